//! The protoc plugin protocol: a serialized [`CodeGeneratorRequest`] on
//! stdin, a serialized [`CodeGeneratorResponse`] on stdout.
//!
//! Generation failures are reported through the response's `error` field
//! with a zero exit, per protoc convention. Nothing but the encoded
//! response is ever written to stdout; diagnostics go to stderr.

use std::io::{self, Read, Write};
use std::path::PathBuf;

use prost::Message;

use crate::descriptor::{CodeGeneratorRequest, CodeGeneratorResponse, GeneratedFile};
use crate::error::{Error, Result};
use crate::extract;
use crate::proto::Package;
use crate::settings::Settings;

/// `CodeGeneratorResponse.Feature.FEATURE_PROTO3_OPTIONAL`.
const FEATURE_PROTO3_OPTIONAL: u64 = 1;

/// Serve one plugin invocation over stdin/stdout.
pub fn run() -> Result<()> {
    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input)?;

    let response = match respond(&input) {
        Ok(response) => response,
        Err(error) => failure(&error),
    };

    io::stdout().write_all(&response.encode_to_vec())?;
    Ok(())
}

/// Decode a request envelope and build its response.
pub fn respond(input: &[u8]) -> Result<CodeGeneratorResponse> {
    let request = CodeGeneratorRequest::decode(input)?;
    let settings = Settings::load(settings_path(request.parameter.as_deref())?.as_deref())?;

    if settings.debug {
        eprintln!(
            "protoc-gen-openapi: {} file(s) in request, generating {:?}",
            request.proto_file.len(),
            request.file_to_generate,
        );
    }

    generate(&request, &settings)
}

/// Build the response for an already-decoded request.
pub fn generate(
    request: &CodeGeneratorRequest,
    settings: &Settings,
) -> Result<CodeGeneratorResponse> {
    let package = Package::from_request(request);
    let mut response = CodeGeneratorResponse {
        error: None,
        supported_features: Some(FEATURE_PROTO3_OPTIONAL),
        file: Vec::new(),
    };

    if let Some(document) = extract::build_document(&package, settings)? {
        response.file.push(GeneratedFile {
            name: Some(output_path(&package.module_name, settings)),
            content: Some(serde_yaml_ng::to_string(&document)?),
        });
    }

    Ok(response)
}

/// Where the document lands, relative to protoc's output directory.
pub fn output_path(module_name: &str, settings: &Settings) -> String {
    if settings.output.use_default_out {
        settings.output.filename.clone()
    } else {
        format!(
            "{}/{}/{}",
            settings.output.path, module_name, settings.output.filename
        )
    }
}

/// Pull the settings file path out of the comma-separated plugin parameter.
///
/// Unknown keys are ignored so unrelated `--openapi_opt` values pass
/// through; a pair without `=` is rejected.
fn settings_path(parameter: Option<&str>) -> Result<Option<PathBuf>> {
    let Some(parameter) = parameter.filter(|value| !value.is_empty()) else {
        return Ok(None);
    };

    let mut path = None;
    for pair in parameter.split(',') {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::InvalidArgument {
                argument: pair.to_string(),
            });
        };
        if key == "settings" {
            path = Some(PathBuf::from(value));
        }
    }
    Ok(path)
}

fn failure(error: &Error) -> CodeGeneratorResponse {
    CodeGeneratorResponse {
        error: Some(error.to_string()),
        supported_features: Some(FEATURE_PROTO3_OPTIONAL),
        file: Vec::new(),
    }
}
