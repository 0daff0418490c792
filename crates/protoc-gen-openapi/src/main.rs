//! CLI for `protoc-gen-openapi`.
//!
//! Invoked by protoc with no arguments, the binary speaks the plugin
//! protocol: a serialized `CodeGeneratorRequest` on stdin, the response
//! on stdout.
//!
//! ```text
//! protoc --openapi_out=gen --openapi_opt=settings=openapi.toml proto/*.proto
//! ```
//!
//! The `generate` subcommand runs the same generator offline against a
//! compiled descriptor set, for pipelines that invoke `protoc` (or
//! `buf build`) separately:
//!
//! ```text
//! protoc-gen-openapi generate \
//!   --descriptors proto.binpb \
//!   --settings openapi.toml \
//!   --out gen
//! ```

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use prost::Message;

use protoc_gen_openapi::descriptor::{CodeGeneratorRequest, FileDescriptorSet};
use protoc_gen_openapi::plugin;
use protoc_gen_openapi::settings::Settings;

/// `OpenAPI` 3.0 generator for annotated proto service definitions.
#[derive(Parser)]
#[command(name = "protoc-gen-openapi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate `OpenAPI` documents from a compiled descriptor set.
    ///
    /// Accepts either a raw `FileDescriptorSet` (`protoc -o`, `buf build`)
    /// or a captured `CodeGeneratorRequest`. With a raw set, every file in
    /// it is treated as requested for generation.
    Generate(GenerateArgs),
}

#[derive(Parser)]
struct GenerateArgs {
    /// Path to the compiled descriptor set (binary).
    #[arg(short, long)]
    descriptors: PathBuf,

    /// Path to the generator settings TOML file.
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Directory the generated documents are written under.
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => plugin::run().context("Plugin run failed"),
        Some(Command::Generate(args)) => run_generate(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.descriptors)
        .with_context(|| format!("Failed to read {}", args.descriptors.display()))?;
    let request = decode_request(&bytes)?;

    let settings = Settings::load(args.settings.as_deref()).context("Failed to load settings")?;

    let response = plugin::generate(&request, &settings).context("Generation failed")?;
    if response.file.is_empty() {
        eprintln!("Nothing to generate: no HTTP-bound service in the descriptors");
        return Ok(());
    }

    for file in &response.file {
        let Some(name) = file.name.as_deref() else {
            continue;
        };
        let path = args.out.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, file.content.as_deref().unwrap_or_default())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

/// Decode the descriptor input, accepting either envelope.
///
/// A `CodeGeneratorRequest` is recognized by its carried `proto_file`
/// entries; anything else is decoded as a raw `FileDescriptorSet` and
/// wrapped with every file marked for generation.
fn decode_request(bytes: &[u8]) -> anyhow::Result<CodeGeneratorRequest> {
    if let Ok(request) = CodeGeneratorRequest::decode(bytes) {
        if !request.proto_file.is_empty() {
            return Ok(request);
        }
    }

    let set = FileDescriptorSet::decode(bytes).context("Failed to decode descriptor set")?;
    Ok(CodeGeneratorRequest {
        file_to_generate: set
            .file
            .iter()
            .filter_map(|file| file.name.clone())
            .collect(),
        parameter: None,
        proto_file: set.file,
    })
}

#[cfg(test)]
mod tests {
    use protoc_gen_openapi::descriptor::{
        DescriptorProto, FileDescriptorProto, HttpPattern, HttpRule, MethodDescriptorProto,
        MethodOptions, ServiceDescriptorProto,
    };

    use super::*;

    fn fixture_file() -> FileDescriptorProto {
        let message = |name: &str| DescriptorProto {
            name: Some(name.to_string()),
            field: vec![],
            nested_type: vec![],
            enum_type: vec![],
            options: None,
        };

        FileDescriptorProto {
            name: Some("cards.proto".to_string()),
            package: Some("services.cards".to_string()),
            message_type: vec![message("ListCardsRequest"), message("ListCardsResponse")],
            enum_type: vec![],
            service: vec![ServiceDescriptorProto {
                name: Some("Cards".to_string()),
                method: vec![MethodDescriptorProto {
                    name: Some("ListCards".to_string()),
                    input_type: Some(".services.cards.ListCardsRequest".to_string()),
                    output_type: Some(".services.cards.ListCardsResponse".to_string()),
                    options: Some(MethodOptions {
                        operation: None,
                        http: Some(HttpRule {
                            pattern: Some(HttpPattern::Get("/v1/cards".to_string())),
                            body: String::new(),
                        }),
                    }),
                }],
                options: None,
            }],
            options: None,
        }
    }

    #[test]
    fn plugin_requests_pass_through_unchanged() {
        let original = CodeGeneratorRequest {
            file_to_generate: vec!["cards.proto".to_string()],
            parameter: Some("settings=openapi.toml".to_string()),
            proto_file: vec![fixture_file()],
        };

        let decoded = decode_request(&original.encode_to_vec()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn raw_descriptor_sets_mark_every_file_for_generation() {
        let mut second = fixture_file();
        second.name = Some("cards_types.proto".to_string());
        second.service.clear();
        let set = FileDescriptorSet {
            file: vec![fixture_file(), second],
        };

        let decoded = decode_request(&set.encode_to_vec()).unwrap();
        assert_eq!(
            decoded.file_to_generate,
            vec!["cards.proto", "cards_types.proto"],
        );
        assert_eq!(decoded.parameter, None);
        assert_eq!(decoded.proto_file.len(), 2);
    }

    #[test]
    fn generate_writes_the_document_under_out() {
        let work = std::env::temp_dir().join("protoc_gen_openapi_generate_test");
        fs::create_dir_all(&work).unwrap();

        let request = CodeGeneratorRequest {
            file_to_generate: vec!["cards.proto".to_string()],
            parameter: None,
            proto_file: vec![fixture_file()],
        };
        let descriptors = work.join("request.binpb");
        fs::write(&descriptors, request.encode_to_vec()).unwrap();

        let args = GenerateArgs {
            descriptors,
            settings: None,
            out: work.clone(),
        };
        run_generate(&args).unwrap();

        let written = fs::read_to_string(work.join("openapi/cards/openapi.yaml")).unwrap();
        assert!(written.starts_with("openapi: 3.0.0"));
    }
}
