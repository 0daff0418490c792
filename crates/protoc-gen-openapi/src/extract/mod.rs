//! Turns a parsed [`Package`] into an OpenAPI [`Document`].
//!
//! Extraction walks every HTTP-bound method of the package's service:
//! request and response messages become component schemas, non-body request
//! fields become parameters, and configured defaults fill in the response
//! tables. Schema naming transforms (inbound camelCase, outbound suffixing)
//! run over the finished schemas, steered by the origin handles recorded
//! during the walk.

mod components;
mod context;
mod message;
mod operation;
mod schema;
mod transform;

pub use context::MethodContext;
pub use message::{Extractor, SchemaOrigins};
pub use transform::{transform_schema, InboundRules, OutboundRules, TransformRules};

use std::collections::BTreeMap;

use openapi_spec::{Document, Info, Operation, Server};

use crate::annotations;
use crate::error::Result;
use crate::lookup;
use crate::proto::Package;
use crate::settings::Settings;

/// Derive the OpenAPI document for a package.
///
/// Returns `Ok(None)` when the package has no service or none of its
/// methods carry an HTTP binding; there is nothing to document then.
pub fn build_document(package: &Package, settings: &Settings) -> Result<Option<Document>> {
    let Some(service) = &package.service else {
        return Ok(None);
    };

    let contexts: Vec<MethodContext<'_>> = service
        .methods
        .iter()
        .filter_map(|method| MethodContext::new(method, package, settings))
        .collect();
    if contexts.is_empty() {
        return Ok(None);
    }

    let mut extractor = Extractor::new(package, settings);
    let components = components::build(package, settings, service, &contexts, &mut extractor)?;
    let security = operation::operation_security(service);

    let mut paths: BTreeMap<String, BTreeMap<String, Operation>> = BTreeMap::new();
    for context in &contexts {
        let built = operation::build_operation(
            context,
            package,
            settings,
            &security,
            extractor.origins_mut(),
        )?;
        paths
            .entry(context.endpoint.clone())
            .or_default()
            .insert(context.verb.to_string(), built);
    }

    let (info, servers) = document_metadata(package, settings)?;
    Ok(Some(Document {
        openapi: "3.0.0".to_string(),
        info,
        servers,
        paths,
        components: Some(components),
    }))
}

/// Document info and servers from the main module file's metadata
/// annotation, with the package name and a stock version as fallbacks.
fn document_metadata(package: &Package, settings: &Settings) -> Result<(Info, Vec<Server>)> {
    let file = lookup::find_main_module_file(package, settings)?;

    let mut info = Info {
        title: package.module_name.clone(),
        version: "v0.1.0".to_string(),
        description: String::new(),
    };
    let mut servers = Vec::new();

    if let Some(metadata) = annotations::file_metadata(file) {
        if let Some(details) = &metadata.info {
            if !details.title.is_empty() {
                info.title = details.title.clone();
            }
            if !details.version.is_empty() {
                info.version = details.version.clone();
            }
            if !details.description.is_empty() {
                info.description = details.description.clone();
            }
        }
        servers = metadata
            .servers
            .iter()
            .map(|server| Server {
                url: server.url.clone(),
                description: server.description.clone(),
            })
            .collect();
    }

    Ok((info, servers))
}
