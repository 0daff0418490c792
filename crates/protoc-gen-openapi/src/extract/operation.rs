//! Operation assembly: parameters, request bodies, responses and security.

use std::collections::BTreeMap;

use heck::ToLowerCamelCase;
use openapi_spec::{Media, Operation, Parameter, RequestBody, Response, Schema, SecurityScheme};

use crate::annotations::{RequestBodyAnnotation, RequestBodyKind, ResponseAnnotation};
use crate::error::{Error, Result};
use crate::lookup;
use crate::proto::{Message, Package, Service};
use crate::settings::Settings;

use super::context::MethodContext;
use super::message::SchemaOrigins;
use super::schema;

/// Merge configured default responses with the method's declared ones.
///
/// Declared codes override same-numbered defaults; a declared success code
/// evicts every default 2xx first; code 0 entries are ignored. The result
/// is ascending by code.
pub(super) fn merged_responses(
    context: &MethodContext<'_>,
    settings: &Settings,
) -> Vec<(i32, String)> {
    let mut merged = BTreeMap::new();
    merged.insert(
        settings.operation.default_success_code,
        settings.operation.default_success_description.clone(),
    );
    for response in &settings.error.responses {
        merged.insert(response.code, response.description.clone());
    }

    let declared: &[ResponseAnnotation] = context
        .operation
        .map_or(&[], |operation| operation.response.as_slice());
    if declared
        .iter()
        .any(|response| lookup::is_success_code(response.code))
    {
        merged.retain(|code, _| !lookup::is_success_code(*code));
    }
    for response in declared {
        if response.code == 0 {
            continue;
        }
        merged.insert(response.code, response.description.clone());
    }

    merged.into_iter().collect()
}

/// The responses section of one operation: success codes reference the
/// response message schema, everything else the configured error schema.
pub(super) fn operation_responses(
    context: &MethodContext<'_>,
    settings: &Settings,
) -> BTreeMap<String, Response> {
    let mut responses = BTreeMap::new();
    for (code, description) in merged_responses(context, settings) {
        let schema_name = if lookup::is_success_code(code) {
            success_schema_name(context, settings)
        } else {
            settings.error.default_name.clone()
        };
        let description = if description.is_empty() {
            format!("HTTP {code} response")
        } else {
            description
        };

        responses.insert(
            code.to_string(),
            Response {
                description,
                content: json_content(Schema::reference(&schema_name)),
            },
        );
    }
    responses
}

/// Name the success responses reference, outbound-suffixed when the
/// outbound transform is on so the ref matches the renamed registry key.
pub(super) fn success_schema_name(context: &MethodContext<'_>, settings: &Settings) -> String {
    let name = context.method.response_type_name();
    if settings.naming.use_outbound_messages {
        format!("{name}{}", settings.naming.outbound_schema_suffix)
    } else {
        name.to_string()
    }
}

pub(super) fn json_content(schema: Schema) -> BTreeMap<String, Media> {
    BTreeMap::from([(
        "application/json".to_string(),
        Media {
            schema: Some(schema),
        },
    )])
}

/// Non-body request fields as path/query/header parameters.
pub(super) fn parameters(
    context: &MethodContext<'_>,
    package: &Package,
    settings: &Settings,
    origins: &mut SchemaOrigins,
) -> Result<Vec<Parameter>> {
    let request = request_message(context, package)?;

    let mut parameters = Vec::new();
    for field in &request.fields {
        let property = field.property();
        if property.is_some_and(|p| p.hide_from_schema) {
            continue;
        }

        let location = lookup::field_location(
            property,
            context.operation,
            Some(context.http_rule),
            &context.path_parameters,
            &field.name,
        );
        if location == "body" {
            continue;
        }

        let name = if settings.naming.use_inbound_messages {
            field.name.to_lower_camel_case()
        } else {
            field.name.clone()
        };

        parameters.push(Parameter {
            required: property.is_some_and(|p| p.required) || location == "path",
            location: location.to_string(),
            name,
            description: property.map(|p| p.description.clone()).unwrap_or_default(),
            schema: Some(schema::field_schema(
                field,
                &request.name,
                package,
                settings,
                origins,
            )),
        });
    }

    Ok(parameters)
}

/// The request body for verbs that carry one; `required` only for POST.
pub(super) fn request_body(
    context: &MethodContext<'_>,
    package: &Package,
) -> Result<Option<RequestBody>> {
    if !matches!(context.verb, "post" | "put" | "patch") {
        return Ok(None);
    }

    let request = request_message(context, package)?;
    let annotation = request
        .annotation()
        .and_then(|annotation| annotation.request_body.as_ref());
    let content_type = match annotation.map(RequestBodyAnnotation::kind) {
        Some(RequestBodyKind::MultipartFormData) => "multipart/form-data",
        _ => "application/json",
    };

    Ok(Some(RequestBody {
        required: context.verb == "post",
        description: annotation
            .map(|body| body.description.clone())
            .unwrap_or_default(),
        content: BTreeMap::from([(
            content_type.to_string(),
            Media {
                schema: Some(Schema::reference(&request.name)),
            },
        )]),
    }))
}

fn request_message<'a>(
    context: &MethodContext<'_>,
    package: &'a Package,
) -> Result<&'a Message> {
    lookup::find_message(package, context.method.request_type_name()).map_err(|_| {
        Error::RequestMessageNotFound {
            message: context.method.request_type_name().to_string(),
        }
    })
}

/// One requirement entry per service-level security annotation.
pub(super) fn operation_security(service: &Service) -> Vec<BTreeMap<String, Vec<String>>> {
    service
        .security()
        .iter()
        .map(|requirement| BTreeMap::from([(requirement.name.clone(), Vec::new())]))
        .collect()
}

/// `components.securitySchemes` transcribed from the service annotations.
pub(super) fn security_schemes(service: &Service) -> BTreeMap<String, SecurityScheme> {
    service
        .security()
        .iter()
        .map(|requirement| {
            (
                requirement.name.clone(),
                SecurityScheme {
                    scheme_type: requirement.security_type().as_str().to_string(),
                    scheme: requirement.scheme_kind().as_str().to_string(),
                    bearer_format: requirement.bearer_format.clone(),
                },
            )
        })
        .collect()
}

/// Assemble one path-item operation.
pub(super) fn build_operation(
    context: &MethodContext<'_>,
    package: &Package,
    settings: &Settings,
    security: &[BTreeMap<String, Vec<String>>],
    origins: &mut SchemaOrigins,
) -> Result<Operation> {
    let annotation = context.operation;
    let summary = match annotation {
        Some(operation) if !operation.summary.is_empty() => operation.summary.clone(),
        _ => context.method.name.clone(),
    };
    let tags = match annotation {
        Some(operation) if !operation.tags.is_empty() => operation.tags.clone(),
        _ => vec![package.module_name.clone()],
    };

    Ok(Operation {
        summary,
        description: annotation
            .map(|operation| operation.description.clone())
            .unwrap_or_default(),
        operation_id: context.method.name.clone(),
        tags,
        parameters: parameters(context, package, settings, origins)?,
        responses: operation_responses(context, settings),
        request_body: request_body(context, package)?,
        security: security.to_vec(),
    })
}
