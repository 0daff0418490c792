//! Component registry: message schemas, the shared error schema and
//! security schemes.

use std::collections::{BTreeMap, BTreeSet};

use openapi_spec::{Components, Response, Schema, SchemaType};

use crate::error::Result;
use crate::lookup;
use crate::proto::{Package, Service};
use crate::settings::{ErrorField, ErrorSettings, Settings};

use super::context::MethodContext;
use super::message::Extractor;
use super::operation;
use super::transform::{transform_schema, InboundRules, OutboundRules, TransformRules};

/// Collect `components` for the whole document.
///
/// Request schemas are walked only for methods that carry a body; response
/// schemas always. The configured error schema is appended afterwards and
/// never goes through the naming transforms.
pub(super) fn build(
    package: &Package,
    settings: &Settings,
    service: &Service,
    contexts: &[MethodContext<'_>],
    extractor: &mut Extractor<'_>,
) -> Result<Components> {
    let mut schemas = BTreeMap::new();
    let mut any_error_code = false;

    for context in contexts {
        if context.has_body() {
            let request = lookup::find_message(package, context.method.request_type_name())?;
            let request_schemas = extractor.message_schemas(request, context)?;
            if settings.naming.use_inbound_messages && !context.inbound_renaming_disabled() {
                let rules = InboundRules::new(extractor.origins());
                extend_transformed(&mut schemas, request_schemas, &rules);
            } else {
                schemas.extend(request_schemas);
            }
        }

        let response = lookup::find_message(package, context.method.response_type_name())?;
        let response_schemas = extractor.message_schemas(response, context)?;
        if settings.naming.use_outbound_messages {
            let rules = OutboundRules::new(
                extractor.origins(),
                &settings.naming.outbound_schema_suffix,
            );
            extend_transformed(&mut schemas, response_schemas, &rules);
        } else {
            schemas.extend(response_schemas);
        }

        any_error_code |= operation::merged_responses(context, settings)
            .iter()
            .any(|(code, _)| !lookup::is_success_code(*code));
    }

    append_error_schemas(&settings.error, &mut schemas);

    let mut responses = BTreeMap::new();
    if any_error_code {
        responses.insert(
            settings.error.default_name.clone(),
            Response {
                description: settings.error.default_description.clone(),
                content: operation::json_content(Schema::reference(&settings.error.default_name)),
            },
        );
    }

    Ok(Components {
        schemas,
        responses,
        security_schemes: operation::security_schemes(service),
    })
}

fn extend_transformed(
    acc: &mut BTreeMap<String, Schema>,
    schemas: BTreeMap<String, Schema>,
    rules: &impl TransformRules,
) {
    for (name, schema) in schemas {
        acc.insert(rules.rename_ref(&name), transform_schema(&schema, rules));
    }
}

/// Register the configured error schema under its default name.
///
/// Named object shapes encountered in the field tree are registered as
/// their own components and referenced from the error schema.
fn append_error_schemas(error: &ErrorSettings, schemas: &mut BTreeMap<String, Schema>) {
    let mut visiting = BTreeSet::new();
    let mut properties = BTreeMap::new();
    for (name, field) in &error.fields {
        properties.insert(name.clone(), error_field_schema(field, schemas, &mut visiting));
    }

    schemas.insert(
        error.default_name.clone(),
        Schema {
            properties,
            ..Schema::typed(SchemaType::Object)
        },
    );
}

/// One node of the configured error shape.
///
/// Unrecognized type strings degrade to untyped nodes; arrays without an
/// item shape stay items-less.
fn error_field_schema(
    field: &ErrorField,
    schemas: &mut BTreeMap<String, Schema>,
    visiting: &mut BTreeSet<String>,
) -> Schema {
    let Some(kind) = field.field_type.as_deref() else {
        return match &field.reference {
            Some(name) => Schema::reference(name),
            None => Schema::default(),
        };
    };

    match kind {
        "array" => {
            let items = match (&field.items, &field.reference) {
                (Some(items), _) => Some(error_field_schema(items, schemas, visiting)),
                (None, Some(name)) => Some(Schema::reference(name)),
                (None, None) => None,
            };
            Schema {
                items: items.map(Box::new),
                ..Schema::typed(SchemaType::Array)
            }
        }
        "object" => object_error_schema(field, schemas, visiting),
        other => match &field.reference {
            Some(name) => Schema::reference(name),
            None => parse_schema_type(other),
        },
    }
}

fn object_error_schema(
    field: &ErrorField,
    schemas: &mut BTreeMap<String, Schema>,
    visiting: &mut BTreeSet<String>,
) -> Schema {
    if let Some(name) = &field.reference {
        let has_definition = !field.fields.is_empty() || field.additional_properties.is_some();
        if has_definition && !visiting.contains(name) && !schemas.contains_key(name) {
            visiting.insert(name.clone());
            let inline = inline_object_schema(field, schemas, visiting);
            schemas.insert(name.clone(), inline);
            visiting.remove(name);
        }
        return Schema::reference(name);
    }

    inline_object_schema(field, schemas, visiting)
}

fn inline_object_schema(
    field: &ErrorField,
    schemas: &mut BTreeMap<String, Schema>,
    visiting: &mut BTreeSet<String>,
) -> Schema {
    let mut schema = Schema::typed(SchemaType::Object);
    for (name, nested) in &field.fields {
        schema
            .properties
            .insert(name.clone(), error_field_schema(nested, schemas, visiting));
    }
    if let Some(nested) = &field.additional_properties {
        schema.additional_properties =
            Some(Box::new(error_field_schema(nested, schemas, visiting)));
    }
    schema
}

fn parse_schema_type(value: &str) -> Schema {
    match value {
        "string" => Schema::typed(SchemaType::String),
        "integer" => Schema::typed(SchemaType::Integer),
        "number" => Schema::typed(SchemaType::Number),
        "boolean" => Schema::typed(SchemaType::Boolean),
        _ => Schema::default(),
    }
}
