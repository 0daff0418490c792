//! Field-to-schema translation.
//!
//! One field becomes one schema node through a fixed sequence of layers;
//! later layers overwrite earlier ones, so a timestamp's `date-time` format
//! beats whatever format the property annotation asked for.

use openapi_spec::{Schema, SchemaType};

use crate::lookup;
use crate::proto::{Field, FieldKind, MapValue, MapValueKind, Package, ScalarKind};
use crate::settings::Settings;

use super::message::SchemaOrigins;

/// JSON shapes a `google.protobuf.Value` can take, in `anyOf` order.
const DYNAMIC_VALUE_SHAPES: [SchemaType; 6] = [
    SchemaType::String,
    SchemaType::Integer,
    SchemaType::Number,
    SchemaType::Boolean,
    SchemaType::Object,
    SchemaType::Array,
];

/// Base OpenAPI type for a classified field, before any overrides.
pub(super) fn base_schema_type(kind: &FieldKind) -> SchemaType {
    match kind {
        FieldKind::Scalar(scalar) => scalar_schema_type(*scalar),
        FieldKind::Enum | FieldKind::Timestamp => SchemaType::String,
        FieldKind::Message
        | FieldKind::DynamicStruct
        | FieldKind::DynamicValue
        | FieldKind::Any
        | FieldKind::Map(_) => SchemaType::Object,
    }
}

fn scalar_schema_type(scalar: ScalarKind) -> SchemaType {
    match scalar {
        ScalarKind::Double | ScalarKind::Float => SchemaType::Number,
        ScalarKind::Bool => SchemaType::Boolean,
        ScalarKind::String | ScalarKind::Bytes => SchemaType::String,
        ScalarKind::Unknown => SchemaType::Unspecified,
        _ => SchemaType::Integer,
    }
}

/// Build the schema node for one field of `owner`.
///
/// Layers, in order: base type, property annotation, well-known-type
/// overrides, map value shape, repeated wrapping. Child-message expansion
/// is the extractor's job; here a message field is a plain object.
pub(super) fn field_schema(
    field: &Field,
    owner: &str,
    package: &Package,
    settings: &Settings,
    origins: &mut SchemaOrigins,
) -> Schema {
    let base = base_schema_type(&field.kind);
    let mut schema = Schema::typed(base);
    schema.origin = Some(origins.record_field(owner, &field.name));

    if let Some(property) = field.property() {
        schema.required = property.required;
        schema.example = property.example.clone();
        schema.description = property.description.clone();

        let format = property.format().as_openapi();
        if !format.is_empty() {
            schema.format = format.to_string();
        }
    }

    match &field.kind {
        FieldKind::Timestamp => {
            schema.format = "date-time".to_string();
        }
        FieldKind::Enum => {
            // Unresolvable enums stay plain strings.
            if let Some(definition) = lookup::find_enum(package, &field.type_name) {
                schema.enum_values = lookup::enum_values(&definition, &settings.enums);
            }
        }
        FieldKind::DynamicStruct => {
            schema.additional_properties = Some(Box::default());
        }
        FieldKind::DynamicValue => {
            schema.any_of = DYNAMIC_VALUE_SHAPES.iter().map(|s| Schema::typed(*s)).collect();
        }
        FieldKind::Map(value) => {
            schema.additional_properties = Some(Box::new(map_value_schema(value)));
        }
        FieldKind::Scalar(_) | FieldKind::Message | FieldKind::Any => {}
    }

    if field.repeated {
        schema.schema_type = SchemaType::Array.as_str().to_string();
        if schema.items.is_none() {
            schema.items = Some(Box::new(Schema::typed(base)));
        }
    }

    schema
}

fn map_value_schema(value: &MapValue) -> Schema {
    match value.kind {
        MapValueKind::Message | MapValueKind::Enum => {
            Schema::reference(value.simple_type_name())
        }
        MapValueKind::Scalar(scalar) => Schema::typed(map_scalar_type(scalar)),
    }
}

fn map_scalar_type(scalar: ScalarKind) -> SchemaType {
    match scalar {
        ScalarKind::Double | ScalarKind::Float => SchemaType::Number,
        ScalarKind::String | ScalarKind::Bytes => SchemaType::String,
        ScalarKind::Bool => SchemaType::Boolean,
        _ => SchemaType::Integer,
    }
}
