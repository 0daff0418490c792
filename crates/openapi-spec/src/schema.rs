//! Schema nodes and the shared reference vocabulary.
//!
//! A [`Schema`] is one node of the generated document tree. Exactly one of
//! three shapes applies to a node: a `$ref` pointer, an inline `type`, or an
//! `anyOf` union. `items` is only meaningful on array-shaped nodes and
//! `additionalProperties` on object/map-shaped ones. The constructors below
//! produce nodes in a valid shape; code that mutates nodes afterwards (the
//! renaming transform, ref substitution) is expected to keep the invariant.

use std::collections::BTreeMap;

use serde::Serialize;

/// Literal prefix of every schema reference in the components section.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// Builds a `$ref` string pointing at a named schema in the components
/// section.
#[must_use]
pub fn schema_ref(name: &str) -> String {
    format!("{SCHEMA_REF_PREFIX}{name}")
}

/// Opaque handle linking a schema node back to the entity that produced it.
///
/// Handles are issued by the producer (monotonically, per generation run) and
/// resolved through a side table the producer owns. They exist so that two
/// nodes for equally-named fields in different messages never collide, and
/// they serialize as plain integers for debugging — but are skipped entirely
/// in document output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SchemaId(u32);

impl SchemaId {
    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value of the handle.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// The inline type vocabulary of generated schema nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    /// No recognized mapping; rendered literally so the gap is visible.
    Unspecified,
    /// JSON object.
    Object,
    /// JSON string.
    String,
    /// JSON array.
    Array,
    /// JSON boolean.
    Boolean,
    /// JSON integer.
    Integer,
    /// JSON number.
    Number,
}

impl SchemaType {
    /// The OpenAPI spelling of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::String => "string",
            Self::Array => "array",
            Self::Unspecified => "unspecified",
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a generated schema tree.
///
/// Field semantics follow the OpenAPI 3.0 Schema Object; empty fields are
/// omitted from serialized output. The non-serialized [`required`](Self::required)
/// flag carries a field-level "this property is mandatory" annotation for the
/// producer to fold into the owning object's [`required_properties`](Self::required_properties)
/// list or into parameter `required` flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    /// Inline type name; empty when the node is a `$ref` or `anyOf`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub schema_type: String,

    /// OpenAPI format hint (`date-time`, `int64`, ...).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,

    /// Reference to a named schema, `#/components/schemas/<Name>`.
    #[serde(rename = "$ref", skip_serializing_if = "String::is_empty")]
    pub reference: String,

    /// Human-readable description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Example value, rendered as a string.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub example: String,

    /// Element schema; array-shaped nodes only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    /// Enumerated string constants.
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,

    /// Names of mandatory properties, in declaration order.
    #[serde(rename = "required", skip_serializing_if = "Vec::is_empty")]
    pub required_properties: Vec<String>,

    /// Named child schemas; object-shaped nodes only.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,

    /// Value schema for map-like objects; an empty schema means "any value".
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<Box<Schema>>,

    /// Union of alternative shapes.
    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,

    /// Field-level mandatory flag; never serialized.
    #[serde(skip)]
    pub required: bool,

    /// Producer-issued origin handle; never serialized.
    #[serde(skip)]
    pub origin: Option<SchemaId>,
}

impl Schema {
    /// An inline node of the given type.
    #[must_use]
    pub fn typed(schema_type: SchemaType) -> Self {
        Self {
            schema_type: schema_type.as_str().to_owned(),
            ..Self::default()
        }
    }

    /// A pure `$ref` node pointing at a named component schema.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self {
            reference: schema_ref(name),
            ..Self::default()
        }
    }

    /// Whether this node is array-shaped.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.schema_type == SchemaType::Array.as_str()
    }

    /// The `<Name>` portion of a `#/components/schemas/<Name>` reference.
    ///
    /// Returns `None` for non-reference nodes and for references of any other
    /// shape, which renaming passes must leave untouched.
    #[must_use]
    pub fn ref_schema_name(&self) -> Option<&str> {
        self.reference
            .strip_prefix(SCHEMA_REF_PREFIX)
            .filter(|name| !name.is_empty() && !name.contains('/'))
    }

    /// Points this node at a named component schema, keeping its other
    /// attributes.
    pub fn set_ref_schema_name(&mut self, name: &str) {
        self.reference = schema_ref(name);
    }
}
