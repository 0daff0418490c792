//! Schema renaming transforms.
//!
//! After extraction, request schemas may get inbound property renaming and
//! response schemas outbound renaming plus a registry suffix. Both are
//! expressed through one strategy trait so the traversal is written once.

use std::collections::BTreeMap;

use heck::ToLowerCamelCase;
use openapi_spec::Schema;

use super::message::SchemaOrigins;

/// Renaming strategy applied while walking a schema tree.
///
/// The defaults rename nothing, so an empty `impl TransformRules for X {}`
/// is a valid identity transform.
pub trait TransformRules {
    /// Whether property keys change; lets the traversal skip map rebuilds.
    fn renames_properties(&self) -> bool {
        false
    }

    /// New name for a schema-registry key or `$ref` target.
    fn rename_ref(&self, name: &str) -> String {
        name.to_string()
    }

    /// New key for a property of `parent`.
    fn rename_property(&self, _parent: &Schema, name: &str, _property: &Schema) -> String {
        name.to_string()
    }
}

/// Apply `rules` to a schema tree, returning the transformed copy.
///
/// Traversal order: the node's own `$ref`, `items`, `additionalProperties`,
/// each `anyOf` member, then properties. Only refs of the
/// `#/components/schemas/<Name>` shape are rewritten; anything else passes
/// through untouched. When properties are renamed the required list is
/// remapped through the old→new table, keeping entries the table does not
/// cover.
pub fn transform_schema(schema: &Schema, rules: &impl TransformRules) -> Schema {
    let mut out = schema.clone();

    if let Some(name) = schema.ref_schema_name() {
        out.set_ref_schema_name(&rules.rename_ref(name));
    }
    if let Some(items) = &schema.items {
        out.items = Some(Box::new(transform_schema(items, rules)));
    }
    if let Some(additional) = &schema.additional_properties {
        out.additional_properties = Some(Box::new(transform_schema(additional, rules)));
    }
    if !schema.any_of.is_empty() {
        out.any_of = schema
            .any_of
            .iter()
            .map(|member| transform_schema(member, rules))
            .collect();
    }

    if schema.properties.is_empty() {
        return out;
    }

    if !rules.renames_properties() {
        out.properties = schema
            .properties
            .iter()
            .map(|(name, property)| (name.clone(), transform_schema(property, rules)))
            .collect();
        return out;
    }

    let mut renamed = BTreeMap::new();
    let mut new_names = BTreeMap::new();
    for (name, property) in &schema.properties {
        let property = transform_schema(property, rules);
        let new_name = rules.rename_property(schema, name, &property);
        new_names.insert(name.clone(), new_name.clone());
        renamed.insert(new_name, property);
    }

    out.properties = renamed;
    out.required_properties = schema
        .required_properties
        .iter()
        .map(|name| new_names.get(name).cloned().unwrap_or_else(|| name.clone()))
        .collect();

    out
}

/// Request-side renaming: property keys become the originating field's
/// lower-camel JSON name; refs and registry keys stay as they are.
pub struct InboundRules<'a> {
    origins: &'a SchemaOrigins,
}

impl<'a> InboundRules<'a> {
    /// Rules backed by the extraction run's origin table.
    #[must_use]
    pub fn new(origins: &'a SchemaOrigins) -> Self {
        Self { origins }
    }
}

impl TransformRules for InboundRules<'_> {
    fn renames_properties(&self) -> bool {
        true
    }

    fn rename_property(&self, _parent: &Schema, name: &str, property: &Schema) -> String {
        camel_property_name(self.origins, name, property)
    }
}

/// Response-side renaming: lower-camel property keys, plus a configured
/// suffix on every schema name so outbound shapes never collide with
/// request schemas.
pub struct OutboundRules<'a> {
    origins: &'a SchemaOrigins,
    suffix: &'a str,
}

impl<'a> OutboundRules<'a> {
    /// Rules appending `suffix` to schema names.
    #[must_use]
    pub fn new(origins: &'a SchemaOrigins, suffix: &'a str) -> Self {
        Self { origins, suffix }
    }
}

impl TransformRules for OutboundRules<'_> {
    fn renames_properties(&self) -> bool {
        true
    }

    fn rename_ref(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }

    fn rename_property(&self, _parent: &Schema, name: &str, property: &Schema) -> String {
        camel_property_name(self.origins, name, property)
    }
}

/// Lower-camel name of the property's originating proto field; properties
/// with no recorded origin keep their key.
fn camel_property_name(origins: &SchemaOrigins, name: &str, property: &Schema) -> String {
    match property.origin.and_then(|id| origins.field_name(id)) {
        Some(field) => field.to_lower_camel_case(),
        None => name.to_string(),
    }
}
