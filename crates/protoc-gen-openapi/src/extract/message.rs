//! The message schema extractor.
//!
//! Walks a method's request/response messages depth-first, accumulating one
//! object schema per message. All traversal state — the visited set and the
//! origin side table — lives in the [`Extractor`] value created per
//! document run, threaded through the recursion by `&mut self`.

use std::collections::{BTreeMap, BTreeSet};

use openapi_spec::{schema_ref, Schema, SchemaId, SchemaType};

use crate::error::{Error, Result};
use crate::lookup;
use crate::proto::{Field, FieldKind, MapValue, MapValueKind, Message, Package};
use crate::settings::Settings;

use super::context::MethodContext;
use super::schema;

/// Side table resolving [`SchemaId`] handles issued during extraction.
///
/// Every schema node built from a field records the `(message, field)` pair
/// it came from; message-level object schemas record just the message. The
/// renaming transform recovers proto field names through this table instead
/// of relying on pointer identity.
#[derive(Debug, Default)]
pub struct SchemaOrigins {
    entries: Vec<Origin>,
}

#[derive(Debug)]
struct Origin {
    message: String,
    field: Option<String>,
}

impl SchemaOrigins {
    pub(super) fn record_field(&mut self, message: &str, field: &str) -> SchemaId {
        self.record(message, Some(field))
    }

    pub(super) fn record_message(&mut self, message: &str) -> SchemaId {
        self.record(message, None)
    }

    fn record(&mut self, message: &str, field: Option<&str>) -> SchemaId {
        let id = SchemaId::new(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(Origin {
            message: message.to_string(),
            field: field.map(str::to_string),
        });
        id
    }

    /// Message behind a handle.
    #[must_use]
    pub fn message_name(&self, id: SchemaId) -> Option<&str> {
        self.entry(id).map(|origin| origin.message.as_str())
    }

    /// Originating field behind a handle; `None` for message-level schemas.
    #[must_use]
    pub fn field_name(&self, id: SchemaId) -> Option<&str> {
        self.entry(id).and_then(|origin| origin.field.as_deref())
    }

    fn entry(&self, id: SchemaId) -> Option<&Origin> {
        self.entries.get(usize::try_from(id.get()).ok()?)
    }
}

/// Per-run schema extraction state.
pub struct Extractor<'a> {
    package: &'a Package,
    settings: &'a Settings,
    visited: BTreeSet<String>,
    origins: SchemaOrigins,
}

impl<'a> Extractor<'a> {
    /// Fresh extractor for one document run.
    #[must_use]
    pub fn new(package: &'a Package, settings: &'a Settings) -> Self {
        Self {
            package,
            settings,
            visited: BTreeSet::new(),
            origins: SchemaOrigins::default(),
        }
    }

    /// The origin side table accumulated so far.
    #[must_use]
    pub fn origins(&self) -> &SchemaOrigins {
        &self.origins
    }

    pub(super) fn origins_mut(&mut self) -> &mut SchemaOrigins {
        &mut self.origins
    }

    /// Extract the schema for `message` and everything it references.
    ///
    /// The message is marked visited before its fields are walked, so
    /// self-referential and mutually recursive messages terminate with one
    /// schema each; a referenced message already visited emits only a
    /// `$ref`. Non-body fields are dropped from messages belonging to the
    /// module being generated (they travel as parameters instead); nested
    /// messages from other modules keep all their fields.
    ///
    /// # Errors
    ///
    /// Any failed message resolution aborts the extraction.
    pub fn message_schemas(
        &mut self,
        message: &Message,
        context: &MethodContext<'_>,
    ) -> Result<BTreeMap<String, Schema>> {
        let mut schemas = BTreeMap::new();
        self.visited.insert(message.name.clone());

        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for field in &message.fields {
            let property = field.property();
            if property.is_some_and(|p| p.hide_from_schema) {
                continue;
            }

            if field.is_child_message() {
                self.collect_child_schemas(field, context, &mut schemas)?;

                let schema = self.child_ref_schema(field, message);
                if schema.required {
                    required.push(override_name(field).to_string());
                }
                // Ref schemas keep the raw field name as their key.
                properties.insert(field.name.clone(), schema);
                continue;
            }

            let location = lookup::field_location(
                property,
                context.operation,
                Some(context.http_rule),
                &context.path_parameters,
                &field.name,
            );
            if location != "body" && message.module_name == self.package.module_name {
                continue;
            }

            let schema = schema::field_schema(
                field,
                &message.name,
                self.package,
                self.settings,
                &mut self.origins,
            );
            if let FieldKind::Map(value) = &field.kind {
                self.collect_map_value_schemas(value, context, &mut schemas)?;
            }

            let name = override_name(field);
            if schema.required {
                required.push(name.to_string());
            }
            properties.insert(name.to_string(), schema);
        }

        let mut own = Schema::typed(SchemaType::Object);
        own.origin = Some(self.origins.record_message(&message.name));
        own.properties = properties;
        own.required_properties = required;
        schemas.insert(message.name.clone(), own);

        Ok(schemas)
    }

    fn collect_child_schemas(
        &mut self,
        field: &Field,
        context: &MethodContext<'_>,
        schemas: &mut BTreeMap<String, Schema>,
    ) -> Result<()> {
        if self.visited.contains(field.simple_type_name()) {
            return Ok(());
        }

        let child = self.resolve_child(field)?;
        let child_schemas = self.message_schemas(&child, context)?;
        schemas.extend(child_schemas);
        Ok(())
    }

    fn resolve_child(&self, field: &Field) -> Result<Message> {
        if lookup::package_of(&field.type_name) == self.package.name {
            return lookup::find_message(self.package, field.simple_type_name()).cloned();
        }
        lookup::find_foreign_message(self.package, &field.type_name)
    }

    /// Turn a child-message field into a `$ref` carrying the field's
    /// annotation overlay: `items` ref when repeated, bare ref otherwise.
    fn child_ref_schema(&mut self, field: &Field, owner: &Message) -> Schema {
        let mut schema = schema::field_schema(
            field,
            &owner.name,
            self.package,
            self.settings,
            &mut self.origins,
        );

        let child_name = field.simple_type_name();
        if schema.is_array() {
            schema.items = Some(Box::new(Schema::reference(child_name)));
        } else {
            schema.schema_type = String::new();
            schema.reference = schema_ref(child_name);
        }
        schema
    }

    /// Expand a map field's message or enum value type into the
    /// accumulator. An absent value type is skipped silently; enum values
    /// expand as their raw wire names keyed by the enum's simple name.
    fn collect_map_value_schemas(
        &mut self,
        value: &MapValue,
        context: &MethodContext<'_>,
        schemas: &mut BTreeMap<String, Schema>,
    ) -> Result<()> {
        match value.kind {
            MapValueKind::Message => {
                if self.visited.contains(value.simple_type_name()) {
                    return Ok(());
                }
                let Some(message) = self.resolve_map_value_message(&value.type_name)? else {
                    return Ok(());
                };
                let value_schemas = self.message_schemas(&message, context)?;
                schemas.extend(value_schemas);
            }
            MapValueKind::Enum => {
                let Some(definition) = lookup::find_enum(self.package, &value.type_name) else {
                    return Ok(());
                };
                let mut schema = Schema::typed(SchemaType::String);
                schema.enum_values = definition.value_names().map(str::to_string).collect();
                schemas.insert(definition.name.clone(), schema);
            }
            MapValueKind::Scalar(_) => {}
        }
        Ok(())
    }

    fn resolve_map_value_message(&self, type_name: &str) -> Result<Option<Message>> {
        if lookup::package_of(type_name) == self.package.name {
            let found = lookup::find_message(self.package, lookup::simple_name(type_name));
            return Ok(found.ok().cloned());
        }

        match lookup::find_foreign_message(self.package, type_name) {
            Ok(message) => Ok(Some(message)),
            Err(Error::MessageNotFound { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }
}

fn override_name(field: &Field) -> &str {
    match field.property() {
        Some(property) if !property.schema_name.is_empty() => &property.schema_name,
        _ => &field.name,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotations::PropertyAnnotation;
    use crate::descriptor::{
        field_label, field_type, CodeGeneratorRequest, DescriptorProto, EnumDescriptorProto,
        EnumValueDescriptorProto, FieldDescriptorProto, FieldOptions, FileDescriptorProto,
        HttpPattern, HttpRule, MessageOptions, MethodDescriptorProto, MethodOptions,
        ServiceDescriptorProto,
    };

    const PACKAGE: &str = "services.cards";

    fn string_field(name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            label: Some(field_label::OPTIONAL),
            r#type: Some(field_type::STRING),
            type_name: None,
            options: None,
        }
    }

    fn message_field(name: &str, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            label: Some(field_label::OPTIONAL),
            r#type: Some(field_type::MESSAGE),
            type_name: Some(type_name.to_string()),
            options: None,
        }
    }

    fn message(name: &str, fields: Vec<FieldDescriptorProto>) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: fields,
            nested_type: vec![],
            enum_type: vec![],
            options: None,
        }
    }

    fn post_method() -> MethodDescriptorProto {
        MethodDescriptorProto {
            name: Some("Create".to_string()),
            input_type: Some(format!(".{PACKAGE}.CreateRequest")),
            output_type: Some(format!(".{PACKAGE}.CreateResponse")),
            options: Some(MethodOptions {
                operation: None,
                http: Some(HttpRule {
                    pattern: Some(HttpPattern::Post("/v1/cards".to_string())),
                    body: "*".to_string(),
                }),
            }),
        }
    }

    fn package_of_files(files: Vec<FileDescriptorProto>) -> Package {
        Package::from_request(&CodeGeneratorRequest {
            file_to_generate: vec![files[0].name.clone().unwrap_or_default()],
            parameter: None,
            proto_file: files,
        })
    }

    fn home_file(messages: Vec<DescriptorProto>) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some("cards.proto".to_string()),
            package: Some(PACKAGE.to_string()),
            message_type: messages,
            enum_type: vec![],
            service: vec![ServiceDescriptorProto {
                name: Some("Cards".to_string()),
                method: vec![post_method()],
                options: None,
            }],
            options: None,
        }
    }

    /// Package, settings and a body-carrying method context around the
    /// given home-package messages.
    fn fixture(messages: Vec<DescriptorProto>) -> (Package, Settings) {
        (
            package_of_files(vec![home_file(messages)]),
            Settings::load(None).unwrap(),
        )
    }

    fn walk(package: &Package, settings: &Settings, name: &str) -> BTreeMap<String, Schema> {
        let service = package.service.as_ref().unwrap();
        let context = MethodContext::new(&service.methods[0], package, settings).unwrap();
        let mut extractor = Extractor::new(package, settings);
        let target = lookup::find_message(package, name).unwrap();
        extractor.message_schemas(target, &context).unwrap()
    }

    #[test]
    fn self_reference_terminates_with_one_schema() {
        let (package, settings) = fixture(vec![message(
            "Node",
            vec![
                string_field("label"),
                message_field("next", &format!(".{PACKAGE}.Node")),
            ],
        )]);

        let schemas = walk(&package, &settings, "Node");
        assert_eq!(schemas.len(), 1);

        let node = &schemas["Node"];
        assert_eq!(node.properties["next"].reference, schema_ref("Node"));
        assert_eq!(node.properties["label"].schema_type, "string");
    }

    #[test]
    fn mutual_recursion_yields_one_schema_each() {
        let (package, settings) = fixture(vec![
            message("Ping", vec![message_field("pong", &format!(".{PACKAGE}.Pong"))]),
            message("Pong", vec![message_field("ping", &format!(".{PACKAGE}.Ping"))]),
        ]);

        let schemas = walk(&package, &settings, "Ping");
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas["Ping"].properties["pong"].reference, schema_ref("Pong"));
        assert_eq!(schemas["Pong"].properties["ping"].reference, schema_ref("Ping"));
    }

    #[test]
    fn visited_children_are_not_rebuilt() {
        let (package, settings) = fixture(vec![
            message("Card", vec![message_field("holder", &format!(".{PACKAGE}.Holder"))]),
            message("Holder", vec![string_field("name")]),
        ]);
        let service = package.service.as_ref().unwrap();
        let context = MethodContext::new(&service.methods[0], &package, &settings).unwrap();
        let mut extractor = Extractor::new(&package, &settings);
        let card = lookup::find_message(&package, "Card").unwrap();

        let first = extractor.message_schemas(card, &context).unwrap();
        assert_eq!(first.len(), 2);

        // Second walk over the same message: the referenced child is
        // already visited, so only the ref is emitted again.
        let second = extractor.message_schemas(card, &context).unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second["Card"].properties["holder"].reference, schema_ref("Holder"));
    }

    #[test]
    fn hidden_fields_vanish_entirely() {
        let mut hidden = string_field("internal_tag");
        hidden.options = Some(FieldOptions {
            property: Some(PropertyAnnotation {
                hide_from_schema: true,
                required: true,
                ..PropertyAnnotation::default()
            }),
        });
        let (package, settings) = fixture(vec![message(
            "Card",
            vec![string_field("number"), hidden],
        )]);

        let schemas = walk(&package, &settings, "Card");
        let card = &schemas["Card"];
        assert!(!card.properties.contains_key("internal_tag"));
        assert!(card.required_properties.is_empty());
    }

    #[test]
    fn non_body_fields_drop_only_from_home_module_messages() {
        let audit = FileDescriptorProto {
            name: Some("audit.proto".to_string()),
            package: Some("services.audit".to_string()),
            message_type: vec![message("Trail", vec![string_field("entry")])],
            enum_type: vec![],
            service: vec![],
            options: None,
        };

        // A GET rule: no body, so every plain field resolves to "query".
        let mut get_method = post_method();
        get_method.options = Some(MethodOptions {
            operation: None,
            http: Some(HttpRule {
                pattern: Some(HttpPattern::Get("/v1/cards".to_string())),
                body: String::new(),
            }),
        });
        let mut home = home_file(vec![message(
            "CreateRequest",
            vec![
                string_field("filter"),
                message_field("trail", ".services.audit.Trail"),
            ],
        )]);
        home.service[0].method = vec![get_method];

        let package = package_of_files(vec![home, audit]);
        let settings = Settings::load(None).unwrap();
        let schemas = walk(&package, &settings, "CreateRequest");

        // Home-module query field is elided; the foreign nested message
        // keeps its fields.
        assert!(!schemas["CreateRequest"].properties.contains_key("filter"));
        assert!(schemas["CreateRequest"].properties.contains_key("trail"));
        assert_eq!(schemas["Trail"].properties["entry"].schema_type, "string");
    }

    #[test]
    fn map_enum_values_expand_under_the_simple_name() {
        let mut statuses = message_field("statuses", &format!(".{PACKAGE}.CreateRequest.StatusesEntry"));
        statuses.label = Some(field_label::REPEATED);
        let entry = DescriptorProto {
            name: Some("StatusesEntry".to_string()),
            field: vec![
                string_field("key"),
                FieldDescriptorProto {
                    name: Some("value".to_string()),
                    label: Some(field_label::OPTIONAL),
                    r#type: Some(field_type::ENUM),
                    type_name: Some(format!(".{PACKAGE}.Status")),
                    options: None,
                },
            ],
            nested_type: vec![],
            enum_type: vec![],
            options: Some(MessageOptions {
                map_entry: Some(true),
                annotation: None,
            }),
        };

        let mut request = message("CreateRequest", vec![statuses]);
        request.nested_type = vec![entry];
        let mut home = home_file(vec![request]);
        home.enum_type = vec![EnumDescriptorProto {
            name: Some("Status".to_string()),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("STATUS_UNSPECIFIED".to_string()),
                    number: Some(0),
                },
                EnumValueDescriptorProto {
                    name: Some("STATUS_ACTIVE".to_string()),
                    number: Some(1),
                },
            ],
        }];

        let package = package_of_files(vec![home]);
        let settings = Settings::load(None).unwrap();
        let schemas = walk(&package, &settings, "CreateRequest");

        let status = &schemas["Status"];
        assert_eq!(status.schema_type, "string");
        assert_eq!(status.enum_values, vec!["STATUS_UNSPECIFIED", "STATUS_ACTIVE"]);
        assert_eq!(
            schemas["CreateRequest"].properties["statuses"]
                .additional_properties
                .as_ref()
                .unwrap()
                .reference,
            schema_ref("Status"),
        );
    }

    #[test]
    fn required_entries_use_the_override_name() {
        let mut renamed = string_field("card_number");
        renamed.options = Some(FieldOptions {
            property: Some(PropertyAnnotation {
                required: true,
                schema_name: "cardNumber".to_string(),
                ..PropertyAnnotation::default()
            }),
        });
        let (package, settings) = fixture(vec![message("CreateRequest", vec![renamed])]);

        let schemas = walk(&package, &settings, "CreateRequest");
        let request = &schemas["CreateRequest"];
        assert!(request.properties.contains_key("cardNumber"));
        assert_eq!(request.required_properties, vec!["cardNumber"]);
    }

    #[test]
    fn repeated_child_messages_become_item_refs() {
        let mut holders = message_field("holders", &format!(".{PACKAGE}.Holder"));
        holders.label = Some(field_label::REPEATED);
        let (package, settings) = fixture(vec![
            message("CreateRequest", vec![holders]),
            message("Holder", vec![string_field("name")]),
        ]);

        let schemas = walk(&package, &settings, "CreateRequest");
        let field = &schemas["CreateRequest"].properties["holders"];
        assert_eq!(field.schema_type, "array");
        assert_eq!(field.items.as_ref().unwrap().reference, schema_ref("Holder"));
        assert!(schemas.contains_key("Holder"));
    }

    #[test]
    fn missing_child_message_aborts_extraction() {
        let (package, settings) = fixture(vec![message(
            "CreateRequest",
            vec![message_field("ghost", &format!(".{PACKAGE}.Ghost"))],
        )]);
        let service = package.service.as_ref().unwrap();
        let context = MethodContext::new(&service.methods[0], &package, &settings).unwrap();
        let mut extractor = Extractor::new(&package, &settings);
        let request = lookup::find_message(&package, "CreateRequest").unwrap();

        assert!(matches!(
            extractor.message_schemas(request, &context),
            Err(Error::MessageNotFound { message }) if message == "Ghost",
        ));
    }
}
