//! Structured view of the compiler request.
//!
//! Wraps the raw descriptor types into a package model the generator walks:
//! the home package (the one being generated), its messages and enums with
//! nested types flattened, the service with its HTTP-annotated methods, and
//! every file from the request for foreign-package lookups.
//!
//! Field classification happens once, at parse time, into a closed
//! [`FieldKind`]. Every later decision — child-message recursion, map value
//! handling, well-known-type overrides — derives from that single enum
//! instead of re-inspecting descriptors.

use std::collections::BTreeMap;

use crate::annotations::{
    self, MessageAnnotation, OperationAnnotation, PropertyAnnotation, SecurityRequirement,
};
use crate::descriptor::{
    self, field_label, field_type, CodeGeneratorRequest, DescriptorProto, EnumDescriptorProto,
    FieldDescriptorProto, FileDescriptorProto, HttpRule, MethodDescriptorProto,
    ServiceDescriptorProto,
};
use crate::lookup;

const TIMESTAMP_TYPE: &str = ".google.protobuf.Timestamp";
const STRUCT_TYPE: &str = ".google.protobuf.Struct";
const VALUE_TYPE: &str = ".google.protobuf.Value";
const ANY_TYPE: &str = ".google.protobuf.Any";

/// The protobuf package a single plugin invocation generates a document for.
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Full proto package name (e.g., `services.cards`).
    pub name: String,
    /// Last dotted component of the package name; names the generated module.
    pub module_name: String,
    /// Every file carried by the request, home package and imports alike.
    pub files: Vec<FileDescriptorProto>,
    /// Home-package files keyed by file stem, for main-module lookup.
    pub package_files: BTreeMap<String, FileDescriptorProto>,
    /// Messages declared in the home package, nested types flattened.
    pub messages: Vec<Message>,
    /// Enums declared in the home package, including message-nested ones.
    pub enums: Vec<Enum>,
    /// The service to document, when the home package declares one.
    pub service: Option<Service>,
}

impl Package {
    /// Build the package model from a decoded compiler request.
    ///
    /// The home package is the package of the first file protoc asked to
    /// generate; a request with nothing to generate yields an empty package
    /// (no service, no document).
    #[must_use]
    pub fn from_request(request: &CodeGeneratorRequest) -> Self {
        let Some(home) = request
            .file_to_generate
            .first()
            .and_then(|name| find_file(&request.proto_file, name))
        else {
            return Self::default();
        };

        let name = home.package.clone().unwrap_or_default();
        let module_name = lookup::simple_name(&name).to_string();

        let mut package_files = BTreeMap::new();
        let mut messages = Vec::new();
        let mut enums = Vec::new();
        let mut service = None;

        for file in &request.proto_file {
            if file.package.as_deref() != Some(name.as_str()) {
                continue;
            }

            if let Some(file_name) = file.name.as_deref() {
                package_files.insert(file_stem(file_name).to_string(), file.clone());
            }

            messages.extend(messages_in_file(file, &module_name));
            enums.extend(enums_in_file(file));

            if service.is_none() {
                service = file.service.first().map(Service::parse);
            }
        }

        Self {
            name,
            module_name,
            files: request.proto_file.clone(),
            package_files,
            messages,
            enums,
            service,
        }
    }
}

fn find_file<'a>(
    files: &'a [FileDescriptorProto],
    name: &str,
) -> Option<&'a FileDescriptorProto> {
    files.iter().find(|f| f.name.as_deref() == Some(name))
}

/// File name without directories or the `.proto` suffix.
pub(crate) fn file_stem(name: &str) -> &str {
    let base = name.rsplit('/').next().unwrap_or(name);
    base.strip_suffix(".proto").unwrap_or(base)
}

/// Parse every message in a file, flattening nested declarations.
///
/// Synthesized map entry messages are skipped; map fields capture their
/// value type at classification time instead.
pub(crate) fn messages_in_file(file: &FileDescriptorProto, module_name: &str) -> Vec<Message> {
    let mut messages = Vec::new();
    for descriptor in &file.message_type {
        collect_messages(descriptor, module_name, &mut messages);
    }
    messages
}

fn collect_messages(descriptor: &DescriptorProto, module_name: &str, out: &mut Vec<Message>) {
    if is_map_entry(descriptor) {
        return;
    }

    out.push(Message::parse(descriptor, module_name));
    for nested in &descriptor.nested_type {
        collect_messages(nested, module_name, out);
    }
}

/// Parse every enum in a file, including enums nested inside messages.
pub(crate) fn enums_in_file(file: &FileDescriptorProto) -> Vec<Enum> {
    let mut enums: Vec<Enum> = file.enum_type.iter().map(Enum::parse).collect();
    for descriptor in &file.message_type {
        collect_enums(descriptor, &mut enums);
    }
    enums
}

fn collect_enums(descriptor: &DescriptorProto, out: &mut Vec<Enum>) {
    out.extend(descriptor.enum_type.iter().map(Enum::parse));
    for nested in &descriptor.nested_type {
        collect_enums(nested, out);
    }
}

fn is_map_entry(descriptor: &DescriptorProto) -> bool {
    descriptor
        .options
        .as_ref()
        .is_some_and(|o| o.map_entry == Some(true))
}

/// A message declared in some package, with its fields classified.
#[derive(Debug, Clone)]
pub struct Message {
    /// Simple message name; also the schema registry key.
    pub name: String,
    /// Module the declaring package belongs to.
    pub module_name: String,
    /// Fields in declaration order.
    pub fields: Vec<Field>,
    descriptor: DescriptorProto,
}

impl Message {
    pub(crate) fn parse(descriptor: &DescriptorProto, module_name: &str) -> Self {
        let fields = descriptor
            .field
            .iter()
            .map(|field| Field::parse(field, descriptor))
            .collect();

        Self {
            name: descriptor.name.clone().unwrap_or_default(),
            module_name: module_name.to_string(),
            fields,
            descriptor: descriptor.clone(),
        }
    }

    /// The message-level annotation (request body hints), when present.
    #[must_use]
    pub fn annotation(&self) -> Option<&MessageAnnotation> {
        annotations::message_annotation(&self.descriptor)
    }
}

/// A single message field with its derived classification.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name as declared in the proto source.
    pub name: String,
    /// Fully-qualified type name for message and enum fields, empty otherwise.
    pub type_name: String,
    /// Closed classification driving schema generation.
    pub kind: FieldKind,
    /// Whether the field is `repeated` (maps excluded).
    pub repeated: bool,
    descriptor: FieldDescriptorProto,
}

impl Field {
    fn parse(descriptor: &FieldDescriptorProto, owner: &DescriptorProto) -> Self {
        let (kind, repeated) = classify(descriptor, owner);

        Self {
            name: descriptor.name.clone().unwrap_or_default(),
            type_name: descriptor.type_name.clone().unwrap_or_default(),
            kind,
            repeated,
            descriptor: descriptor.clone(),
        }
    }

    /// The field's property annotation, when present.
    #[must_use]
    pub fn property(&self) -> Option<&PropertyAnnotation> {
        annotations::field_property(&self.descriptor)
    }

    /// Whether this field references another message that gets its own
    /// schema (well-known types and maps are handled structurally instead).
    #[must_use]
    pub fn is_child_message(&self) -> bool {
        matches!(self.kind, FieldKind::Message)
    }

    /// Simple name of the referenced message or enum type.
    #[must_use]
    pub fn simple_type_name(&self) -> &str {
        lookup::simple_name(&self.type_name)
    }
}

/// Field classification, computed once per field at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain scalar wire type.
    Scalar(ScalarKind),
    /// Enum-typed field; values render as strings.
    Enum,
    /// Message-typed field that is neither well-known nor a map.
    Message,
    /// `google.protobuf.Timestamp`; forces `format: date-time`.
    Timestamp,
    /// `google.protobuf.Struct`; renders as a free-form object.
    DynamicStruct,
    /// `google.protobuf.Value`; renders as `anyOf` over the JSON shapes.
    DynamicValue,
    /// `google.protobuf.Any`; treated as an opaque object.
    Any,
    /// Map field, with the synthesized entry's value type captured.
    Map(MapValue),
}

/// Value-type information captured from a map field's synthesized entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapValue {
    /// Classification of the entry's value field.
    pub kind: MapValueKind,
    /// Fully-qualified value type name for message/enum values.
    pub type_name: String,
}

impl MapValue {
    /// Simple name of the value type, used as the `$ref` destination.
    #[must_use]
    pub fn simple_type_name(&self) -> &str {
        lookup::simple_name(&self.type_name)
    }
}

/// Classification of a map field's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapValueKind {
    /// Scalar value; `additionalProperties` carries the mapped type.
    Scalar(ScalarKind),
    /// Enum value; referenced by name and expanded as a raw wire-name list.
    Enum,
    /// Message value; referenced by name and recursed into.
    Message,
}

/// Proto scalar wire types, as carried by the field descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)] // Names mirror the proto scalar type names one-to-one.
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    /// Anything this generator does not map (e.g., groups).
    Unknown,
}

impl ScalarKind {
    pub(crate) fn from_wire_type(wire_type: i32) -> Self {
        match wire_type {
            field_type::DOUBLE => Self::Double,
            field_type::FLOAT => Self::Float,
            field_type::INT64 => Self::Int64,
            field_type::UINT64 => Self::Uint64,
            field_type::INT32 => Self::Int32,
            field_type::FIXED64 => Self::Fixed64,
            field_type::FIXED32 => Self::Fixed32,
            field_type::BOOL => Self::Bool,
            field_type::STRING => Self::String,
            field_type::BYTES => Self::Bytes,
            field_type::UINT32 => Self::Uint32,
            field_type::SFIXED32 => Self::Sfixed32,
            field_type::SFIXED64 => Self::Sfixed64,
            field_type::SINT32 => Self::Sint32,
            field_type::SINT64 => Self::Sint64,
            _ => Self::Unknown,
        }
    }
}

fn classify(field: &FieldDescriptorProto, owner: &DescriptorProto) -> (FieldKind, bool) {
    let wire_type = field.r#type.unwrap_or_default();
    let repeated = field.label == Some(field_label::REPEATED);

    if wire_type == field_type::MESSAGE {
        let type_name = field.type_name.as_deref().unwrap_or_default();

        if repeated {
            if let Some(entry) = map_entry(owner, type_name) {
                // Maps arrive as repeated entry messages; the repeated label
                // belongs to the encoding, not the declared field.
                return (FieldKind::Map(map_value(entry)), false);
            }
        }

        let kind = match type_name {
            TIMESTAMP_TYPE => FieldKind::Timestamp,
            STRUCT_TYPE => FieldKind::DynamicStruct,
            VALUE_TYPE => FieldKind::DynamicValue,
            ANY_TYPE => FieldKind::Any,
            _ => FieldKind::Message,
        };
        return (kind, repeated);
    }

    if wire_type == field_type::ENUM {
        return (FieldKind::Enum, repeated);
    }

    (
        FieldKind::Scalar(ScalarKind::from_wire_type(wire_type)),
        repeated,
    )
}

/// Find the synthesized `*Entry` message a repeated message field points at.
fn map_entry<'a>(owner: &'a DescriptorProto, type_name: &str) -> Option<&'a DescriptorProto> {
    let entry_name = lookup::simple_name(type_name);
    owner
        .nested_type
        .iter()
        .find(|nested| nested.name.as_deref() == Some(entry_name) && is_map_entry(nested))
}

fn map_value(entry: &DescriptorProto) -> MapValue {
    // Entry messages always carry `key` and `value` fields by those names.
    let Some(value) = entry
        .field
        .iter()
        .find(|f| f.name.as_deref() == Some("value"))
    else {
        return MapValue {
            kind: MapValueKind::Scalar(ScalarKind::Unknown),
            type_name: String::new(),
        };
    };

    let kind = match value.r#type.unwrap_or_default() {
        field_type::MESSAGE => MapValueKind::Message,
        field_type::ENUM => MapValueKind::Enum,
        wire_type => MapValueKind::Scalar(ScalarKind::from_wire_type(wire_type)),
    };

    MapValue {
        kind,
        type_name: value.type_name.clone().unwrap_or_default(),
    }
}

/// An enum declared in some package.
#[derive(Debug, Clone)]
pub struct Enum {
    /// Simple enum name.
    pub name: String,
    /// Declared values in order.
    pub values: Vec<EnumValue>,
}

impl Enum {
    fn parse(descriptor: &EnumDescriptorProto) -> Self {
        let values = descriptor
            .value
            .iter()
            .map(|value| EnumValue {
                name: value.name.clone().unwrap_or_default(),
                number: value.number.unwrap_or_default(),
            })
            .collect();

        Self {
            name: descriptor.name.clone().unwrap_or_default(),
            values,
        }
    }

    /// Declared wire names in order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|value| value.name.as_str())
    }
}

/// One declared enum value.
#[derive(Debug, Clone)]
pub struct EnumValue {
    /// Wire name (e.g., `STATUS_ACTIVE`).
    pub name: String,
    /// Declared number.
    pub number: i32,
}

/// The service a document is generated for.
#[derive(Debug, Clone)]
pub struct Service {
    /// Proto service name.
    pub name: String,
    /// Declared methods in order, HTTP-annotated or not.
    pub methods: Vec<Method>,
    descriptor: ServiceDescriptorProto,
}

impl Service {
    fn parse(descriptor: &ServiceDescriptorProto) -> Self {
        let methods = descriptor.method.iter().map(Method::parse).collect();

        Self {
            name: descriptor.name.clone().unwrap_or_default(),
            methods,
            descriptor: descriptor.clone(),
        }
    }

    /// Service-level security requirements, empty when unannotated.
    #[must_use]
    pub fn security(&self) -> &[SecurityRequirement] {
        annotations::service_security(&self.descriptor)
    }
}

/// One RPC method of the documented service.
#[derive(Debug, Clone)]
pub struct Method {
    /// Proto method name; doubles as the `operationId`.
    pub name: String,
    /// Fully-qualified request message type.
    pub input_type: String,
    /// Fully-qualified response message type.
    pub output_type: String,
    descriptor: MethodDescriptorProto,
}

impl Method {
    fn parse(descriptor: &MethodDescriptorProto) -> Self {
        Self {
            name: descriptor.name.clone().unwrap_or_default(),
            input_type: descriptor.input_type.clone().unwrap_or_default(),
            output_type: descriptor.output_type.clone().unwrap_or_default(),
            descriptor: descriptor.clone(),
        }
    }

    /// Simple name of the request message.
    #[must_use]
    pub fn request_type_name(&self) -> &str {
        lookup::simple_name(&self.input_type)
    }

    /// Simple name of the response message.
    #[must_use]
    pub fn response_type_name(&self) -> &str {
        lookup::simple_name(&self.output_type)
    }

    /// The method's operation annotation, when present.
    #[must_use]
    pub fn operation(&self) -> Option<&OperationAnnotation> {
        annotations::method_operation(&self.descriptor)
    }

    /// The method's `google.api.http` rule, when present.
    #[must_use]
    pub fn http_rule(&self) -> Option<&HttpRule> {
        descriptor::http_rule(&self.descriptor)
    }

    /// `(verb, endpoint)` from the HTTP rule, verb lowercased.
    #[must_use]
    pub fn http_pattern(&self) -> Option<(&'static str, &str)> {
        descriptor::extract_http_pattern(&self.descriptor)
    }
}
