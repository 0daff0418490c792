//! Minimal protobuf descriptor types with annotation extension support.
//!
//! Standard descriptor crates drop extension fields during decoding because
//! prost doesn't retain unknown fields. These custom types preserve the
//! extensions this generator reads: `google.api.http` (field 72295728) and
//! the OpenAPI annotations in the 54000 private extension range. The plugin
//! envelope (`CodeGeneratorRequest`/`CodeGeneratorResponse`) is hand-written
//! for the same reason — a stock envelope would strip the extensions from
//! the descriptors it carries.
//!
//! Only the descriptor subset the generator consumes is modeled.

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    use crate::annotations::{
        DocumentMetadata, MessageAnnotation, OperationAnnotation, PropertyAnnotation,
        SecurityRequirement,
    };

    /// Request read from stdin when invoked by protoc.
    #[derive(Clone, PartialEq, Message)]
    pub struct CodeGeneratorRequest {
        #[prost(string, repeated, tag = "1")]
        pub file_to_generate: Vec<String>,
        /// Comma-separated plugin parameter (`--openapi_opt`).
        #[prost(string, optional, tag = "2")]
        pub parameter: Option<String>,
        #[prost(message, repeated, tag = "15")]
        pub proto_file: Vec<FileDescriptorProto>,
    }

    /// Response written to stdout; `error` reports failure without a
    /// nonzero exit (protoc convention).
    #[derive(Clone, PartialEq, Message)]
    pub struct CodeGeneratorResponse {
        #[prost(string, optional, tag = "1")]
        pub error: Option<String>,
        #[prost(uint64, optional, tag = "2")]
        pub supported_features: Option<u64>,
        #[prost(message, repeated, tag = "15")]
        pub file: Vec<GeneratedFile>,
    }

    /// One generated file inside a [`CodeGeneratorResponse`].
    #[derive(Clone, PartialEq, Message)]
    pub struct GeneratedFile {
        /// Output path relative to protoc's output directory.
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "15")]
        pub content: Option<String>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorSet {
        #[prost(message, repeated, tag = "1")]
        pub file: Vec<FileDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FileDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub package: Option<String>,
        #[prost(message, repeated, tag = "4")]
        pub message_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "5")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, repeated, tag = "6")]
        pub service: Vec<ServiceDescriptorProto>,
        #[prost(message, optional, tag = "8")]
        pub options: Option<FileOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct DescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub field: Vec<FieldDescriptorProto>,
        /// Nested messages, including synthesized `*Entry` types for maps.
        #[prost(message, repeated, tag = "3")]
        pub nested_type: Vec<DescriptorProto>,
        #[prost(message, repeated, tag = "4")]
        pub enum_type: Vec<EnumDescriptorProto>,
        #[prost(message, optional, tag = "7")]
        pub options: Option<MessageOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct FieldDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        /// Label enum: 1=optional, 2=required, 3=repeated.
        #[prost(int32, optional, tag = "4")]
        pub label: Option<i32>,
        /// Wire type enum: 1=double, 5=int32, 9=string, 11=message, 14=enum, …
        #[prost(int32, optional, tag = "5")]
        pub r#type: Option<i32>,
        /// Fully-qualified type name for message/enum fields
        /// (e.g., `.accounts.v1.CardHolder`).
        #[prost(string, optional, tag = "6")]
        pub type_name: Option<String>,
        #[prost(message, optional, tag = "8")]
        pub options: Option<FieldOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub value: Vec<EnumValueDescriptorProto>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct EnumValueDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(int32, optional, tag = "2")]
        pub number: Option<i32>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(message, repeated, tag = "2")]
        pub method: Vec<MethodDescriptorProto>,
        #[prost(message, optional, tag = "3")]
        pub options: Option<ServiceOptions>,
    }

    #[derive(Clone, PartialEq, Message)]
    pub struct MethodDescriptorProto {
        #[prost(string, optional, tag = "1")]
        pub name: Option<String>,
        #[prost(string, optional, tag = "2")]
        pub input_type: Option<String>,
        #[prost(string, optional, tag = "3")]
        pub output_type: Option<String>,
        #[prost(message, optional, tag = "4")]
        pub options: Option<MethodOptions>,
    }

    /// File options carrying the document metadata extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct FileOptions {
        /// `openapi.metadata` extension (info/servers for the document).
        #[prost(message, optional, tag = "54000")]
        pub metadata: Option<DocumentMetadata>,
    }

    /// Message options; `map_entry` marks synthesized map entry types.
    #[derive(Clone, PartialEq, Message)]
    pub struct MessageOptions {
        #[prost(bool, optional, tag = "7")]
        pub map_entry: Option<bool>,
        /// `openapi.message` extension (request body hints).
        #[prost(message, optional, tag = "54003")]
        pub annotation: Option<MessageAnnotation>,
    }

    /// Field options carrying the property schema extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct FieldOptions {
        /// `openapi.property` extension.
        #[prost(message, optional, tag = "54004")]
        pub property: Option<PropertyAnnotation>,
    }

    /// Service options carrying the security requirement extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct ServiceOptions {
        /// `openapi.security` extension (repeated).
        #[prost(message, repeated, tag = "54001")]
        pub security: Vec<SecurityRequirement>,
    }

    /// Method options with the `google.api.http` extension (field 72295728)
    /// and the operation annotation extension.
    #[derive(Clone, PartialEq, Message)]
    pub struct MethodOptions {
        /// `openapi.operation` extension.
        #[prost(message, optional, tag = "54002")]
        pub operation: Option<OperationAnnotation>,
        #[prost(message, optional, tag = "72295728")]
        pub http: Option<HttpRule>,
    }

    /// [`google.api.HttpRule`] — defines the REST mapping for an RPC.
    #[derive(Clone, PartialEq, Message)]
    pub struct HttpRule {
        #[prost(oneof = "HttpPattern", tags = "2, 3, 4, 5, 6")]
        pub pattern: Option<HttpPattern>,
        /// Request field mapped to the body, or `*` for the whole message.
        #[prost(string, tag = "7")]
        pub body: String,
    }

    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum HttpPattern {
        #[prost(string, tag = "2")]
        Get(String),
        #[prost(string, tag = "3")]
        Put(String),
        #[prost(string, tag = "4")]
        Post(String),
        #[prost(string, tag = "5")]
        Delete(String),
        #[prost(string, tag = "6")]
        Patch(String),
    }
}

pub use types::*;

/// Proto field type constants (from `google.protobuf.FieldDescriptorProto.Type`).
pub mod field_type {
    /// `TYPE_DOUBLE = 1`
    pub const DOUBLE: i32 = 1;
    /// `TYPE_FLOAT = 2`
    pub const FLOAT: i32 = 2;
    /// `TYPE_INT64 = 3`
    pub const INT64: i32 = 3;
    /// `TYPE_UINT64 = 4`
    pub const UINT64: i32 = 4;
    /// `TYPE_INT32 = 5`
    pub const INT32: i32 = 5;
    /// `TYPE_FIXED64 = 6`
    pub const FIXED64: i32 = 6;
    /// `TYPE_FIXED32 = 7`
    pub const FIXED32: i32 = 7;
    /// `TYPE_BOOL = 8`
    pub const BOOL: i32 = 8;
    /// `TYPE_STRING = 9`
    pub const STRING: i32 = 9;
    /// `TYPE_MESSAGE = 11`
    pub const MESSAGE: i32 = 11;
    /// `TYPE_BYTES = 12`
    pub const BYTES: i32 = 12;
    /// `TYPE_UINT32 = 13`
    pub const UINT32: i32 = 13;
    /// `TYPE_ENUM = 14`
    pub const ENUM: i32 = 14;
    /// `TYPE_SFIXED32 = 15`
    pub const SFIXED32: i32 = 15;
    /// `TYPE_SFIXED64 = 16`
    pub const SFIXED64: i32 = 16;
    /// `TYPE_SINT32 = 17`
    pub const SINT32: i32 = 17;
    /// `TYPE_SINT64 = 18`
    pub const SINT64: i32 = 18;
}

/// Proto field label constants (from `google.protobuf.FieldDescriptorProto.Label`).
pub mod field_label {
    /// `LABEL_OPTIONAL = 1`
    pub const OPTIONAL: i32 = 1;
    /// `LABEL_REPEATED = 3`
    pub const REPEATED: i32 = 3;
}

/// Extract `(http_verb, path)` from a method's `google.api.http` annotation.
///
/// The verb comes back lowercase, ready to key a path item. Methods without
/// the annotation (or with an empty pattern) return `None` and are skipped
/// by the generator.
#[must_use]
pub fn extract_http_pattern(method: &MethodDescriptorProto) -> Option<(&'static str, &str)> {
    let pattern = method
        .options
        .as_ref()
        .and_then(|o| o.http.as_ref())
        .and_then(|h| h.pattern.as_ref())?;

    Some(match pattern {
        HttpPattern::Get(p) => ("get", p.as_str()),
        HttpPattern::Put(p) => ("put", p.as_str()),
        HttpPattern::Post(p) => ("post", p.as_str()),
        HttpPattern::Delete(p) => ("delete", p.as_str()),
        HttpPattern::Patch(p) => ("patch", p.as_str()),
    })
}

/// The HTTP rule attached to a method, if any.
#[must_use]
pub fn http_rule(method: &MethodDescriptorProto) -> Option<&HttpRule> {
    method.options.as_ref().and_then(|o| o.http.as_ref())
}

/// Collect `{param}` placeholder names from an endpoint template, in order.
#[must_use]
pub fn path_parameters(endpoint: &str) -> Vec<String> {
    let mut parameters = Vec::new();
    let mut rest = endpoint;
    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        parameters.push(rest[start + 1..start + end].to_string());
        rest = &rest[start + end + 1..];
    }
    parameters
}
