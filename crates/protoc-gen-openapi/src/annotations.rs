//! OpenAPI annotation payloads decoded from descriptor option extensions.
//!
//! Proto authors refine the generated document through custom options:
//! property schemas on fields, operation metadata on methods, request-body
//! hints on messages, security requirements on services, and document
//! info/servers on the file. The payload types here are referenced by the
//! option structs in [`crate::descriptor`], which preserve them through
//! decoding; the free functions mirror the option access path and hide the
//! `Option` chains.

#[allow(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
mod types {
    use prost::Message;

    /// File-level document metadata (`openapi.metadata` extension).
    #[derive(Clone, PartialEq, Message)]
    pub struct DocumentMetadata {
        #[prost(message, optional, tag = "1")]
        pub info: Option<DocumentInfo>,
        #[prost(message, repeated, tag = "2")]
        pub servers: Vec<DocumentServer>,
    }

    /// `info` section overrides for the generated document.
    #[derive(Clone, PartialEq, Message)]
    pub struct DocumentInfo {
        #[prost(string, tag = "1")]
        pub title: String,
        #[prost(string, tag = "2")]
        pub version: String,
        #[prost(string, tag = "3")]
        pub description: String,
    }

    /// One `servers` entry for the generated document.
    #[derive(Clone, PartialEq, Message)]
    pub struct DocumentServer {
        #[prost(string, tag = "1")]
        pub url: String,
        #[prost(string, tag = "2")]
        pub description: String,
    }

    /// One service-level security scheme (`openapi.security` extension).
    #[derive(Clone, PartialEq, Message)]
    pub struct SecurityRequirement {
        /// Scheme name, used as the `securitySchemes` key and in each
        /// operation's requirement list.
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(enumeration = "SecurityType", tag = "2")]
        pub r#type: i32,
        #[prost(enumeration = "SecuritySchemeKind", tag = "3")]
        pub scheme: i32,
        #[prost(string, tag = "4")]
        pub bearer_format: String,
    }

    /// Method-level operation metadata (`openapi.operation` extension).
    #[derive(Clone, PartialEq, Message)]
    pub struct OperationAnnotation {
        #[prost(string, tag = "1")]
        pub summary: String,
        #[prost(string, tag = "2")]
        pub description: String,
        #[prost(string, repeated, tag = "3")]
        pub tags: Vec<String>,
        /// Declared response codes; entries with code 0 are ignored.
        #[prost(message, repeated, tag = "4")]
        pub response: Vec<ResponseAnnotation>,
        /// Request fields carried as HTTP headers.
        #[prost(string, repeated, tag = "5")]
        pub header: Vec<String>,
        /// Keep this method's request properties under their proto names
        /// even when inbound renaming is enabled in the settings.
        #[prost(bool, tag = "6")]
        pub disable_inbound_renaming: bool,
    }

    /// One declared response. `code` is the literal HTTP status number.
    #[derive(Clone, PartialEq, Message)]
    pub struct ResponseAnnotation {
        #[prost(int32, tag = "1")]
        pub code: i32,
        #[prost(string, tag = "2")]
        pub description: String,
    }

    /// Message-level annotation (`openapi.message` extension).
    #[derive(Clone, PartialEq, Message)]
    pub struct MessageAnnotation {
        #[prost(message, optional, tag = "1")]
        pub request_body: Option<RequestBodyAnnotation>,
    }

    /// Request-body hints read from the method's request message.
    #[derive(Clone, PartialEq, Message)]
    pub struct RequestBodyAnnotation {
        #[prost(string, tag = "1")]
        pub description: String,
        #[prost(enumeration = "RequestBodyKind", tag = "2")]
        pub kind: i32,
    }

    /// Field-level property schema (`openapi.property` extension).
    #[derive(Clone, PartialEq, Message)]
    pub struct PropertyAnnotation {
        #[prost(bool, tag = "1")]
        pub required: bool,
        #[prost(string, tag = "2")]
        pub example: String,
        #[prost(string, tag = "3")]
        pub description: String,
        #[prost(enumeration = "PropertyFormat", tag = "4")]
        pub format: i32,
        #[prost(enumeration = "PropertyLocation", tag = "5")]
        pub location: i32,
        /// Omit the field from schemas and parameters entirely.
        #[prost(bool, tag = "6")]
        pub hide_from_schema: bool,
        /// Override for the property/parameter name.
        #[prost(string, tag = "7")]
        pub schema_name: String,
    }

    /// OpenAPI `format` values selectable per field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum PropertyFormat {
        Unspecified = 0,
        DateTime = 1,
        Binary = 2,
        Double = 3,
        Float = 4,
        Int32 = 5,
        Int64 = 6,
        Byte = 7,
        Date = 8,
        Password = 9,
        String = 10,
    }

    /// Where an HTTP-bound field's value is carried.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum PropertyLocation {
        Unspecified = 0,
        Body = 1,
        Path = 2,
        Query = 3,
        Header = 4,
    }

    /// Request body content types beyond the JSON default.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum RequestBodyKind {
        Unspecified = 0,
        MultipartFormData = 1,
    }

    /// OpenAPI security scheme `type` values.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum SecurityType {
        Unspecified = 0,
        ApiKey = 1,
        Http = 2,
        Oauth2 = 3,
        OpenIdConnect = 4,
    }

    /// HTTP authentication scheme names for `type: http`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum SecuritySchemeKind {
        Unspecified = 0,
        Basic = 1,
        Bearer = 2,
        Digest = 3,
        Oauth = 4,
    }
}

pub use types::*;

use crate::descriptor::{
    DescriptorProto, FieldDescriptorProto, FileDescriptorProto, MethodDescriptorProto,
    ServiceDescriptorProto,
};

impl SecurityRequirement {
    /// Decoded security type.
    #[must_use]
    pub fn security_type(&self) -> SecurityType {
        SecurityType::try_from(self.r#type).unwrap_or(SecurityType::Unspecified)
    }

    /// Decoded scheme kind.
    #[must_use]
    pub fn scheme_kind(&self) -> SecuritySchemeKind {
        SecuritySchemeKind::try_from(self.scheme).unwrap_or(SecuritySchemeKind::Unspecified)
    }
}

impl PropertyFormat {
    /// The OpenAPI `format` string; empty for `Unspecified`.
    #[must_use]
    pub const fn as_openapi(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::DateTime => "date-time",
            Self::Binary => "binary",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Byte => "byte",
            Self::Date => "date",
            Self::Password => "password",
            Self::String => "string",
        }
    }
}

impl PropertyLocation {
    /// The lowercase location keyword; empty for `Unspecified`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Body => "body",
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

impl SecurityType {
    /// The OpenAPI `type` vocabulary; empty for `Unspecified`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::ApiKey => "apiKey",
            Self::Http => "http",
            Self::Oauth2 => "oauth2",
            Self::OpenIdConnect => "openIdConnect",
        }
    }
}

impl SecuritySchemeKind {
    /// The OpenAPI `scheme` vocabulary; empty for `Unspecified`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Basic => "basic",
            Self::Bearer => "bearer",
            Self::Digest => "digest",
            Self::Oauth => "oauth",
        }
    }
}

/// Document metadata from a file's options, if annotated.
#[must_use]
pub fn file_metadata(file: &FileDescriptorProto) -> Option<&DocumentMetadata> {
    file.options.as_ref().and_then(|o| o.metadata.as_ref())
}

/// Operation annotation from a method's options, if annotated.
#[must_use]
pub fn method_operation(method: &MethodDescriptorProto) -> Option<&OperationAnnotation> {
    method.options.as_ref().and_then(|o| o.operation.as_ref())
}

/// Message annotation from a message's options, if annotated.
#[must_use]
pub fn message_annotation(message: &DescriptorProto) -> Option<&MessageAnnotation> {
    message.options.as_ref().and_then(|o| o.annotation.as_ref())
}

/// Security requirements declared on a service; empty when unannotated.
#[must_use]
pub fn service_security(service: &ServiceDescriptorProto) -> &[SecurityRequirement] {
    service
        .options
        .as_ref()
        .map_or(&[], |o| o.security.as_slice())
}

/// Property annotation from a field's options, if annotated.
#[must_use]
pub fn field_property(field: &FieldDescriptorProto) -> Option<&PropertyAnnotation> {
    field.options.as_ref().and_then(|o| o.property.as_ref())
}

#[cfg(test)]
mod tests {
    use prost::Message as _;

    use super::*;
    use crate::descriptor::{FieldOptions, MethodOptions};

    #[test]
    fn unknown_wire_values_fall_back_to_unspecified() {
        let property = PropertyAnnotation {
            format: 99,
            location: -3,
            ..PropertyAnnotation::default()
        };
        assert_eq!(property.format(), PropertyFormat::Unspecified);
        assert_eq!(property.location(), PropertyLocation::Unspecified);
    }

    #[test]
    fn format_strings_match_openapi_vocabulary() {
        assert_eq!(PropertyFormat::DateTime.as_openapi(), "date-time");
        assert_eq!(PropertyFormat::Byte.as_openapi(), "byte");
        assert_eq!(PropertyFormat::Unspecified.as_openapi(), "");
    }

    #[test]
    fn security_enums_transcribe_to_openapi_vocabulary() {
        assert_eq!(SecurityType::ApiKey.as_str(), "apiKey");
        assert_eq!(SecurityType::OpenIdConnect.as_str(), "openIdConnect");
        assert_eq!(SecuritySchemeKind::Bearer.as_str(), "bearer");
        assert_eq!(SecuritySchemeKind::Oauth.as_str(), "oauth");
    }

    #[test]
    fn accessors_read_through_missing_options() {
        let field = FieldDescriptorProto::default();
        assert!(field_property(&field).is_none());

        let service = ServiceDescriptorProto::default();
        assert!(service_security(&service).is_empty());
    }

    /// Operation annotations survive an options encode → decode cycle.
    #[test]
    fn operation_annotation_round_trip() {
        let original = MethodOptions {
            operation: Some(OperationAnnotation {
                summary: "Create a card".to_string(),
                tags: vec!["cards".to_string()],
                response: vec![ResponseAnnotation {
                    code: 201,
                    description: "Created".to_string(),
                }],
                header: vec!["x_request_id".to_string()],
                ..OperationAnnotation::default()
            }),
            http: None,
        };

        let bytes = original.encode_to_vec();
        let decoded = MethodOptions::decode(bytes.as_slice()).unwrap();
        assert_eq!(original, decoded);
        assert_eq!(decoded.operation.unwrap().response[0].code, 201);
    }

    #[test]
    fn property_annotation_round_trip_via_field_options() {
        let original = FieldOptions {
            property: Some(PropertyAnnotation {
                required: true,
                format: PropertyFormat::Date as i32,
                location: PropertyLocation::Header as i32,
                schema_name: "issuedAt".to_string(),
                ..PropertyAnnotation::default()
            }),
        };

        let bytes = original.encode_to_vec();
        let decoded = FieldOptions::decode(bytes.as_slice()).unwrap();
        let property = decoded.property.unwrap();
        assert_eq!(property.format(), PropertyFormat::Date);
        assert_eq!(property.location(), PropertyLocation::Header);
        assert_eq!(property.schema_name, "issuedAt");
    }
}
