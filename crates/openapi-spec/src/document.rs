//! The document root and everything between it and the schema nodes.
//!
//! Serialization mirrors the OpenAPI 3.0 object layout directly; maps are
//! `BTreeMap`s so output is byte-for-byte reproducible across runs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::schema::Schema;

/// A complete OpenAPI 3.0 document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// OpenAPI version string, `"3.0.0"`.
    pub openapi: String,

    /// Service metadata.
    pub info: Info,

    /// Server list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,

    /// Endpoint template -> lowercase HTTP verb -> operation.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub paths: BTreeMap<String, BTreeMap<String, Operation>>,

    /// Reusable schemas, responses and security schemes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

/// The `info` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Info {
    /// API title.
    pub title: String,

    /// API version.
    pub version: String,

    /// Optional free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// One `servers` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Server {
    /// Server URL.
    pub url: String,

    /// Optional description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A single API operation on a path.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Operation {
    /// Short summary.
    pub summary: String,

    /// Longer description; serialized even when empty.
    pub description: String,

    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,

    /// Grouping tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Path/query/header parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,

    /// Status code (decimal string) -> response.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,

    /// Request body, for verbs that carry one.
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,

    /// Security requirements, one scheme-name -> scope-list map per entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<BTreeMap<String, Vec<String>>>,
}

/// A single operation parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Parameter {
    /// Whether the parameter is mandatory; always serialized.
    pub required: bool,

    /// Parameter location: `path`, `query` or `header`.
    #[serde(rename = "in")]
    pub location: String,

    /// Parameter name.
    pub name: String,

    /// Optional description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Value schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// A single response of an operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    /// Response description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Content type -> media object.
    pub content: BTreeMap<String, Media>,
}

/// A request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestBody {
    /// Whether a body must be supplied; always serialized.
    pub required: bool,

    /// Optional description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Content type -> media object.
    pub content: BTreeMap<String, Media>,
}

/// A media object: the schema behind one content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Media {
    /// Payload schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// The `components` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    /// Named schemas; serialized even when empty.
    pub schemas: BTreeMap<String, Schema>,

    /// Named responses; serialized even when empty.
    pub responses: BTreeMap<String, Response>,

    /// Named security schemes.
    #[serde(rename = "securitySchemes", skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecurityScheme>,
}

/// One entry under `components.securitySchemes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SecurityScheme {
    /// Scheme type: `apiKey`, `http`, `oauth2` or `openIdConnect`.
    #[serde(rename = "type")]
    pub scheme_type: String,

    /// HTTP auth scheme: `basic`, `bearer`, `digest` or `oauth`.
    pub scheme: String,

    /// Bearer token format hint.
    #[serde(rename = "bearerFormat", skip_serializing_if = "String::is_empty")]
    pub bearer_format: String,
}
