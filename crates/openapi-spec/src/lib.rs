#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod document;
mod schema;

pub use document::{
    Components, Document, Info, Media, Operation, Parameter, RequestBody, Response,
    SecurityScheme, Server,
};
pub use schema::{schema_ref, Schema, SchemaId, SchemaType, SCHEMA_REF_PREFIX};
