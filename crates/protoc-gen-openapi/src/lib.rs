#![allow(clippy::doc_markdown)] // README uses "OpenAPI" proper noun throughout
#![doc = include_str!("../README.md")]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod annotations;
pub mod descriptor;
mod error;
pub mod extract;
pub mod lookup;
pub mod plugin;
pub mod proto;
pub mod settings;

pub use error::{Error, Result};
