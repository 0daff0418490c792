//! Typed error enum for the `protoc-gen-openapi` library API.
//!
//! Library consumers can match on specific variants. The CLI (`main.rs`)
//! converts these to `anyhow::Error` at the binary boundary; plugin mode
//! renders them into the `CodeGeneratorResponse.error` field instead.

/// Errors produced by `protoc-gen-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure (reading the request or settings, writing output).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML serialization failure for the generated document.
    #[error(transparent)]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Proto envelope or descriptor decoding failure.
    #[error("failed to decode proto descriptor: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    /// Settings file parsing failure.
    #[error("failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// A plugin parameter pair was not `key=value` shaped.
    #[error("invalid plugin argument '{argument}'")]
    InvalidArgument {
        /// The malformed pair as received from protoc.
        argument: String,
    },

    /// No home-package file in the request had the main module stem.
    ///
    /// The file-level metadata annotation is read from the main module file,
    /// whose stem must match the package's last component (or `<module>_api`
    /// under `naming.keep_main_module_file_prefix`).
    #[error("could not find main module file '{file_name}'")]
    MainModuleFileNotFound {
        /// The file stem that was searched for.
        file_name: String,
    },

    /// A method's request message was absent from the package being generated.
    #[error("could not find method request message '{message}'")]
    RequestMessageNotFound {
        /// The unresolved request type name.
        message: String,
    },

    /// A referenced message was absent from its home package.
    #[error("could not find message '{message}'")]
    MessageNotFound {
        /// The unresolved message name.
        message: String,
    },

    /// A cross-package reference pointed at a package with no parseable
    /// messages (schema file missing from the compiler request).
    #[error("could not load foreign messages for package '{package}'")]
    ForeignPackageEmpty {
        /// The foreign proto package name.
        package: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
