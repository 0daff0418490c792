//! Generator settings loaded from a TOML file.
//!
//! The settings file is named by the `settings=<path>` plugin argument
//! (`--openapi_opt=settings=openapi.toml`). Every key has a default, so the
//! plugin runs without a file at all.
//!
//! # File format
//!
//! ```toml
//! debug = false
//! add_service_name_in_endpoints = true
//!
//! [enum]
//! remove_prefix = true
//! remove_unspecified_entry = true
//!
//! [naming]
//! use_inbound_messages = true
//! use_outbound_messages = true
//! outbound_schema_suffix = "Outbound"
//!
//! [output]
//! path = "openapi"
//! filename = "openapi.yaml"
//!
//! [operation]
//! default_success_code = 200
//! default_success_description = "OK"
//!
//! [error]
//! default_name = "DefaultError"
//!
//! [error.fields.code]
//! type = "integer"
//!
//! [[error.responses]]
//! code = 500
//! description = "Internal Server Error"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// All generator knobs, with serde defaults throughout.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Verbose diagnostics on stderr (never on stdout, which carries the
    /// plugin response).
    pub debug: bool,

    /// Prefix every endpoint with `/<kebab-cased module name>`.
    pub add_service_name_in_endpoints: bool,

    /// Enum value rendering.
    #[serde(rename = "enum")]
    pub enums: EnumSettings,

    /// Schema naming policies.
    pub naming: NamingSettings,

    /// Where the generated document lands.
    pub output: OutputSettings,

    /// Per-operation response defaults.
    pub operation: OperationSettings,

    /// Shared error response schema.
    pub error: ErrorSettings,
}

/// Enum value rendering options.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EnumSettings {
    /// Strip the common `ENUM_NAME_` prefix from rendered values.
    pub remove_prefix: bool,

    /// Drop values whose wire name ends in `_UNSPECIFIED`.
    pub remove_unspecified_entry: bool,
}

/// Schema naming policies for request and response bodies.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingSettings {
    /// Rename request-body properties to their lower-camel JSON names.
    pub use_inbound_messages: bool,

    /// Rename response-body properties and suffix their schema names.
    pub use_outbound_messages: bool,

    /// Suffix appended to outbound schema names and refs.
    pub outbound_schema_suffix: String,

    /// Expect the main module file to be named `<module>_api.proto`
    /// instead of `<module>.proto`.
    pub keep_main_module_file_prefix: bool,
}

impl Default for NamingSettings {
    fn default() -> Self {
        Self {
            use_inbound_messages: false,
            use_outbound_messages: false,
            outbound_schema_suffix: "Outbound".to_string(),
            keep_main_module_file_prefix: false,
        }
    }
}

/// Output location of the generated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Write the bare filename into protoc's output directory instead of
    /// `<path>/<module>/<filename>`.
    pub use_default_out: bool,

    /// Leading directory of the computed output path.
    pub path: String,

    /// Name of the generated YAML file.
    pub filename: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            use_default_out: false,
            path: "openapi".to_string(),
            filename: "openapi.yaml".to_string(),
        }
    }
}

/// Defaults applied to every operation's response table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OperationSettings {
    /// Success code inserted when the method declares none.
    pub default_success_code: i32,

    /// Description for the default success response.
    pub default_success_description: String,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            default_success_code: 200,
            default_success_description: "OK".to_string(),
        }
    }
}

/// Shape and registration of the shared error response schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ErrorSettings {
    /// Component name the error schema is registered under.
    pub default_name: String,

    /// Description of the shared error response.
    pub default_description: String,

    /// Error schema properties; empty falls back to the standard shape.
    pub fields: BTreeMap<String, ErrorField>,

    /// Error codes merged into every operation; empty falls back to
    /// 500/400.
    pub responses: Vec<ErrorResponse>,
}

impl Default for ErrorSettings {
    fn default() -> Self {
        Self {
            default_name: "DefaultError".to_string(),
            default_description: "The default error response.".to_string(),
            fields: BTreeMap::new(),
            responses: Vec::new(),
        }
    }
}

/// One node of the configured error schema.
///
/// `type` and `ref` are alternatives; `items` only applies to arrays,
/// `fields`/`additional_properties` to objects. Shapes the generator does
/// not recognize degrade to untyped nodes instead of failing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ErrorField {
    /// Schema type string (`string`, `integer`, `number`, `boolean`,
    /// `object`, `array`).
    #[serde(rename = "type")]
    pub field_type: Option<String>,

    /// Name of another configured field definition to reference.
    #[serde(rename = "ref")]
    pub reference: Option<String>,

    /// Element shape for `array` nodes.
    pub items: Option<Box<ErrorField>>,

    /// Named properties for `object` nodes.
    pub fields: BTreeMap<String, ErrorField>,

    /// Value shape for map-like `object` nodes.
    pub additional_properties: Option<Box<ErrorField>>,
}

/// One error response code merged into every operation.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ErrorResponse {
    /// HTTP status code.
    pub code: i32,

    /// Response description.
    pub description: String,
}

impl Settings {
    /// Load settings from a TOML file, or defaults when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        let mut settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content)?
            }
            None => Self::default(),
        };
        settings.adjust();
        Ok(settings)
    }

    /// Fill in the error shape when the file leaves it empty.
    fn adjust(&mut self) {
        if self.error.fields.is_empty() {
            self.error.fields = default_error_fields();
        }
        if self.error.responses.is_empty() {
            self.error.responses = vec![
                ErrorResponse {
                    code: 500,
                    description: "Internal Server Error".to_string(),
                },
                ErrorResponse {
                    code: 400,
                    description: "Bad Request".to_string(),
                },
            ];
        }
    }
}

fn default_error_fields() -> BTreeMap<String, ErrorField> {
    let typed = |name: &str| ErrorField {
        field_type: Some(name.to_string()),
        ..ErrorField::default()
    };

    BTreeMap::from([
        ("code".to_string(), typed("integer")),
        ("service_name".to_string(), typed("string")),
        ("message".to_string(), typed("string")),
        ("destination".to_string(), typed("string")),
        ("kind".to_string(), typed("string")),
    ])
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_without_settings_file() {
        let settings = Settings::load(None).unwrap();

        assert!(!settings.debug);
        assert!(!settings.add_service_name_in_endpoints);
        assert!(!settings.enums.remove_prefix);
        assert_eq!(settings.naming.outbound_schema_suffix, "Outbound");
        assert_eq!(settings.output.path, "openapi");
        assert_eq!(settings.output.filename, "openapi.yaml");
        assert_eq!(settings.operation.default_success_code, 200);
        assert_eq!(settings.operation.default_success_description, "OK");
        assert_eq!(settings.error.default_name, "DefaultError");
    }

    #[test]
    fn empty_error_shape_falls_back_to_standard_fields() {
        let settings = Settings::load(None).unwrap();

        let names: Vec<&str> = settings.error.fields.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["code", "destination", "kind", "message", "service_name"],
        );
        assert_eq!(
            settings.error.fields["code"].field_type.as_deref(),
            Some("integer"),
        );

        let codes: Vec<i32> = settings.error.responses.iter().map(|r| r.code).collect();
        assert_eq!(codes, vec![500, 400]);
    }

    #[test]
    fn parses_full_file() {
        let toml = indoc! {r#"
            debug = true
            add_service_name_in_endpoints = true

            [enum]
            remove_prefix = true
            remove_unspecified_entry = true

            [naming]
            use_inbound_messages = true
            use_outbound_messages = true
            outbound_schema_suffix = "Wire"
            keep_main_module_file_prefix = true

            [output]
            use_default_out = true
            path = "docs"
            filename = "api.yaml"

            [operation]
            default_success_code = 201
            default_success_description = "Created"

            [error]
            default_name = "ApiError"
            default_description = "Something went wrong."

            [error.fields.code]
            type = "integer"

            [error.fields.details]
            type = "array"

            [error.fields.details.items]
            type = "string"

            [[error.responses]]
            code = 500
            description = "Internal Server Error"
        "#};

        let mut settings: Settings = toml::from_str(toml).unwrap();
        settings.adjust();

        assert!(settings.debug);
        assert!(settings.enums.remove_prefix);
        assert!(settings.naming.use_outbound_messages);
        assert_eq!(settings.naming.outbound_schema_suffix, "Wire");
        assert!(settings.output.use_default_out);
        assert_eq!(settings.output.filename, "api.yaml");
        assert_eq!(settings.operation.default_success_code, 201);
        assert_eq!(settings.error.default_name, "ApiError");
        assert_eq!(
            settings.error.fields["details"]
                .items
                .as_ref()
                .and_then(|i| i.field_type.as_deref()),
            Some("string"),
        );
        // Configured fields/responses are kept as-is, not extended.
        assert_eq!(settings.error.fields.len(), 2);
        assert_eq!(settings.error.responses.len(), 1);
    }

    #[test]
    fn nested_error_fields_parse_recursively() {
        let toml = indoc! {r#"
            [error.fields.source]
            type = "object"

            [error.fields.source.fields.name]
            type = "string"

            [error.fields.source.additional_properties]
            type = "string"
        "#};

        let settings: Settings = toml::from_str(toml).unwrap();
        let source = &settings.error.fields["source"];

        assert_eq!(source.field_type.as_deref(), Some("object"));
        assert_eq!(
            source.fields["name"].field_type.as_deref(),
            Some("string"),
        );
        assert!(source.additional_properties.is_some());
    }

    #[test]
    fn load_from_file() {
        let dir = std::env::temp_dir().join("protoc-gen-openapi-settings-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("openapi.toml");
        std::fs::write(&path, "add_service_name_in_endpoints = true\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(settings.add_service_name_in_endpoints);
        // Defaults still apply.
        assert_eq!(settings.output.filename, "openapi.yaml");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_nonexistent_file_returns_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/openapi.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("protoc-gen-openapi-settings-test-invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        std::fs::write(&path, "debug = [[[").unwrap();

        let result = Settings::load(Some(&path));
        assert!(result.is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
