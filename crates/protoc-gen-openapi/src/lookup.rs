//! Type, enum, and file resolution over the package model.
//!
//! Lookups come in two flavors: local (the home package, already parsed
//! into [`Package`]) and foreign (any other package carried by the request,
//! parsed on demand). Missing messages are fatal; missing enums degrade to
//! plain string schemas.

use crate::annotations::{OperationAnnotation, PropertyAnnotation, PropertyLocation};
use crate::descriptor::{FileDescriptorProto, HttpRule};
use crate::error::{Error, Result};
use crate::proto::{self, Enum, Message, Package};
use crate::settings::{EnumSettings, Settings};

/// Dotted package portion of a qualified type name, leading `.` trimmed.
///
/// `.services.cards.Card` → `services.cards`; unqualified names yield `""`.
#[must_use]
pub fn package_of(qualified: &str) -> &str {
    let trimmed = qualified.trim_start_matches('.');
    match trimmed.rfind('.') {
        Some(index) => &trimmed[..index],
        None => "",
    }
}

/// Last dotted component of a qualified name.
#[must_use]
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Find a home-package message by simple name.
///
/// # Errors
///
/// Returns [`Error::MessageNotFound`] when the package declares no such
/// message.
pub fn find_message<'a>(package: &'a Package, name: &str) -> Result<&'a Message> {
    package
        .messages
        .iter()
        .find(|message| message.name == name)
        .ok_or_else(|| Error::MessageNotFound {
            message: name.to_string(),
        })
}

/// Find a message declared in another package of the request.
///
/// Messages are parsed from every request file belonging to the foreign
/// package, so split-file packages resolve the same as single-file ones.
///
/// # Errors
///
/// Returns [`Error::ForeignPackageEmpty`] when the request carries no
/// messages for the package, and [`Error::MessageNotFound`] when the
/// package exists but lacks the message.
pub fn find_foreign_message(package: &Package, type_name: &str) -> Result<Message> {
    let foreign_package = package_of(type_name);
    let messages = foreign_messages(package, foreign_package);
    if messages.is_empty() {
        return Err(Error::ForeignPackageEmpty {
            package: foreign_package.to_string(),
        });
    }

    let name = simple_name(type_name);
    messages
        .into_iter()
        .find(|message| message.name == name)
        .ok_or_else(|| Error::MessageNotFound {
            message: name.to_string(),
        })
}

fn foreign_messages(package: &Package, foreign_package: &str) -> Vec<Message> {
    let module_name = simple_name(foreign_package);
    files_of_package(package, foreign_package)
        .flat_map(|file| proto::messages_in_file(file, module_name))
        .collect()
}

fn files_of_package<'a>(
    package: &'a Package,
    name: &'a str,
) -> impl Iterator<Item = &'a FileDescriptorProto> {
    package
        .files
        .iter()
        .filter(move |file| file.package.as_deref() == Some(name))
}

/// Find an enum by qualified type name, locally or in a foreign package.
///
/// Absence is not an error; callers fall back to a plain string schema.
#[must_use]
pub fn find_enum(package: &Package, type_name: &str) -> Option<Enum> {
    let enum_package = package_of(type_name);
    let name = simple_name(type_name);

    if enum_package == package.name {
        return package
            .enums
            .iter()
            .find(|definition| definition.name == name)
            .cloned();
    }

    files_of_package(package, enum_package)
        .flat_map(proto::enums_in_file)
        .find(|definition| definition.name == name)
}

/// Locate the main module file, the one carrying document-level metadata.
///
/// The expected stem is the module name, or `<module>_api` when
/// `naming.keep_main_module_file_prefix` is set.
///
/// # Errors
///
/// Returns [`Error::MainModuleFileNotFound`] when no home-package file has
/// the expected stem.
pub fn find_main_module_file<'a>(
    package: &'a Package,
    settings: &Settings,
) -> Result<&'a FileDescriptorProto> {
    let stem = if settings.naming.keep_main_module_file_prefix {
        format!("{}_api", package.module_name)
    } else {
        package.module_name.clone()
    };

    package
        .package_files
        .get(&stem)
        .ok_or_else(|| Error::MainModuleFileNotFound {
            file_name: format!("{stem}.proto"),
        })
}

/// Resolve where a field travels in the HTTP request.
///
/// Precedence: explicit location annotation, then path template parameters,
/// then a whole-message body rule, then the method's header list; everything
/// else is a query parameter.
#[must_use]
pub fn field_location(
    property: Option<&PropertyAnnotation>,
    operation: Option<&OperationAnnotation>,
    http_rule: Option<&HttpRule>,
    path_parameters: &[String],
    field_name: &str,
) -> &'static str {
    if let Some(location) = property.map(PropertyAnnotation::location) {
        if location != PropertyLocation::Unspecified {
            return location.as_str();
        }
    }

    if path_parameters.iter().any(|parameter| parameter == field_name) {
        return "path";
    }

    if http_rule.is_some_and(|rule| rule.body == "*") {
        return "body";
    }

    if operation.is_some_and(|op| op.header.iter().any(|header| header == field_name)) {
        return "header";
    }

    "query"
}

/// Whether an HTTP status code counts as a success response.
#[must_use]
pub fn is_success_code(code: i32) -> bool {
    (200..300).contains(&code)
}

/// Render an enum's values per the settings.
///
/// `remove_unspecified_entry` drops values whose raw wire name ends in
/// `_UNSPECIFIED`, checked before any prefix stripping.
#[must_use]
pub fn enum_values(definition: &Enum, settings: &EnumSettings) -> Vec<String> {
    let prefix = if settings.remove_prefix {
        enum_name_prefix(definition)
    } else {
        None
    };

    let mut values = Vec::new();
    for name in definition.value_names() {
        if settings.remove_unspecified_entry && name.ends_with("_UNSPECIFIED") {
            continue;
        }

        let rendered = match &prefix {
            Some(prefix) => name.strip_prefix(prefix.as_str()).unwrap_or(name),
            None => name,
        };
        values.push(rendered.to_string());
    }

    values
}

/// Common leading underscore-token run of the first two values, with a
/// trailing `_`. Enums with fewer than two values have no prefix.
fn enum_name_prefix(definition: &Enum) -> Option<String> {
    let mut names = definition.value_names();
    let first = names.next()?;
    let second = names.next()?;

    let tokens: Vec<&str> = first
        .split('_')
        .zip(second.split('_'))
        .take_while(|(a, b)| a == b)
        .map(|(token, _)| token)
        .collect();
    if tokens.is_empty() {
        return None;
    }

    Some(format!("{}_", tokens.join("_")))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::descriptor::{
        field_label, field_type, CodeGeneratorRequest, DescriptorProto, EnumDescriptorProto,
        EnumValueDescriptorProto, FieldDescriptorProto, HttpPattern,
    };
    use crate::proto::EnumValue;

    fn named_enum(name: &str, values: &[&str]) -> Enum {
        Enum {
            name: name.to_string(),
            values: values
                .iter()
                .enumerate()
                .map(|(number, value)| EnumValue {
                    name: (*value).to_string(),
                    number: i32::try_from(number).unwrap(),
                })
                .collect(),
        }
    }

    fn message_descriptor(name: &str) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: vec![FieldDescriptorProto {
                name: Some("value".to_string()),
                label: Some(field_label::OPTIONAL),
                r#type: Some(field_type::STRING),
                type_name: None,
                options: None,
            }],
            nested_type: vec![],
            enum_type: vec![],
            options: None,
        }
    }

    fn file(
        name: &str,
        package: &str,
        messages: Vec<DescriptorProto>,
        enums: Vec<EnumDescriptorProto>,
    ) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            package: Some(package.to_string()),
            message_type: messages,
            enum_type: enums,
            service: vec![],
            options: None,
        }
    }

    fn package_with_files(files: Vec<FileDescriptorProto>) -> Package {
        Package::from_request(&CodeGeneratorRequest {
            file_to_generate: vec![files[0].name.clone().unwrap_or_default()],
            parameter: None,
            proto_file: files,
        })
    }

    #[test]
    fn package_and_simple_name_split_qualified_names() {
        assert_eq!(package_of(".services.cards.Card"), "services.cards");
        assert_eq!(simple_name(".services.cards.Card"), "Card");
        assert_eq!(package_of("Card"), "");
        assert_eq!(simple_name("Card"), "Card");
    }

    #[test]
    fn find_message_reports_missing_name() {
        let package = package_with_files(vec![file(
            "cards.proto",
            "services.cards",
            vec![message_descriptor("Card")],
            vec![],
        )]);

        assert_eq!(find_message(&package, "Card").unwrap().name, "Card");
        assert!(matches!(
            find_message(&package, "Missing"),
            Err(Error::MessageNotFound { message }) if message == "Missing",
        ));
    }

    #[test]
    fn foreign_messages_collect_across_files() {
        let package = package_with_files(vec![
            file("cards.proto", "services.cards", vec![], vec![]),
            file(
                "shared_a.proto",
                "services.shared",
                vec![message_descriptor("Money")],
                vec![],
            ),
            file(
                "shared_b.proto",
                "services.shared",
                vec![message_descriptor("Address")],
                vec![],
            ),
        ]);

        let address = find_foreign_message(&package, ".services.shared.Address").unwrap();
        assert_eq!(address.name, "Address");
        assert_eq!(address.module_name, "shared");
    }

    #[test]
    fn foreign_lookup_distinguishes_empty_and_missing() {
        let package = package_with_files(vec![
            file("cards.proto", "services.cards", vec![], vec![]),
            file(
                "shared.proto",
                "services.shared",
                vec![message_descriptor("Money")],
                vec![],
            ),
        ]);

        assert!(matches!(
            find_foreign_message(&package, ".services.absent.Thing"),
            Err(Error::ForeignPackageEmpty { package }) if package == "services.absent",
        ));
        assert!(matches!(
            find_foreign_message(&package, ".services.shared.Thing"),
            Err(Error::MessageNotFound { message }) if message == "Thing",
        ));
    }

    #[test]
    fn enum_lookup_dispatches_local_and_foreign() {
        let status = EnumDescriptorProto {
            name: Some("Status".to_string()),
            value: vec![EnumValueDescriptorProto {
                name: Some("STATUS_ACTIVE".to_string()),
                number: Some(1),
            }],
        };
        let package = package_with_files(vec![
            file("cards.proto", "services.cards", vec![], vec![status.clone()]),
            file("shared.proto", "services.shared", vec![], vec![status]),
        ]);

        assert!(find_enum(&package, ".services.cards.Status").is_some());
        assert!(find_enum(&package, ".services.shared.Status").is_some());
        assert!(find_enum(&package, ".services.cards.Missing").is_none());
        assert!(find_enum(&package, ".services.absent.Status").is_none());
    }

    #[test]
    fn main_module_file_respects_prefix_setting() {
        let package = package_with_files(vec![
            file("cards.proto", "services.cards", vec![], vec![]),
            file("cards_api.proto", "services.cards", vec![], vec![]),
        ]);

        let mut settings = Settings::load(None).unwrap();
        let found = find_main_module_file(&package, &settings).unwrap();
        assert_eq!(found.name.as_deref(), Some("cards.proto"));

        settings.naming.keep_main_module_file_prefix = true;
        let found = find_main_module_file(&package, &settings).unwrap();
        assert_eq!(found.name.as_deref(), Some("cards_api.proto"));
    }

    #[test]
    fn main_module_file_missing_is_fatal() {
        let package = package_with_files(vec![file(
            "other.proto",
            "services.cards",
            vec![],
            vec![],
        )]);
        let settings = Settings::load(None).unwrap();

        assert!(matches!(
            find_main_module_file(&package, &settings),
            Err(Error::MainModuleFileNotFound { file_name }) if file_name == "cards.proto",
        ));
    }

    #[test]
    fn location_precedence_annotation_path_body_header_query() {
        let annotated = PropertyAnnotation {
            location: PropertyLocation::Header as i32,
            ..PropertyAnnotation::default()
        };
        let operation = OperationAnnotation {
            header: vec!["x-debug".to_string()],
            ..OperationAnnotation::default()
        };
        let body_rule = HttpRule {
            pattern: Some(HttpPattern::Post("/v1/cards".to_string())),
            body: "*".to_string(),
        };
        let path_parameters = vec!["card_id".to_string()];

        // Explicit annotation wins over everything.
        assert_eq!(
            field_location(
                Some(&annotated),
                Some(&operation),
                Some(&body_rule),
                &path_parameters,
                "card_id",
            ),
            "header",
        );
        // Path parameter beats a whole-message body rule.
        assert_eq!(
            field_location(None, None, Some(&body_rule), &path_parameters, "card_id"),
            "path",
        );
        assert_eq!(
            field_location(None, None, Some(&body_rule), &path_parameters, "name"),
            "body",
        );
        // Header list applies only without a body rule.
        assert_eq!(
            field_location(None, Some(&operation), None, &[], "x-debug"),
            "header",
        );
        assert_eq!(field_location(None, None, None, &[], "name"), "query");
    }

    #[test]
    fn success_codes_are_the_2xx_range() {
        assert!(!is_success_code(199));
        assert!(is_success_code(200));
        assert!(is_success_code(204));
        assert!(is_success_code(299));
        assert!(!is_success_code(300));
        assert!(!is_success_code(500));
    }

    #[test]
    fn enum_values_strip_prefix_and_unspecified() {
        let definition = named_enum(
            "Status",
            &["STATUS_UNSPECIFIED", "STATUS_ACTIVE", "STATUS_CLOSED"],
        );
        let settings = EnumSettings {
            remove_prefix: true,
            remove_unspecified_entry: true,
        };

        assert_eq!(enum_values(&definition, &settings), vec!["ACTIVE", "CLOSED"]);
    }

    #[test]
    fn enum_values_untouched_by_default() {
        let definition = named_enum("Status", &["STATUS_UNSPECIFIED", "STATUS_ACTIVE"]);

        assert_eq!(
            enum_values(&definition, &EnumSettings::default()),
            vec!["STATUS_UNSPECIFIED", "STATUS_ACTIVE"],
        );
    }

    #[test]
    fn enum_prefix_needs_two_values_and_a_common_token() {
        let single = named_enum("Status", &["STATUS_ACTIVE"]);
        let settings = EnumSettings {
            remove_prefix: true,
            remove_unspecified_entry: false,
        };
        assert_eq!(enum_values(&single, &settings), vec!["STATUS_ACTIVE"]);

        let disjoint = named_enum("Kind", &["FOO", "BAR"]);
        assert_eq!(enum_values(&disjoint, &settings), vec!["FOO", "BAR"]);
    }

    #[test]
    fn enum_prefix_spans_multiple_tokens() {
        let definition = named_enum(
            "HealthStatus",
            &[
                "HEALTH_STATUS_UNSPECIFIED",
                "HEALTH_STATUS_HEALTHY",
                "HEALTH_STATUS_UNHEALTHY",
            ],
        );
        let settings = EnumSettings {
            remove_prefix: true,
            remove_unspecified_entry: false,
        };

        assert_eq!(
            enum_values(&definition, &settings),
            vec!["UNSPECIFIED", "HEALTHY", "UNHEALTHY"],
        );
    }

    #[test]
    fn values_without_the_prefix_pass_through() {
        let definition = named_enum("Mixed", &["MIXED_A", "MIXED_B", "OTHER"]);
        let settings = EnumSettings {
            remove_prefix: true,
            remove_unspecified_entry: false,
        };

        assert_eq!(enum_values(&definition, &settings), vec!["A", "B", "OTHER"]);
    }
}
