//! Per-method traversal context.
//!
//! Everything the extractor needs to know about the method it is walking —
//! verb, endpoint template, path parameters, the raw HTTP rule and the
//! operation annotation — is resolved once up front and carried by value
//! through the recursion.

use heck::ToKebabCase;

use crate::annotations::OperationAnnotation;
use crate::descriptor::{self, HttpRule};
use crate::proto::{Method, Package};
use crate::settings::Settings;

/// A service method joined with its HTTP binding.
///
/// Construction fails (returns `None`) for methods without a
/// `google.api.http` annotation; those are skipped silently.
#[derive(Debug)]
pub struct MethodContext<'a> {
    /// The RPC method being documented.
    pub method: &'a Method,
    /// Lowercase HTTP verb, the path-item key.
    pub verb: &'static str,
    /// Endpoint template, module-prefixed when configured.
    pub endpoint: String,
    /// `{param}` names scanned from the path template.
    pub path_parameters: Vec<String>,
    /// The raw HTTP rule; its `body` setting drives field locations.
    pub http_rule: &'a HttpRule,
    /// The method's operation annotation, when present.
    pub operation: Option<&'a OperationAnnotation>,
}

impl<'a> MethodContext<'a> {
    /// Resolve the HTTP binding of one method.
    #[must_use]
    pub fn new(method: &'a Method, package: &Package, settings: &Settings) -> Option<Self> {
        let (verb, path) = method.http_pattern()?;
        let http_rule = method.http_rule()?;

        let endpoint = if settings.add_service_name_in_endpoints {
            format!("/{}{path}", package.module_name.to_kebab_case())
        } else {
            path.to_string()
        };

        Some(Self {
            method,
            verb,
            endpoint,
            path_parameters: descriptor::path_parameters(path),
            http_rule,
            operation: method.operation(),
        })
    }

    /// Whether the request message travels (at least partly) as a body:
    /// the rule names a body field, or the verb conventionally carries one.
    #[must_use]
    pub fn has_body(&self) -> bool {
        !self.http_rule.body.is_empty() || matches!(self.verb, "post" | "put" | "patch")
    }

    /// Whether this method opted out of inbound property renaming.
    #[must_use]
    pub fn inbound_renaming_disabled(&self) -> bool {
        self.operation
            .is_some_and(|operation| operation.disable_inbound_renaming)
    }
}
