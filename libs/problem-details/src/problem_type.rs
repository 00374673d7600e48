//! Problem types: reusable definitions of an error category.

use std::fmt;
use std::sync::{Arc, LazyLock};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::IdentifierPolicy;
use crate::constants::{BLANK_SCHEME, BLANK_TYPE, is_reserved_name};
use crate::error::{ProblemError, ProblemResult};
use crate::schema::{JsonSchemaValidator, SchemaValidator};
use crate::uri::{Rfc3986Normalizer, UriError, UriNormalizer};

static BLANK: LazyLock<Arc<ProblemType>> = LazyLock::new(|| Arc::new(ProblemType::blank()));

/// An RFC 7807 problem type.
///
/// Holds a canonical identifier URI, title/detail templates and the schemas of
/// the extension members its instances may carry. Everything is validated at
/// construction; the value is immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemType {
    identifier: String,
    title: String,
    detail: String,
    extension: IndexMap<String, Value>,
}

impl Default for ProblemType {
    fn default() -> Self {
        Self::blank()
    }
}

impl ProblemType {
    /// Create a problem type with the default identifier policy and validators.
    ///
    /// A missing identifier yields the blank type identifier.
    ///
    /// # Errors
    /// Returns `ProblemError::InvalidIdentifier`, `ProblemError::ReservedFieldName`
    /// or `ProblemError::InvalidSchema` when validation fails.
    pub fn new(
        identifier: Option<&str>,
        title: impl Into<String>,
        detail: impl Into<String>,
        extension: IndexMap<String, Value>,
    ) -> ProblemResult<Self> {
        let mut builder = Self::builder()
            .title(title)
            .detail(detail)
            .extensions(extension);
        if let Some(identifier) = identifier {
            builder = builder.identifier(identifier);
        }
        builder.build()
    }

    pub fn builder() -> ProblemTypeBuilder {
        ProblemTypeBuilder::default()
    }

    /// The blank type: `about:blank`, empty templates, no extension members.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            identifier: BLANK_TYPE.to_owned(),
            title: String::new(),
            detail: String::new(),
            extension: IndexMap::new(),
        }
    }

    /// Process-wide shared blank type.
    #[must_use]
    pub fn blank_shared() -> Arc<Self> {
        Arc::clone(&BLANK)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    #[must_use]
    pub fn extension(&self) -> &IndexMap<String, Value> {
        &self.extension
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.identifier == BLANK_TYPE
    }

    /// Ordered projection of `identifier`, `title`, `detail` and `extension`.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, Value); 4] {
        [
            ("identifier", Value::String(self.identifier.clone())),
            ("title", Value::String(self.title.clone())),
            ("detail", Value::String(self.detail.clone())),
            (
                "extension",
                Value::Object(
                    self.extension
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
            ),
        ]
    }

    /// Normalize an identifier with the default policy.
    ///
    /// # Errors
    /// Returns `ProblemError::InvalidIdentifier` if the identifier cannot be
    /// normalized or falls outside the allowed schemes/hosts.
    pub fn validate_identifier(input: &str) -> ProblemResult<String> {
        Self::validate_identifier_with(input, &Rfc3986Normalizer, &IdentifierPolicy::default())
    }

    /// Normalize an identifier into a canonical absolute URI.
    ///
    /// Bare paths get a leading `/` and the default host; references without a
    /// scheme get the default scheme. The blank type identifier is returned as is,
    /// provided the policy allows the `about` scheme.
    ///
    /// # Errors
    /// Returns `ProblemError::InvalidIdentifier` carrying the offending URI and
    /// the reason it was rejected.
    pub fn validate_identifier_with(
        input: &str,
        normalizer: &dyn UriNormalizer,
        policy: &IdentifierPolicy,
    ) -> ProblemResult<String> {
        if input == BLANK_TYPE {
            if !policy.allows_scheme(BLANK_SCHEME) {
                return Err(invalid_identifier(
                    input,
                    UriError::UnpermittedComponent {
                        component: "scheme",
                        allowed: policy.allowed_schemes.clone(),
                        value: BLANK_SCHEME.to_owned(),
                    },
                ));
            }
            return Ok(BLANK_TYPE.to_owned());
        }

        let mut reference = normalizer
            .parse(input)
            .map_err(|reason| invalid_identifier(input, reason))?;
        if reference.host().is_none() {
            if !reference.path().is_empty() && !reference.path().starts_with('/') {
                let path = format!("/{}", reference.path());
                reference = reference.with_path(path);
            }
            reference = reference.with_host(&policy.default_host);
        }
        if reference.scheme().is_none() {
            reference = reference.with_scheme(&policy.default_scheme);
        }

        let uri = normalizer
            .finalize(&reference)
            .map_err(|reason| invalid_identifier(&reference.unsplit(), reason))?;
        normalizer
            .validate(&uri, policy)
            .map_err(|reason| invalid_identifier(&reference.unsplit(), reason))?;
        Ok(uri.as_str().to_owned())
    }

    /// Validate extension declarations with the default schema validator.
    ///
    /// # Errors
    /// See [`ProblemType::validate_extension_with`].
    pub fn validate_extension(
        extension: IndexMap<String, Value>,
    ) -> ProblemResult<IndexMap<String, Value>> {
        Self::validate_extension_with(extension, &JsonSchemaValidator)
    }

    /// Reject reserved member names and structurally invalid schemas.
    ///
    /// The mapping is returned unchanged on success.
    ///
    /// # Errors
    /// Returns `ProblemError::ReservedFieldName` if any name collides with a
    /// structural member, otherwise `ProblemError::InvalidSchema` for the first
    /// malformed schema.
    pub fn validate_extension_with(
        extension: IndexMap<String, Value>,
        validator: &dyn SchemaValidator,
    ) -> ProblemResult<IndexMap<String, Value>> {
        if let Some(field) = extension.keys().find(|name| is_reserved_name(name)) {
            tracing::debug!(field = %field, "extension declares a reserved member name");
            return Err(ProblemError::ReservedFieldName {
                field: field.clone(),
            });
        }
        for (field, schema) in &extension {
            validator.check_schema(schema).map_err(|source| {
                tracing::debug!(field = %field, reason = %source, "extension schema is not valid");
                ProblemError::InvalidSchema {
                    field: field.clone(),
                    source,
                }
            })?;
        }
        Ok(extension)
    }

    /// Validate one extension value against the schema declared for `field`.
    ///
    /// # Errors
    /// Returns `ProblemError::UnknownExtensionField` if the field is not declared,
    /// or `ProblemError::SchemaValidation` if the value does not match.
    pub fn validate_value(
        &self,
        field: &str,
        value: &Value,
        validator: &dyn SchemaValidator,
    ) -> ProblemResult<()> {
        let Some(schema) = self.extension.get(field) else {
            tracing::debug!(field, problem_type = %self.identifier, "unknown extension member");
            return Err(ProblemError::UnknownExtensionField {
                field: field.to_owned(),
                problem_type: self.identifier.clone(),
            });
        };
        validator.validate(value, schema).map_err(|source| {
            tracing::debug!(field, reason = %source, "extension value failed its schema");
            ProblemError::SchemaValidation {
                field: field.to_owned(),
                value: value.clone(),
                source,
            }
        })
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

fn invalid_identifier(identifier: &str, reason: UriError) -> ProblemError {
    tracing::debug!(identifier, reason = %reason, "problem type identifier rejected");
    ProblemError::InvalidIdentifier {
        identifier: identifier.to_owned(),
        reason,
    }
}

/// Builder for [`ProblemType`].
#[derive(Debug, Default)]
#[must_use]
pub struct ProblemTypeBuilder {
    identifier: Option<String>,
    title: String,
    detail: String,
    extension: IndexMap<String, Value>,
    policy: IdentifierPolicy,
}

impl ProblemTypeBuilder {
    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Declare one extension member and its schema.
    pub fn extension(mut self, field: impl Into<String>, schema: Value) -> Self {
        self.extension.insert(field.into(), schema);
        self
    }

    pub fn extensions<I, K>(mut self, extension: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.extension
            .extend(extension.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn policy(mut self, policy: IdentifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate and build with the RFC 3986 normalizer and the `jsonschema` validator.
    ///
    /// # Errors
    /// See [`ProblemTypeBuilder::build_with`].
    pub fn build(self) -> ProblemResult<ProblemType> {
        self.build_with(&Rfc3986Normalizer, &JsonSchemaValidator)
    }

    /// Validate and build with the given collaborators.
    ///
    /// # Errors
    /// Returns `ProblemError::InvalidIdentifier`, `ProblemError::ReservedFieldName`
    /// or `ProblemError::InvalidSchema` when validation fails.
    pub fn build_with(
        self,
        normalizer: &dyn UriNormalizer,
        validator: &dyn SchemaValidator,
    ) -> ProblemResult<ProblemType> {
        let identifier = match self.identifier.as_deref() {
            Some(identifier) => {
                ProblemType::validate_identifier_with(identifier, normalizer, &self.policy)?
            }
            None => BLANK_TYPE.to_owned(),
        };
        let extension = ProblemType::validate_extension_with(self.extension, validator)?;

        tracing::trace!(
            identifier = %identifier,
            members = extension.len(),
            "problem type constructed"
        );
        Ok(ProblemType {
            identifier,
            title: self.title,
            detail: self.detail,
            extension,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_type_defaults() {
        let problem_type = ProblemType::default();
        assert_eq!(problem_type.identifier(), "about:blank");
        assert!(problem_type.is_blank());
        assert_eq!(problem_type.title(), "");
        assert_eq!(problem_type.detail(), "");
        assert!(problem_type.extension().is_empty());
        assert_eq!(problem_type.to_string(), "about:blank");
    }

    #[test]
    fn shared_blank_is_reused() {
        let a = ProblemType::blank_shared();
        let b = ProblemType::blank_shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*a, ProblemType::blank());
    }

    #[test]
    fn explicit_blank_identifier_is_kept() {
        let identifier = ProblemType::validate_identifier("about:blank").unwrap();
        assert_eq!(identifier, "about:blank");
    }

    #[test]
    fn explicit_blank_identifier_respects_scheme_allow_list() {
        let policy = IdentifierPolicy {
            allowed_schemes: vec!["https".to_owned()],
            ..IdentifierPolicy::default()
        };
        let err =
            ProblemType::validate_identifier_with("about:blank", &Rfc3986Normalizer, &policy)
                .unwrap_err();
        assert!(matches!(
            err,
            ProblemError::InvalidIdentifier {
                reason: UriError::UnpermittedComponent {
                    component: "scheme",
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn scheme_without_host_gets_default_host() {
        let identifier = ProblemType::validate_identifier("https:foo").unwrap();
        assert_eq!(identifier, "https://example.com/foo");
    }

    #[test]
    fn custom_policy_is_honoured() {
        let policy = IdentifierPolicy {
            default_scheme: "http".to_owned(),
            default_host: "errors.example.org".to_owned(),
            allowed_schemes: vec!["http".to_owned()],
            allowed_hosts: vec!["errors.example.org".to_owned()],
        };
        let problem_type = ProblemType::builder()
            .identifier("out-of-stock")
            .policy(policy)
            .build()
            .unwrap();
        assert_eq!(
            problem_type.identifier(),
            "http://errors.example.org/out-of-stock"
        );
    }

    #[test]
    fn reserved_name_wins_over_schema_errors() {
        let err = ProblemType::builder()
            .extension("foo", json!([]))
            .extension("status", json!({}))
            .build()
            .unwrap_err();
        assert!(matches!(err, ProblemError::ReservedFieldName { field } if field == "status"));
    }

    #[test]
    fn validate_value_checks_declared_schema() {
        let problem_type = ProblemType::builder()
            .extension("bar", json!({"type": "integer"}))
            .build()
            .unwrap();
        assert!(
            problem_type
                .validate_value("bar", &json!(1), &JsonSchemaValidator)
                .is_ok()
        );
        let err = problem_type
            .validate_value("bar", &json!("1"), &JsonSchemaValidator)
            .unwrap_err();
        assert!(matches!(err, ProblemError::SchemaValidation { .. }));
    }

    #[test]
    fn serializes_in_declaration_order() {
        let problem_type = ProblemType::builder()
            .identifier("/foo")
            .title("Foo")
            .extension("zeta", json!({}))
            .extension("alpha", json!({}))
            .build()
            .unwrap();
        let json = serde_json::to_string(&problem_type).unwrap();
        assert_eq!(
            json,
            r#"{"identifier":"https://example.com/foo","title":"Foo","detail":"","extension":{"zeta":{},"alpha":{}}}"#
        );
    }
}
