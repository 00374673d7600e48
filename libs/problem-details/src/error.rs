use crate::schema::{SchemaError, ValidationError};
use crate::uri::UriError;

/// Result alias used throughout the crate.
pub type ProblemResult<T> = Result<T, ProblemError>;

/// Errors raised while constructing problem types and problem details.
///
/// Every variant is a construction-time failure; nothing is deferred.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProblemError {
    /// The identifier failed URI normalization or the scheme/host allow-lists.
    #[error("Identifier '{identifier}' is invalid: {reason}")]
    InvalidIdentifier {
        identifier: String,
        #[source]
        reason: UriError,
    },

    /// An extension declares a field that collides with a structural member.
    #[error("Extension member name '{field}' is not allowed")]
    ReservedFieldName { field: String },

    /// A declared extension schema is not a well-formed JSON schema.
    #[error("Extension for the field '{field}' needs to be a valid JSON schema: {source}")]
    InvalidSchema {
        field: String,
        #[source]
        source: SchemaError,
    },

    /// An instance supplied a field its type does not declare.
    #[error("'{field}' is not a valid extension member for problem type '{problem_type}'")]
    UnknownExtensionField { field: String, problem_type: String },

    /// An instance supplied a value that does not match its field schema.
    #[error("Value for the field '{field}' is invalid: {source}")]
    SchemaValidation {
        field: String,
        value: serde_json::Value,
        #[source]
        source: ValidationError,
    },

    /// A template placeholder references a segment absent from the data.
    #[error("Template references a missing field '{field}'")]
    MissingTemplateField { field: String },

    /// A template is syntactically broken (unbalanced or empty braces).
    #[error("Template '{template}' is invalid: {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Lookup of a name that is neither structural nor a declared extension field.
    #[error("'{type_name}' object has no attribute '{attribute}'")]
    AttributeNotFound {
        attribute: String,
        type_name: &'static str,
    },

    /// The status code is not a registered HTTP status.
    #[error("{code} is not a valid HTTP status code")]
    InvalidStatus { code: u16 },
}
