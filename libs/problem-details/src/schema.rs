//! Extension schema checks.

use serde_json::Value;

/// A schema document that is not itself a well-formed JSON schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SchemaError {
    pub message: String,
}

/// A value that does not satisfy its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

/// Capability interface for JSON-Schema structural and value validation.
pub trait SchemaValidator: Send + Sync {
    /// Check that `schema` is a well-formed schema document.
    ///
    /// # Errors
    /// Returns `SchemaError` with the meta-schema violation.
    fn check_schema(&self, schema: &Value) -> Result<(), SchemaError>;

    /// Check `value` against `schema`.
    ///
    /// # Errors
    /// Returns `ValidationError` describing the first violation.
    fn validate(&self, value: &Value, schema: &Value) -> Result<(), ValidationError>;
}

/// [`SchemaValidator`] backed by the `jsonschema` crate.
///
/// The draft is picked from the schema's `$schema` keyword, defaulting to the
/// latest draft the crate supports.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaValidator;

impl SchemaValidator for JsonSchemaValidator {
    fn check_schema(&self, schema: &Value) -> Result<(), SchemaError> {
        jsonschema::meta::validate(schema).map_err(|e| SchemaError {
            message: e.to_string(),
        })
    }

    fn validate(&self, value: &Value, schema: &Value) -> Result<(), ValidationError> {
        let validator = jsonschema::validator_for(schema).map_err(|e| ValidationError {
            message: format!("schema could not be compiled: {e}"),
        })?;
        validator.validate(value).map_err(|e| ValidationError {
            message: e.to_string(),
        })
    }
}
