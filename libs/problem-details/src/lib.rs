//! RFC 7807 problem types and problem details
//!
//! This crate builds and validates problem data; it does not transmit it. It includes:
//! - Problem types with normalized identifier URIs and schema-typed extension members (`ProblemType`)
//! - Problem details validated against their type, with resolved title/detail templates (`ProblemDetails`)
//! - Seams for URI normalization (`UriNormalizer`) and JSON-Schema validation (`SchemaValidator`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod constants;
pub mod error;
pub mod problem;
pub mod problem_type;
pub mod schema;
pub mod template;
pub mod uri;

// Re-export commonly used types
pub use config::{ConfigError, IdentifierPolicy};
pub use constants::{APPLICATION_PROBLEM_JSON, BLANK_TYPE, RESERVED_EXTENSION_NAMES};
pub use error::{ProblemError, ProblemResult};
pub use problem::{Field, ProblemDetails, ProblemDetailsBuilder, StatusInput};
pub use problem_type::{ProblemType, ProblemTypeBuilder};
pub use schema::{JsonSchemaValidator, SchemaError, SchemaValidator, ValidationError};
pub use template::format;
pub use uri::{FinalizedUri, Rfc3986Normalizer, UriError, UriNormalizer, UriReference};
