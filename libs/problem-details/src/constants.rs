/// Content type for Problem Details as per RFC 7807.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Identifier of the blank problem type ("no specific type").
pub const BLANK_TYPE: &str = "about:blank";

/// Scheme inserted into identifiers that do not carry one.
pub const DEFAULT_SCHEME: &str = "https";

/// Host inserted into identifiers that do not carry one.
pub const DEFAULT_HOST: &str = "example.com";

/// Scheme of the blank type identifier.
pub const BLANK_SCHEME: &str = "about";

/// Schemes a problem type identifier may use.
pub const ALLOWED_SCHEMES: &[&str] = &["about", "http", "https"];

/// Hosts a problem type identifier may use.
pub const ALLOWED_HOSTS: &[&str] = &["example.com"];

/// Extension field names that collide with structural members of the problem model.
pub const RESERVED_EXTENSION_NAMES: &[&str] = &[
    "detail",
    "extension",
    "identifier",
    "instance",
    "status",
    "title",
    "type",
];

/// Returns `true` if `name` may not be declared as an extension field.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_EXTENSION_NAMES.contains(&name)
}
