//! Identifier policy: the scheme/host namespace problem type identifiers live in.
//!
//! The policy is plain serde data so hosts can load it from their own
//! configuration section. Missing keys fall back to the contract constants.

use serde::{Deserialize, Serialize};

use crate::constants::{ALLOWED_HOSTS, ALLOWED_SCHEMES, DEFAULT_HOST, DEFAULT_SCHEME};

/// Configuration error for identifier policies
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("default scheme '{scheme}' is not in the allowed schemes {allowed:?}")]
    DefaultSchemeNotAllowed { scheme: String, allowed: Vec<String> },
    #[error("default host '{host}' is not in the allowed hosts {allowed:?}")]
    DefaultHostNotAllowed { host: String, allowed: Vec<String> },
    #[error("invalid identifier policy: {source}")]
    InvalidConfig {
        #[source]
        source: serde_json::Error,
    },
}

/// Scheme and host rules applied to problem type identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierPolicy {
    /// Scheme inserted when an identifier has none
    pub default_scheme: String,

    /// Host inserted when an identifier has none
    pub default_host: String,

    /// Schemes an identifier may use
    pub allowed_schemes: Vec<String>,

    /// Hosts an identifier may use
    pub allowed_hosts: Vec<String>,
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        Self {
            default_scheme: DEFAULT_SCHEME.to_owned(),
            default_host: DEFAULT_HOST.to_owned(),
            allowed_schemes: ALLOWED_SCHEMES.iter().map(|s| (*s).to_owned()).collect(),
            allowed_hosts: ALLOWED_HOSTS.iter().map(|h| (*h).to_owned()).collect(),
        }
    }
}

impl IdentifierPolicy {
    /// Load a policy from a raw JSON configuration section.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConfig` if the section cannot be deserialized,
    /// or any error from [`IdentifierPolicy::validate`].
    pub fn from_value(section: &serde_json::Value) -> Result<Self, ConfigError> {
        let policy: Self = serde_json::from_value(section.clone())
            .map_err(|e| ConfigError::InvalidConfig { source: e })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check that the defaults fall inside their own allow-lists.
    ///
    /// # Errors
    /// Returns `ConfigError` if the default scheme or host would be rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.allows_scheme(&self.default_scheme) {
            return Err(ConfigError::DefaultSchemeNotAllowed {
                scheme: self.default_scheme.clone(),
                allowed: self.allowed_schemes.clone(),
            });
        }
        if !self.allows_host(&self.default_host) {
            return Err(ConfigError::DefaultHostNotAllowed {
                host: self.default_host.clone(),
                allowed: self.allowed_hosts.clone(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }

    #[must_use]
    pub fn allows_host(&self, host: &str) -> bool {
        self.allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
    }
}
