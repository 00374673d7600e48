//! URI reference handling for problem type identifiers.
//!
//! Identifiers arrive as partial references (`foo/bar`, `//host/path`) or full
//! URIs. [`UriNormalizer`] is the seam used to split them into components, fill
//! in what is missing, produce the canonical form and check it against an
//! [`IdentifierPolicy`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::IdentifierPolicy;

// RFC 3986, Appendix B.
#[allow(clippy::expect_used)] // good regex, it doesn't panic
static URI_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$")
        .expect("static regex should not panic")
});

/// Reasons a URI reference is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum UriError {
    #[error("could not be parsed: {reason}")]
    Parse { reason: String },

    #[error("{component} was required but missing")]
    MissingComponent { component: &'static str },

    #[error("{component} was required to be one of {allowed:?} but was {value:?}")]
    UnpermittedComponent {
        component: &'static str,
        allowed: Vec<String>,
        value: String,
    },
}

/// A possibly partial URI reference, split into its RFC 3986 components.
///
/// The `with_*` methods return an updated copy, mirroring a URI builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriReference {
    scheme: Option<String>,
    authority: Option<String>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl UriReference {
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Host part of the authority, without userinfo or port.
    ///
    /// An empty host is reported as absent.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        let authority = self.authority.as_deref()?;
        let host_port = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host_port)| host_port);
        let host = if host_port.starts_with('[') {
            host_port
                .find(']')
                .map_or(host_port, |end| &host_port[..=end])
        } else {
            host_port
                .rsplit_once(':')
                .map_or(host_port, |(host, _)| host)
        };
        (!host.is_empty()).then_some(host)
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.authority = Some(host.into());
        self
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Recompose the components (RFC 3986, section 5.3).
    #[must_use]
    pub fn unsplit(&self) -> String {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(authority) = &self.authority {
            out.push_str("//");
            out.push_str(authority);
        }
        out.push_str(&self.path);
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

impl fmt::Display for UriReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unsplit())
    }
}

/// A complete URI in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedUri {
    url: Url,
    has_path: bool,
}

impl FinalizedUri {
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.url.host_str().filter(|h| !h.is_empty())
    }

    /// Whether the reference carried a path before canonicalization.
    #[must_use]
    pub fn has_path(&self) -> bool {
        self.has_path
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for FinalizedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability interface for URI parsing, canonicalization and allow-list checks.
pub trait UriNormalizer: Send + Sync {
    /// Split `input` into URI reference components.
    ///
    /// # Errors
    /// Returns `UriError::Parse` if the input is not a URI reference.
    fn parse(&self, input: &str) -> Result<UriReference, UriError>;

    /// Turn a complete reference into its canonical URI.
    ///
    /// # Errors
    /// Returns `UriError::Parse` if the reference is not an absolute URI.
    fn finalize(&self, reference: &UriReference) -> Result<FinalizedUri, UriError>;

    /// Check a canonical URI against the policy's allow-lists.
    ///
    /// # Errors
    /// Returns `UriError` naming the first component that is missing or not permitted.
    fn validate(&self, uri: &FinalizedUri, policy: &IdentifierPolicy) -> Result<(), UriError>;
}

/// RFC 3986 reference splitting with canonical serialization by the `url` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc3986Normalizer;

impl UriNormalizer for Rfc3986Normalizer {
    fn parse(&self, input: &str) -> Result<UriReference, UriError> {
        let caps = URI_REFERENCE
            .captures(input)
            .ok_or_else(|| UriError::Parse {
                reason: format!("'{input}' is not a URI reference"),
            })?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_owned());
        Ok(UriReference {
            scheme: group(1),
            authority: group(2),
            path: group(3).unwrap_or_default(),
            query: group(4),
            fragment: group(5),
        })
    }

    fn finalize(&self, reference: &UriReference) -> Result<FinalizedUri, UriError> {
        let parse_error = |e: url::ParseError| UriError::Parse {
            reason: e.to_string(),
        };
        let mut url = Url::parse(&reference.unsplit()).map_err(parse_error)?;
        // Non-special schemes keep the host as written.
        if let Some(host) = url.host_str()
            && host.bytes().any(|b| b.is_ascii_uppercase())
        {
            let host = host.to_ascii_lowercase();
            url.set_host(Some(&host)).map_err(parse_error)?;
        }
        Ok(FinalizedUri {
            url,
            has_path: !reference.path.is_empty(),
        })
    }

    fn validate(&self, uri: &FinalizedUri, policy: &IdentifierPolicy) -> Result<(), UriError> {
        if !uri.has_path() {
            return Err(UriError::MissingComponent { component: "path" });
        }
        if !policy.allows_scheme(uri.scheme()) {
            return Err(UriError::UnpermittedComponent {
                component: "scheme",
                allowed: policy.allowed_schemes.clone(),
                value: uri.scheme().to_owned(),
            });
        }
        if let Some(host) = uri.host()
            && !policy.allows_host(host)
        {
            return Err(UriError::UnpermittedComponent {
                component: "host",
                allowed: policy.allowed_hosts.clone(),
                value: host.to_owned(),
            });
        }
        Ok(())
    }
}
