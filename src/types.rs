//! Common types used throughout PorkChop
//!
//! Shared HTTP vocabulary: the request verb, the cache directive applied to
//! every request of a client, and the ordered pair list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// Ordered list of name/value pairs (query items, headers)
pub type Pairs = Vec<(String, String)>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Method {
    /// Whether a body supplied for this verb is serialized and sent
    pub fn allows_body(self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH)
    }

    /// Upper-case wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Cache Policy
// ============================================================================

/// Cache directive applied to outgoing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Let the transport and server negotiate caching
    UseProtocol,
    /// Bypass local and intermediary caches
    #[default]
    ReloadIgnoringCache,
    /// Accept stale cached data before going to the network
    ReturnCacheElseLoad,
}

impl CachePolicy {
    /// Request headers that express this policy, if any
    pub fn directives(self) -> &'static [(&'static str, &'static str)] {
        match self {
            CachePolicy::UseProtocol => &[],
            CachePolicy::ReloadIgnoringCache => {
                &[("Cache-Control", "no-cache"), ("Pragma", "no-cache")]
            }
            CachePolicy::ReturnCacheElseLoad => &[("Cache-Control", "max-stale")],
        }
    }
}
