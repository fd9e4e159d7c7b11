//! Credential types
//!
//! A credential is either a header credential (contributes an
//! `Authorization` header) or a query credential (contributes one URL query
//! item). Credentials are immutable; replacing the active one goes through
//! [`super::CredentialStore`].

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the header contributed by a [`HeaderCredential`]
pub const AUTHORIZATION: &str = "Authorization";

/// Active authentication contribution attached to outgoing requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// Token sent in the `Authorization` header
    Header(HeaderCredential),
    /// Key/value pair appended to the URL query
    Query(QueryCredential),
}

impl Credential {
    /// Shorthand for a header credential with a scheme
    pub fn header(token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Credential::Header(HeaderCredential::new(token, token_type))
    }

    /// Shorthand for a query credential
    pub fn query(key: impl Into<String>, value: impl Into<String>) -> Self {
        Credential::Query(QueryCredential::new(key, value))
    }

    /// The header pair this credential contributes, if any
    pub fn header_pair(&self) -> Option<(&'static str, String)> {
        match self {
            Credential::Header(header) => Some(header.header()),
            Credential::Query(_) => None,
        }
    }

    /// The query item this credential contributes, if any
    pub fn query_pair(&self) -> Option<(&str, &str)> {
        match self {
            Credential::Header(_) => None,
            Credential::Query(query) => Some(query.pair()),
        }
    }
}

impl From<HeaderCredential> for Credential {
    fn from(credential: HeaderCredential) -> Self {
        Credential::Header(credential)
    }
}

impl From<QueryCredential> for Credential {
    fn from(credential: QueryCredential) -> Self {
        Credential::Query(credential)
    }
}

// ============================================================================
// Header Credential
// ============================================================================

/// Token sent as `Authorization: <token_type> <token>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderCredential {
    token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl HeaderCredential {
    /// Create a credential with the given scheme; an empty scheme sends the
    /// bare token
    pub fn new(token: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            token_type: token_type.into(),
            expires_at: None,
            refresh_token: None,
        }
    }

    /// Create a `Bearer` credential
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new(token, "Bearer")
    }

    /// Create a `Basic` credential from a username and password
    pub fn basic(username: &str, password: &str) -> Self {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
        Self::new(encoded, "Basic")
    }

    /// Set an absolute expiration time
    #[must_use]
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Expire `seconds` after `reference`. Fails when the expiry falls
    /// outside the representable date range.
    pub fn expiring_in(self, reference: DateTime<Utc>, seconds: i64) -> Result<Self> {
        let expires_at = Duration::try_seconds(seconds)
            .and_then(|offset| reference.checked_add_signed(offset))
            .ok_or_else(|| {
                Error::config(format!("Expiry of {seconds} seconds is out of range"))
            })?;
        Ok(self.with_expiry(expires_at))
    }

    /// Set the expiration from an ISO-8601 / RFC 3339 timestamp
    pub fn with_expiry_str(self, expires_at: &str) -> Result<Self> {
        let parsed = DateTime::parse_from_rfc3339(expires_at).map_err(|e| {
            Error::config(format!("invalid expiration timestamp '{expires_at}': {e}"))
        })?;
        Ok(self.with_expiry(parsed.with_timezone(&Utc)))
    }

    /// Attach a refresh token for use by a refresh hook
    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Value of the `Authorization` header
    pub fn header_value(&self) -> String {
        if self.token_type.is_empty() {
            self.token.clone()
        } else {
            format!("{} {}", self.token_type, self.token)
        }
    }

    /// The `("Authorization", value)` pair
    pub fn header(&self) -> (&'static str, String) {
        (AUTHORIZATION, self.header_value())
    }

    /// True when `at` is strictly past the expiration. Without an expiration
    /// the credential never expires.
    pub fn is_expired(&self, at: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => at > expires_at,
            None => false,
        }
    }

    /// True when `at` lies within `tolerance` units of the expiration, on
    /// either side. Without an expiration the credential is always treated
    /// as about to expire.
    pub fn is_about_to_expire(&self, at: DateTime<Utc>, level: ToleranceLevel, tolerance: f64) -> bool {
        let Some(expires_at) = self.expires_at else {
            return true;
        };
        let diff = (at - expires_at).num_milliseconds().unsigned_abs() as f64 / 1000.0;
        diff / level.seconds() <= tolerance
    }
}

/// Unit for [`HeaderCredential::is_about_to_expire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToleranceLevel {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl ToleranceLevel {
    fn seconds(self) -> f64 {
        match self {
            ToleranceLevel::Seconds => 1.0,
            ToleranceLevel::Minutes => 60.0,
            ToleranceLevel::Hours => 3_600.0,
            ToleranceLevel::Days => 86_400.0,
        }
    }
}

// ============================================================================
// Query Credential
// ============================================================================

/// API key sent as a URL query item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCredential {
    key: String,
    value: String,
}

impl QueryCredential {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The `(key, value)` query item
    pub fn pair(&self) -> (&str, &str) {
        (&self.key, &self.value)
    }
}
