//! Error types for PorkChop
//!
//! Every public API returns `Result<T, Error>`. Composition failures
//! (`InvalidUrl`, `InvalidHeader`, `Serialization`) are raised before
//! anything is dispatched; classification failures mirror the status-code
//! table; transport failures wrap [`TransportError`].

use thiserror::Error;

/// The main error type for PorkChop
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Composition Errors
    // ============================================================================
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },

    #[error("Failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    // ============================================================================
    // Classification Errors
    // ============================================================================
    #[error("The server returned a response without an HTTP status")]
    InvalidResponse,

    #[error("Authentication is required to access this resource")]
    Unauthorized,

    #[error("Missing permission to access this resource")]
    Forbidden,

    #[error("The requested resource does not exist")]
    NotFound,

    #[error("The server returned an error (HTTP {status})")]
    ServerError { status: u16 },

    #[error("The server returned an unexpected status (HTTP {status})")]
    Unknown { status: u16 },

    // ============================================================================
    // Retry Errors
    // ============================================================================
    #[error("Gave up after {attempts} attempt(s) on an unauthorized request")]
    TooManyRetries { attempts: u32 },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Failures raised by the transport layer
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Request was cancelled")]
    Cancelled,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Flat discriminant of [`Error`], handy for matching and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidUrl,
    InvalidHeader,
    Serialization,
    InvalidResponse,
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    Unknown,
    TooManyRetries,
    Transport,
    Decode,
    Config,
    Other,
}

impl Error {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an invalid header error
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Kind of failure, without payload
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::InvalidUrl { .. } => FailureKind::InvalidUrl,
            Error::InvalidHeader { .. } => FailureKind::InvalidHeader,
            Error::Serialization(_) => FailureKind::Serialization,
            Error::InvalidResponse => FailureKind::InvalidResponse,
            Error::Unauthorized => FailureKind::Unauthorized,
            Error::Forbidden => FailureKind::Forbidden,
            Error::NotFound => FailureKind::NotFound,
            Error::ServerError { .. } => FailureKind::ServerError,
            Error::Unknown { .. } => FailureKind::Unknown,
            Error::TooManyRetries { .. } => FailureKind::TooManyRetries,
            Error::Transport(_) => FailureKind::Transport,
            Error::Decode(_) => FailureKind::Decode,
            Error::Config { .. }
            | Error::YamlParse(_)
            | Error::JsonParse(_)
            | Error::Io(_) => FailureKind::Config,
            Error::Other(_) => FailureKind::Other,
        }
    }

    /// Check if this error is an unauthorized response
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized)
    }

    /// Check if the request was cancelled by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Cancelled))
    }
}

/// Result type alias for PorkChop
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
