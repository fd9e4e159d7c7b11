// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # PorkChop
//!
//! An HTTP client core that attaches a credential to every request,
//! classifies responses by status code, and recovers from `401` by asking a
//! caller-supplied hook for a fresh credential before trying again.
//!
//! ## Features
//!
//! - **Credentials**: `Authorization` header or API key query item
//! - **Typed outcomes**: every status code maps to a success or one error
//! - **Unauthorized recovery**: bounded retry through a refresh hook
//! - **Cancellation**: per-attempt timeouts and a shared cancel token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use porkchop::{Credential, HttpClient, HttpClientConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = HttpClientConfig::builder()
//!         .credential(Credential::header("abc", "Bearer"))
//!         .build();
//!     let client = HttpClient::with_config(config)?;
//!
//!     let store = client.credentials();
//!     let client = client.with_refresh_hook(move || {
//!         let store = store.clone();
//!         async move {
//!             store.replace(Credential::header("fresh", "Bearer")).await;
//!             true
//!         }
//!     });
//!
//!     let posts: serde_json::Value = client.get_json("https://api.example.com/posts").await?;
//!     println!("{posts}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ─▶ PreparedRequest ─▶ authorize(credential) ─▶ Transport::submit
//!                 ▲                                            │
//!                 │                                            ▼
//!           RefreshHook ◀── 401 (attempts left) ◀── classify_response
//!                                                              │
//!                                                              ▼
//!                                                  Bytes or one typed Error
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credentials, the credential store and refresh hooks
pub mod auth;

/// Request composition, classification, retry and the client facade
pub mod http;

/// Client settings files
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{
    CallbackRefresh, Credential, CredentialStore, HeaderCredential, QueryCredential,
    RefreshCompletion, RefreshHook, ToleranceLevel,
};
pub use config::{load_settings, ClientSettings};
pub use error::{Error, FailureKind, Result, ResultExt, TransportError};
pub use http::{
    CancelToken, HttpClient, HttpClientConfig, RawResponse, RequestConfig, RequestDescriptor,
    StatusClass, Transport,
};
pub use types::{CachePolicy, Method};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
