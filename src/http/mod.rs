//! HTTP client module
//!
//! Composes requests with the active credential, classifies responses and
//! recovers from 401 through a refresh hook.
//!
//! # Features
//!
//! - **Composition**: URL, query, headers and JSON body in one descriptor
//! - **Classification**: status codes mapped to typed errors
//! - **Unauthorized recovery**: bounded retry after a credential refresh
//! - **Cancellation**: per-attempt timeouts and a shared cancel token

mod cancel;
mod classify;
mod client;
mod request;
mod retry;
mod transport;

pub use cancel::CancelToken;
pub use classify::{classify_response, classify_status, StatusClass};
pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig,
    DEFAULT_MAX_RETRY_ATTEMPTS,
};
pub use request::{check_header, compose, parse_url, PreparedRequest, RequestDescriptor, DEFAULT_TIMEOUT};
pub use retry::{RetryCoordinator, RetryState};
pub use transport::{RawResponse, ReqwestTransport, Transport};
