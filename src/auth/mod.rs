//! Authentication module
//!
//! Supports: header credentials (Bearer, Basic, custom scheme or bare token)
//! and query credentials (API key in the URL).
//!
//! The `CredentialStore` holds the single active credential of a client;
//! a `RefreshHook` replaces it when the server answers 401.

mod refresh;
mod store;
mod types;

pub use refresh::{CallbackRefresh, RefreshCompletion, RefreshHook};
pub use store::CredentialStore;
pub use types::{Credential, HeaderCredential, QueryCredential, ToleranceLevel, AUTHORIZATION};

#[cfg(test)]
mod tests;
