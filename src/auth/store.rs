//! Shared slot for the active credential
//!
//! Many in-flight requests read the credential; only explicit updates
//! write it. Readers take a snapshot, so a request keeps the credential it
//! was dispatched with even if an update lands mid-flight.

use super::types::Credential;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Holds at most one active credential, shared between clones
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    active: Arc<RwLock<Option<Credential>>>,
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `credential`
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            active: Arc::new(RwLock::new(Some(credential))),
        }
    }

    /// Copy of the credential active right now
    pub async fn snapshot(&self) -> Option<Credential> {
        self.active.read().await.clone()
    }

    /// Replace the active credential, returning the previous one
    pub async fn replace(&self, credential: Credential) -> Option<Credential> {
        let mut active = self.active.write().await;
        debug!(
            kind = match &credential {
                Credential::Header(_) => "header",
                Credential::Query(_) => "query",
            },
            "Credential updated"
        );
        active.replace(credential)
    }

    /// Remove the active credential
    pub async fn clear(&self) -> Option<Credential> {
        self.active.write().await.take()
    }

    /// Whether a credential is currently set
    pub async fn is_set(&self) -> bool {
        self.active.read().await.is_some()
    }
}
