//! Credential refresh hooks
//!
//! A refresh hook is invoked after an unauthorized response. It tries to
//! obtain a new credential (typically writing it into a
//! [`super::CredentialStore`]) and answers `true` to retry or `false` to give up.

use async_trait::async_trait;
use std::future::Future;
use tokio::sync::oneshot;
use tracing::warn;

/// Caller-supplied procedure that attempts to obtain a fresh credential
#[async_trait]
pub trait RefreshHook: Send + Sync {
    /// Returns `true` when a new credential is in place and the request
    /// should be re-dispatched
    async fn refresh(&self) -> bool;
}

#[async_trait]
impl<F, Fut> RefreshHook for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn refresh(&self) -> bool {
        (self)().await
    }
}

/// One-shot answer handed to a callback-style refresh procedure
///
/// Consuming `complete` guarantees at most one answer. Dropping the
/// completion without answering counts as a failed refresh.
#[derive(Debug)]
pub struct RefreshCompletion {
    tx: oneshot::Sender<bool>,
}

impl RefreshCompletion {
    /// Report the outcome of the refresh
    pub fn complete(self, refreshed: bool) {
        // The waiting side may already be gone (cancelled request).
        let _ = self.tx.send(refreshed);
    }
}

/// Adapts a completion-callback procedure to [`RefreshHook`]
pub struct CallbackRefresh<F> {
    callback: F,
}

impl<F> CallbackRefresh<F>
where
    F: Fn(RefreshCompletion) + Send + Sync + 'static,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

#[async_trait]
impl<F> RefreshHook for CallbackRefresh<F>
where
    F: Fn(RefreshCompletion) + Send + Sync + 'static,
{
    async fn refresh(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        (self.callback)(RefreshCompletion { tx });
        match rx.await {
            Ok(refreshed) => refreshed,
            Err(_) => {
                warn!("Refresh callback dropped its completion without answering");
                false
            }
        }
    }
}

impl<F> std::fmt::Debug for CallbackRefresh<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRefresh").finish_non_exhaustive()
    }
}
