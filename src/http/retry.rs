//! Unauthorized-recovery retry coordinator
//!
//! One logical request is dispatched and classified, and either completes or,
//! on 401, is refreshed and dispatched again. Attempts are strictly
//! sequential and bounded by `max_attempts`; the bound is checked before the
//! refresh hook runs.

use super::cancel::CancelToken;
use super::classify::classify_response;
use super::request::{PreparedRequest, RequestDescriptor};
use super::transport::{duration_millis, RawResponse, Transport};
use crate::auth::{CredentialStore, RefreshHook};
use crate::error::{Error, Result, TransportError};
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Attempt counter of one retry chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
    max_attempts: u32,
}

impl RetryState {
    /// Start a chain at attempt 1. A bound of 0 still allows one dispatch.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt: 1,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Current attempt, starting at 1
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether the current attempt is the last one allowed
    pub fn exhausted(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Move on to the next attempt
    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

/// Drives one logical request through dispatch, classification and refresh
pub struct RetryCoordinator<'a> {
    transport: &'a dyn Transport,
    credentials: &'a CredentialStore,
    refresh_hook: Option<&'a dyn RefreshHook>,
    refresh_timeout: Option<Duration>,
    debug_mode: bool,
}

impl<'a> RetryCoordinator<'a> {
    pub fn new(transport: &'a dyn Transport, credentials: &'a CredentialStore) -> Self {
        Self {
            transport,
            credentials,
            refresh_hook: None,
            refresh_timeout: None,
            debug_mode: false,
        }
    }

    #[must_use]
    pub fn refresh_hook(mut self, hook: Option<&'a dyn RefreshHook>) -> Self {
        self.refresh_hook = hook;
        self
    }

    #[must_use]
    pub fn refresh_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.refresh_timeout = timeout;
        self
    }

    #[must_use]
    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }

    /// Run the chain to completion.
    ///
    /// The credential is snapshotted at each dispatch, so an attempt after a
    /// successful refresh carries the new credential while everything else
    /// about the request stays as prepared.
    pub async fn run(
        &self,
        request: &PreparedRequest,
        max_attempts: u32,
        cancel: &CancelToken,
    ) -> Result<Bytes> {
        let mut state = RetryState::new(max_attempts);

        loop {
            let credential = self.credentials.snapshot().await;
            let descriptor = request.authorize(credential.as_ref())?;

            let response = self.dispatch(&descriptor, &state, cancel).await?;

            trace!(status = ?response.status, attempt = state.attempt(), "Classifying response");
            match classify_response(response) {
                Ok(body) => {
                    trace!(attempt = state.attempt(), "Request completed");
                    return Ok(body);
                }
                Err(Error::Unauthorized) => {
                    let Some(hook) = self.refresh_hook else {
                        debug!("Unauthorized and no refresh hook configured");
                        return Err(Error::Unauthorized);
                    };
                    if state.exhausted() {
                        warn!(
                            attempt = state.attempt(),
                            max_attempts = state.max_attempts(),
                            "Unauthorized on final attempt, giving up"
                        );
                        return Err(Error::TooManyRetries {
                            attempts: state.attempt(),
                        });
                    }

                    if !self.refresh(hook, cancel).await? {
                        warn!(attempt = state.attempt(), "Credential refresh failed");
                        return Err(Error::TooManyRetries {
                            attempts: state.attempt(),
                        });
                    }
                    state.advance();
                }
                Err(e) => {
                    debug!(error = %e, attempt = state.attempt(), "Request failed");
                    return Err(e);
                }
            }
        }
    }

    /// Submit one attempt, bounded by the descriptor timeout and the
    /// cancellation token
    async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        state: &RetryState,
        cancel: &CancelToken,
    ) -> Result<RawResponse> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled.into());
        }

        debug!(
            method = %descriptor.method,
            url = %descriptor.url,
            attempt = state.attempt(),
            max_attempts = state.max_attempts(),
            "Dispatching request"
        );
        if self.debug_mode {
            let header_names: Vec<&str> =
                descriptor.headers.iter().map(|(k, _)| k.as_str()).collect();
            debug!(
                query = ?descriptor.query_string(),
                headers = ?header_names,
                body = %descriptor
                    .body
                    .as_deref()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default(),
                "Request payload"
            );
        }

        let submit = tokio::time::timeout(descriptor.timeout, self.transport.submit(descriptor));
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(attempt = state.attempt(), "Request cancelled in flight");
                return Err(TransportError::Cancelled.into());
            }
            result = submit => result,
        };

        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, attempt = state.attempt(), "Transport error");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout = ?descriptor.timeout, attempt = state.attempt(), "Request timed out");
                return Err(TransportError::Timeout {
                    timeout_ms: duration_millis(descriptor.timeout),
                }
                .into());
            }
        };

        if self.debug_mode {
            debug!(
                status = ?response.status,
                body = %String::from_utf8_lossy(&response.body),
                "Response payload"
            );
        }

        Ok(response)
    }

    /// Await the refresh hook; an elapsed refresh timeout counts as a failed
    /// refresh
    async fn refresh(&self, hook: &dyn RefreshHook, cancel: &CancelToken) -> Result<bool> {
        debug!("Refreshing credential");
        let refresh = async {
            match self.refresh_timeout {
                Some(limit) => tokio::time::timeout(limit, hook.refresh())
                    .await
                    .unwrap_or_else(|_| {
                        warn!(timeout = ?limit, "Refresh hook did not answer in time");
                        false
                    }),
                None => hook.refresh().await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Request cancelled during refresh");
                Err(TransportError::Cancelled.into())
            }
            refreshed = refresh => Ok(refreshed),
        }
    }
}

impl std::fmt::Debug for RetryCoordinator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryCoordinator")
            .field("has_refresh_hook", &self.refresh_hook.is_some())
            .field("refresh_timeout", &self.refresh_timeout)
            .field("debug_mode", &self.debug_mode)
            .finish_non_exhaustive()
    }
}
