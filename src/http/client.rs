//! HTTP client with credential handling and unauthorized recovery
//!
//! Provides a client that handles:
//! - Request composition with the active credential
//! - Status-code classification into typed errors
//! - Bounded retry after 401 through a caller-supplied refresh hook
//! - Per-attempt timeouts and caller-driven cancellation

use super::cancel::CancelToken;
use super::request::{PreparedRequest, RequestDescriptor, DEFAULT_TIMEOUT};
use super::retry::RetryCoordinator;
use super::transport::{ReqwestTransport, Transport};
use crate::auth::{Credential, CredentialStore, RefreshHook};
use crate::error::{Error, Result};
use crate::types::{CachePolicy, Method, Pairs};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default bound on dispatches per logical request
pub const DEFAULT_MAX_RETRY_ATTEMPTS: u32 = 3;

const NO_BODY: Option<&'static ()> = None;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Cache directive applied to every request
    pub cache_policy: CachePolicy,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Maximum dispatches per logical request
    pub max_retry_attempts: u32,
    /// Log request and response bodies
    pub debug_mode_enabled: bool,
    /// Upper bound on one refresh hook invocation
    pub refresh_timeout: Option<Duration>,
    /// Headers sent with every request, before the credential
    pub default_headers: Pairs,
    /// User agent string
    pub user_agent: String,
    /// Credential active when the client is built
    pub credential: Option<Credential>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            cache_policy: CachePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            debug_mode_enabled: false,
            refresh_timeout: None,
            default_headers: Pairs::new(),
            user_agent: format!("porkchop/{}", env!("CARGO_PKG_VERSION")),
            credential: None,
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the cache policy
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.config.cache_policy = policy;
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max dispatch attempts
    pub fn max_retry_attempts(mut self, attempts: u32) -> Self {
        self.config.max_retry_attempts = attempts;
        self
    }

    /// Enable or disable body logging
    pub fn debug_mode(mut self, enabled: bool) -> Self {
        self.config.debug_mode_enabled = enabled;
        self
    }

    /// Bound each refresh hook invocation
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.config.refresh_timeout = Some(timeout);
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((key.into(), value.into()));
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the initial credential
    pub fn credential(mut self, credential: impl Into<Credential>) -> Self {
        self.config.credential = Some(credential.into());
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters, in order
    pub query: Pairs,
    /// Request headers; override the credential and defaults
    pub headers: Pairs,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max dispatch attempts for this request
    pub max_retry_attempts: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max dispatch attempts
    #[must_use]
    pub fn retries(mut self, attempts: u32) -> Self {
        self.max_retry_attempts = Some(attempts);
        self
    }
}

/// HTTP client with credential handling and unauthorized recovery
pub struct HttpClient {
    config: HttpClientConfig,
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    refresh_hook: Option<Arc<dyn RefreshHook>>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of any transport. The store is seeded with
    /// the configured credential and lives as long as the client.
    pub fn with_transport(mut config: HttpClientConfig, transport: Arc<dyn Transport>) -> Self {
        let credentials = match config.credential.take() {
            Some(credential) => CredentialStore::with_credential(credential),
            None => CredentialStore::new(),
        };
        Self {
            config,
            transport,
            credentials,
            refresh_hook: None,
        }
    }

    /// Install a refresh hook
    #[must_use]
    pub fn with_refresh_hook(mut self, hook: impl RefreshHook + 'static) -> Self {
        self.refresh_hook = Some(Arc::new(hook));
        self
    }

    /// Set or replace the refresh hook
    pub fn set_refresh_hook(&mut self, hook: Arc<dyn RefreshHook>) {
        self.refresh_hook = Some(hook);
    }

    /// Remove the refresh hook; 401 then fails immediately
    pub fn clear_refresh_hook(&mut self) {
        self.refresh_hook = None;
    }

    /// Check if a refresh hook is installed
    pub fn has_refresh_hook(&self) -> bool {
        self.refresh_hook.is_some()
    }

    /// Replace the active credential. Requests already dispatched keep the
    /// credential they were sent with.
    pub async fn update_credential(&self, credential: Credential) -> Option<Credential> {
        self.credentials.replace(credential).await
    }

    /// Remove the active credential
    pub async fn clear_credential(&self) -> Option<Credential> {
        self.credentials.clear().await
    }

    /// Snapshot of the active credential
    pub async fn credential(&self) -> Option<Credential> {
        self.credentials.snapshot().await
    }

    /// Handle to the credential slot, e.g. for a refresh hook to write into
    pub fn credentials(&self) -> CredentialStore {
        self.credentials.clone()
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Parse and serialize a request without dispatching it
    pub fn prepare<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: &RequestConfig,
    ) -> Result<PreparedRequest>
    where
        B: Serialize + ?Sized,
    {
        Ok(PreparedRequest::new(url, method, body)?
            .query(config.query.iter().cloned())
            .default_headers(&self.config.default_headers)?
            .headers(config.headers.iter().cloned())?
            .cache_policy(self.config.cache_policy)
            .timeout(config.timeout.unwrap_or(self.config.timeout)))
    }

    /// Compose the descriptor the next dispatch would send
    pub async fn compose<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: &RequestConfig,
    ) -> Result<RequestDescriptor>
    where
        B: Serialize + ?Sized,
    {
        let prepared = self.prepare(method, url, body, config)?;
        let credential = self.credentials.snapshot().await;
        prepared.authorize(credential.as_ref())
    }

    /// Make a generic request and return the success payload
    pub async fn execute<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        self.execute_with_cancel(method, url, body, config, &CancelToken::new())
            .await
    }

    /// Make a generic request that `cancel` can abort
    pub async fn execute_with_cancel<B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
        cancel: &CancelToken,
    ) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let prepared = self.prepare(method, url, body, &config)?;
        let max_attempts = config
            .max_retry_attempts
            .unwrap_or(self.config.max_retry_attempts);

        let result = RetryCoordinator::new(self.transport.as_ref(), &self.credentials)
            .refresh_hook(self.refresh_hook.as_deref())
            .refresh_timeout(self.config.refresh_timeout)
            .debug_mode(self.config.debug_mode_enabled)
            .run(&prepared, max_attempts, cancel)
            .await;

        if result.is_ok() {
            debug!("Request succeeded: {} {}", method, prepared.url());
        }
        result
    }

    /// Make a request without a body
    pub async fn request(&self, method: Method, url: &str, config: RequestConfig) -> Result<Bytes> {
        self.execute(method, url, NO_BODY, config).await
    }

    /// Make a request and parse JSON response
    pub async fn request_json<T, B>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
        config: RequestConfig,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let bytes = self.execute(method, url, body, config).await?;
        serde_json::from_slice(&bytes).map_err(Error::Decode)
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Bytes> {
        self.request(Method::GET, url, RequestConfig::default()).await
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, url: &str, config: RequestConfig) -> Result<Bytes> {
        self.request(Method::GET, url, config).await
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.request_json(Method::GET, url, NO_BODY, RequestConfig::default())
            .await
    }

    /// Make a POST request with a JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Bytes> {
        self.execute(Method::POST, url, Some(body), RequestConfig::default())
            .await
    }

    /// Make a PUT request with a JSON body
    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Bytes> {
        self.execute(Method::PUT, url, Some(body), RequestConfig::default())
            .await
    }

    /// Make a PATCH request with a JSON body
    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Bytes> {
        self.execute(Method::PATCH, url, Some(body), RequestConfig::default())
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str) -> Result<Bytes> {
        self.request(Method::DELETE, url, RequestConfig::default())
            .await
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_refresh_hook", &self.refresh_hook.is_some())
            .finish_non_exhaustive()
    }
}
