//! Transport boundary
//!
//! The core only needs "submit a descriptor, get status + bytes or a
//! transport error". [`ReqwestTransport`] is the production implementation;
//! tests substitute scripted transports.

use super::request::RequestDescriptor;
use crate::error::{Result, TransportError};
use crate::types::Pairs;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

/// Raw outcome of one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status; `None` when the transport produced a non-HTTP response
    pub status: Option<u16>,
    /// Response headers
    pub headers: Pairs,
    /// Response body
    pub body: Bytes,
}

impl RawResponse {
    /// Response with a status and body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: Some(status),
            headers: Pairs::new(),
            body: body.into(),
        }
    }

    /// Response that carried no HTTP status
    pub fn without_status(body: impl Into<Bytes>) -> Self {
        Self {
            status: None,
            headers: Pairs::new(),
            body: body.into(),
        }
    }
}

/// Asynchronous HTTP execution primitive
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request. Dropping the returned future cancels it.
    async fn submit(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport with its own connection pool
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self { client })
    }

    /// Reuse an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn submit(
        &self,
        request: &RequestDescriptor,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut req = self
            .client
            .request(request.method.into(), request.full_url())
            .timeout(request.timeout);

        // Cache directives yield to explicit caller headers.
        for (name, value) in request.cache_policy.directives() {
            if request.header(name).is_none() {
                req = req.header(*name, *value);
            }
        }

        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        if let Some(ref body) = request.body {
            req = req.body(body.clone());
        }

        let response = req
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, request.timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| classify_reqwest_error(e, request.timeout))?;

        Ok(RawResponse {
            status: Some(status),
            headers,
            body,
        })
    }
}

fn classify_reqwest_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        return TransportError::Timeout {
            timeout_ms: duration_millis(timeout),
        };
    }
    TransportError::Http(error)
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub(crate) fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
