//! Request composition
//!
//! A [`PreparedRequest`] is the logical request of one retry chain: the URL
//! is parsed and the body serialized exactly once. Every dispatch turns it
//! into a [`RequestDescriptor`] by applying the credential snapshot taken at
//! that moment.

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::types::{CachePolicy, Method, Pairs};
use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default per-attempt timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fully composed, transport-ready description of one HTTP request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP verb
    pub method: Method,
    /// Target URL as supplied by the caller
    pub url: Url,
    /// Query items appended to `url`, in order
    pub query: Pairs,
    /// Request headers, in order, names unique ignoring case
    pub headers: Pairs,
    /// Serialized JSON body (POST/PUT/PATCH only)
    pub body: Option<Bytes>,
    /// Cache directive
    pub cache_policy: CachePolicy,
    /// Bound on one attempt
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// The URL with the composed query appended
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }

    /// The encoded query string of [`Self::full_url`]
    pub fn query_string(&self) -> Option<String> {
        self.full_url().query().map(str::to_string)
    }

    /// Look up a header value, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// The logical request reused by every attempt of a retry chain
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    method: Method,
    url: Url,
    query: Pairs,
    base_headers: Pairs,
    headers: Pairs,
    body: Option<Bytes>,
    cache_policy: CachePolicy,
    timeout: Duration,
}

impl PreparedRequest {
    /// Parse the URL and serialize the body.
    ///
    /// Fails with [`Error::InvalidUrl`] or [`Error::Serialization`]; nothing
    /// is dispatched in either case. Bodies given to GET or DELETE are
    /// ignored without being serialized.
    pub fn new<B>(url: &str, method: Method, body: Option<&B>) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        let url = parse_url(url)?;
        let body = match body {
            Some(body) if method.allows_body() => Some(Bytes::from(
                serde_json::to_vec(body).map_err(Error::Serialization)?,
            )),
            Some(_) => {
                debug!(%method, "Ignoring body for a verb that does not carry one");
                None
            }
            None => None,
        };

        let mut base_headers = Pairs::new();
        if body.is_some() {
            base_headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(Self {
            method,
            url,
            query: Pairs::new(),
            base_headers,
            headers: Pairs::new(),
            body,
            cache_policy: CachePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Append caller query items
    #[must_use]
    pub fn query<I, K, V>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(items.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Headers applied before the credential (client defaults)
    pub fn default_headers<'a, I>(mut self, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a (String, String)>,
    {
        for (name, value) in items {
            check_header(name, value)?;
            set_header(&mut self.base_headers, name, value);
        }
        Ok(self)
    }

    /// Headers applied after the credential; these win on conflict
    pub fn headers<I, K, V>(mut self, items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in items {
            let (name, value) = (name.into(), value.into());
            check_header(&name, &value)?;
            self.headers.push((name, value));
        }
        Ok(self)
    }

    #[must_use]
    pub fn cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Compose the descriptor for one dispatch.
    ///
    /// Query: caller items first, then the query credential. Headers:
    /// defaults, then the header credential, then caller headers. A token
    /// that cannot travel in a header fails with [`Error::InvalidHeader`].
    pub fn authorize(&self, credential: Option<&Credential>) -> Result<RequestDescriptor> {
        let mut query = self.query.clone();
        let mut headers = self.base_headers.clone();

        match credential {
            Some(Credential::Header(header)) => {
                let (name, value) = header.header();
                check_header(name, &value)?;
                set_header(&mut headers, name, &value);
            }
            Some(Credential::Query(item)) => {
                let (key, value) = item.pair();
                query.push((key.to_string(), value.to_string()));
            }
            None => {}
        }

        for (name, value) in &self.headers {
            set_header(&mut headers, name, value);
        }

        Ok(RequestDescriptor {
            method: self.method,
            url: self.url.clone(),
            query,
            headers,
            body: self.body.clone(),
            cache_policy: self.cache_policy,
            timeout: self.timeout,
        })
    }
}

/// Build a descriptor in one step from raw inputs
pub fn compose<B>(
    url: &str,
    method: Method,
    body: Option<&B>,
    query: &[(&str, &str)],
    credential: Option<&Credential>,
) -> Result<RequestDescriptor>
where
    B: Serialize + ?Sized,
{
    PreparedRequest::new(url, method, body)?
        .query(query.iter().copied())
        .authorize(credential)
}

/// Parse a URL, rejecting forms that cannot carry a path and query
pub fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(raw, e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(Error::invalid_url(raw, "URL cannot carry a path"));
    }
    Ok(url)
}

/// Reject names and values that are not valid HTTP header syntax
pub fn check_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::invalid_header(name, e.to_string()))?;
    HeaderValue::from_str(value).map_err(|e| Error::invalid_header(name, e.to_string()))?;
    Ok(())
}

/// Insert or replace a header, matching names without regard to case
fn set_header(headers: &mut Pairs, name: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
        Some(existing) => {
            existing.0 = name.to_string();
            existing.1 = value.to_string();
        }
        None => headers.push((name.to_string(), value.to_string())),
    }
}
