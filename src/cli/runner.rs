//! CLI runner - executes commands

use crate::auth::{Credential, HeaderCredential};
use crate::cli::commands::{Cli, Commands, TimeUnit};
use crate::config::{load_settings, ClientSettings};
use crate::error::{Error, Result, ResultExt};
use crate::http::{classify_status, HttpClient, RequestConfig};
use crate::types::Method;
use bytes::Bytes;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Options of the `request` subcommand
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub data: Option<String>,
    pub bearer: Option<String>,
    pub api_key: Option<(String, String)>,
    pub retries: Option<u32>,
    pub timeout: Option<u64>,
    pub pretty: bool,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Request {
                url,
                method,
                query,
                headers,
                data,
                bearer,
                api_key,
                retries,
                timeout,
                pretty,
            } => {
                let options = RequestOptions {
                    method: *method,
                    query: query.clone(),
                    headers: headers.clone(),
                    data: data.clone(),
                    bearer: bearer.clone(),
                    api_key: api_key.clone(),
                    retries: *retries,
                    timeout: *timeout,
                    pretty: *pretty,
                };
                let body = self.request(url, &options).await?;
                println!("{}", render_body(&body, options.pretty));
                Ok(())
            }
            Commands::Classify { statuses } => {
                for line in classify_lines(statuses) {
                    println!("{line}");
                }
                Ok(())
            }
            Commands::Token {
                expires_at,
                tolerance,
                unit,
            } => {
                let report = token_report(expires_at, *tolerance, *unit)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
        }
    }

    /// Load client settings, or defaults when no file was given
    fn load_settings(&self) -> Result<ClientSettings> {
        match &self.cli.settings {
            Some(path) => load_settings(path),
            None => Ok(ClientSettings::default()),
        }
    }

    /// Send one request with the configured client
    async fn request(&self, url: &str, options: &RequestOptions) -> Result<Bytes> {
        let mut config = self.load_settings()?.into_config();
        match (&options.bearer, &options.api_key) {
            (Some(token), _) => {
                config.credential = Some(HeaderCredential::bearer(token.as_str()).into());
            }
            (None, Some((key, value))) => {
                config.credential = Some(Credential::query(key.as_str(), value.as_str()));
            }
            (None, None) => {}
        }
        let client = HttpClient::with_config(config)?;

        let mut request_config = RequestConfig::new();
        request_config.query.clone_from(&options.query);
        request_config.headers.clone_from(&options.headers);
        request_config.timeout = options.timeout.map(Duration::from_secs);
        request_config.max_retry_attempts = options.retries;

        let body: Option<Value> = options
            .data
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .context("Invalid --data JSON")?;

        debug!(method = %options.method, url, "Sending request");
        client
            .execute(options.method, url, body.as_ref(), request_config)
            .await
    }
}

/// Format a response body; JSON bodies are re-rendered when `pretty` is set
pub fn render_body(body: &[u8], pretty: bool) -> String {
    if pretty {
        if let Ok(value) = serde_json::from_slice::<Value>(body) {
            if let Ok(rendered) = serde_json::to_string_pretty(&value) {
                return rendered;
            }
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

/// One `<status> <class>` line per code
pub fn classify_lines(statuses: &[u16]) -> Vec<String> {
    statuses
        .iter()
        .map(|status| format!("{status} {:?}", classify_status(*status)))
        .collect()
}

/// Expiry state of a token expiring at `expires_at`, evaluated now
pub fn token_report(expires_at: &str, tolerance: f64, unit: TimeUnit) -> Result<Value> {
    if tolerance < 0.0 {
        return Err(Error::config("--tolerance must not be negative"));
    }
    let credential = HeaderCredential::new("", "").with_expiry_str(expires_at)?;
    let now = Utc::now();

    Ok(json!({
        "expires_at": credential.expires_at().map(|at| at.to_rfc3339()),
        "checked_at": now.to_rfc3339(),
        "expired": credential.is_expired(now),
        "about_to_expire": credential.is_about_to_expire(now, unit.into(), tolerance),
    }))
}
