//! Client settings files
//!
//! A settings file describes one client: cache policy, timeouts, retry bound,
//! default headers and an optional initial credential. YAML and JSON are
//! both accepted; the format follows the file extension.

use crate::auth::Credential;
use crate::error::{Error, Result};
use crate::http::{check_header, HttpClientConfig, DEFAULT_MAX_RETRY_ATTEMPTS};
use crate::types::CachePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Settings
// ============================================================================

/// Client settings as written in a settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSettings {
    /// Cache directive applied to every request
    #[serde(default)]
    pub cache_policy: CachePolicy,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum dispatches per logical request
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Log request and response bodies
    #[serde(default)]
    pub debug_mode: bool,

    /// Bound on one refresh hook invocation, in milliseconds
    #[serde(default)]
    pub refresh_timeout_ms: Option<u64>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Initial credential
    #[serde(default)]
    pub credential: Option<Credential>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retry_attempts() -> u32 {
    DEFAULT_MAX_RETRY_ATTEMPTS
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            cache_policy: CachePolicy::default(),
            timeout_secs: default_timeout_secs(),
            max_retry_attempts: default_max_retry_attempts(),
            debug_mode: false,
            refresh_timeout_ms: None,
            user_agent: None,
            headers: BTreeMap::new(),
            credential: None,
        }
    }
}

impl ClientSettings {
    /// Build the client configuration, initial credential included
    pub fn into_config(self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .cache_policy(self.cache_policy)
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retry_attempts(self.max_retry_attempts)
            .debug_mode(self.debug_mode);

        if let Some(ms) = self.refresh_timeout_ms {
            builder = builder.refresh_timeout(Duration::from_millis(ms));
        }
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        if let Some(credential) = self.credential {
            builder = builder.credential(credential);
        }

        builder.build()
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if self.refresh_timeout_ms == Some(0) {
            return Err(Error::config(
                "refresh_timeout_ms must be greater than zero when set",
            ));
        }
        for (name, value) in &self.headers {
            check_header(name, value).map_err(|e| Error::config(e.to_string()))?;
        }
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Settings file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Yaml,
    Json,
}

impl SettingsFormat {
    /// Pick the format from a file extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SettingsFormat::Json,
            _ => SettingsFormat::Yaml,
        }
    }
}

/// Load settings from a YAML or JSON file
pub fn load_settings(path: impl AsRef<Path>) -> Result<ClientSettings> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read settings file '{}': {}",
            path.display(),
            e
        ))
    })?;
    settings_from_str(&content, SettingsFormat::from_path(path))
}

/// Parse settings from a string
pub fn settings_from_str(content: &str, format: SettingsFormat) -> Result<ClientSettings> {
    let settings: ClientSettings = match format {
        SettingsFormat::Yaml => serde_yaml::from_str(content)?,
        SettingsFormat::Json => serde_json::from_str(content)?,
    };
    settings.validate()?;
    Ok(settings)
}
