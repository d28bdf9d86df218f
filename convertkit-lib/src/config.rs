//! Client settings as they appear in a TOML file.
//!
//! ```toml
//! base_url = "https://api.convertkit.com/v3/"
//! api_secret = "..."
//! timeout = "30s"
//!
//! [rate_limit]
//! limit = 120
//! interval = "60s"
//! max_pending = 1000
//! overflow = "reject-oldest"
//!
//! [headers]
//! X-Request-Source = "nightly-sync"
//! ```
use http::{HeaderMap, HeaderName, HeaderValue};
use log::debug;
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use crate::{ClientBuilder, ErrorKind, RateLimitConfig, Result};

/// Everything needed to build a [`crate::Client`], loadable from TOML
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Public API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// API secret, preferred over the key when both are set
    #[serde(default)]
    pub api_secret: Option<SecretString>,

    /// User-agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Response timeout per request, e.g. `"30s"`
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Rate ceiling and queueing behavior
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_secret: None,
            user_agent: default_user_agent(),
            timeout: None,
            rate_limit: RateLimitConfig::default(),
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid
    /// configuration.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        debug!("Loading client configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ErrorKind::ReadConfig(path.to_path_buf(), e))?;
        contents.parse()
    }

    /// Turn this configuration into a [`ClientBuilder`].
    ///
    /// # Errors
    ///
    /// Returns an error if a header name or value is invalid.
    pub fn into_builder(self) -> Result<ClientBuilder> {
        let mut custom_headers = HeaderMap::new();
        for (name, value) in &self.headers {
            custom_headers.insert(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        Ok(ClientBuilder::builder()
            .base_url(self.base_url)
            .api_key(self.api_key)
            .api_secret(self.api_secret)
            .user_agent(self.user_agent)
            .timeout(self.timeout)
            .rate_limit(self.rate_limit)
            .custom_headers(custom_headers)
            .build())
    }
}

impl FromStr for ClientConfig {
    type Err = ErrorKind;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
