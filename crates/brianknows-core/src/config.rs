//! Upstream configuration for the relay.
//!
//! Built once at start-up from process configuration and handed to the relay
//! adapter by reference. Nothing here is global.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Base address of the BrianKnows REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.brianknows.org";

/// Address the relay listens on unless overridden.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Upstream request timeout in seconds unless overridden.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the upstream API.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Upstream base URL without a trailing slash.
    pub base_url: String,
    /// Bearer token sent with every upstream call.
    pub api_key: String,
    /// Upper bound on a whole upstream call. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl UpstreamConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check the settings before any client is built.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("upstream base URL is empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "upstream base URL must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("API key is empty".into()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::Config("upstream timeout must be non-zero".into()));
        }
        Ok(())
    }

    /// Absolute upstream URL for a resource path such as `/agents`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Load `KEY=value` pairs from an env file into the process environment.
///
/// With `path == None` the file is `.env`, searched from the working directory
/// upwards. Variables already set in the environment are left alone. A missing
/// file is not an error and yields `Ok(None)`; a file that fails to parse is.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(Error::Config(format!("failed to load env file: {e}"))),
    }
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
