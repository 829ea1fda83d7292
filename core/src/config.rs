//! Client configuration.
//!
//! Defaults point at the production service. Override the base URL to target
//! a mock or proxy; override the timeout for slow links.

use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for `NewsClient` and `UreqTransport`.
///
/// `Debug` redacts `api_key` so configs can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            ..Self::default()
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}
