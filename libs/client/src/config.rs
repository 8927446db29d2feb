//! Client configuration.

use std::time::Duration;

/// Production API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.butterflymx.com";

/// Production door unlock endpoint host.
pub const DEFAULT_UNLOCK_URL: &str = "https://api.unlock.prod.butterflymx.com";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("bmx-rust-client/", env!("CARGO_PKG_VERSION"));

/// Page size requested from list endpoints.
pub const PAGE_SIZE: u32 = 100;

/// Settings for [`crate::ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,

    /// Base URL of the door unlock service, without a trailing slash.
    pub unlock_url: String,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            unlock_url: DEFAULT_UNLOCK_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_unlock_url(mut self, unlock_url: impl Into<String>) -> Self {
        self.unlock_url = unlock_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
