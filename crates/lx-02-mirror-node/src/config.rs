//! Mirror-node client configuration

use std::time::Duration;

use lx_01_message_correlation::Network;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest page the mirror node serves
pub const MAX_PAGE_LIMIT: u16 = 100;

/// Public mirror node for a network, if there is one.
pub fn default_base_url(network: Network) -> Option<&'static str> {
    match network {
        Network::Testnet => Some("https://testnet.mirrornode.hedera.com"),
        Network::Mainnet => Some("https://mainnet-public.mirrornode.hedera.com"),
        Network::Previewnet => Some("https://previewnet.mirrornode.hedera.com"),
        Network::Local => None,
    }
}

/// Mirror-node client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct MirrorNodeConfig {
    /// Overrides the network's public mirror node
    pub base_url: Option<String>,
    /// Messages per page (1..=100)
    pub page_limit: u16,
    /// Upper bound on pages fetched per read; a longer topic fails the read
    pub max_pages: u32,
    /// Whole-request timeout
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Sent as `x-api-key` when set
    pub api_key: Option<String>,
}

impl Default for MirrorNodeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            page_limit: MAX_PAGE_LIMIT,
            max_pages: 1000,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for MirrorNodeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MirrorNodeConfig")
            .field("base_url", &self.base_url)
            .field("page_limit", &self.page_limit)
            .field("max_pages", &self.max_pages)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl MirrorNodeConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), MirrorConfigError> {
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(MirrorConfigError::PageLimit(self.page_limit));
        }
        if self.max_pages == 0 {
            return Err(MirrorConfigError::Invalid(
                "max_pages must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(MirrorConfigError::Invalid(
                "timeouts must be non-zero".to_string(),
            ));
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(MirrorConfigError::BaseUrl(url.clone()));
            }
        }
        Ok(())
    }

    /// Base URL to use for a network, without trailing slash.
    pub fn resolve_base_url(&self, network: Network) -> Result<String, MirrorConfigError> {
        self.base_url
            .as_deref()
            .or_else(|| default_base_url(network))
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(MirrorConfigError::NoDefaultUrl(network))
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum MirrorConfigError {
    #[error("page limit must be between 1 and 100, got {0}")]
    PageLimit(u16),

    #[error("mirror node URL must be http(s): {0}")]
    BaseUrl(String),

    #[error("no public mirror node for network {0}; set a base URL")]
    NoDefaultUrl(Network),

    #[error("invalid API key header value")]
    ApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
