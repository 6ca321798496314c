//! # Node Configuration
//!
//! Assembled from `LYNX_*` environment variables on top of each crate's
//! defaults. Malformed values fail startup instead of falling back silently.

use std::fmt::Display;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use lx_01_message_correlation::{AccountId, CorrelationConfig, Network, TopicId};
use lx_02_mirror_node::{MirrorConfigError, MirrorNodeConfig};
use lx_03_history_gateway::GatewayConfig;
use thiserror::Error;

/// Operator credentials for signing topic submissions.
#[derive(Clone)]
pub struct OperatorCredentials {
    pub account_id: AccountId,
    pub private_key: String,
}

impl std::fmt::Debug for OperatorCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorCredentials")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub network: Network,
    /// Rebalance topic; requests fail while unset
    pub topic_id: Option<TopicId>,
    pub operator: Option<OperatorCredentials>,
    pub mirror: MirrorNodeConfig,
    pub gateway: GatewayConfig,
    pub correlation: CorrelationConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
            topic_id: None,
            operator: None,
            mirror: MirrorNodeConfig::default(),
            gateway: GatewayConfig::default(),
            correlation: CorrelationConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("LYNX_OPERATOR_ID and LYNX_OPERATOR_KEY must be set together")]
    PartialOperator,

    #[error(transparent)]
    Gateway(#[from] lx_03_history_gateway::ConfigError),

    #[error(transparent)]
    Mirror(#[from] MirrorConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl NodeConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let mut config = Self::default();

        if let Some(network) = env.parse::<Network>("LYNX_NETWORK")? {
            config.network = network;
        }
        config.topic_id = env.parse::<TopicId>("LYNX_REBALANCE_TOPIC_ID")?;

        config.operator = match (
            env.parse::<AccountId>("LYNX_OPERATOR_ID")?,
            env.get("LYNX_OPERATOR_KEY"),
        ) {
            (Some(account_id), Some(private_key)) => Some(OperatorCredentials {
                account_id,
                private_key,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialOperator),
        };

        config.mirror.base_url = env.get("LYNX_MIRROR_URL");
        config.mirror.api_key = env.get("LYNX_MIRROR_API_KEY");
        if let Some(limit) = env.parse::<u16>("LYNX_MIRROR_PAGE_LIMIT")? {
            config.mirror.page_limit = limit;
        }
        if let Some(pages) = env.parse::<u32>("LYNX_MIRROR_MAX_PAGES")? {
            config.mirror.max_pages = pages;
        }
        if let Some(secs) = env.parse::<u64>("LYNX_MIRROR_TIMEOUT_SECS")? {
            config.mirror.timeout = Duration::from_secs(secs);
        }

        if let Some(host) = env.parse::<IpAddr>("LYNX_HTTP_HOST")? {
            config.gateway.host = host;
        }
        if let Some(port) = env.parse::<u16>("LYNX_HTTP_PORT")? {
            config.gateway.port = port;
        }
        if let Some(secs) = env.parse::<u64>("LYNX_REQUEST_TIMEOUT_SECS")? {
            config.gateway.request_timeout = Duration::from_secs(secs);
        }
        if let Some(origins) = env.get("LYNX_CORS_ORIGINS") {
            config.gateway.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(clamp) = env.flag("LYNX_CLAMP_FUTURE_TIMESTAMPS")? {
            config.correlation.clamp_future_timestamps = clamp;
        }
        if let Some(skew) = env.parse::<u64>("LYNX_MAX_TIMESTAMP_SKEW_SECS")? {
            config.correlation.max_timestamp_skew_secs = skew;
        }

        Ok(config)
    }

    /// Validate configuration before startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway.validate()?;
        if self.network != Network::Local {
            self.mirror.validate()?;
            self.mirror.resolve_base_url(self.network)?;
        }
        if let Some(operator) = &self.operator {
            if operator.private_key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "operator key cannot be blank".to_string(),
                ));
            }
        }
        Ok(())
    }
}

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(&self, var: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(var)
            .map(|value| {
                value.parse::<T>().map_err(|e| ConfigError::InvalidVar {
                    var,
                    reason: format!("{:?}: {}", value, e),
                })
            })
            .transpose()
    }

    fn flag(&self, var: &'static str) -> Result<Option<bool>, ConfigError> {
        self.get(var)
            .map(|value| match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidVar {
                    var,
                    reason: format!("{:?} is not a boolean", value),
                }),
            })
            .transpose()
    }
}
