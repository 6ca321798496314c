//! Gateway domain: configuration, errors and response shapes.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigError, CorsConfig, GatewayConfig};
pub use error::{ErrorBody, GatewayError};
pub use types::{HealthResponse, HistoryResponse};
