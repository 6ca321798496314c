//! # LYNX Telemetry
//!
//! Observability for LYNX ledger services.
//!
//! ## Components
//!
//! - Structured logs via `tracing-subscriber` (pretty or JSON)
//! - Optional span export over OTLP via OpenTelemetry
//! - Prometheus metrics, rendered by the gateway's `/metrics` route
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lynx_telemetry::{init_telemetry, TelemetryConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).await.expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LYNX_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `LYNX_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `LYNX_OTLP_ENABLED` | `false` | Export spans over OTLP |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | `http://localhost:4317` | OTLP endpoint |
//! | `OTEL_SERVICE_NAME` | `lynx-ledger` | Service name in traces |

#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, MetricsHandle, DUPLICATE_REQUESTS,
    HTTP_REQUESTS, HTTP_REQUEST_DURATION, MESSAGES_DECODED, MESSAGES_DROPPED, ORPHANED_GROUPS,
    TOPIC_READ_DURATION, TOPIC_READ_FAILURES, TOPIC_SUBMISSIONS, TRANSACTIONS_CORRELATED,
};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("tracing setup failed: {0}")]
    TracerInit(String),

    #[error("metric registration failed: {0}")]
    MetricsInit(String),

    #[error("invalid telemetry configuration: {0}")]
    Config(String),
}

/// Register metrics and install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes buffered spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let tracing = tracing_setup::init_tracing(&config).await?;
    Ok(TelemetryGuard {
        _tracing: tracing,
        _metrics: metrics,
    })
}

/// Holds the tracer provider and metric registration.
pub struct TelemetryGuard {
    _tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Telemetry shut down");
    }
}
