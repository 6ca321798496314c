//! Telemetry configuration from environment variables.

/// Configuration for logging, tracing and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for traces and logs
    pub service_name: String,

    /// Level (trace, debug, info, warn, error) or a full `EnvFilter` directive
    pub log_level: String,

    pub json_logs: bool,

    /// Export spans over OTLP
    pub otlp_enabled: bool,

    pub otlp_endpoint: String,

    /// Network name, reported as the deployment environment
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "lynx-ledger".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            otlp_enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            network: "testnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read `OTEL_SERVICE_NAME`, `LYNX_LOG_LEVEL` (then `RUST_LOG`),
    /// `LYNX_JSON_LOGS`, `LYNX_OTLP_ENABLED`, `OTEL_EXPORTER_OTLP_ENDPOINT`
    /// and `LYNX_NETWORK`.
    ///
    /// JSON logs default on inside Docker or Kubernetes.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let in_container = lookup("KUBERNETES_SERVICE_HOST").is_some()
            || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: lookup("LYNX_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("LYNX_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(in_container),
            otlp_enabled: lookup("LYNX_OTLP_ENABLED")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT")
                .unwrap_or(defaults.otlp_endpoint),
            network: lookup("LYNX_NETWORK")
                .map(|n| n.to_lowercase())
                .unwrap_or(defaults.network),
        }
    }

    /// Service name qualified with the network, e.g. `lynx-ledger-testnet`.
    pub fn full_service_name(&self) -> String {
        if self.network.is_empty() {
            self.service_name.clone()
        } else {
            format!("{}-{}", self.service_name, self.network)
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
