//! HTTP server lifecycle.

use std::future::Future;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;

use crate::domain::config::{ConfigError, GatewayConfig};
use crate::router::{build_router, AppState};

/// Errors from running the gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// History gateway: validated config plus shared handler state.
pub struct HistoryGateway {
    config: GatewayConfig,
    state: AppState,
}

impl HistoryGateway {
    pub fn new(config: GatewayConfig, state: AppState) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayServeError::Bind { addr, source })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr().map_err(GatewayServeError::Serve)?;
        info!(
            addr = %local,
            topic = ?self.state.topic_id.as_ref().map(ToString::to_string),
            "Starting history gateway"
        );

        let router = build_router(self.state, &self.config);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(GatewayServeError::Serve)?;

        info!("History gateway stopped");
        Ok(())
    }
}
