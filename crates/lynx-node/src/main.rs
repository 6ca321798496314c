use anyhow::{Context, Result};
use lynx_node::{NodeConfig, NodeRuntime};
use lynx_telemetry::{init_telemetry, TelemetryConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    let _telemetry = init_telemetry(TelemetryConfig::from_env())
        .await
        .context("Failed to initialize telemetry")?;

    info!("===========================================");
    info!("  LYNX Node v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        network = %config.network,
        topic = ?config.topic_id.map(|id| id.to_string()),
        http = %config.gateway.http_addr(),
        "Configuration loaded"
    );

    let runtime = NodeRuntime::new(config).context("Failed to start node")?;

    info!("Node is running. Press Ctrl+C to stop.");
    runtime.run(shutdown_signal()).await.context("Gateway failed")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        return;
    }
    info!("Initiating graceful shutdown...");
}
