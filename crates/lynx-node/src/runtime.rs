//! Wires readers, writers, the history service and the gateway together.

use std::future::Future;
use std::sync::Arc;

use lx_01_message_correlation::{
    InMemoryTopic, MessageCorrelator, Network, RebalanceHistoryApi, RebalanceHistoryService,
};
use lx_02_mirror_node::{MirrorConfigError, MirrorNodeClient};
use lx_03_history_gateway::{AppState, GatewayServeError, HistoryGateway};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, NodeConfig};

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create mirror-node client: {0}")]
    Mirror(#[from] MirrorConfigError),

    #[error(transparent)]
    Gateway(#[from] GatewayServeError),
}

/// Build the history service for the configured network.
///
/// `Local` shares one in-process topic as reader and writer. Ledger networks
/// read through the mirror node and have no writer.
pub fn build_history_api(config: &NodeConfig) -> Result<Arc<dyn RebalanceHistoryApi>, NodeError> {
    let correlator = MessageCorrelator::new(config.correlation.clone());

    let service = match config.network {
        Network::Local => {
            let topic = Arc::new(InMemoryTopic::default());
            if let Some(id) = config.topic_id {
                topic.create_topic(id);
            }
            info!(topic = ?config.topic_id.map(|id| id.to_string()), "Using in-process topic");
            RebalanceHistoryService::new(topic.clone(), correlator).with_writer(topic)
        }
        network => {
            let client = MirrorNodeClient::new(network, &config.mirror)?;
            if config.operator.is_some() {
                warn!(
                    network = %network,
                    "Operator credentials set but ledger submission is not supported; submissions disabled"
                );
            }
            RebalanceHistoryService::new(Arc::new(client), correlator)
        }
    };

    Ok(Arc::new(service))
}

/// A configured node ready to serve.
pub struct NodeRuntime {
    gateway: HistoryGateway,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        if config.topic_id.is_none() {
            warn!("LYNX_REBALANCE_TOPIC_ID is not set; history requests will fail");
        }

        let api = build_history_api(&config)?;
        let state = AppState::new(api, config.topic_id);
        let gateway = HistoryGateway::new(config.gateway, state).map_err(ConfigError::from)?;

        Ok(Self { gateway })
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), NodeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.gateway.serve(shutdown).await?;
        Ok(())
    }
}
