//! Response shapes.

use lx_01_message_correlation::{
    CorrelationDiagnostics, CorrelationOutcome, DecodedMessage, RebalanceTransaction, TopicId,
};
use serde::{Deserialize, Serialize};

/// `GET /rebalance/history`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub history: Vec<RebalanceTransaction>,
    pub raw_messages: Vec<DecodedMessage>,
    pub topic_id: TopicId,
    pub diagnostics: CorrelationDiagnostics,
}

impl HistoryResponse {
    pub fn new(topic_id: TopicId, outcome: CorrelationOutcome) -> Self {
        Self {
            history: outcome.history,
            raw_messages: outcome.raw_messages,
            topic_id,
            diagnostics: outcome.diagnostics,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
