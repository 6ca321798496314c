//! Gateway error types and their HTTP rendering.
//!
//! Every failure renders as `{ "error": ..., "details": ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lx_01_message_correlation::HistoryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Error body returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

/// Failures surfaced by gateway handlers
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No rebalance topic was configured at startup
    #[error("topic ID not configured")]
    TopicNotConfigured,

    /// Reading or correlating the topic failed
    #[error("failed to fetch rebalance history: {0}")]
    History(#[source] HistoryError),

    /// Submitting a message failed
    #[error("failed to submit rebalance message: {0}")]
    Submit(#[source] HistoryError),

    /// Request body was not a JSON object
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Metrics could not be rendered
    #[error("failed to encode metrics: {0}")]
    Metrics(String),

    /// Handler overran the request deadline
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::TopicNotConfigured
            | GatewayError::History(_)
            | GatewayError::Metrics(_)
            | GatewayError::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            GatewayError::Submit(HistoryError::InvalidMessage(_)) => StatusCode::BAD_REQUEST,
            GatewayError::Submit(HistoryError::WriterUnavailable) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Submit(HistoryError::Topic(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (error, details) = match self {
            GatewayError::TopicNotConfigured => (
                "topic ID not configured",
                "set LYNX_REBALANCE_TOPIC_ID to the rebalance topic".to_string(),
            ),
            GatewayError::History(e) => ("failed to fetch rebalance history", e.to_string()),
            GatewayError::Submit(HistoryError::InvalidMessage(msg)) => {
                ("invalid rebalance message", msg.clone())
            }
            GatewayError::Submit(e @ HistoryError::WriterUnavailable) => {
                ("submissions disabled", e.to_string())
            }
            GatewayError::Submit(e) => ("failed to submit rebalance message", e.to_string()),
            GatewayError::InvalidBody(msg) => ("invalid request body", msg.clone()),
            GatewayError::Metrics(msg) => ("failed to encode metrics", msg.clone()),
            GatewayError::Timeout(deadline) => (
                "request timed out",
                format!("no response within {:?}", deadline),
            ),
        };
        ErrorBody {
            error: error.to_string(),
            details,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
