//! Routes and handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use lx_01_message_correlation::{OutboundMessage, RebalanceHistoryApi, Submission, TopicId};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::domain::types::{HealthResponse, HistoryResponse};
use crate::middleware::{create_cors_layer, enforce_deadline, track_metrics};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn RebalanceHistoryApi>,
    /// `None` when no rebalance topic was configured
    pub topic_id: Option<TopicId>,
}

impl AppState {
    pub fn new(api: Arc<dyn RebalanceHistoryApi>, topic_id: Option<TopicId>) -> Self {
        Self { api, topic_id }
    }

    fn topic(&self) -> Result<TopicId, GatewayError> {
        self.topic_id.ok_or(GatewayError::TopicNotConfigured)
    }
}

/// Build the HTTP router with its middleware stack.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&config.cors));

    Router::new()
        .route("/rebalance/history", get(get_history))
        .route("/rebalance/messages", post(submit_message))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route_layer(middleware::from_fn_with_state(
            config.request_timeout,
            enforce_deadline,
        ))
        .route_layer(middleware::from_fn(track_metrics))
        .layer(stack)
        .with_state(state)
}

/// `GET /rebalance/history`
async fn get_history(State(state): State<AppState>) -> Result<Json<HistoryResponse>, GatewayError> {
    let topic = state.topic()?;
    let outcome = state
        .api
        .history(&topic)
        .await
        .map_err(GatewayError::History)?;

    Ok(Json(HistoryResponse::new(topic, outcome)))
}

/// `POST /rebalance/messages`
async fn submit_message(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Submission>), GatewayError> {
    let topic = state.topic()?;
    let Json(value) = body.map_err(|rejection| GatewayError::InvalidBody(rejection.body_text()))?;
    let message = OutboundMessage::try_from(value).map_err(GatewayError::InvalidBody)?;

    let submission = state
        .api
        .submit(&topic, message)
        .await
        .map_err(GatewayError::Submit)?;

    debug!(request_id = %submission.request_id, "Accepted rebalance message");
    Ok((StatusCode::ACCEPTED, Json(submission)))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Prometheus text exposition
async fn metrics() -> Result<impl IntoResponse, GatewayError> {
    let body = lynx_telemetry::encode_metrics().map_err(|e| GatewayError::Metrics(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
