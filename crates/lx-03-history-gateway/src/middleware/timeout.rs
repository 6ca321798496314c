//! Request deadline.
//!
//! Handlers that overrun the configured deadline are cancelled and answered
//! with a `GatewayError::Timeout` body instead of an empty response.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::time::timeout;
use tracing::warn;

use crate::domain::error::GatewayError;

/// Run the rest of the stack under `deadline`.
pub async fn enforce_deadline(
    State(deadline): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, timeout_ms = deadline.as_millis() as u64, "Request deadline exceeded");
            GatewayError::Timeout(deadline).into_response()
        }
    }
}
