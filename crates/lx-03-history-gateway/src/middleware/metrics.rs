//! Prometheus request metrics.

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use lynx_telemetry::{HTTP_REQUESTS, HTTP_REQUEST_DURATION};
use std::time::Instant;

/// Count requests and observe latency, labelled by route template.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;

    HTTP_REQUEST_DURATION
        .with_label_values(&[route.as_str()])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS
        .with_label_values(&[route.as_str(), response.status().as_str()])
        .inc();

    response
}
