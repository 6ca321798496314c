//! Middleware stack: CORS, request metrics and the request deadline.
//! Tracing comes straight from tower-http.

pub mod cors;
pub mod metrics;
pub mod timeout;

pub use cors::create_cors_layer;
pub use metrics::track_metrics;
pub use timeout::enforce_deadline;
