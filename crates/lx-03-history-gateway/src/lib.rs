//! # History Gateway
//!
//! HTTP surface over the rebalance history service.
//!
//! ## Routes
//!
//! | Method | Path                  | Description                              |
//! |--------|-----------------------|------------------------------------------|
//! | GET    | `/rebalance/history`  | Correlated history plus raw messages     |
//! | POST   | `/rebalance/messages` | Submit a rebalance message to the topic  |
//! | GET    | `/health`             | Liveness probe                           |
//! | GET    | `/metrics`            | Prometheus exposition                    |
//!
//! Failures answer with `{"error": ..., "details": ...}`.

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::{ConfigError, CorsConfig, ErrorBody, GatewayConfig, GatewayError};
pub use router::{build_router, AppState};
pub use service::{GatewayServeError, HistoryGateway};
