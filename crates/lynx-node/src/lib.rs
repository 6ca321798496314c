//! # LYNX Node
//!
//! Runs the rebalance history gateway.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `LYNX_*` environment variables
//! 2. Initialize logging, tracing and metrics
//! 3. Build the topic reader (and writer on `local`) for the network
//! 4. Serve HTTP until Ctrl+C, then drain in-flight requests

pub mod config;
pub mod runtime;

pub use config::{ConfigError, NodeConfig, OperatorCredentials};
pub use runtime::{build_history_api, NodeError, NodeRuntime};
