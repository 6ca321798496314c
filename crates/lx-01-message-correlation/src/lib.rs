//! # LX-01: Message Correlation Subsystem
//!
//! Turns the append-only message feed of a ledger topic into correlated
//! rebalance transactions: one request plus every recommendation and
//! execution that shares its `requestId`, newest request first.
//!
//! ## Architecture
//!
//! - **Domain**: RawMessage, DecodedMessage, RebalanceTransaction, ledger identifiers
//! - **Algorithms**: decode, group, filter, sort
//! - **Ports**: Inbound (RebalanceHistoryApi) and Outbound (TopicReader, TopicWriter, TimeSource)
//! - **Adapters**: In-memory topic for local runs and tests
//! - **Application**: Service orchestration and metrics

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryTopic;
pub use algorithms::{correlate, MessageCorrelator};
pub use application::service::RebalanceHistoryService;
pub use config::CorrelationConfig;
pub use domain::entities::*;
pub use domain::errors::{EntityIdError, HistoryError, TimestampError, TopicError};
pub use domain::value_objects::*;
pub use ports::inbound::RebalanceHistoryApi;
pub use ports::outbound::{SystemTimeSource, TimeSource, TopicReader, TopicWriter};
