//! Ports module for message correlation
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::RebalanceHistoryApi;
pub use outbound::{SystemTimeSource, TimeSource, TopicReader, TopicWriter};
