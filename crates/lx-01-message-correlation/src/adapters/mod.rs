//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits without leaving the process.

mod in_memory_topic;

pub use in_memory_topic::InMemoryTopic;
