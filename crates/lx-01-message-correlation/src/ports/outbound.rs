//! Outbound Ports (Driven Ports / SPI)

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{RawMessage, SubmissionReceipt};
use crate::domain::errors::TopicError;
use crate::domain::value_objects::TopicId;

/// Read access to a ledger topic.
#[async_trait]
pub trait TopicReader: Send + Sync {
    /// Fetch every message currently on the topic.
    ///
    /// Ordering of the returned messages is not guaranteed.
    async fn read_topic(&self, topic: &TopicId) -> Result<Vec<RawMessage>, TopicError>;
}

/// Write access to a ledger topic.
#[async_trait]
pub trait TopicWriter: Send + Sync {
    /// Submit one JSON message.
    async fn submit(
        &self,
        topic: &TopicId,
        message: serde_json::Value,
    ) -> Result<SubmissionReceipt, TopicError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
