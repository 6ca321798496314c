//! Inbound Ports (Driving Ports / API)

use async_trait::async_trait;

use crate::domain::entities::{CorrelationOutcome, OutboundMessage, Submission};
use crate::domain::errors::HistoryError;
use crate::domain::value_objects::TopicId;

/// Primary rebalance history API
#[async_trait]
pub trait RebalanceHistoryApi: Send + Sync {
    /// Read the whole topic and correlate it.
    ///
    /// A reader failure fails the call; there is no partial result.
    async fn history(&self, topic: &TopicId) -> Result<CorrelationOutcome, HistoryError>;

    /// Validate and submit one message.
    ///
    /// Requests without a `requestId` get a generated one. Missing
    /// `timestamp` fields are filled with the current time.
    async fn submit(
        &self,
        topic: &TopicId,
        message: OutboundMessage,
    ) -> Result<Submission, HistoryError>;
}
