//! In-process topic adapter
//!
//! Implements `TopicReader` and `TopicWriter` over a shared in-memory log.
//! Backs the `local` network and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::domain::entities::{RawMessage, SubmissionReceipt};
use crate::domain::errors::TopicError;
use crate::domain::value_objects::{ConsensusTimestamp, TopicId};
use crate::ports::outbound::{SystemTimeSource, TimeSource, TopicReader, TopicWriter};

#[derive(Default)]
struct TopicLog {
    messages: Vec<RawMessage>,
}

impl TopicLog {
    /// Next ledger position: sequence numbers start at 1, consensus times
    /// never go backwards even if the clock does.
    fn next_position(&self, now: ConsensusTimestamp) -> (ConsensusTimestamp, u64) {
        match self.messages.last() {
            Some(last) => (now.max(last.consensus_timestamp.next()), last.sequence_number + 1),
            None => (now, 1),
        }
    }
}

/// Append-only topics held in memory.
pub struct InMemoryTopic {
    topics: RwLock<HashMap<TopicId, TopicLog>>,
    clock: Arc<dyn TimeSource>,
}

impl InMemoryTopic {
    pub fn new(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Create a topic. Existing topics are left untouched.
    pub fn create_topic(&self, topic: TopicId) {
        self.topics.write().entry(topic).or_default();
    }

    /// Append arbitrary bytes, bypassing JSON encoding.
    pub fn append_raw(
        &self,
        topic: &TopicId,
        payload: impl Into<Vec<u8>>,
    ) -> Result<SubmissionReceipt, TopicError> {
        let now = ConsensusTimestamp::from_datetime(self.clock.now());
        let mut topics = self.topics.write();
        let log = topics
            .get_mut(topic)
            .ok_or_else(|| TopicError::NotFound(topic.to_string()))?;

        let (consensus_timestamp, sequence_number) = log.next_position(now);
        log.messages
            .push(RawMessage::new(payload, consensus_timestamp, sequence_number));

        debug!(
            topic = %topic,
            sequence_number,
            consensus_timestamp = %consensus_timestamp,
            "Appended message to in-memory topic"
        );

        Ok(SubmissionReceipt {
            topic_id: *topic,
            sequence_number: Some(sequence_number),
            consensus_timestamp: Some(consensus_timestamp),
        })
    }

    /// Number of messages on a topic, zero if it does not exist.
    pub fn message_count(&self, topic: &TopicId) -> usize {
        self.topics
            .read()
            .get(topic)
            .map_or(0, |log| log.messages.len())
    }
}

impl Default for InMemoryTopic {
    fn default() -> Self {
        Self::new(Arc::new(SystemTimeSource))
    }
}

#[async_trait]
impl TopicReader for InMemoryTopic {
    async fn read_topic(&self, topic: &TopicId) -> Result<Vec<RawMessage>, TopicError> {
        self.topics
            .read()
            .get(topic)
            .map(|log| log.messages.clone())
            .ok_or_else(|| TopicError::NotFound(topic.to_string()))
    }
}

#[async_trait]
impl TopicWriter for InMemoryTopic {
    async fn submit(
        &self,
        topic: &TopicId,
        message: serde_json::Value,
    ) -> Result<SubmissionReceipt, TopicError> {
        let payload = serde_json::to_vec(&message)
            .map_err(|e| TopicError::Rejected(format!("unserialisable message: {}", e)))?;
        self.append_raw(topic, payload)
    }
}
