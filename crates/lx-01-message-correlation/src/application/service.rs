//! Rebalance History Service
//!
//! Main service implementing RebalanceHistoryApi.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::algorithms::MessageCorrelator;
use crate::domain::entities::{
    fields, CorrelationDiagnostics, CorrelationOutcome, OutboundMessage, Submission,
};
use crate::domain::errors::HistoryError;
use crate::domain::value_objects::{MessageKind, TopicId};
use crate::ports::inbound::RebalanceHistoryApi;
use crate::ports::outbound::{SystemTimeSource, TimeSource, TopicReader, TopicWriter};

/// Rebalance History Service
///
/// Orchestrates the read path:
/// 1. Fetch the topic snapshot
/// 2. Correlate
/// 3. Record metrics
///
/// and the write path: validate, complete, forward to the writer.
pub struct RebalanceHistoryService {
    reader: Arc<dyn TopicReader>,
    writer: Option<Arc<dyn TopicWriter>>,
    correlator: MessageCorrelator,
    clock: Arc<dyn TimeSource>,
}

impl RebalanceHistoryService {
    /// Create a read-only service
    pub fn new(reader: Arc<dyn TopicReader>, correlator: MessageCorrelator) -> Self {
        Self {
            reader,
            writer: None,
            correlator,
            clock: Arc::new(SystemTimeSource),
        }
    }

    /// Enable submissions through the given writer
    pub fn with_writer(mut self, writer: Arc<dyn TopicWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Replace the clock used to fill missing timestamps
    pub fn with_clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    pub fn has_writer(&self) -> bool {
        self.writer.is_some()
    }

    /// Check and complete an outbound message.
    fn prepare(
        &self,
        mut message: OutboundMessage,
    ) -> Result<(MessageKind, String, OutboundMessage), HistoryError> {
        let kind = match message.kind() {
            Some(kind) if kind.is_rebalance() => kind,
            Some(other) => {
                return Err(HistoryError::InvalidMessage(format!(
                    "unsupported message type: {}",
                    other
                )))
            }
            None => {
                return Err(HistoryError::InvalidMessage(
                    "missing string field `type`".to_string(),
                ))
            }
        };

        let request_id = match (message.request_id().map(str::to_string), &kind) {
            (Some(id), _) => id,
            (None, MessageKind::RebalanceRequest) => {
                let id = Uuid::now_v7().to_string();
                message.set(fields::REQUEST_ID, id.clone());
                id
            }
            (None, kind) => {
                return Err(HistoryError::InvalidMessage(format!(
                    "{} requires a non-empty `requestId`",
                    kind
                )))
            }
        };

        if !message.has_timestamp() {
            let now = self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true);
            message.set(fields::TIMESTAMP, now);
        }

        Ok((kind, request_id, message))
    }
}

fn record_correlation(diagnostics: &CorrelationDiagnostics, transactions: usize) {
    use lynx_telemetry::metrics::{
        DUPLICATE_REQUESTS, MESSAGES_DECODED, MESSAGES_DROPPED, ORPHANED_GROUPS,
        TRANSACTIONS_CORRELATED,
    };

    MESSAGES_DECODED.inc_by(diagnostics.decoded as f64);
    for (reason, count) in [
        ("undecodable", diagnostics.undecodable),
        ("replayed", diagnostics.replayed),
        ("no_request_id", diagnostics.without_request_id),
        ("unrecognized_kind", diagnostics.unrecognized_kind),
    ] {
        if count > 0 {
            MESSAGES_DROPPED
                .with_label_values(&[reason])
                .inc_by(count as f64);
        }
    }
    TRANSACTIONS_CORRELATED.inc_by(transactions as f64);
    ORPHANED_GROUPS.inc_by(diagnostics.orphans.len() as f64);
    DUPLICATE_REQUESTS.inc_by(diagnostics.duplicate_requests.len() as f64);
}

#[async_trait]
impl RebalanceHistoryApi for RebalanceHistoryService {
    async fn history(&self, topic: &TopicId) -> Result<CorrelationOutcome, HistoryError> {
        let raw = {
            let _timer = lynx_telemetry::time_histogram!(lynx_telemetry::TOPIC_READ_DURATION);
            self.reader.read_topic(topic).await
        };

        let raw = raw.map_err(|e| {
            lynx_telemetry::TOPIC_READ_FAILURES
                .with_label_values(&[e.kind()])
                .inc();
            warn!(topic = %topic, error = %e, "Failed to read rebalance topic");
            e
        })?;

        debug!(topic = %topic, messages = raw.len(), "Read rebalance topic");

        let outcome = self.correlator.correlate(&raw);
        record_correlation(&outcome.diagnostics, outcome.history.len());

        info!(
            topic = %topic,
            transactions = outcome.history.len(),
            raw_messages = outcome.raw_messages.len(),
            orphans = outcome.diagnostics.orphans.len(),
            "Rebalance history assembled"
        );

        Ok(outcome)
    }

    async fn submit(
        &self,
        topic: &TopicId,
        message: OutboundMessage,
    ) -> Result<Submission, HistoryError> {
        let writer = self.writer.as_ref().ok_or(HistoryError::WriterUnavailable)?;
        let (kind, request_id, message) = self.prepare(message)?;

        match writer.submit(topic, message.into_value()).await {
            Ok(receipt) => {
                lynx_telemetry::TOPIC_SUBMISSIONS
                    .with_label_values(&["accepted"])
                    .inc();
                info!(
                    topic = %topic,
                    request_id = %request_id,
                    kind = %kind,
                    sequence_number = ?receipt.sequence_number,
                    "Submitted rebalance message"
                );
                Ok(Submission {
                    request_id,
                    kind,
                    receipt,
                })
            }
            Err(e) => {
                lynx_telemetry::TOPIC_SUBMISSIONS
                    .with_label_values(&["rejected"])
                    .inc();
                warn!(topic = %topic, request_id = %request_id, error = %e, "Submission failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryTopic;
    use crate::config::CorrelationConfig;
    use crate::domain::entities::RawMessage;
    use crate::domain::errors::TopicError;
    use crate::domain::value_objects::ConsensusTimestamp;
    use crate::ports::outbound::mocks::{
        FailingReader, FixedTimeSource, RecordingWriter, StaticReader,
    };
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};

    fn topic() -> TopicId {
        TopicId::new(0, 0, 5005)
    }

    fn raw(value: Value, seq: u64) -> RawMessage {
        RawMessage::new(
            value.to_string().into_bytes(),
            ConsensusTimestamp::new(1_709_251_200 + seq as i64, 0).unwrap(),
            seq,
        )
    }

    fn outbound(value: Value) -> OutboundMessage {
        OutboundMessage::try_from(value).unwrap()
    }

    fn service_with_writer(writer: Arc<RecordingWriter>) -> RebalanceHistoryService {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        RebalanceHistoryService::new(
            Arc::new(StaticReader(vec![])),
            MessageCorrelator::default(),
        )
        .with_writer(writer)
        .with_clock(Arc::new(FixedTimeSource(instant)))
    }

    #[tokio::test]
    async fn test_history_correlates_snapshot() {
        let reader = StaticReader(vec![
            raw(json!({ "type": "REBALANCE_REQUEST", "requestId": "r1", "timestamp": "2024-01-01" }), 1),
            raw(json!({ "type": "REBALANCE_EXECUTION", "requestId": "r1" }), 2),
            raw(json!({ "type": "REBALANCE_EXECUTION", "requestId": "orphan" }), 3),
        ]);
        let service = RebalanceHistoryService::new(Arc::new(reader), MessageCorrelator::default());

        let outcome = service.history(&topic()).await.unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.history[0].executions.len(), 1);
        assert_eq!(outcome.raw_messages.len(), 3);
        assert_eq!(outcome.diagnostics.orphans.len(), 1);
    }

    #[tokio::test]
    async fn test_history_propagates_reader_failure() {
        let service = RebalanceHistoryService::new(
            Arc::new(FailingReader(TopicError::Unauthorized("bad key".into()))),
            MessageCorrelator::new(CorrelationConfig::default()),
        );

        let err = service.history(&topic()).await.unwrap_err();
        assert!(matches!(
            err,
            HistoryError::Topic(TopicError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_without_writer_unavailable() {
        let service = RebalanceHistoryService::new(
            Arc::new(StaticReader(vec![])),
            MessageCorrelator::default(),
        );
        assert!(!service.has_writer());

        let err = service
            .submit(&topic(), outbound(json!({ "type": "REBALANCE_REQUEST" })))
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::WriterUnavailable));
    }

    #[tokio::test]
    async fn test_submit_request_generates_id_and_timestamp() {
        let writer = Arc::new(RecordingWriter::default());
        let service = service_with_writer(writer.clone());

        let submission = service
            .submit(&topic(), outbound(json!({ "type": "REBALANCE_REQUEST", "ratio": 0.5 })))
            .await
            .unwrap();

        assert_eq!(submission.kind, MessageKind::RebalanceRequest);
        assert!(Uuid::parse_str(&submission.request_id).is_ok());
        assert_eq!(submission.receipt.sequence_number, Some(1));

        let sent = writer.submitted.lock();
        assert_eq!(sent[0]["requestId"], submission.request_id.as_str());
        assert_eq!(sent[0]["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(sent[0]["ratio"], 0.5);
    }

    #[tokio::test]
    async fn test_submit_keeps_producer_fields() {
        let writer = Arc::new(RecordingWriter::default());
        let service = service_with_writer(writer.clone());

        let submission = service
            .submit(
                &topic(),
                outbound(json!({
                    "type": "REBALANCE_EXECUTION",
                    "requestId": "r9",
                    "timestamp": "2024-01-01T00:00:00Z"
                })),
            )
            .await
            .unwrap();

        assert_eq!(submission.request_id, "r9");
        assert_eq!(writer.submitted.lock()[0]["timestamp"], "2024-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_messages() {
        let writer = Arc::new(RecordingWriter::default());
        let service = service_with_writer(writer.clone());

        for bad in [
            json!({ "requestId": "r1" }),
            json!({ "type": "GOVERNANCE_VOTE", "requestId": "r1" }),
            json!({ "type": "REBALANCE_RECOMMENDATION" }),
            json!({ "type": "REBALANCE_EXECUTION", "requestId": "" }),
        ] {
            let err = service.submit(&topic(), outbound(bad)).await.unwrap_err();
            assert!(matches!(err, HistoryError::InvalidMessage(_)));
        }
        assert!(writer.submitted.lock().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_through_in_memory_topic() {
        let store = Arc::new(InMemoryTopic::default());
        store.create_topic(topic());
        let service = RebalanceHistoryService::new(store.clone(), MessageCorrelator::default())
            .with_writer(store.clone());

        let request = service
            .submit(&topic(), outbound(json!({ "type": "REBALANCE_REQUEST" })))
            .await
            .unwrap();
        service
            .submit(
                &topic(),
                outbound(json!({
                    "type": "REBALANCE_RECOMMENDATION",
                    "requestId": request.request_id.clone()
                })),
            )
            .await
            .unwrap();

        let outcome = service.history(&topic()).await.unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.history[0].request_id, request.request_id);
        assert_eq!(outcome.history[0].recommendations.len(), 1);
    }
}
