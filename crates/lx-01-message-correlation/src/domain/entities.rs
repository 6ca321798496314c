//! Domain entities for message correlation
//!
//! `RawMessage` is the ledger's unit. `DecodedMessage` is its JSON view.
//! `RebalanceTransaction` is the read-time projection built by correlation;
//! it is never persisted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::value_objects::{ConsensusTimestamp, MessageKind, TopicId};

/// Field names shared by producers and the correlation engine.
pub mod fields {
    pub const TYPE: &str = "type";
    pub const REQUEST_ID: &str = "requestId";
    pub const TIMESTAMP: &str = "timestamp";
    pub const CONSENSUS_TIMESTAMP: &str = "consensusTimestamp";
    pub const SEQUENCE_NUMBER: &str = "sequenceNumber";
}

/// Opaque message as recorded on a ledger topic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawMessage {
    /// Producer bytes, expected to be UTF-8 JSON
    pub payload: Vec<u8>,
    /// Assigned by the ledger when consensus on order is reached
    pub consensus_timestamp: ConsensusTimestamp,
    /// Monotonic within a topic, assigned by the ledger
    pub sequence_number: u64,
}

impl RawMessage {
    pub fn new(
        payload: impl Into<Vec<u8>>,
        consensus_timestamp: ConsensusTimestamp,
        sequence_number: u64,
    ) -> Self {
        Self {
            payload: payload.into(),
            consensus_timestamp,
            sequence_number,
        }
    }

    /// Ledger order key: consensus time, then sequence number.
    pub fn ledger_position(&self) -> (ConsensusTimestamp, u64) {
        (self.consensus_timestamp, self.sequence_number)
    }
}

/// A payload decoded as a JSON object, annotated with its ledger position.
///
/// Serialises as the producer's fields plus `consensusTimestamp` and
/// `sequenceNumber`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedMessage {
    #[serde(flatten)]
    pub body: Map<String, Value>,
    pub consensus_timestamp: ConsensusTimestamp,
    pub sequence_number: u64,
}

impl DecodedMessage {
    /// Wrap a decoded object. Producer copies of the ledger fields are
    /// discarded; the ledger values are authoritative.
    pub fn new(
        mut body: Map<String, Value>,
        consensus_timestamp: ConsensusTimestamp,
        sequence_number: u64,
    ) -> Self {
        body.remove(fields::CONSENSUS_TIMESTAMP);
        body.remove(fields::SEQUENCE_NUMBER);
        Self {
            body,
            consensus_timestamp,
            sequence_number,
        }
    }

    /// The `type` discriminator, if present as a string.
    pub fn kind(&self) -> Option<MessageKind> {
        self.body
            .get(fields::TYPE)
            .and_then(Value::as_str)
            .map(MessageKind::parse)
    }

    /// The correlation key, if present as a non-empty string.
    pub fn request_id(&self) -> Option<&str> {
        self.body
            .get(fields::REQUEST_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Producer-supplied business time. Untrusted.
    pub fn timestamp(&self) -> Option<&str> {
        self.body.get(fields::TIMESTAMP).and_then(Value::as_str)
    }

    pub fn ledger_position(&self) -> (ConsensusTimestamp, u64) {
        (self.consensus_timestamp, self.sequence_number)
    }
}

/// One request with every recommendation and execution sharing its id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebalanceTransaction {
    pub request_id: String,
    pub request: DecodedMessage,
    pub recommendations: Vec<DecodedMessage>,
    pub executions: Vec<DecodedMessage>,
}

/// A request dropped because an earlier one already claimed its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateRequest {
    pub request_id: String,
    pub sequence_number: u64,
    pub consensus_timestamp: ConsensusTimestamp,
}

/// Recommendations/executions whose request never appeared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedGroup {
    pub request_id: String,
    pub recommendations: usize,
    pub executions: usize,
}

/// Data-quality counters gathered during one correlation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationDiagnostics {
    /// Raw messages handed to the engine
    pub received: usize,
    /// Messages decoded as JSON objects
    pub decoded: usize,
    /// Invalid UTF-8, invalid JSON or non-object JSON
    pub undecodable: usize,
    /// Messages repeating an already seen sequence number
    pub replayed: usize,
    /// Decoded messages without a usable `requestId`
    pub without_request_id: usize,
    /// Decoded messages with a `requestId` but a non-rebalance `type`
    pub unrecognized_kind: usize,
    /// Requests whose business time was clamped to consensus time
    pub clamped_timestamps: usize,
    pub duplicate_requests: Vec<DuplicateRequest>,
    pub orphans: Vec<OrphanedGroup>,
}

/// Everything produced by one correlation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationOutcome {
    /// Complete transactions, newest first
    pub history: Vec<RebalanceTransaction>,
    /// Every decoded message in ledger order
    pub raw_messages: Vec<DecodedMessage>,
    pub diagnostics: CorrelationDiagnostics,
}

/// Message handed to the service for submission.
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    body: Map<String, Value>,
}

impl OutboundMessage {
    pub fn from_object(body: Map<String, Value>) -> Self {
        Self { body }
    }

    pub fn kind(&self) -> Option<MessageKind> {
        self.body
            .get(fields::TYPE)
            .and_then(Value::as_str)
            .map(MessageKind::parse)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.body
            .get(fields::REQUEST_ID)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn has_timestamp(&self) -> bool {
        self.body
            .get(fields::TIMESTAMP)
            .and_then(Value::as_str)
            .is_some()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.body.insert(key.to_string(), value.into());
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }
}

impl TryFrom<Value> for OutboundMessage {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(body) => Ok(Self { body }),
            other => Err(format!("expected a JSON object, got {}", json_type(&other))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Acknowledgment from a topic writer.
///
/// Not a guarantee of final position; ledgers may assign it later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub topic_id: TopicId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus_timestamp: Option<ConsensusTimestamp>,
}

/// A validated submission and the writer's acknowledgment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub request_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub receipt: SubmissionReceipt,
}
