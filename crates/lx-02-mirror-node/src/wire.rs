//! Mirror-node REST response shapes
//!
//! Only the fields the reader needs; unknown fields are ignored.

use serde::Deserialize;

/// `GET /api/v1/topics/{id}/messages`
#[derive(Debug, Deserialize)]
pub struct MessagesPage {
    #[serde(default)]
    pub messages: Vec<TopicMessage>,
    #[serde(default)]
    pub links: Links,
}

#[derive(Debug, Default, Deserialize)]
pub struct Links {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicMessage {
    /// `"<seconds>.<nanos>"`
    pub consensus_timestamp: String,
    /// Base64 payload
    pub message: String,
    pub sequence_number: u64,
    pub chunk_info: Option<ChunkInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkInfo {
    pub initial_transaction_id: TransactionId,
    pub number: u32,
    pub total: u32,
}

/// Identifies the transaction that opened a chunked message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct TransactionId {
    pub account_id: String,
    pub transaction_valid_start: String,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub scheduled: bool,
}

/// Mirror-node error body, `{"_status":{"messages":[{"message":"..."}]}}`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "_status")]
    pub status: ErrorStatus,
}

#[derive(Debug, Deserialize)]
pub struct ErrorStatus {
    #[serde(default)]
    pub messages: Vec<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

impl ErrorBody {
    /// First message, if any.
    pub fn summary(&self) -> Option<&str> {
        self.status.messages.first().map(|m| m.message.as_str())
    }
}
