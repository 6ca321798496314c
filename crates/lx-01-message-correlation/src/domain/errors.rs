//! Error types for message correlation

use thiserror::Error;

/// Malformed `shard.realm.num` identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityIdError {
    #[error("entity id is empty")]
    Empty,

    #[error("expected 3 components (shard.realm.num), got {0}")]
    WrongComponentCount(usize),

    #[error("invalid entity id component: {0:?}")]
    InvalidComponent(String),

    #[error("invalid entity id checksum: {0:?}")]
    InvalidChecksum(String),
}

/// Malformed consensus timestamp
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("malformed consensus timestamp: {0:?}")]
    Malformed(String),

    #[error("nanoseconds out of range: {0}")]
    NanosOutOfRange(u32),
}

/// Failure reported by a topic reader or writer.
///
/// Always fatal for the enclosing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("topic not found: {0}")]
    NotFound(String),

    #[error("ledger rejected credentials: {0}")]
    Unauthorized(String),

    #[error("topic request timed out: {0}")]
    Timeout(String),

    #[error("topic transport failure: {0}")]
    Transport(String),

    #[error("invalid topic response: {0}")]
    InvalidResponse(String),

    #[error("submission rejected: {0}")]
    Rejected(String),

    /// Topic holds more messages than a single read may fetch
    #[error("topic exceeds read limit: {0}")]
    TooLarge(String),
}

impl TopicError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TopicError::NotFound(_) => "not_found",
            TopicError::Unauthorized(_) => "unauthorized",
            TopicError::Timeout(_) => "timeout",
            TopicError::Transport(_) => "transport",
            TopicError::InvalidResponse(_) => "invalid_response",
            TopicError::Rejected(_) => "rejected",
            TopicError::TooLarge(_) => "too_large",
        }
    }
}

/// Errors surfaced by the rebalance history service
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reader or writer failure
    #[error(transparent)]
    Topic(#[from] TopicError),

    /// Submission attempted without a configured writer
    #[error("topic writer not configured")]
    WriterUnavailable,

    /// Outbound message failed validation
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
