//! Chunked message reassembly
//!
//! Messages larger than one ledger transaction arrive as numbered chunks
//! sharing the initial transaction id. Chunks may straddle page boundaries.

use std::collections::{BTreeMap, HashMap};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lx_01_message_correlation::{ConsensusTimestamp, RawMessage, TopicError};
use tracing::warn;

use crate::wire::{TopicMessage, TransactionId};

struct PendingChunks {
    total: u32,
    parts: BTreeMap<u32, Vec<u8>>,
    last: (ConsensusTimestamp, u64),
}

/// Collects chunks across pages and emits complete messages.
#[derive(Default)]
pub struct ChunkAssembler {
    pending: HashMap<TransactionId, PendingChunks>,
}

impl ChunkAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one mirror-node message.
    ///
    /// Returns the complete message once its last chunk has arrived.
    pub fn push(&mut self, message: TopicMessage) -> Result<Option<RawMessage>, TopicError> {
        let consensus_timestamp: ConsensusTimestamp =
            message.consensus_timestamp.parse().map_err(|e| {
                TopicError::InvalidResponse(format!(
                    "message {}: {}",
                    message.sequence_number, e
                ))
            })?;
        let payload = STANDARD.decode(message.message.as_bytes()).map_err(|e| {
            TopicError::InvalidResponse(format!(
                "message {}: bad base64 payload: {}",
                message.sequence_number, e
            ))
        })?;
        let position = (consensus_timestamp, message.sequence_number);

        let chunk = match message.chunk_info {
            Some(chunk) if chunk.total > 1 => chunk,
            _ => return Ok(Some(RawMessage::new(payload, position.0, position.1))),
        };

        if chunk.number == 0 || chunk.number > chunk.total {
            return Err(TopicError::InvalidResponse(format!(
                "message {}: chunk {} of {}",
                message.sequence_number, chunk.number, chunk.total
            )));
        }

        let entry = self
            .pending
            .entry(chunk.initial_transaction_id.clone())
            .or_insert_with(|| PendingChunks {
                total: chunk.total,
                parts: BTreeMap::new(),
                last: position,
            });

        if entry.total != chunk.total {
            return Err(TopicError::InvalidResponse(format!(
                "message {}: chunk total changed from {} to {}",
                message.sequence_number, entry.total, chunk.total
            )));
        }

        entry.parts.insert(chunk.number, payload);
        entry.last = entry.last.max(position);

        if entry.parts.len() < entry.total as usize {
            return Ok(None);
        }

        let Some(done) = self.pending.remove(&chunk.initial_transaction_id) else {
            return Ok(None);
        };
        let payload: Vec<u8> = done.parts.into_values().flatten().collect();
        Ok(Some(RawMessage::new(payload, done.last.0, done.last.1)))
    }

    /// Discard incomplete chunk sets, returning how many there were.
    pub fn finish(self) -> usize {
        for (id, pending) in &self.pending {
            warn!(
                payer = %id.account_id,
                valid_start = %id.transaction_valid_start,
                received = pending.parts.len(),
                total = pending.total,
                "Skipping incomplete chunked message"
            );
        }
        self.pending.len()
    }
}
