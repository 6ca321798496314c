//! Ledger order and history order
//!
//! Two orders matter here. Ledger order `(consensusTimestamp,
//! sequenceNumber)` drives processing. History order is newest request first
//! by producer business time, with ledger position as tiebreaker.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::config::CorrelationConfig;
use crate::domain::entities::{RawMessage, RebalanceTransaction};
use crate::domain::value_objects::ConsensusTimestamp;

/// Messages in ledger order, with replayed sequence numbers removed.
#[derive(Debug)]
pub struct CanonicalBatch<'a> {
    pub messages: Vec<&'a RawMessage>,
    pub replayed: usize,
}

/// Stable sort by ledger position. The first occurrence of each sequence
/// number in that order is kept.
pub fn canonical_order(raw: &[RawMessage]) -> CanonicalBatch<'_> {
    let mut ordered: Vec<&RawMessage> = raw.iter().collect();
    ordered.sort_by_key(|m| m.ledger_position());

    let mut seen = HashSet::with_capacity(ordered.len());
    let before = ordered.len();
    ordered.retain(|m| seen.insert(m.sequence_number));

    CanonicalBatch {
        replayed: before - ordered.len(),
        messages: ordered,
    }
}

/// Parse a producer business time.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC, and a
/// bare `YYYY-MM-DD` read as UTC midnight.
pub fn parse_business_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sort key for one transaction. Compared descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HistoryKey {
    pub business_time: DateTime<Utc>,
    pub consensus_timestamp: ConsensusTimestamp,
    pub sequence_number: u64,
}

impl HistoryKey {
    /// Build the key, clamping implausible future business times when
    /// configured. The flag reports whether clamping happened.
    ///
    /// Business times before 1970 count as epoch 0, the same as a missing or
    /// unparseable timestamp, so no dated request sorts below an undated one.
    pub fn for_transaction(tx: &RebalanceTransaction, config: &CorrelationConfig) -> (Self, bool) {
        let request = &tx.request;
        let mut business_time = request
            .timestamp()
            .and_then(parse_business_time)
            .map_or(DateTime::UNIX_EPOCH, |t| t.max(DateTime::UNIX_EPOCH));

        let mut clamped = false;
        if config.clamp_future_timestamps {
            if let Some(consensus) = request.consensus_timestamp.to_datetime() {
                // An unrepresentable skew never clamps
                let limit = i64::try_from(config.max_timestamp_skew_secs)
                    .ok()
                    .and_then(Duration::try_seconds)
                    .and_then(|skew| consensus.checked_add_signed(skew));
                if matches!(limit, Some(limit) if business_time > limit) {
                    business_time = consensus;
                    clamped = true;
                }
            }
        }

        let key = Self {
            business_time,
            consensus_timestamp: request.consensus_timestamp,
            sequence_number: request.sequence_number,
        };
        (key, clamped)
    }
}

/// Order transactions newest first. Returns how many business times were
/// clamped.
pub fn sort_newest_first(
    history: Vec<RebalanceTransaction>,
    config: &CorrelationConfig,
) -> (Vec<RebalanceTransaction>, usize) {
    let mut clamped = 0;
    let mut keyed: Vec<(HistoryKey, RebalanceTransaction)> = history
        .into_iter()
        .map(|tx| {
            let (key, was_clamped) = HistoryKey::for_transaction(&tx, config);
            if was_clamped {
                clamped += 1;
            }
            (key, tx)
        })
        .collect();

    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    (keyed.into_iter().map(|(_, tx)| tx).collect(), clamped)
}
