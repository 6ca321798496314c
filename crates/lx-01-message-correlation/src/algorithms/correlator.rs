//! Message correlation pipeline
//!
//! canonical order → decode → group → filter → sort.
//! Pure and synchronous; the same input always yields the same outcome.

use tracing::{debug, warn};

use super::decode::decode_message;
use super::grouping::group_by_request_id;
use super::ordering::{canonical_order, sort_newest_first};
use crate::config::CorrelationConfig;
use crate::domain::invariants;
use crate::domain::entities::{
    CorrelationDiagnostics, CorrelationOutcome, RawMessage, RebalanceTransaction,
};

/// Correlation engine with a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct MessageCorrelator {
    config: CorrelationConfig,
}

impl MessageCorrelator {
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Correlate one snapshot of a topic.
    ///
    /// Malformed messages never fail the call; they are counted in the
    /// diagnostics instead.
    pub fn correlate(&self, raw: &[RawMessage]) -> CorrelationOutcome {
        let mut diagnostics = CorrelationDiagnostics {
            received: raw.len(),
            ..Default::default()
        };

        let batch = canonical_order(raw);
        diagnostics.replayed = batch.replayed;

        let mut decoded = Vec::with_capacity(batch.messages.len());
        for message in batch.messages {
            match decode_message(message) {
                Ok(msg) => decoded.push(msg),
                Err(reason) => {
                    diagnostics.undecodable += 1;
                    debug!(
                        sequence_number = message.sequence_number,
                        consensus_timestamp = %message.consensus_timestamp,
                        reason = reason.as_str(),
                        "Skipping undecodable topic message"
                    );
                }
            }
        }
        diagnostics.decoded = decoded.len();

        let grouping = group_by_request_id(&decoded);
        diagnostics.without_request_id = grouping.without_request_id;
        diagnostics.unrecognized_kind = grouping.unrecognized_kind;

        for duplicate in &grouping.duplicates {
            debug!(
                request_id = %duplicate.request_id,
                sequence_number = duplicate.sequence_number,
                "Dropping duplicate rebalance request"
            );
        }
        diagnostics.duplicate_requests = grouping.duplicates;

        let mut complete: Vec<RebalanceTransaction> = Vec::with_capacity(grouping.groups.len());
        for group in grouping.groups {
            match group.into_transaction() {
                Ok(tx) => complete.push(tx),
                Err(orphan) => {
                    if self.config.report_orphans {
                        warn!(
                            request_id = %orphan.request_id,
                            recommendations = orphan.recommendations,
                            executions = orphan.executions,
                            "Rebalance messages without a matching request"
                        );
                    }
                    diagnostics.orphans.push(orphan);
                }
            }
        }

        let (history, clamped) = sort_newest_first(complete, &self.config);
        diagnostics.clamped_timestamps = clamped;

        debug!(
            received = diagnostics.received,
            decoded = diagnostics.decoded,
            transactions = history.len(),
            orphans = diagnostics.orphans.len(),
            "Correlation complete"
        );

        let outcome = CorrelationOutcome {
            history,
            raw_messages: decoded,
            diagnostics,
        };
        debug_assert!(
            invariants::check_all(&outcome),
            "correlation outcome violates domain invariants"
        );
        outcome
    }
}

/// Correlate with the default configuration, returning only the history.
pub fn correlate(raw: &[RawMessage]) -> Vec<RebalanceTransaction> {
    MessageCorrelator::default().correlate(raw).history
}
