//! Domain invariants for message correlation
//!
//! Predicates over a correlation outcome. Used by tests and debug assertions.

use std::collections::HashSet;

use super::entities::{CorrelationOutcome, RebalanceTransaction};
use super::value_objects::MessageKind;

/// Every transaction is anchored by a request carrying its id.
pub fn invariant_request_anchored(history: &[RebalanceTransaction]) -> bool {
    history.iter().all(|tx| {
        tx.request.kind() == Some(MessageKind::RebalanceRequest)
            && tx.request.request_id() == Some(tx.request_id.as_str())
    })
}

/// Recommendations and executions share the transaction's id and kind.
pub fn invariant_members_consistent(history: &[RebalanceTransaction]) -> bool {
    history.iter().all(|tx| {
        let id = Some(tx.request_id.as_str());
        tx.recommendations
            .iter()
            .all(|m| m.request_id() == id && m.kind() == Some(MessageKind::RebalanceRecommendation))
            && tx
                .executions
                .iter()
                .all(|m| m.request_id() == id && m.kind() == Some(MessageKind::RebalanceExecution))
    })
}

/// No two transactions share a request id.
pub fn invariant_unique_request_ids(history: &[RebalanceTransaction]) -> bool {
    let mut seen = HashSet::new();
    history.iter().all(|tx| seen.insert(tx.request_id.as_str()))
}

/// Members inside a transaction, and the raw echo, are in ledger order.
pub fn invariant_ledger_order(outcome: &CorrelationOutcome) -> bool {
    let ordered = |positions: Vec<_>| positions.windows(2).all(|w| w[0] < w[1]);

    ordered(outcome.raw_messages.iter().map(|m| m.ledger_position()).collect())
        && outcome.history.iter().all(|tx| {
            ordered(tx.recommendations.iter().map(|m| m.ledger_position()).collect())
                && ordered(tx.executions.iter().map(|m| m.ledger_position()).collect())
        })
}

/// All of the above.
pub fn check_all(outcome: &CorrelationOutcome) -> bool {
    invariant_request_anchored(&outcome.history)
        && invariant_members_consistent(&outcome.history)
        && invariant_unique_request_ids(&outcome.history)
        && invariant_ledger_order(outcome)
}
