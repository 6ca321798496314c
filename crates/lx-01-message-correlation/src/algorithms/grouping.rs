//! Grouping decoded messages by `requestId`
//!
//! Input must already be in ledger order; "first" always means earliest on
//! the ledger.

use std::collections::HashMap;

use crate::domain::entities::{DecodedMessage, DuplicateRequest, OrphanedGroup, RebalanceTransaction};
use crate::domain::value_objects::MessageKind;

/// Accumulator for one correlation key.
#[derive(Clone, Debug, Default)]
pub struct RequestGroup {
    pub request_id: String,
    pub request: Option<DecodedMessage>,
    pub recommendations: Vec<DecodedMessage>,
    pub executions: Vec<DecodedMessage>,
}

impl RequestGroup {
    fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            ..Default::default()
        }
    }

    /// A complete transaction, or the orphan summary when no request arrived.
    pub fn into_transaction(self) -> Result<RebalanceTransaction, OrphanedGroup> {
        match self.request {
            Some(request) => Ok(RebalanceTransaction {
                request_id: self.request_id,
                request,
                recommendations: self.recommendations,
                executions: self.executions,
            }),
            None => Err(OrphanedGroup {
                request_id: self.request_id,
                recommendations: self.recommendations.len(),
                executions: self.executions.len(),
            }),
        }
    }
}

/// Result of grouping one batch.
#[derive(Debug, Default)]
pub struct Grouping {
    /// Groups in order of first appearance
    pub groups: Vec<RequestGroup>,
    pub without_request_id: usize,
    pub unrecognized_kind: usize,
    pub duplicates: Vec<DuplicateRequest>,
}

/// Build request groups. Later requests for a claimed id are reported as
/// duplicates and discarded.
pub fn group_by_request_id(messages: &[DecodedMessage]) -> Grouping {
    let mut grouping = Grouping::default();
    let mut index: HashMap<String, usize> = HashMap::new();

    for message in messages {
        let Some(request_id) = message.request_id() else {
            grouping.without_request_id += 1;
            continue;
        };

        let kind = match message.kind() {
            Some(kind) if kind.is_rebalance() => kind,
            _ => {
                grouping.unrecognized_kind += 1;
                continue;
            }
        };

        let slot = *index.entry(request_id.to_string()).or_insert_with(|| {
            grouping.groups.push(RequestGroup::new(request_id));
            grouping.groups.len() - 1
        });
        let group = &mut grouping.groups[slot];

        match kind {
            MessageKind::RebalanceRequest if group.request.is_some() => {
                grouping.duplicates.push(DuplicateRequest {
                    request_id: request_id.to_string(),
                    sequence_number: message.sequence_number,
                    consensus_timestamp: message.consensus_timestamp,
                });
            }
            MessageKind::RebalanceRequest => group.request = Some(message.clone()),
            MessageKind::RebalanceRecommendation => group.recommendations.push(message.clone()),
            MessageKind::RebalanceExecution => group.executions.push(message.clone()),
            MessageKind::Other(_) => {}
        }
    }

    grouping
}
