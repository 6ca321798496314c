//! Synthetic rebalance feeds.

use lx_01_message_correlation::{ConsensusTimestamp, RawMessage};
use serde_json::json;

/// First consensus second of generated feeds.
pub const FEED_START: i64 = 1_800_000_000;

/// Business time for the `index`th request, one minute apart.
pub fn request_time(index: usize) -> String {
    format!(
        "2024-01-{:02}T{:02}:{:02}:00Z",
        1 + (index / 1440) % 28,
        (index / 60) % 24,
        index % 60
    )
}

/// A feed of `requests` rebalances in ledger order.
///
/// Each request is followed by two recommendations and one execution. Every
/// tenth position also carries a non-JSON payload and a heartbeat without a
/// `requestId`.
pub fn rebalance_feed(requests: usize) -> Vec<RawMessage> {
    let mut payloads = Vec::with_capacity(requests * 5);
    for i in 0..requests {
        let id = format!("req-{:06}", i);
        payloads.push(
            json!({"type": "REBALANCE_REQUEST", "requestId": id, "timestamp": request_time(i)})
                .to_string(),
        );
        for venue in ["saucerswap", "heliswap"] {
            payloads.push(
                json!({"type": "REBALANCE_RECOMMENDATION", "requestId": id, "venue": venue})
                    .to_string(),
            );
        }
        payloads.push(json!({"type": "REBALANCE_EXECUTION", "requestId": id}).to_string());
        if i % 10 == 0 {
            payloads.push("not json".to_string());
            payloads.push(json!({"type": "HEARTBEAT"}).to_string());
        }
    }

    payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            let sequence = i as u64 + 1;
            let timestamp = ConsensusTimestamp {
                seconds: FEED_START + i as i64,
                nanos: 0,
            };
            RawMessage::new(payload, timestamp, sequence)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lx_01_message_correlation::MessageCorrelator;

    #[test]
    fn test_feed_correlates_every_request() {
        let feed = rebalance_feed(25);
        let outcome = MessageCorrelator::default().correlate(&feed);

        assert_eq!(outcome.history.len(), 25);
        assert_eq!(outcome.history[0].request_id, "req-000024");
        assert!(outcome
            .history
            .iter()
            .all(|tx| tx.recommendations.len() == 2 && tx.executions.len() == 1));
        assert_eq!(outcome.diagnostics.undecodable, 3);
        assert_eq!(outcome.diagnostics.without_request_id, 3);
    }
}
