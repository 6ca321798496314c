//! # Mirror Node Flow
//!
//! A fake mirror node serves a topic over HTTP. The real client pages
//! through it, the service correlates the feed and the gateway renders it.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::extract::{Path, Query, State};
    use axum::http::{Request, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use lx_01_message_correlation::{MessageCorrelator, Network, RebalanceHistoryService, TopicId};
    use lx_02_mirror_node::{MirrorNodeClient, MirrorNodeConfig};
    use lx_03_history_gateway::{build_router, AppState, GatewayConfig};

    const TOPIC: &str = "0.0.48100";

    // =========================================================================
    // FAKE MIRROR NODE
    // =========================================================================

    struct FakeMirror {
        messages: Vec<Value>,
        page_size: usize,
    }

    impl FakeMirror {
        fn new(page_size: usize) -> Self {
            Self {
                messages: Vec::new(),
                page_size,
            }
        }

        fn next_sequence(&self) -> u64 {
            self.messages.len() as u64 + 1
        }

        fn push(&mut self, payload: &[u8]) {
            let seq = self.next_sequence();
            self.messages.push(json!({
                "consensus_timestamp": format!("{}.000000500", 1_750_000_000 + seq),
                "message": STANDARD.encode(payload),
                "sequence_number": seq,
                "topic_id": TOPIC,
            }));
        }

        fn push_json(&mut self, body: Value) {
            self.push(body.to_string().as_bytes());
        }

        /// Split `body` across `parts` chunks of one submission.
        fn push_chunked(&mut self, body: Value, parts: usize) {
            let bytes = body.to_string().into_bytes();
            let size = bytes.len().div_ceil(parts);
            let valid_start = format!("{}.000000000", 1_750_000_000 + self.next_sequence());
            for (i, chunk) in bytes.chunks(size).enumerate() {
                let seq = self.next_sequence();
                self.messages.push(json!({
                    "consensus_timestamp": format!("{}.000000500", 1_750_000_000 + seq),
                    "message": STANDARD.encode(chunk),
                    "sequence_number": seq,
                    "topic_id": TOPIC,
                    "chunk_info": {
                        "initial_transaction_id": {
                            "account_id": "0.0.1001",
                            "transaction_valid_start": valid_start,
                            "nonce": 0,
                            "scheduled": false
                        },
                        "number": i + 1,
                        "total": parts
                    }
                }));
            }
        }
    }

    async fn messages_handler(
        State(fake): State<Arc<FakeMirror>>,
        Path(topic): Path<String>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if topic != TOPIC {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({ "_status": { "messages": [{ "message": "Not found" }] } })),
            )
                .into_response();
        }

        let after: u64 = query
            .get("sequencenumber")
            .and_then(|s| s.strip_prefix("gt:"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let page: Vec<Value> = fake
            .messages
            .iter()
            .filter(|m| m["sequence_number"].as_u64().unwrap() > after)
            .take(fake.page_size)
            .cloned()
            .collect();
        let next = page.last().and_then(|last| {
            let seq = last["sequence_number"].as_u64().unwrap();
            (seq < fake.messages.len() as u64).then(|| {
                format!(
                    "/api/v1/topics/{}/messages?order=asc&sequencenumber=gt:{}",
                    TOPIC, seq
                )
            })
        });

        Json(json!({ "messages": page, "links": { "next": next } })).into_response()
    }

    async fn serve_mirror(fake: FakeMirror) -> String {
        let app = Router::new()
            .route("/api/v1/topics/:topic/messages", get(messages_handler))
            .with_state(Arc::new(fake));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn gateway_for(mirror_url: String, topic: &str) -> Router {
        let config = MirrorNodeConfig {
            base_url: Some(mirror_url),
            page_limit: 3,
            timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let client = MirrorNodeClient::new(Network::Local, &config).unwrap();
        let service =
            RebalanceHistoryService::new(Arc::new(client), MessageCorrelator::default());
        let topic: TopicId = topic.parse().unwrap();
        build_router(
            AppState::new(Arc::new(service), Some(topic)),
            &GatewayConfig::default(),
        )
    }

    async fn get_history(router: Router) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/rebalance/history")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    /// Two rebalances spread over several pages, one request chunked, plus
    /// noise that must not break the read.
    #[tokio::test]
    async fn test_history_across_pages_and_chunks() {
        let mut fake = FakeMirror::new(3);
        fake.push_json(json!({
            "type": "REBALANCE_REQUEST",
            "requestId": "r-old",
            "timestamp": "2025-06-01T10:00:00Z",
            "targetWeights": {"HBAR": 0.4, "SAUCE": 0.6}
        }));
        fake.push(b"\xff\xfe not utf-8");
        fake.push_chunked(
            json!({
                "type": "REBALANCE_REQUEST",
                "requestId": "r-new",
                "timestamp": "2025-06-02T10:00:00Z",
                "targetWeights": {"HBAR": 0.5, "SAUCE": 0.3, "PACK": 0.2}
            }),
            3,
        );
        fake.push_json(json!({"type": "REBALANCE_RECOMMENDATION", "requestId": "r-old"}));
        fake.push_json(json!({"type": "REBALANCE_EXECUTION", "requestId": "r-new"}));
        fake.push_json(json!({"type": "REBALANCE_EXECUTION", "requestId": "r-ghost"}));
        fake.push(b"[1, 2, 3]");

        let url = serve_mirror(fake).await;
        let (status, body) = get_history(gateway_for(url, TOPIC).await).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topicId"], TOPIC);

        let history = body["history"].as_array().unwrap();
        let ids: Vec<&str> = history
            .iter()
            .map(|tx| tx["requestId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["r-new", "r-old"]);

        let newest = &history[0];
        assert_eq!(newest["request"]["targetWeights"]["PACK"], 0.2);
        assert_eq!(newest["executions"].as_array().unwrap().len(), 1);
        assert!(newest["recommendations"].as_array().unwrap().is_empty());
        assert_eq!(history[1]["recommendations"].as_array().unwrap().len(), 1);

        // Chunked request is one decoded message at its last chunk's position
        assert_eq!(newest["request"]["sequenceNumber"], 5);
        assert_eq!(body["rawMessages"].as_array().unwrap().len(), 5);

        let diagnostics = &body["diagnostics"];
        assert_eq!(diagnostics["received"], 7);
        assert_eq!(diagnostics["undecodable"], 2);
        assert_eq!(diagnostics["orphans"][0]["requestId"], "r-ghost");
    }

    #[tokio::test]
    async fn test_empty_topic_gives_empty_history() {
        let url = serve_mirror(FakeMirror::new(3)).await;
        let (status, body) = get_history(gateway_for(url, TOPIC).await).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["history"].as_array().unwrap().is_empty());
        assert!(body["rawMessages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_topic_is_server_error() {
        let url = serve_mirror(FakeMirror::new(3)).await;
        let (status, body) = get_history(gateway_for(url, "0.0.9").await).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to fetch rebalance history");
        assert!(body["details"].as_str().unwrap().starts_with("topic not found"));
    }

    #[tokio::test]
    async fn test_unreachable_mirror_is_server_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let (status, body) = get_history(gateway_for(url, TOPIC).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "failed to fetch rebalance history");
    }
}
