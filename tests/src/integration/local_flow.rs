//! # Local Network Flow
//!
//! `lynx-node` wiring for `local`: one in-process topic is both the reader
//! and the writer, so messages posted to the gateway come back correlated.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use lx_01_message_correlation::{Network, TopicId};
    use lx_03_history_gateway::{build_router, AppState};
    use lynx_node::{build_history_api, NodeConfig};

    fn local_router(topic: Option<TopicId>) -> Router {
        let config = NodeConfig {
            network: Network::Local,
            topic_id: topic,
            ..NodeConfig::default()
        };
        let api = build_history_api(&config).unwrap();
        build_router(AppState::new(api, config.topic_id), &config.gateway)
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(router: &Router, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/rebalance/messages")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        call(router, request).await
    }

    async fn history(router: &Router) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri("/rebalance/history")
            .body(Body::empty())
            .unwrap();
        call(router, request).await
    }

    #[tokio::test]
    async fn test_posted_rebalance_reads_back_correlated() {
        let router = local_router(Some(TopicId::new(0, 0, 7001)));

        let (status, submission) = post(
            &router,
            json!({"type": "REBALANCE_REQUEST", "timestamp": "2025-03-01T00:00:00Z"}),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let request_id = submission["requestId"].as_str().unwrap().to_string();
        assert_eq!(submission["receipt"]["sequenceNumber"], 1);

        for kind in ["REBALANCE_RECOMMENDATION", "REBALANCE_EXECUTION"] {
            let (status, _) = post(&router, json!({"type": kind, "requestId": request_id})).await;
            assert_eq!(status, StatusCode::ACCEPTED);
        }

        let (status, body) = history(&router).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topicId"], "0.0.7001");

        let history = body["history"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["requestId"], request_id.as_str());
        assert_eq!(history[0]["recommendations"].as_array().unwrap().len(), 1);
        assert_eq!(history[0]["executions"].as_array().unwrap().len(), 1);
        assert_eq!(body["rawMessages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_newest_request_listed_first() {
        let router = local_router(Some(TopicId::new(0, 0, 7002)));

        for (id, ts) in [
            ("r-march", "2025-03-01T00:00:00Z"),
            ("r-may", "2025-05-01T00:00:00Z"),
            ("r-april", "2025-04-01T00:00:00Z"),
        ] {
            let (status, _) = post(
                &router,
                json!({"type": "REBALANCE_REQUEST", "requestId": id, "timestamp": ts}),
            )
            .await;
            assert_eq!(status, StatusCode::ACCEPTED);
        }

        let (_, body) = history(&router).await;
        let ids: Vec<&str> = body["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|tx| tx["requestId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["r-may", "r-april", "r-march"]);
    }

    #[tokio::test]
    async fn test_missing_topic_fails_every_route() {
        let router = local_router(None);

        let (status, body) = history(&router).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "topic ID not configured");

        let (status, body) = post(&router, json!({"type": "REBALANCE_REQUEST"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "topic ID not configured");
    }
}
