//! # REST API Flows
//!
//! A memory-backed [`node_runtime::NodeRuntime`] exercised through its
//! gateway router, the way an HTTP client sees the node. Requests go through
//! `tower::ServiceExt::oneshot`, so no socket is opened.

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use hub_01_vpn::test_utils::{address, register_node_msg};
    use hub_01_vpn::{EndSession, Msg, StartSession, UpdateSessionBandwidth};
    use hub_02_api_gateway::GatewayConfig;
    use node_runtime::{NodeConfig, NodeRuntime};
    use serde_json::{json, Value};
    use shared_types::{Bandwidth, Id, GIGABYTE};
    use tower::ServiceExt;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn node_router() -> Router {
        let mut config = NodeConfig::default();
        config.api_gateway = GatewayConfig::for_testing();
        config.vpn.default_page_size = 2;
        let runtime = NodeRuntime::new(config).unwrap();
        runtime.gateway().unwrap().router()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
        send(router, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(router, request).await
    }

    async fn submit(router: &Router, msg: impl Into<Msg>) -> (StatusCode, Value) {
        post(router, "/vpn/messages", serde_json::to_value(msg.into()).unwrap()).await
    }

    fn start_subscription(from: u8, node_id: &str, amount: &str) -> Value {
        json!({
            "type": "vpn/StartSubscription",
            "value": {
                "from": address(from).to_string(),
                "node_id": node_id,
                "deposit": { "denom": "stake", "amount": amount }
            }
        })
    }

    // =========================================================================
    // END-TO-END OVER HTTP
    // =========================================================================

    #[tokio::test]
    async fn test_session_lifecycle_over_http() {
        let router = node_router();

        let (status, body) = submit(&router, register_node_msg(address(1))).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["result"]["node_id"], "1");

        // Hand-written wire JSON, as a wallet would send it.
        let (status, body) =
            post(&router, "/vpn/messages", start_subscription(2, "1", "1000")).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["height"], 2);
        assert_eq!(body["result"]["outcome"], "subscription_started");

        let (status, _) = submit(&router, StartSession::new(address(2), Id::new(1))).await;
        assert_eq!(status, StatusCode::OK);

        let update = UpdateSessionBandwidth::new(
            address(1),
            Id::new(1),
            Bandwidth::new(GIGABYTE, 2 * GIGABYTE),
        );
        let (status, body) = submit(&router, update).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["result"]["consumed"]["upload"], "1000000000");

        let (status, body) = get(&router, "/vpn/subscriptions/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["height"], 4);
        assert_eq!(body["result"]["consumed"]["download"], "2000000000");
        assert_eq!(body["result"]["price_per_gb"]["amount"], "100");
        assert_eq!(body["result"]["status"], "active");

        let (_, body) = get(&router, "/vpn/nodes/1/subscriptions").await;
        assert_eq!(body["result"].as_array().unwrap().len(), 1);

        let (status, _) = submit(&router, EndSession::new(address(2), Id::new(1))).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = get(&router, "/vpn/subscriptions/1/sessions").await;
        assert_eq!(body["result"][0]["status"], "ended");
        assert_eq!(body["result"][0]["status_modified_at"], 5);
    }

    #[tokio::test]
    async fn test_error_statuses_over_http() {
        let router = node_router();

        // Stateless rejection: zero deposit.
        let (status, body) =
            post(&router, "/vpn/messages", start_subscription(2, "1", "0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.as_str().unwrap().contains("deposit"));

        // Unknown node.
        let (status, _) = post(&router, "/vpn/messages", start_subscription(2, "7", "10")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Lifecycle conflict: second active session.
        submit(&router, register_node_msg(address(1))).await;
        post(&router, "/vpn/messages", start_subscription(2, "1", "10")).await;
        submit(&router, StartSession::new(address(2), Id::new(1))).await;
        let (status, body) = submit(&router, StartSession::new(address(2), Id::new(1))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.as_str().unwrap().contains("already has active session"));

        // Unknown message type.
        let (status, _) = post(
            &router,
            "/vpn/messages",
            json!({ "type": "vpn/Teleport", "value": {} }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Rejected messages do not advance the height.
        let (_, body) = get(&router, "/vpn/nodes/1").await;
        assert_eq!(body["height"], 3);
    }

    #[tokio::test]
    async fn test_validate_does_not_apply() {
        let router = node_router();
        let (status, body) = post(
            &router,
            "/vpn/messages/validate",
            start_subscription(2, "1", "1000"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["action"], "start_subscription");
        assert_eq!(body["result"]["signers"], json!([address(2).to_string()]));
        assert_eq!(body["height"], 0);

        let (status, _) = get(&router, "/vpn/subscriptions/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_default_page_size_from_node_config() {
        let router = node_router();
        for n in 1..=3 {
            submit(&router, register_node_msg(address(n))).await;
        }

        let (_, body) = get(&router, "/vpn/nodes").await;
        assert_eq!(body["result"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(body["result"]["next_start_after"], "2");

        let (_, body) = get(&router, "/vpn/nodes?start_after=2").await;
        assert_eq!(body["result"]["items"][0]["id"], "3");
        assert!(body["result"]["next_start_after"].is_null());

        let (status, _) = get(&router, "/vpn/nodes?limit=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let (status, body) = get(&node_router(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], hub_02_api_gateway::VERSION);
    }
}
