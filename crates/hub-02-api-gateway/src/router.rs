use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domain::GatewayConfig;
use crate::middleware::create_cors_layer;
use crate::rest::{messages, queries, AppState};

/// Build the HTTP router with its middleware stack.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    // Outermost first. CORS and the timeout both synthesise responses and need
    // a `Default` body, so they sit inside the trace layer.
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.timeouts.request()))
        .layer(create_cors_layer(&config.cors));

    Router::new()
        .route("/health", get(health_check))
        // Sessions
        .route("/vpn/sessions", get(queries::get_all_sessions))
        .route("/vpn/sessions/:id", get(queries::get_session))
        // Subscriptions
        .route("/vpn/subscriptions", get(queries::get_all_subscriptions))
        .route("/vpn/subscriptions/:id", get(queries::get_subscription))
        .route(
            "/vpn/subscriptions/:id/sessions",
            get(queries::get_sessions_of_subscription),
        )
        // Nodes
        .route("/vpn/nodes", get(queries::get_all_nodes))
        .route("/vpn/nodes/:id", get(queries::get_node))
        .route(
            "/vpn/nodes/:id/subscriptions",
            get(queries::get_subscriptions_of_node),
        )
        .route(
            "/vpn/accounts/:address/nodes",
            get(queries::get_nodes_of_owner),
        )
        // Messages
        .route("/vpn/messages", post(messages::submit_message))
        .route("/vpn/messages/validate", post(messages::validate_message))
        .layer(DefaultBodyLimit::max(config.limits.max_request_size))
        .layer(middleware)
        .with_state(state)
}

/// Liveness probe
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
    }))
}
