//! Read-only endpoints backed by [`hub_01_vpn::VpnQueryApi`].

use axum::extract::{Path, Query, State};
use axum::response::Response;
use shared_types::{AccAddress, Id};

use super::{respond, AppState, FormatParams, ListParams};
use crate::domain::ApiResult;

/// `GET /vpn/sessions/:id`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let session = state.queries.get_session(id.parse::<Id>()?).await?;
    respond(&state, format.indent.as_deref(), session).await
}

/// `GET /vpn/subscriptions/:id/sessions`
pub async fn get_sessions_of_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let sessions = state
        .queries
        .get_sessions_of_subscription(id.parse::<Id>()?)
        .await?;
    respond(&state, format.indent.as_deref(), sessions).await
}

/// `GET /vpn/sessions`
pub async fn get_all_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let page = state.queries.get_all_sessions(params.page_request()?).await?;
    respond(&state, params.indent.as_deref(), page).await
}

/// `GET /vpn/nodes/:id`
pub async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let node = state.queries.get_node(id.parse::<Id>()?).await?;
    respond(&state, format.indent.as_deref(), node).await
}

/// `GET /vpn/nodes`
pub async fn get_all_nodes(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let page = state.queries.get_all_nodes(params.page_request()?).await?;
    respond(&state, params.indent.as_deref(), page).await
}

/// `GET /vpn/accounts/:address/nodes`
pub async fn get_nodes_of_owner(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let owner = AccAddress::from_hex(&address)?;
    let nodes = state.queries.get_nodes_of_owner(&owner).await?;
    respond(&state, format.indent.as_deref(), nodes).await
}

/// `GET /vpn/subscriptions/:id`
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let subscription = state.queries.get_subscription(id.parse::<Id>()?).await?;
    respond(&state, format.indent.as_deref(), subscription).await
}

/// `GET /vpn/subscriptions`
pub async fn get_all_subscriptions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let page = state
        .queries
        .get_all_subscriptions(params.page_request()?)
        .await?;
    respond(&state, params.indent.as_deref(), page).await
}

/// `GET /vpn/nodes/:id/subscriptions`
pub async fn get_subscriptions_of_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(format): Query<FormatParams>,
) -> ApiResult<Response> {
    let subscriptions = state
        .queries
        .get_subscriptions_of_node(id.parse::<Id>()?)
        .await?;
    respond(&state, format.indent.as_deref(), subscriptions).await
}
