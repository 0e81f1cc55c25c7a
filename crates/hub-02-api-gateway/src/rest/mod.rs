//! REST handlers under the `/vpn` prefix.
//!
//! Every successful response is wrapped in [`Envelope`] and carries the
//! height of the state it was read from.

pub mod messages;
pub mod queries;

use std::sync::Arc;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use hub_01_vpn::{PageRequest, VpnMsgApi, VpnQueryApi};
use serde::{Deserialize, Serialize};
use shared_types::{Height, Id};

use crate::domain::{ApiError, ApiResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<dyn VpnQueryApi>,
    pub messages: Arc<dyn VpnMsgApi>,
    /// Pretty-print every response regardless of `?indent`
    pub indent: bool,
}

impl AppState {
    pub fn new(queries: Arc<dyn VpnQueryApi>, messages: Arc<dyn VpnMsgApi>, indent: bool) -> Self {
        Self {
            queries,
            messages,
            indent,
        }
    }

    fn wants_indent(&self, flag: Option<&str>) -> bool {
        self.indent || matches!(flag, Some("true") | Some("1"))
    }
}

/// Success body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub height: Height,
    pub result: T,
}

/// Query string accepted by every endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct FormatParams {
    pub indent: Option<String>,
}

/// Query string of the paginated listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub start_after: Option<String>,
    pub limit: Option<String>,
    pub indent: Option<String>,
}

impl ListParams {
    /// Parse the cursor and size. Empty values count as absent.
    pub fn page_request(&self) -> ApiResult<PageRequest> {
        let start_after = match self.start_after.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<Id>()?),
        };
        let limit = match self.limit.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| ApiError::bad_request(format!("invalid limit: {raw:?}")))?,
            ),
        };
        Ok(PageRequest { start_after, limit })
    }
}

/// Wrap `result` in an [`Envelope`] at the current height.
pub(crate) async fn respond<T: Serialize>(
    state: &AppState,
    indent_flag: Option<&str>,
    result: T,
) -> ApiResult<Response> {
    let height = state.queries.latest_height().await?;
    let envelope = Envelope { height, result };
    let body = if state.wants_indent(indent_flag) {
        serde_json::to_string_pretty(&envelope)
    } else {
        serde_json::to_string(&envelope)
    }
    .map_err(|e| ApiError::internal(format!("failed to encode response: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
