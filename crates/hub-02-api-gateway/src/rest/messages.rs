//! Message endpoints.
//!
//! Bodies are the tagged JSON form of [`Msg`], e.g.
//! `{"type": "vpn/StartSession", "value": {...}}`. Signature checks happen
//! before a message reaches this gateway.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use hub_01_vpn::Msg;
use hub_telemetry::log_msg_event;
use serde::Serialize;
use shared_types::AccAddress;

use super::{respond, AppState, FormatParams};
use crate::domain::{ApiError, ApiResult};

/// What `POST /vpn/messages/validate` reports for a well-formed message.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub route: &'static str,
    pub action: &'static str,
    pub signers: Vec<AccAddress>,
    /// Canonical JSON the signers must sign
    pub sign_bytes: String,
}

impl ValidationReport {
    fn of(msg: &Msg) -> ApiResult<Self> {
        let sign_bytes = msg
            .sign_bytes()
            .map_err(|e| ApiError::internal(format!("cannot encode sign bytes: {e}")))?;
        Ok(Self {
            type_name: msg.type_name(),
            route: msg.route(),
            action: msg.action(),
            signers: msg.signers(),
            sign_bytes: String::from_utf8_lossy(&sign_bytes).into_owned(),
        })
    }
}

fn parse_msg(body: &str) -> ApiResult<Msg> {
    Ok(serde_json::from_str(body)?)
}

/// `POST /vpn/messages/validate`: stateless checks only.
pub async fn validate_message(
    State(state): State<AppState>,
    Query(format): Query<FormatParams>,
    body: String,
) -> ApiResult<Response> {
    let msg = parse_msg(&body)?;
    msg.validate_basic()?;
    let report = ValidationReport::of(&msg)?;
    respond(&state, format.indent.as_deref(), report).await
}

/// `POST /vpn/messages`: apply through the keeper at the next height.
pub async fn submit_message(
    State(state): State<AppState>,
    Query(format): Query<FormatParams>,
    body: String,
) -> ApiResult<Response> {
    let msg = parse_msg(&body)?;
    let action = msg.action();
    let sender = msg.sender().clone();

    // The keeper blocks on its mutex and on store writes.
    let api = Arc::clone(&state.messages);
    let delivered = tokio::task::spawn_blocking(move || api.deliver(&msg))
        .await
        .map_err(|e| ApiError::internal(format!("delivery task failed: {e}")))?;

    match delivered {
        Ok(outcome) => {
            log_msg_event!(info, "api-gateway", "message applied", action, sender);
            respond(&state, format.indent.as_deref(), outcome).await
        }
        Err(e) => {
            log_msg_event!(debug, "api-gateway", "message rejected", action, sender, error = %e);
            Err(e.into())
        }
    }
}
