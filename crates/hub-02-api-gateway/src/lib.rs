//! # API Gateway Subsystem
//!
//! **Subsystem ID:** 2
//!
//! REST interface over the VPN registry: read endpoints backed by
//! `VpnQueryApi` and message endpoints backed by `VpnMsgApi`.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    API GATEWAY (hub-02)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │   HTTP  (default port 1317)                                 │
//! │        │                                                    │
//! │   ┌────┴──────────────────────────────────────┐             │
//! │   │ Middleware: CORS → Timeout → Trace → Limit │             │
//! │   └────┬──────────────────────────────────────┘             │
//! │        │                                                    │
//! │   ┌────┴─────────────┐     ┌──────────────────┐             │
//! │   │ rest::queries    │     │ rest::messages   │             │
//! │   └────┬─────────────┘     └────┬─────────────┘             │
//! └────────┼────────────────────────┼───────────────────────────┘
//!          ▼                        ▼
//!     VpnQueryApi              VpnMsgApi
//!   (VpnQueryService)         (VpnKeeper)
//! ```
//!
//! ## Responses
//!
//! Success: `{"height": <u64>, "result": <value>}`, pretty-printed when
//! `indent = true` in config or `?indent=true` on the request.
//! Errors: plain text, 400 / 404 / 409 / 500 (see [`domain::error`]).
//!
//! ## Usage
//!
//! ```ignore
//! use hub_02_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let service = ApiGatewayService::new(GatewayConfig::default(), queries, keeper)?;
//! service.start(shutdown_signal()).await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod service;

pub use domain::{ApiError, ApiResult, GatewayConfig, GatewayError};
pub use rest::{AppState, Envelope};
pub use router::build_router;
pub use service::ApiGatewayService;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
