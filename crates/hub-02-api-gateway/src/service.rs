//! API Gateway service: binds the HTTP listener and serves the router
//! until the shutdown future resolves.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use hub_01_vpn::{VpnMsgApi, VpnQueryApi};
use tokio::net::TcpListener;
use tracing::info;

use crate::domain::{GatewayConfig, GatewayError};
use crate::rest::AppState;
use crate::router::build_router;

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    router: Router,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(
        config: GatewayConfig,
        queries: Arc<dyn VpnQueryApi>,
        messages: Arc<dyn VpnMsgApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let state = AppState::new(queries, messages, config.indent);
        let router = build_router(state, &config);
        Ok(Self { config, router })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Router with middleware, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured HTTP address.
    pub async fn bind(&self) -> Result<TcpListener, GatewayError> {
        let addr = self.config.http_addr();
        TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?addr, "[hub-02] Starting HTTP server");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("[hub-02] API Gateway stopped");
        Ok(())
    }

    /// Bind and serve.
    pub async fn start(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), GatewayError> {
        let listener = self.bind().await?;
        self.serve(listener, shutdown).await
    }
}
