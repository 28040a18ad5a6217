//! Axum-based RPC server.

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

/// Build the API router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route(
            "/api/config/test-connection",
            post(handlers::test_connection),
        )
        .route("/api/wallet", get(handlers::wallet_status))
        .route("/api/balance", post(handlers::balance))
        .route("/api/trustline", post(handlers::create_trustline))
        .route("/api/send", post(handlers::send))
        .route("/api/logs", get(handlers::logs))
        .route("/api/logs/export", get(handlers::export_logs))
        .route("/api/validate", post(handlers::validate_address))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    state: Arc<AppState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<AppState>) -> Self {
        Self { port, state }
    }

    /// Bind on all interfaces and serve until the listener fails.
    pub async fn start(self) -> std::io::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await?;
        let profile = self.state.profile();
        info!(
            %addr,
            issuer = %profile.issuer,
            currency = %profile.currency,
            network = self.state.settings.network.as_str(),
            "desk API listening"
        );
        axum::serve(listener, router(self.state)).await
    }
}
