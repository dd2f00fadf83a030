//! Web server module (serve mode).
//!
//! A read-only projection of the persisted snapshot: the monitoring runs
//! themselves happen in separate `run` invocations driven by an external
//! scheduler.

mod handlers;

use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::snapshot::SnapshotStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
}

/// Status page server.
pub struct Server {
    config: ServerConfig,
    state: AppState,
}

impl Server {
    pub fn new(config: ServerConfig, store: SnapshotStore) -> Self {
        Self {
            config,
            state: AppState { store },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            .route("/", get(handlers::handle_status_page))
            .route("/api/status", get(handlers::handle_status_json))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let router = self.routes();

        tracing::info!("status server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
