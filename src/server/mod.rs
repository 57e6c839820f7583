//! HTTP host for the presentation context.
//!
//! A browser or webview loads the UI from `ui_dir` and reaches the store only
//! through `POST /api/{name}`, where `name` is one of the exposed shim
//! functions.

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use crate::shim::DatabaseApi;

pub mod routes;

/// Server state
pub struct AppState {
    pub api: DatabaseApi,
}

pub fn router(api: DatabaseApi, ui_dir: &Path) -> Router {
    let state = Arc::new(AppState { api });

    Router::new()
        .route("/api", get(routes::list_exposed))
        .route("/api/{name}", post(routes::invoke))
        .fallback_service(ServeDir::new(ui_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server(
    port: u16,
    api: DatabaseApi,
    ui_dir: &Path,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = router(api, ui_dir);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
