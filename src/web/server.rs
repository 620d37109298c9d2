//! Web server setup and routing for the artifact mediation HTTP surface.

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use super::state::AppState;
use crate::artifact::service::ArtifactService;

/// Start the artifact mediation HTTP server.
pub async fn start_server(bind_addr: &str, service: Arc<ArtifactService>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(service));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/task/:task_id/runs/:run_id/artifacts/*name",
            post(handlers::create_artifact).get(handlers::get_artifact),
        )
        .route(
            "/task/:task_id/artifacts/*name",
            get(handlers::get_latest_artifact),
        )
        .route(
            "/task/:task_id/runs/:run_id/artifacts",
            get(handlers::list_artifacts),
        )
        .route(
            "/task/:task_id/artifacts",
            get(handlers::list_latest_artifacts),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = bind_addr.parse()?;
    info!("Starting artifact mediation server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
