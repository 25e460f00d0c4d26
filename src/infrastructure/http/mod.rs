use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, jobs::JobsController};
use crate::infrastructure::config::Config;

/// Build the application router with all routes configured
pub fn build_router(jobs_controller: Arc<JobsController>) -> Router {
    let job_routes = Router::new()
        .route("/api/jobs", post(JobsController::submit))
        .route("/api/jobs/:jobId", get(JobsController::get_status))
        .route("/api/jobs/:jobId/download", get(JobsController::download))
        .with_state(jobs_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(job_routes)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    jobs_controller: Arc<JobsController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(jobs_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
