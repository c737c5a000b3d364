pub mod error;
pub mod form;
pub mod pages;
pub mod routes;
pub mod state;

use crate::app::state::SharedState;
use crate::utils::error::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/predictor", get(routes::predictor))
        .route("/questionnaire", get(routes::questionnaire))
        .route("/waitlist", get(routes::waitlist))
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// 服務直到收到 Ctrl-C
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("⚠️ Could not listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
