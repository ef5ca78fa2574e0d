//! HTTP server for elxd

use crate::collector::Collector;
use crate::exposition::{Exposition, CONTENT_TYPE};
use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// How long in-flight requests may run after shutdown is requested.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Application state shared across handlers
pub struct AppState {
    pub collector: Arc<Collector>,
    pub exposition: Exposition,
}

impl AppState {
    pub fn new(collector: Arc<Collector>, exposition: Exposition) -> Self {
        Self {
            collector,
            exposition,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    let samples = state.collector.collect().await;
    match state.exposition.render(&samples) {
        Ok(body) => ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Serve until `shutdown` fires, then drain for at most [`SHUTDOWN_GRACE`].
pub async fn run(state: AppState, addr: &str, shutdown: CancellationToken) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let token = shutdown.clone();
    let mut serve = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await
    });

    tokio::select! {
        result = &mut serve => {
            result??;
            return Ok(());
        }
        _ = shutdown.cancelled() => {}
    }

    match tokio::time::timeout(SHUTDOWN_GRACE, serve).await {
        Ok(result) => result??,
        Err(_) => warn!("Shutdown grace period elapsed with requests in flight"),
    }
    Ok(())
}
