//! Health probes.

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tracing::warn;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness: the process is serving.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 while the commerce API does not answer, since no page can
/// render without it.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(latency) => {
            tracing::debug!(latency_ms = latency.as_millis(), "commerce API reachable");
            StatusCode::OK
        }
        Err(e) => {
            warn!(error = %e, "commerce API not reachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
