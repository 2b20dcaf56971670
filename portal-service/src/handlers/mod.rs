//! HTTP handlers for portal-service.

pub mod accounts;
pub mod payments;
pub mod session;

use axum::{extract::State, http::header, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{services::get_metrics, AppState};

/// Liveness plus a store ping.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.accounts.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Store health check failed");
        AppError::DatabaseError(anyhow::Error::new(e))
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        get_metrics(),
    )
}
