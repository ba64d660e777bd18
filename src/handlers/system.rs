// src/handlers/system.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{error::AppError, state::AppState};

pub async fn health() -> &'static str {
    "Cyber Service is running"
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Metrics are not enabled".to_string()))?;

    Ok((StatusCode::OK, handle.render()))
}
