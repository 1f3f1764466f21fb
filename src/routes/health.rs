use crate::AppState;
use crate::cache::redis_health_check;
use crate::db::models::api::ApiResponse;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// `None` when no Redis is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis: Option<bool>,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let redis = match &state.redis {
        Some(client) => Some(match redis_health_check(client).await {
            Ok(healthy) => healthy,
            Err(err) => {
                tracing::warn!(error = %err, "Redis health check failed");
                false
            }
        }),
        None => None,
    };

    let status = if redis == Some(false) { "degraded" } else { "ok" };
    let response = ApiResponse::success(HealthStatus { status, redis }, "Service is running");
    (StatusCode::OK, Json(response))
}
