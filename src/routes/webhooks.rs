use crate::AppState;
use crate::db::models::api::{ApiResponse, SuccessFlag};
use crate::error::AppError;
use crate::identity::IdentityUser;
use crate::identity::webhook::WebhookEvent;
use crate::services::UsersService;
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

// 身份服务回调（用户同步、成员缓存失效）
pub async fn identity_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(verifier) = &state.webhooks else {
        let response = ApiResponse::<()>::not_found("Webhooks are not enabled");
        return (StatusCode::NOT_FOUND, Json(response)).into_response();
    };

    if let Err(err) = verifier.verify(&headers, &body, chrono::Utc::now().timestamp()) {
        tracing::warn!(error = %err, "Rejected identity webhook");
        return err.into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            return AppError::validation(format!("Invalid webhook payload: {}", e)).into_response();
        }
    };

    match handle_event(&state, &event).await {
        Ok(()) => {
            let response = ApiResponse::success(SuccessFlag::ok(), "Webhook processed");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

async fn handle_event(state: &AppState, event: &WebhookEvent) -> Result<(), AppError> {
    match event.event_type.as_str() {
        "user.created" | "user.updated" => {
            let remote: IdentityUser = serde_json::from_value(event.data.clone())
                .map_err(|e| AppError::validation(format!("Invalid user payload: {}", e)))?;
            let mut conn = state.conn()?;
            let user = UsersService::upsert_from_identity(&mut conn, &remote)?;
            tracing::info!(
                user_id = %user.id,
                clerk_user_id = %user.clerk_user_id,
                "User mirrored from webhook"
            );
        }
        "user.deleted" => {
            let clerk_user_id = event.data.get("id").and_then(|id| id.as_str()).unwrap_or("");
            tracing::info!(clerk_user_id, "Identity user deleted; local row kept");
        }
        kind if kind.starts_with("organizationMembership.") => {
            if let Some(organization_id) = event.organization_id() {
                state.identity.invalidate_memberships(organization_id).await?;
                tracing::info!(organization_id, event = kind, "Membership cache invalidated");
            }
        }
        kind => {
            tracing::debug!(event = kind, "Ignoring identity webhook");
        }
    }
    Ok(())
}
