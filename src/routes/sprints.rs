use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::db::models::sprint::{CreateSprintRequest, UpdateSprintStatusRequest};
use crate::services::{SessionContext, SprintsService};
use crate::validation::ValidatedJson;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

pub async fn create_sprint(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    session: SessionContext,
    ValidatedJson(payload): ValidatedJson<CreateSprintRequest>,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SprintsService::create(&mut conn, state.identity.as_ref(), &session, project_id, &payload)
        .await
    {
        Ok(sprint) => {
            let response = ApiResponse::created(sprint, "Sprint created successfully");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 更新冲刺状态（仅组织管理员）
pub async fn update_sprint_status(
    State(state): State<Arc<AppState>>,
    Path(sprint_id): Path<Uuid>,
    session: SessionContext,
    Json(payload): Json<UpdateSprintStatusRequest>,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match SprintsService::update_status(
        &mut conn,
        state.identity.as_ref(),
        &session,
        sprint_id,
        payload.status,
    )
    .await
    {
        Ok(sprint) => {
            let response = ApiResponse::success(sprint, "Sprint status updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
