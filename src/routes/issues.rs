use crate::AppState;
use crate::db::models::api::{ApiResponse, ResponseMeta};
use crate::db::models::issue::{CreateIssueRequest, UpdateIssueOrderRequest, UpdateIssueRequest};
use crate::services::access::grant_member;
use crate::services::{IssuesService, SessionContext};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

// 获取冲刺内的任务（按状态、排序）
pub async fn get_sprint_issues(
    State(state): State<Arc<AppState>>,
    Path(sprint_id): Path<Uuid>,
    session: SessionContext,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::for_sprint(&mut conn, state.identity.as_ref(), &session, sprint_id).await {
        Ok(issues) => {
            let meta = ResponseMeta {
                total_count: Some(issues.len() as i64),
            };
            let response =
                ApiResponse::success_with_meta(issues, "Issues retrieved successfully", meta);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 创建任务
pub async fn create_issue(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    session: SessionContext,
    Json(payload): Json<CreateIssueRequest>,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::create(&mut conn, state.identity.as_ref(), &session, project_id, &payload)
        .await
    {
        Ok(issue) => {
            let response = ApiResponse::created(issue, "Issue created successfully");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 批量更新任务排序（看板拖拽）
pub async fn update_issue_order(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    Json(payload): Json<UpdateIssueOrderRequest>,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::update_order(&mut conn, state.identity.as_ref(), &session, &payload.issues)
        .await
    {
        Ok(result) => {
            let response = ApiResponse::success(result, "Issue order updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn update_issue(
    State(state): State<Arc<AppState>>,
    Path(issue_id): Path<Uuid>,
    session: SessionContext,
    Json(payload): Json<UpdateIssueRequest>,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::update(&mut conn, state.identity.as_ref(), &session, issue_id, &payload)
        .await
    {
        Ok(issue) => {
            let response = ApiResponse::success(issue, "Issue updated successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn delete_issue(
    State(state): State<Arc<AppState>>,
    Path(issue_id): Path<Uuid>,
    session: SessionContext,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::delete(&mut conn, state.identity.as_ref(), &session, issue_id).await {
        Ok(result) => {
            let response = ApiResponse::success(result, "Issue deleted successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 当前用户在组织内的任务（指派给我 / 我创建的）
pub async fn get_user_issues(
    State(state): State<Arc<AppState>>,
    Path(org): Path<String>,
    session: SessionContext,
) -> impl IntoResponse {
    let grant = match grant_member(state.identity.as_ref(), &session, &org).await {
        Ok(grant) => grant,
        Err(err) => return err.into_response(),
    };
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match IssuesService::list_for_user(&mut conn, state.identity.as_ref(), &session, &grant).await
    {
        Ok(issues) => {
            let response = ApiResponse::success(issues, "Issues retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
