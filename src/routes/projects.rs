use crate::AppState;
use crate::db::models::api::{ApiResponse, ResponseMeta};
use crate::db::models::project::{CreateProjectRequest, DeleteProjectQuery};
use crate::services::access::grant_member;
use crate::services::{ProjectsService, SessionContext};
use crate::validation::ValidatedJson;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

// 创建项目（仅组织管理员）
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(payload): ValidatedJson<CreateProjectRequest>,
) -> impl IntoResponse {
    let identity = state.identity.as_ref();
    let grant = match ProjectsService::authorize_create(identity, &session, &payload).await {
        Ok(grant) => grant,
        Err(err) => return err.into_response(),
    };
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ProjectsService::create(&mut conn, identity, &session, &grant, &payload).await {
        Ok(project) => {
            let response = ApiResponse::created(project, "Project created successfully");
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 获取组织下的项目列表
pub async fn get_projects(
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

    match ProjectsService::list(&mut conn, state.identity.as_ref(), &session, &grant).await {
        Ok(projects) => {
            let meta = ResponseMeta {
                total_count: Some(projects.len() as i64),
            };
            let response =
                ApiResponse::success_with_meta(projects, "Projects retrieved successfully", meta);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    session: SessionContext,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ProjectsService::get(&mut conn, state.identity.as_ref(), &session, project_id).await {
        Ok(Some(project)) => {
            let response = ApiResponse::success(project, "Project retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => {
            let response = ApiResponse::<()>::not_found("Project not found");
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

// 删除项目（级联删除冲刺与任务）
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<DeleteProjectQuery>,
    session: SessionContext,
) -> impl IntoResponse {
    let grant =
        match ProjectsService::authorize_delete(state.identity.as_ref(), &session, query.org_id)
            .await
        {
            Ok(grant) => grant,
            Err(err) => return err.into_response(),
        };
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match ProjectsService::delete(&mut conn, &grant, project_id) {
        Ok(result) => {
            let response = ApiResponse::success(result, "Project deleted successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
