use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::services::{SessionContext, UsersService};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

// 获取当前用户（首次访问时从身份服务同步）
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
) -> impl IntoResponse {
    let mut conn = match state.conn() {
        Ok(conn) => conn,
        Err(err) => return err.into_response(),
    };

    match UsersService::resolve(&mut conn, state.identity.as_ref(), &session).await {
        Ok(user) => {
            let response = ApiResponse::success(user, "User retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
