use crate::AppState;
use crate::db::models::api::ApiResponse;
use crate::services::{OrganizationsService, SessionContext};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Path(org): Path<String>,
    session: SessionContext,
) -> impl IntoResponse {
    match OrganizationsService::get(state.identity.as_ref(), &session, &org).await {
        Ok(Some(organization)) => {
            let response =
                ApiResponse::success(organization, "Organization retrieved successfully");
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(None) => {
            let response = ApiResponse::<()>::not_found("Organization not found");
            (StatusCode::NOT_FOUND, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}
