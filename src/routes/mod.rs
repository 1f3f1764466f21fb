pub mod health;
pub mod issues;
pub mod organizations;
pub mod projects;
pub mod sprints;
pub mod users;
pub mod webhooks;

use crate::AppState;
use crate::middleware::{request_tracking_middleware, session_middleware};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn create_router(state: Arc<AppState>) -> Router {
    // Every route below requires a verified session
    let protected_routes = Router::new()
        .route("/users/me", get(users::get_current_user))
        .route("/organizations/:org", get(organizations::get_organization))
        .route(
            "/organizations/:org/projects",
            get(projects::get_projects),
        )
        .route(
            "/organizations/:org/issues",
            get(issues::get_user_issues),
        )
        .route("/projects", post(projects::create_project))
        .route("/projects/:project_id", get(projects::get_project))
        .route("/projects/:project_id", delete(projects::delete_project))
        .route(
            "/projects/:project_id/sprints",
            post(sprints::create_sprint),
        )
        .route(
            "/projects/:project_id/issues",
            post(issues::create_issue),
        )
        .route(
            "/sprints/:sprint_id/status",
            patch(sprints::update_sprint_status),
        )
        .route(
            "/sprints/:sprint_id/issues",
            get(issues::get_sprint_issues),
        )
        .route("/issues/order", put(issues::update_issue_order))
        .route("/issues/:issue_id", put(issues::update_issue))
        .route("/issues/:issue_id", delete(issues::delete_issue))
        .route_layer(from_fn_with_state(state.clone(), session_middleware));

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/webhooks/identity", post(webhooks::identity_webhook));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&state.config.server().cors_origins))
        .layer(from_fn(request_tracking_middleware))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed).allow_credentials(true)
}
