use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use tracker_backend::cache::MembershipCache;
use tracker_backend::identity::webhook::WebhookVerifier;
use tracker_backend::identity::{CachedIdentityProvider, InMemoryIdentityProvider, Organization};
use tracker_backend::routes::create_router;

use super::support::{TEST_WEBHOOK_SECRET, session_token, test_config, test_state};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn provider_with_acme() -> Arc<InMemoryIdentityProvider> {
    let provider = InMemoryIdentityProvider::new().with_member("org_1", "user_1", "org:member");
    provider.add_organization(Organization {
        id: "org_1".into(),
        name: "Acme".into(),
        slug: Some("acme".into()),
        image_url: None,
    });
    Arc::new(provider)
}

#[tokio::test]
async fn health_reports_ok_without_redis() {
    let app = create_router(test_state(test_config(), provider_with_acme()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = create_router(test_state(test_config(), provider_with_acme()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "req-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn protected_routes_require_session() {
    let provider = provider_with_acme();
    let app = create_router(test_state(test_config(), provider.clone()));

    for (method, uri) in [
        ("GET", "/users/me"),
        ("POST", "/projects"),
        ("PUT", "/issues/order"),
        ("DELETE", "/issues/8b4f4b3e-51a5-4a43-9d0e-0b8a7b3b1a10"),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    assert_eq!(provider.membership_calls(), 0);
}

#[tokio::test]
async fn invalid_session_token_is_rejected() {
    let app = create_router(test_state(test_config(), provider_with_acme()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/organizations/acme")
                .header("authorization", "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn organization_visible_to_members_only() {
    let app = create_router(test_state(test_config(), provider_with_acme()));

    let member = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/organizations/acme")
                .header("authorization", format!("Bearer {}", session_token("user_1", None)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(member.status(), StatusCode::OK);
    let body = body_json(member).await;
    assert_eq!(body["data"]["id"], "org_1");

    let outsider = app
        .oneshot(
            Request::builder()
                .uri("/organizations/acme")
                .header("cookie", format!("__session={}", session_token("user_2", None)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(outsider.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhooks_disabled_without_secret() {
    let app = create_router(test_state(test_config(), provider_with_acme()));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhook_signature_is_enforced() {
    let mut config = test_config();
    config.webhook_signing_secret = Some(TEST_WEBHOOK_SECRET.to_string());
    let app = create_router(test_state(config, provider_with_acme()));

    let body = r#"{"type":"organizationMembership.deleted","data":{"organization":{"id":"org_1"}}}"#;
    let timestamp = chrono::Utc::now().timestamp().to_string();

    let unsigned = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", &timestamp)
                .header("svix-signature", "v1,AAAA")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(unsigned.status(), StatusCode::UNAUTHORIZED);

    let signature = WebhookVerifier::new(TEST_WEBHOOK_SECRET)
        .unwrap()
        .sign("msg_1", &timestamp, body.as_bytes())
        .unwrap();
    let signed = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_1")
                .header("svix-timestamp", &timestamp)
                .header("svix-signature", format!("v1,{}", signature))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(signed.status(), StatusCode::OK);
}

#[tokio::test]
async fn membership_webhook_fails_when_cache_cannot_be_cleared() {
    let mut config = test_config();
    config.webhook_signing_secret = Some(TEST_WEBHOOK_SECRET.to_string());
    let unreachable = redis::Client::open("redis://127.0.0.1:1/").unwrap();
    let identity = Arc::new(CachedIdentityProvider::new(
        provider_with_acme(),
        MembershipCache::new(unreachable, 60),
    ));
    let app = create_router(test_state(config, identity));

    let body = r#"{"type":"organizationMembership.deleted","data":{"organization":{"id":"org_1"}}}"#;
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = WebhookVerifier::new(TEST_WEBHOOK_SECRET)
        .unwrap()
        .sign("msg_2", &timestamp, body.as_bytes())
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/identity")
                .header("svix-id", "msg_2")
                .header("svix-timestamp", &timestamp)
                .header("svix-signature", format!("v1,{}", signature))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn organization_routes_deny_before_touching_the_database() {
    let provider = provider_with_acme();
    let mut config = test_config();
    config.database_url = "postgres://nobody@127.0.0.1:1/unreachable".to_string();
    let app = create_router(test_state(config, provider.clone()));

    let outsider = session_token("user_2", None);
    let member = session_token("user_1", None);
    for (method, uri, token) in [
        ("GET", "/organizations/org_1/projects", &outsider),
        ("GET", "/organizations/org_1/issues", &outsider),
        (
            "DELETE",
            "/projects/8b4f4b3e-51a5-4a43-9d0e-0b8a7b3b1a10?org_id=org_1",
            &member,
        ),
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{} {}", method, uri);
    }

    assert_eq!(provider.membership_calls(), 3);
}
