use chrono::{Duration, Utc};
use tracker_backend::db::enums::{IssuePriority, IssueStatus};
use tracker_backend::db::models::issue::{CreateIssueRequest, IssueOrderPatch};
use tracker_backend::db::models::project::CreateProjectRequest;
use tracker_backend::db::models::sprint::CreateSprintRequest;
use tracker_backend::error::AppError;
use tracker_backend::validation::issue::validate_order_patches;
use tracker_backend::validation::sprint::validate_sprint_window;
use tracker_backend::validation::validate_request;
use uuid::Uuid;

#[test]
fn project_request_rules() {
    let request = |name: &str, key: &str| CreateProjectRequest {
        name: name.to_string(),
        key: key.to_string(),
        description: None,
        org_id: Some("org_1".to_string()),
    };

    assert!(validate_request(&request("Alpha", "AL")).is_ok());
    assert!(validate_request(&request("Alpha", "ALPHA_1-X")).is_ok());
    assert!(validate_request(&request(&"n".repeat(101), "ALPHA")).is_err());
    assert!(validate_request(&request("Alpha", "ALPHA.1")).is_err());
}

#[test]
fn issue_request_rules() {
    let request = CreateIssueRequest {
        title: "Crash on save".to_string(),
        description: Some("Steps to reproduce".to_string()),
        status: IssueStatus::InReview,
        priority: IssuePriority::Urgent,
        sprint_id: None,
        assignee_id: Some(Uuid::new_v4()),
    };
    assert!(validate_request(&request).is_ok());

    let untitled = CreateIssueRequest {
        title: String::new(),
        ..request
    };
    match validate_request(&untitled) {
        Err(AppError::Validation { message }) => assert!(message.contains("title")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn order_batch_rules() {
    let id = Uuid::new_v4();
    let duplicate = vec![
        IssueOrderPatch {
            id,
            status: IssueStatus::Todo,
            order: 0,
        },
        IssueOrderPatch {
            id,
            status: IssueStatus::Done,
            order: 0,
        },
    ];
    assert!(validate_order_patches(&duplicate).is_err());
}

#[test]
fn sprint_window_rules() {
    let start = Utc::now();
    assert!(validate_sprint_window(start, start + Duration::weeks(2)).is_ok());
    assert!(validate_sprint_window(start, start - Duration::days(1)).is_err());
}

#[test]
fn sprint_names_may_be_blank() {
    let start = Utc::now();
    let request = |name: Option<&str>| CreateSprintRequest {
        name: name.map(str::to_string),
        start_date: start,
        end_date: start + Duration::weeks(2),
    };

    assert!(validate_request(&request(None)).is_ok());
    assert!(validate_request(&request(Some(""))).is_ok());
    assert!(validate_request(&request(Some("   "))).is_ok());
    assert!(validate_request(&request(Some("Sprint 7"))).is_ok());
    assert!(validate_request(&request(Some(&"s".repeat(256)))).is_err());
}
