//! Service tests against a real Postgres. Each test runs inside a test
//! transaction that is never committed.

use chrono::{Duration, Utc};
use diesel::prelude::*;
use tracker_backend::db::enums::{IssuePriority, IssueStatus, SprintStatus};
use tracker_backend::db::models::issue::{
    CreateIssueRequest, Issue, IssueOrderPatch, UpdateIssueRequest,
};
use tracker_backend::db::models::project::{CreateProjectRequest, Project};
use tracker_backend::db::models::sprint::CreateSprintRequest;
use tracker_backend::db::repositories::issues::IssueRepo;
use tracker_backend::db::repositories::sprints::SprintsRepo;
use tracker_backend::error::AppError;
use tracker_backend::identity::{ADMIN_ROLE, IdentityUser, InMemoryIdentityProvider};
use tracker_backend::services::access::grant_member;
use tracker_backend::services::{
    IssuesService, ProjectsService, SessionContext, SprintsService, UsersService,
};
use uuid::Uuid;

struct Fixture {
    conn: PgConnection,
    identity: InMemoryIdentityProvider,
    org_id: String,
    admin: SessionContext,
    member: SessionContext,
}

fn identity_user(id: &str) -> IdentityUser {
    IdentityUser {
        id: id.to_string(),
        first_name: Some("Test".to_string()),
        last_name: Some(id.to_string()),
        image_url: None,
        email_addresses: vec![],
        primary_email_address_id: None,
    }
}

fn fixture() -> Fixture {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut conn = PgConnection::establish(&url).unwrap();
    conn.begin_test_transaction().unwrap();

    let org_id = format!("org_{}", Uuid::new_v4().simple());
    let admin_id = format!("user_{}", Uuid::new_v4().simple());
    let member_id = format!("user_{}", Uuid::new_v4().simple());

    let identity = InMemoryIdentityProvider::new()
        .with_member(&org_id, &admin_id, ADMIN_ROLE)
        .with_member(&org_id, &member_id, "org:member");
    identity.add_user(identity_user(&admin_id));
    identity.add_user(identity_user(&member_id));

    Fixture {
        conn,
        identity,
        admin: SessionContext::new(admin_id).with_org(org_id.clone(), ADMIN_ROLE),
        member: SessionContext::new(member_id).with_org(org_id.clone(), "org:member"),
        org_id,
    }
}

fn project_request(name: &str, key: &str, org_id: Option<String>) -> CreateProjectRequest {
    CreateProjectRequest {
        name: name.to_string(),
        key: key.to_string(),
        description: None,
        org_id,
    }
}

async fn create_project(
    conn: &mut PgConnection,
    identity: &InMemoryIdentityProvider,
    session: &SessionContext,
    request: &CreateProjectRequest,
) -> Result<Project, AppError> {
    let grant = ProjectsService::authorize_create(identity, session, request).await?;
    ProjectsService::create(conn, identity, session, &grant, request).await
}

async fn project(fx: &mut Fixture, key: &str) -> Project {
    let request = project_request(&format!("Project {}", key), key, None);
    create_project(&mut fx.conn, &fx.identity, &fx.admin, &request)
        .await
        .unwrap()
}

fn issue_request(title: &str, status: IssueStatus) -> CreateIssueRequest {
    CreateIssueRequest {
        title: title.to_string(),
        description: None,
        status,
        priority: IssuePriority::Medium,
        sprint_id: None,
        assignee_id: None,
    }
}

async fn add_issue(
    conn: &mut PgConnection,
    identity: &InMemoryIdentityProvider,
    session: &SessionContext,
    project_id: Uuid,
    title: &str,
) -> Issue {
    let request = issue_request(title, IssueStatus::Todo);
    IssuesService::create(conn, identity, session, project_id, &request)
        .await
        .unwrap()
        .issue
}

fn sprint_window() -> CreateSprintRequest {
    let now = Utc::now();
    CreateSprintRequest {
        name: None,
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(13),
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn orders_append_within_status_column() {
    let mut fx = fixture();
    let project = project(&mut fx, "ORD").await;

    let mut orders = Vec::new();
    for (title, status) in [
        ("first", IssueStatus::Todo),
        ("second", IssueStatus::Todo),
        ("done", IssueStatus::Done),
        ("third", IssueStatus::Todo),
    ] {
        let created = IssuesService::create(
            &mut fx.conn,
            &fx.identity,
            &fx.member,
            project.id,
            &issue_request(title, status),
        )
        .await
        .unwrap();
        assert!(created.reporter.is_some());
        orders.push(created.issue.sort_order);
    }

    assert_eq!(orders, vec![0, 1, 0, 2]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn full_column_rejects_new_issues() {
    let mut fx = fixture();
    let project = project(&mut fx, "TOP").await;
    let top = add_issue(&mut fx.conn, &fx.identity, &fx.member, project.id, "top").await;

    let to_top = vec![IssueOrderPatch {
        id: top.id,
        status: IssueStatus::Todo,
        order: i32::MAX,
    }];
    IssuesService::update_order(&mut fx.conn, &fx.identity, &fx.member, &to_top)
        .await
        .unwrap();

    let err = IssuesService::create(
        &mut fx.conn,
        &fx.identity,
        &fx.member,
        project.id,
        &issue_request("overflow", IssueStatus::Todo),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn reorder_is_all_or_nothing() {
    let mut fx = fixture();
    let alpha = project(&mut fx, "ALPHA").await;
    let beta = project(&mut fx, "BETA").await;

    let a1 = add_issue(&mut fx.conn, &fx.identity, &fx.admin, alpha.id, "a1").await;
    let a2 = add_issue(&mut fx.conn, &fx.identity, &fx.admin, alpha.id, "a2").await;
    let b1 = add_issue(&mut fx.conn, &fx.identity, &fx.admin, beta.id, "b1").await;

    // A patch outside the first issue's project aborts the batch.
    let mixed = vec![
        IssueOrderPatch {
            id: a1.id,
            status: IssueStatus::Done,
            order: 7,
        },
        IssueOrderPatch {
            id: b1.id,
            status: IssueStatus::Done,
            order: 8,
        },
    ];
    let err = IssuesService::update_order(&mut fx.conn, &fx.identity, &fx.member, &mixed)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));

    let unchanged = IssueRepo::find_by_id(&mut fx.conn, a1.id).unwrap().unwrap();
    assert_eq!(unchanged.status, IssueStatus::Todo);
    assert_eq!(unchanged.sort_order, 0);

    let swap = vec![
        IssueOrderPatch {
            id: a2.id,
            status: IssueStatus::InProgress,
            order: 0,
        },
        IssueOrderPatch {
            id: a1.id,
            status: IssueStatus::InProgress,
            order: 1,
        },
    ];
    let result = IssuesService::update_order(&mut fx.conn, &fx.identity, &fx.member, &swap)
        .await
        .unwrap();
    assert!(result.success);

    let moved = IssueRepo::find_by_id(&mut fx.conn, a1.id).unwrap().unwrap();
    assert_eq!(moved.status, IssueStatus::InProgress);
    assert_eq!(moved.sort_order, 1);

    let empty = IssuesService::update_order(&mut fx.conn, &fx.identity, &fx.member, &[])
        .await
        .unwrap();
    assert!(empty.success);
}

#[tokio::test]
#[ignore = "requires database"]
async fn issue_creation_checks_sprint_and_assignee() {
    let mut fx = fixture();
    let web = project(&mut fx, "WEB").await;
    let api = project(&mut fx, "API").await;
    let api_sprint =
        SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, api.id, &sprint_window())
            .await
            .unwrap();

    let mut foreign_sprint = issue_request("wrong sprint", IssueStatus::Todo);
    foreign_sprint.sprint_id = Some(api_sprint.id);
    let err = IssuesService::create(&mut fx.conn, &fx.identity, &fx.member, web.id, &foreign_sprint)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let mut ghost_assignee = issue_request("nobody", IssueStatus::Todo);
    ghost_assignee.assignee_id = Some(Uuid::new_v4());
    let err = IssuesService::create(&mut fx.conn, &fx.identity, &fx.member, web.id, &ghost_assignee)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn issue_update_overwrites_given_fields_only() {
    let mut fx = fixture();
    let project = project(&mut fx, "UPD").await;
    let issue = add_issue(&mut fx.conn, &fx.identity, &fx.member, project.id, "flaky test").await;

    let status_only = UpdateIssueRequest {
        status: Some(IssueStatus::Done),
        priority: None,
    };
    let updated =
        IssuesService::update(&mut fx.conn, &fx.identity, &fx.member, issue.id, &status_only)
            .await
            .unwrap();
    assert_eq!(updated.issue.status, IssueStatus::Done);
    assert_eq!(updated.issue.priority, IssuePriority::Medium);
    assert_eq!(updated.issue.title, "flaky test");

    let untouched = IssuesService::update(
        &mut fx.conn,
        &fx.identity,
        &fx.member,
        issue.id,
        &UpdateIssueRequest::default(),
    )
    .await
    .unwrap();
    assert_eq!(untouched.issue.status, IssueStatus::Done);
    assert_eq!(untouched.issue.updated_at, updated.issue.updated_at);

    let outsider = SessionContext::new("user_outsider");
    let err = IssuesService::update(&mut fx.conn, &fx.identity, &outsider, issue.id, &status_only)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let err =
        IssuesService::update(&mut fx.conn, &fx.identity, &fx.member, Uuid::new_v4(), &status_only)
            .await
            .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn delete_requires_reporter_or_project_admin() {
    let mut fx = fixture();
    let project = project(&mut fx, "DEL").await;

    let by_admin = add_issue(&mut fx.conn, &fx.identity, &fx.admin, project.id, "admin's").await;
    let by_member = add_issue(&mut fx.conn, &fx.identity, &fx.member, project.id, "member's").await;

    let err = IssuesService::delete(&mut fx.conn, &fx.identity, &fx.member, by_admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    // The project creator is a project admin and may delete anyone's issue.
    assert!(
        IssuesService::delete(&mut fx.conn, &fx.identity, &fx.admin, by_member.id)
            .await
            .is_ok()
    );
    assert!(
        IssuesService::delete(&mut fx.conn, &fx.identity, &fx.admin, by_admin.id)
            .await
            .is_ok()
    );
    assert!(IssueRepo::find_by_id(&mut fx.conn, by_admin.id).unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn project_creation_rules() {
    let mut fx = fixture();
    let request = project_request("Web", "WEB", None);

    let err = create_project(&mut fx.conn, &fx.identity, &fx.member, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let created = create_project(&mut fx.conn, &fx.identity, &fx.admin, &request)
        .await
        .unwrap();
    assert_eq!(created.organization_id, fx.org_id);
    assert_eq!(created.admin_ids.len(), 1);

    let err = create_project(&mut fx.conn, &fx.identity, &fx.admin, &request)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { .. }));

    let grant = grant_member(&fx.identity, &fx.member, &fx.org_id).await.unwrap();
    let listed = ProjectsService::list(&mut fx.conn, &fx.identity, &fx.member, &grant)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let outsider = SessionContext::new("user_outsider");
    let err = create_project(
        &mut fx.conn,
        &fx.identity,
        &outsider,
        &project_request("Web", "WEB2", Some(fx.org_id.clone())),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn project_lookup_lists_newest_sprints_first() {
    use tracker_backend::schema::sprints;

    let mut fx = fixture();
    let missing = ProjectsService::get(&mut fx.conn, &fx.identity, &fx.member, Uuid::new_v4())
        .await
        .unwrap();
    assert!(missing.is_none());

    let project = project(&mut fx, "GET").await;
    let older =
        SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &sprint_window())
            .await
            .unwrap();
    let newer =
        SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &sprint_window())
            .await
            .unwrap();
    diesel::update(sprints::table.filter(sprints::id.eq(older.id)))
        .set(sprints::created_at.eq(Utc::now() - Duration::days(2)))
        .execute(&mut fx.conn)
        .unwrap();

    let found = ProjectsService::get(&mut fx.conn, &fx.identity, &fx.member, project.id)
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<Uuid> = found.sprints.iter().map(|sprint| sprint.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);

    let outsider = SessionContext::new("user_outsider");
    let err = ProjectsService::get(&mut fx.conn, &fx.identity, &outsider, project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn project_deletion_rules() {
    let mut fx = fixture();
    let project = project(&mut fx, "GONE").await;
    let sprint =
        SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &sprint_window())
            .await
            .unwrap();
    let issue = add_issue(&mut fx.conn, &fx.identity, &fx.member, project.id, "doomed").await;

    let err = ProjectsService::authorize_delete(&fx.identity, &fx.member, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let no_org = SessionContext::new(fx.member.user_id.clone());
    let err = ProjectsService::authorize_delete(&fx.identity, &no_org, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized { .. }));

    // Without an active organization the requested org is checked against memberships.
    let err = ProjectsService::authorize_delete(&fx.identity, &no_org, Some(fx.org_id.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let other_org = format!("org_{}", Uuid::new_v4().simple());
    fx.identity.add_member(&other_org, &fx.admin.user_id, ADMIN_ROLE);
    let elsewhere = SessionContext::new(fx.admin.user_id.clone()).with_org(other_org, ADMIN_ROLE);
    let foreign = create_project(
        &mut fx.conn,
        &fx.identity,
        &elsewhere,
        &project_request("Elsewhere", "ELSE", None),
    )
    .await
    .unwrap();

    let grant = ProjectsService::authorize_delete(&fx.identity, &fx.admin, None)
        .await
        .unwrap();
    let err = ProjectsService::delete(&mut fx.conn, &grant, foreign.id).unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));

    let admin_without_org = SessionContext::new(fx.admin.user_id.clone());
    let grant = ProjectsService::authorize_delete(
        &fx.identity,
        &admin_without_org,
        Some(fx.org_id.clone()),
    )
    .await
    .unwrap();
    assert_eq!(grant.organization_id(), fx.org_id);

    let result = ProjectsService::delete(&mut fx.conn, &grant, project.id).unwrap();
    assert!(result.success);
    assert!(IssueRepo::find_by_id(&mut fx.conn, issue.id).unwrap().is_none());
    assert!(SprintsRepo::find_with_project(&mut fx.conn, sprint.id).unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires database"]
async fn user_issues_split_assigned_and_reported() {
    let mut fx = fixture();
    let project = project(&mut fx, "MINE").await;
    let admin_user = UsersService::resolve(&mut fx.conn, &fx.identity, &fx.admin)
        .await
        .unwrap();
    let member_user = UsersService::resolve(&mut fx.conn, &fx.identity, &fx.member)
        .await
        .unwrap();

    let mut for_admin = issue_request("reported by member", IssueStatus::Todo);
    for_admin.assignee_id = Some(admin_user.id);
    let reported =
        IssuesService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &for_admin)
            .await
            .unwrap()
            .issue;

    let mut for_member = issue_request("assigned to member", IssueStatus::Todo);
    for_member.assignee_id = Some(member_user.id);
    let assigned =
        IssuesService::create(&mut fx.conn, &fx.identity, &fx.admin, project.id, &for_member)
            .await
            .unwrap()
            .issue;

    let grant = grant_member(&fx.identity, &fx.member, &fx.org_id).await.unwrap();
    let mine = IssuesService::list_for_user(&mut fx.conn, &fx.identity, &fx.member, &grant)
        .await
        .unwrap();

    let assigned_ids: Vec<Uuid> = mine.assigned.iter().map(|row| row.issue.id).collect();
    let reported_ids: Vec<Uuid> = mine.reported.iter().map(|row| row.issue.id).collect();
    assert_eq!(assigned_ids, vec![assigned.id]);
    assert_eq!(reported_ids, vec![reported.id]);
    assert_eq!(mine.assigned[0].project.id, project.id);
    assert_eq!(
        mine.reported[0].assignee.as_ref().map(|user| user.id),
        Some(admin_user.id)
    );
}

#[tokio::test]
#[ignore = "requires database"]
async fn sprint_lifecycle() {
    let mut fx = fixture();
    let project = project(&mut fx, "SPR").await;
    let window = sprint_window();

    let sprint = SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &window)
        .await
        .unwrap();
    assert_eq!(sprint.name, "SPR-1");
    assert_eq!(sprint.status, SprintStatus::Planned);

    let err = SprintsService::update_status(
        &mut fx.conn,
        &fx.identity,
        &fx.admin,
        sprint.id,
        SprintStatus::Completed,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));

    let err = SprintsService::update_status(
        &mut fx.conn,
        &fx.identity,
        &fx.member,
        sprint.id,
        SprintStatus::Active,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));

    let active = SprintsService::update_status(
        &mut fx.conn,
        &fx.identity,
        &fx.admin,
        sprint.id,
        SprintStatus::Active,
    )
    .await
    .unwrap();
    assert_eq!(active.status, SprintStatus::Active);

    let mut in_sprint = issue_request("sprint work", IssueStatus::Todo);
    in_sprint.sprint_id = Some(sprint.id);
    IssuesService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &in_sprint)
        .await
        .unwrap();
    let listed = IssuesService::for_sprint(&mut fx.conn, &fx.identity, &fx.member, sprint.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let second = SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &window)
        .await
        .unwrap();
    assert_eq!(second.name, "SPR-2");

    let blank = CreateSprintRequest {
        name: Some("   ".to_string()),
        ..window
    };
    let third = SprintsService::create(&mut fx.conn, &fx.identity, &fx.member, project.id, &blank)
        .await
        .unwrap();
    assert_eq!(third.name, "SPR-3");
}
