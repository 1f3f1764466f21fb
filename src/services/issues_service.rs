use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::models::api::SuccessFlag,
    db::models::issue::{
        CreateIssueRequest, Issue, IssueChanges, IssueOrderPatch, IssueWithUsers, NewIssue,
        UpdateIssueRequest, UserIssues,
    },
    db::models::project::Project,
    db::repositories::{
        issues::IssueRepo, projects::ProjectsRepo, sprints::SprintsRepo, users::UsersRepo,
    },
    error::AppError,
    identity::IdentityProvider,
    services::access::{OrgGrant, ensure_org_access},
    services::context::SessionContext,
    services::users_service::UsersService,
    validation::issue::validate_order_patches,
    validation::validate_request,
};

/// Rank for a new issue appended to a status column.
pub fn next_order(current_max: Option<i32>) -> Result<i32, AppError> {
    match current_max {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            AppError::conflict_with_code(
                "No order left in this status column",
                Some("order".into()),
                "ORDER_EXHAUSTED",
            )
        }),
    }
}

/// Only the reporter or a project admin may delete an issue.
pub fn can_delete_issue(issue: &Issue, project: &Project, user_id: Uuid) -> bool {
    issue.reporter_id == user_id || project.is_admin(user_id)
}

pub struct IssuesService;

impl IssuesService {
    pub async fn for_sprint(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        sprint_id: Uuid,
    ) -> Result<Vec<IssueWithUsers>, AppError> {
        let (_, project) = SprintsRepo::find_with_project(conn, sprint_id)?
            .ok_or_else(|| AppError::not_found("Sprint"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        let rows = IssueRepo::list_by_sprint(conn, sprint_id)?;
        Ok(IssueRepo::with_users(conn, rows)?)
    }

    pub async fn create(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        project_id: Uuid,
        req: &CreateIssueRequest,
    ) -> Result<IssueWithUsers, AppError> {
        let project = ProjectsRepo::find_by_id(conn, project_id)?
            .ok_or_else(|| AppError::not_found("Project"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        validate_request(req)?;

        if let Some(sprint_id) = req.sprint_id {
            if !SprintsRepo::belongs_to_project(conn, sprint_id, project.id)? {
                return Err(AppError::validation("Sprint does not belong to this project"));
            }
        }
        if let Some(assignee_id) = req.assignee_id {
            if !UsersRepo::exists(conn, assignee_id)? {
                return Err(AppError::validation("Assignee does not exist"));
            }
        }

        let reporter = UsersService::resolve(conn, identity, session).await?;

        // The project row lock serializes order assignment per project.
        let issue = conn.transaction::<_, AppError, _>(|conn| {
            ProjectsRepo::lock_by_id(conn, project.id)?
                .ok_or_else(|| AppError::not_found("Project"))?;
            let sort_order = next_order(IssueRepo::max_order(conn, project.id, req.status)?)?;

            let new_issue = NewIssue {
                title: req.title.trim().to_string(),
                description: req.description.clone(),
                status: req.status,
                sort_order,
                priority: req.priority,
                project_id: project.id,
                sprint_id: req.sprint_id,
                reporter_id: reporter.id,
                assignee_id: req.assignee_id,
            };
            Ok(IssueRepo::insert(conn, &new_issue)?)
        })?;

        tracing::info!(
            issue_id = %issue.id,
            %project_id,
            order = issue.sort_order,
            "Issue created"
        );
        Self::single_with_users(conn, issue)
    }

    /// Applies a drag-and-drop batch atomically inside the first issue's project.
    pub async fn update_order(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        patches: &[IssueOrderPatch],
    ) -> Result<SuccessFlag, AppError> {
        let Some(first) = patches.first() else {
            return Ok(SuccessFlag::ok());
        };
        validate_order_patches(patches)?;

        let (_, project) = IssueRepo::find_with_project(conn, first.id)?
            .ok_or_else(|| AppError::not_found("Issue"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        IssueRepo::apply_order(conn, project.id, patches)?;
        tracing::debug!(project_id = %project.id, count = patches.len(), "Issue order updated");
        Ok(SuccessFlag::ok())
    }

    pub async fn update(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        issue_id: Uuid,
        req: &UpdateIssueRequest,
    ) -> Result<IssueWithUsers, AppError> {
        Self::apply_update(conn, identity, session, issue_id, req)
            .await
            .inspect_err(|e| tracing::error!(%issue_id, error = %e, "Failed to update issue"))
    }

    async fn apply_update(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        issue_id: Uuid,
        req: &UpdateIssueRequest,
    ) -> Result<IssueWithUsers, AppError> {
        let (issue, project) = IssueRepo::find_with_project(conn, issue_id)?
            .ok_or_else(|| AppError::not_found("Issue"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        if req.status.is_none() && req.priority.is_none() {
            return Self::single_with_users(conn, issue);
        }

        let changes = IssueChanges {
            status: req.status,
            priority: req.priority,
            updated_at: Some(Utc::now()),
        };
        let updated = IssueRepo::update_changes(conn, issue.id, &changes)?;
        Self::single_with_users(conn, updated)
    }

    pub async fn delete(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        issue_id: Uuid,
    ) -> Result<SuccessFlag, AppError> {
        let user = UsersService::resolve(conn, identity, session).await?;

        let (issue, project) = IssueRepo::find_with_project(conn, issue_id)?
            .ok_or_else(|| AppError::not_found("Issue"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        if !can_delete_issue(&issue, &project, user.id) {
            tracing::warn!(%issue_id, user_id = %user.id, "Issue deletion denied");
            return Err(AppError::forbidden("You don't have permission to delete this issue"));
        }

        IssueRepo::delete_by_id(conn, issue.id)?;
        tracing::info!(%issue_id, "Issue deleted");
        Ok(SuccessFlag::ok())
    }

    /// The caller's assigned and reported issues across one organization's projects.
    pub async fn list_for_user(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        grant: &OrgGrant,
    ) -> Result<UserIssues, AppError> {
        let organization_id = grant.organization_id();
        let user = UsersService::resolve(conn, identity, session).await?;

        let assigned = IssueRepo::list_assigned_in_organization(conn, organization_id, user.id)?;
        let reported = IssueRepo::list_reported_in_organization(conn, organization_id, user.id)?;

        Ok(UserIssues {
            assigned: IssueRepo::with_project_and_users(conn, assigned)?,
            reported: IssueRepo::with_project_and_users(conn, reported)?,
        })
    }

    fn single_with_users(
        conn: &mut PgConnection,
        issue: Issue,
    ) -> Result<IssueWithUsers, AppError> {
        IssueRepo::with_users(conn, vec![issue])?
            .pop()
            .ok_or_else(|| AppError::internal("Issue vanished while loading users"))
    }
}
