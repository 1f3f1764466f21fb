use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    db::enums::SprintStatus,
    db::models::project::Project,
    db::models::sprint::{CreateSprintRequest, NewSprint, Sprint},
    db::repositories::{projects::ProjectsRepo, sprints::SprintsRepo},
    error::AppError,
    identity::IdentityProvider,
    services::access::{ensure_org_access, is_admin_role, org_role},
    services::context::SessionContext,
    validation::sprint::{validate_sprint_transition, validate_sprint_window},
};

/// `{KEY}-{n}` where n counts the project's sprints including the new one.
pub fn default_sprint_name(project: &Project, existing: i64) -> String {
    format!("{}-{}", project.key, existing + 1)
}

pub struct SprintsService;

impl SprintsService {
    pub async fn create(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        project_id: Uuid,
        req: &CreateSprintRequest,
    ) -> Result<Sprint, AppError> {
        let project = ProjectsRepo::find_by_id(conn, project_id)?
            .ok_or_else(|| AppError::not_found("Project"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        validate_sprint_window(req.start_date, req.end_date)?;

        let name = match req.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_sprint_name(&project, SprintsRepo::count_by_project(conn, project.id)?),
        };

        let sprint = SprintsRepo::insert(
            conn,
            &NewSprint {
                name,
                start_date: req.start_date,
                end_date: req.end_date,
                status: SprintStatus::Planned,
                project_id: project.id,
            },
        )?;
        tracing::info!(sprint_id = %sprint.id, %project_id, "Sprint created");
        Ok(sprint)
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        sprint_id: Uuid,
        next: SprintStatus,
    ) -> Result<Sprint, AppError> {
        let (sprint, project) = SprintsRepo::find_with_project(conn, sprint_id)?
            .ok_or_else(|| AppError::not_found("Sprint"))?;
        ensure_org_access(identity, session, &project.organization_id).await?;

        let role = org_role(identity, session, &project.organization_id).await?;
        if !is_admin_role(role.as_deref()) {
            return Err(AppError::forbidden("Only organization admins can change sprint status"));
        }

        if sprint.status == next {
            return Ok(sprint);
        }
        validate_sprint_transition(&sprint, next, chrono::Utc::now())?;

        let updated = SprintsRepo::update_status(conn, sprint.id, next)?;
        tracing::info!(%sprint_id, status = ?next, "Sprint status changed");
        Ok(updated)
    }
}
