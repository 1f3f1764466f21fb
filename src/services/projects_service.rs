use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::{
    db::models::api::SuccessFlag,
    db::models::project::{CreateProjectRequest, NewProject, Project, ProjectWithSprints},
    db::repositories::{projects::ProjectsRepo, sprints::SprintsRepo},
    error::AppError,
    identity::IdentityProvider,
    services::access::{OrgGrant, ensure_org_access, is_admin_role, org_role},
    services::context::SessionContext,
    services::users_service::UsersService,
    validation::validate_request,
};

fn key_exists() -> AppError {
    AppError::conflict_with_code(
        "Project key already exists in this organization",
        Some("key".into()),
        "PROJECT_KEY_EXISTS",
    )
}

pub struct ProjectsService;

impl ProjectsService {
    /// Resolves the target organization and requires an admin membership in it.
    pub async fn authorize_create(
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        req: &CreateProjectRequest,
    ) -> Result<OrgGrant, AppError> {
        let organization_id = session
            .org_id
            .clone()
            .or_else(|| req.org_id.clone())
            .ok_or_else(|| AppError::validation("No Organization Selected"))?;

        // The membership list is consulted even for the session org, so a
        // client-supplied org id is never trusted on its own.
        let role = identity
            .find_membership(&organization_id, &session.user_id)
            .await?
            .map(|membership| membership.role);
        if !is_admin_role(role.as_deref()) {
            tracing::warn!(
                user_id = %session.user_id,
                organization_id = %organization_id,
                "Project creation denied"
            );
            return Err(AppError::forbidden("Only organization admins can create projects"));
        }

        Ok(OrgGrant::new(organization_id, true))
    }

    pub async fn create(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        grant: &OrgGrant,
        req: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        if !grant.is_admin() {
            return Err(AppError::forbidden("Only organization admins can create projects"));
        }
        let organization_id = grant.organization_id();

        validate_request(req)?;

        if ProjectsRepo::exists_key_in_organization(conn, organization_id, &req.key)? {
            return Err(key_exists());
        }

        let creator = UsersService::resolve(conn, identity, session).await?;

        let new_project = NewProject {
            name: req.name.trim().to_string(),
            key: req.key.clone(),
            description: req.description.clone(),
            organization_id: organization_id.to_string(),
            admin_ids: vec![creator.id],
        };

        match ProjectsRepo::insert(conn, &new_project) {
            Ok(project) => {
                tracing::info!(project_id = %project.id, key = %project.key, "Project created");
                Ok(project)
            }
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Err(key_exists())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        grant: &OrgGrant,
    ) -> Result<Vec<Project>, AppError> {
        UsersService::resolve(conn, identity, session).await?;
        Ok(ProjectsRepo::list_by_organization(conn, grant.organization_id())?)
    }

    /// `None` when the project does not exist.
    pub async fn get(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        project_id: Uuid,
    ) -> Result<Option<ProjectWithSprints>, AppError> {
        UsersService::resolve(conn, identity, session).await?;

        let Some(project) = ProjectsRepo::find_by_id(conn, project_id)? else {
            return Ok(None);
        };
        ensure_org_access(identity, session, &project.organization_id).await?;

        let sprints = SprintsRepo::list_by_project(conn, project.id)?;
        Ok(Some(ProjectWithSprints { project, sprints }))
    }

    /// Admin rights come from the session when it targets its active
    /// organization, otherwise from the membership list.
    pub async fn authorize_delete(
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        requested_org_id: Option<String>,
    ) -> Result<OrgGrant, AppError> {
        let organization_id = session
            .org_id
            .clone()
            .or(requested_org_id)
            .ok_or_else(|| AppError::unauthorized("No organization selected"))?;

        let mut is_admin = is_admin_role(session.org_role.as_deref());
        if !is_admin && !session.is_active_org(&organization_id) {
            let role = org_role(identity, session, &organization_id).await?;
            is_admin = is_admin_role(role.as_deref());
        }
        if !is_admin {
            tracing::warn!(
                user_id = %session.user_id,
                organization_id = %organization_id,
                "Project deletion denied"
            );
            return Err(AppError::forbidden("Only organization admins can delete projects"));
        }

        Ok(OrgGrant::new(organization_id, true))
    }

    /// Removes the project with its sprints and issues.
    pub fn delete(
        conn: &mut PgConnection,
        grant: &OrgGrant,
        project_id: Uuid,
    ) -> Result<SuccessFlag, AppError> {
        if !grant.is_admin() {
            return Err(AppError::forbidden("Only organization admins can delete projects"));
        }

        match ProjectsRepo::find_by_id(conn, project_id)? {
            Some(project) if project.organization_id == grant.organization_id() => {}
            _ => return Err(AppError::not_found("Project")),
        }

        ProjectsRepo::delete_by_id(conn, project_id)?;
        tracing::info!(%project_id, "Project deleted");
        Ok(SuccessFlag::ok())
    }
}
