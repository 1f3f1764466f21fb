use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::sprint::Sprint;
use crate::validation::project::validate_project_key;

// Project models
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub organization_id: String,
    pub admin_ids: Vec<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Project {
    pub fn is_admin(&self, user_id: Uuid) -> bool {
        self.admin_ids.contains(&user_id)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::projects)]
pub struct NewProject {
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub organization_id: String,
    pub admin_ids: Vec<Uuid>,
}

// Project API DTOs
#[derive(Deserialize, Validate, Debug, Clone)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100, message = "Project name must be between 1 and 100 characters"))]
    pub name: String,

    #[validate(
        length(min = 2, max = 10, message = "Project key must be between 2 and 10 characters"),
        custom(function = "validate_project_key")
    )]
    pub key: String,

    #[validate(length(max = 10000, message = "Project description is too long"))]
    pub description: Option<String>,

    /// Used only when the session carries no active organization.
    pub org_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DeleteProjectQuery {
    pub org_id: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct ProjectWithSprints {
    #[serde(flatten)]
    pub project: Project,
    pub sprints: Vec<Sprint>,
}
