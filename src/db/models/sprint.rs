use crate::db::enums::SprintStatus;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Sprint models
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::sprints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Sprint {
    pub id: Uuid,
    pub name: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub status: SprintStatus,
    pub project_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::sprints)]
pub struct NewSprint {
    pub name: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub status: SprintStatus,
    pub project_id: Uuid,
}

#[derive(Deserialize, Validate, Debug, Clone)]
pub struct CreateSprintRequest {
    /// Blank names fall back to the generated `{KEY}-{n}` name.
    #[validate(length(max = 255, message = "Sprint name must be at most 255 characters"))]
    pub name: Option<String>,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UpdateSprintStatusRequest {
    pub status: SprintStatus,
}
