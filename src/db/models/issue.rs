use crate::db::enums::{IssuePriority, IssueStatus};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::project::Project;
use super::user::User;
use crate::validation::issue::validate_issue_title;

// Issue models
#[derive(Queryable, Selectable, Identifiable, Serialize, Deserialize, Clone, Debug)]
#[diesel(table_name = crate::schema::issues)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub priority: IssuePriority,
    pub project_id: Uuid,
    pub sprint_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::issues)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub status: IssueStatus,
    pub sort_order: i32,
    pub priority: IssuePriority,
    pub project_id: Uuid,
    pub sprint_id: Option<Uuid>,
    pub reporter_id: Uuid,
    pub assignee_id: Option<Uuid>,
}

/// Fields `updateIssue` is allowed to overwrite. `None` leaves the column untouched.
#[derive(AsChangeset, Default, Debug, Clone)]
#[diesel(table_name = crate::schema::issues)]
pub struct IssueChanges {
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

// Issue API DTOs
#[derive(Deserialize, Validate, Debug, Clone)]
pub struct CreateIssueRequest {
    #[validate(custom(function = "validate_issue_title"))]
    pub title: String,

    #[validate(length(max = 10000, message = "Issue description is too long (max 10000 characters)"))]
    pub description: Option<String>,

    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub sprint_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UpdateIssueRequest {
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
}

/// One drag-and-drop position change.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct IssueOrderPatch {
    pub id: Uuid,
    pub status: IssueStatus,
    pub order: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct UpdateIssueOrderRequest {
    pub issues: Vec<IssueOrderPatch>,
}

#[derive(Serialize, Debug, Clone)]
pub struct IssueWithUsers {
    #[serde(flatten)]
    pub issue: Issue,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
}

#[derive(Serialize, Debug, Clone)]
pub struct UserIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub project: Project,
    pub assignee: Option<User>,
    pub reporter: Option<User>,
}

/// The caller's issues inside one organization.
#[derive(Serialize, Debug, Default)]
pub struct UserIssues {
    pub assigned: Vec<UserIssue>,
    pub reported: Vec<UserIssue>,
}
