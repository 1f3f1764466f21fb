use diesel::prelude::*;
use uuid::Uuid;

use crate::db::enums::IssueStatus;
use crate::db::models::issue::{
    Issue, IssueChanges, IssueOrderPatch, IssueWithUsers, NewIssue, UserIssue,
};
use crate::db::models::project::Project;
use crate::db::repositories::users::UsersRepo;
use crate::error::AppError;

pub struct IssueRepo;

impl IssueRepo {
    pub fn find_by_id(
        conn: &mut PgConnection,
        issue_id: Uuid,
    ) -> Result<Option<Issue>, diesel::result::Error> {
        use crate::schema::issues::dsl::*;
        issues
            .filter(id.eq(issue_id))
            .first::<Issue>(conn)
            .optional()
    }

    pub fn find_with_project(
        conn: &mut PgConnection,
        issue_id: Uuid,
    ) -> Result<Option<(Issue, Project)>, diesel::result::Error> {
        use crate::schema::{issues, projects};
        issues::table
            .inner_join(projects::table)
            .filter(issues::id.eq(issue_id))
            .select((Issue::as_select(), Project::as_select()))
            .first::<(Issue, Project)>(conn)
            .optional()
    }

    /// Highest rank in a (project, status) column, `None` when the column is empty.
    pub fn max_order(
        conn: &mut PgConnection,
        target_project_id: Uuid,
        target_status: IssueStatus,
    ) -> Result<Option<i32>, diesel::result::Error> {
        use crate::schema::issues::dsl::*;
        issues
            .filter(project_id.eq(target_project_id))
            .filter(status.eq(target_status))
            .select(diesel::dsl::max(sort_order))
            .get_result::<Option<i32>>(conn)
    }

    pub fn list_by_sprint(
        conn: &mut PgConnection,
        target_sprint_id: Uuid,
    ) -> Result<Vec<Issue>, diesel::result::Error> {
        use crate::schema::issues::dsl::*;
        issues
            .filter(sprint_id.eq(target_sprint_id))
            .order((status.asc(), sort_order.asc()))
            .load::<Issue>(conn)
    }

    pub fn list_assigned_in_organization(
        conn: &mut PgConnection,
        organization: &str,
        user_id: Uuid,
    ) -> Result<Vec<(Issue, Project)>, diesel::result::Error> {
        use crate::schema::{issues, projects};
        issues::table
            .inner_join(projects::table)
            .filter(projects::organization_id.eq(organization))
            .filter(issues::assignee_id.eq(user_id))
            .order(issues::updated_at.desc())
            .select((Issue::as_select(), Project::as_select()))
            .load::<(Issue, Project)>(conn)
    }

    pub fn list_reported_in_organization(
        conn: &mut PgConnection,
        organization: &str,
        user_id: Uuid,
    ) -> Result<Vec<(Issue, Project)>, diesel::result::Error> {
        use crate::schema::{issues, projects};
        issues::table
            .inner_join(projects::table)
            .filter(projects::organization_id.eq(organization))
            .filter(issues::reporter_id.eq(user_id))
            .order(issues::updated_at.desc())
            .select((Issue::as_select(), Project::as_select()))
            .load::<(Issue, Project)>(conn)
    }

    pub fn insert(
        conn: &mut PgConnection,
        new_issue: &NewIssue,
    ) -> Result<Issue, diesel::result::Error> {
        diesel::insert_into(crate::schema::issues::table)
            .values(new_issue)
            .get_result(conn)
    }

    pub fn update_changes(
        conn: &mut PgConnection,
        issue_id: Uuid,
        changes: &IssueChanges,
    ) -> Result<Issue, diesel::result::Error> {
        use crate::schema::issues::dsl::*;
        diesel::update(issues.filter(id.eq(issue_id)))
            .set(changes)
            .get_result(conn)
    }

    /// Applies every patch or none. Each update is scoped to `scope_project_id`;
    /// a patch that matches no row aborts the whole batch.
    pub fn apply_order(
        conn: &mut PgConnection,
        scope_project_id: Uuid,
        patches: &[IssueOrderPatch],
    ) -> Result<(), AppError> {
        use crate::schema::issues::dsl::*;
        conn.transaction::<_, AppError, _>(|conn| {
            let now = chrono::Utc::now();
            for patch in patches {
                let updated = diesel::update(
                    issues
                        .filter(id.eq(patch.id))
                        .filter(project_id.eq(scope_project_id)),
                )
                .set((
                    status.eq(patch.status),
                    sort_order.eq(patch.order),
                    updated_at.eq(now),
                ))
                .execute(conn)?;

                if updated == 0 {
                    return Err(AppError::not_found(format!("Issue {}", patch.id)));
                }
            }
            Ok(())
        })
    }

    pub fn delete_by_id(
        conn: &mut PgConnection,
        issue_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::issues::dsl::*;
        diesel::delete(issues.filter(id.eq(issue_id))).execute(conn)
    }

    fn related_user_ids<'a>(rows: impl Iterator<Item = &'a Issue>) -> Vec<Uuid> {
        let mut user_ids: Vec<Uuid> = rows
            .flat_map(|issue| std::iter::once(issue.reporter_id).chain(issue.assignee_id))
            .collect();
        user_ids.sort_unstable();
        user_ids.dedup();
        user_ids
    }

    /// Joins assignee and reporter onto each issue with one user query.
    pub fn with_users(
        conn: &mut PgConnection,
        rows: Vec<Issue>,
    ) -> Result<Vec<IssueWithUsers>, diesel::result::Error> {
        let users = UsersRepo::load_many(conn, &Self::related_user_ids(rows.iter()))?;
        Ok(rows
            .into_iter()
            .map(|issue| IssueWithUsers {
                assignee: issue.assignee_id.and_then(|uid| users.get(&uid).cloned()),
                reporter: users.get(&issue.reporter_id).cloned(),
                issue,
            })
            .collect())
    }

    pub fn with_project_and_users(
        conn: &mut PgConnection,
        rows: Vec<(Issue, Project)>,
    ) -> Result<Vec<UserIssue>, diesel::result::Error> {
        let user_ids = Self::related_user_ids(rows.iter().map(|(issue, _)| issue));
        let users = UsersRepo::load_many(conn, &user_ids)?;
        Ok(rows
            .into_iter()
            .map(|(issue, project)| UserIssue {
                assignee: issue.assignee_id.and_then(|uid| users.get(&uid).cloned()),
                reporter: users.get(&issue.reporter_id).cloned(),
                project,
                issue,
            })
            .collect())
    }
}
