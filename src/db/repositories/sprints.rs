use diesel::prelude::*;
use uuid::Uuid;

use crate::db::enums::SprintStatus;
use crate::db::models::project::Project;
use crate::db::models::sprint::{NewSprint, Sprint};

pub struct SprintsRepo;

impl SprintsRepo {
    pub fn find_with_project(
        conn: &mut PgConnection,
        sprint_id: Uuid,
    ) -> Result<Option<(Sprint, Project)>, diesel::result::Error> {
        use crate::schema::{projects, sprints};
        sprints::table
            .inner_join(projects::table)
            .filter(sprints::id.eq(sprint_id))
            .select((Sprint::as_select(), Project::as_select()))
            .first::<(Sprint, Project)>(conn)
            .optional()
    }

    pub fn belongs_to_project(
        conn: &mut PgConnection,
        sprint_id: Uuid,
        target_project_id: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::sprints::dsl::*;
        diesel::select(diesel::dsl::exists(
            sprints
                .filter(id.eq(sprint_id))
                .filter(project_id.eq(target_project_id)),
        ))
        .get_result(conn)
    }

    pub fn list_by_project(
        conn: &mut PgConnection,
        target_project_id: Uuid,
    ) -> Result<Vec<Sprint>, diesel::result::Error> {
        use crate::schema::sprints::dsl::*;
        sprints
            .filter(project_id.eq(target_project_id))
            .order(created_at.desc())
            .load::<Sprint>(conn)
    }

    pub fn count_by_project(
        conn: &mut PgConnection,
        target_project_id: Uuid,
    ) -> Result<i64, diesel::result::Error> {
        use crate::schema::sprints::dsl::*;
        sprints
            .filter(project_id.eq(target_project_id))
            .count()
            .get_result(conn)
    }

    pub fn insert(
        conn: &mut PgConnection,
        new_sprint: &NewSprint,
    ) -> Result<Sprint, diesel::result::Error> {
        diesel::insert_into(crate::schema::sprints::table)
            .values(new_sprint)
            .get_result(conn)
    }

    pub fn update_status(
        conn: &mut PgConnection,
        sprint_id: Uuid,
        next: SprintStatus,
    ) -> Result<Sprint, diesel::result::Error> {
        use crate::schema::sprints::dsl::*;
        diesel::update(sprints.filter(id.eq(sprint_id)))
            .set((status.eq(next), updated_at.eq(chrono::Utc::now())))
            .get_result(conn)
    }
}
