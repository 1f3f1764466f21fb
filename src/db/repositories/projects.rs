use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::project::{NewProject, Project};

pub struct ProjectsRepo;

impl ProjectsRepo {
    pub fn exists_key_in_organization(
        conn: &mut PgConnection,
        org: &str,
        project_key: &str,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        diesel::select(diesel::dsl::exists(
            projects
                .filter(organization_id.eq(org))
                .filter(key.eq(project_key)),
        ))
        .get_result(conn)
    }

    pub fn insert(
        conn: &mut PgConnection,
        new_project: &NewProject,
    ) -> Result<Project, diesel::result::Error> {
        diesel::insert_into(crate::schema::projects::table)
            .values(new_project)
            .get_result(conn)
    }

    pub fn find_by_id(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<Option<Project>, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        projects
            .filter(id.eq(project_id))
            .first::<Project>(conn)
            .optional()
    }

    /// Locks the project row until the surrounding transaction ends.
    pub fn lock_by_id(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<Option<Project>, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        projects
            .filter(id.eq(project_id))
            .for_update()
            .first::<Project>(conn)
            .optional()
    }

    pub fn list_by_organization(
        conn: &mut PgConnection,
        org: &str,
    ) -> Result<Vec<Project>, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        projects
            .filter(organization_id.eq(org))
            .order(created_at.desc())
            .load::<Project>(conn)
    }

    pub fn delete_by_id(
        conn: &mut PgConnection,
        project_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::projects::dsl::*;
        diesel::delete(projects.filter(id.eq(project_id))).execute(conn)
    }
}
