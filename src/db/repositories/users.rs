use std::collections::HashMap;

use diesel::prelude::*;
use uuid::Uuid;

use crate::db::models::user::{NewUser, User};

pub struct UsersRepo;

impl UsersRepo {
    pub fn find_by_clerk_id(
        conn: &mut PgConnection,
        external_id: &str,
    ) -> Result<Option<User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        users
            .filter(clerk_user_id.eq(external_id))
            .first::<User>(conn)
            .optional()
    }

    pub fn exists(conn: &mut PgConnection, user_id: Uuid) -> Result<bool, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::select(diesel::dsl::exists(users.filter(id.eq(user_id)))).get_result(conn)
    }

    /// Inserts the mirrored account or refreshes its profile fields.
    pub fn upsert(
        conn: &mut PgConnection,
        new_user: &NewUser,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        diesel::insert_into(users)
            .values(new_user)
            .on_conflict(clerk_user_id)
            .do_update()
            .set((
                email.eq(&new_user.email),
                name.eq(&new_user.name),
                image_url.eq(&new_user.image_url),
                updated_at.eq(chrono::Utc::now()),
            ))
            .get_result(conn)
    }

    pub fn load_many(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, User>, diesel::result::Error> {
        use crate::schema::users::dsl::*;
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = users.filter(id.eq_any(user_ids)).load::<User>(conn)?;
        Ok(rows.into_iter().map(|user| (user.id, user)).collect())
    }
}
