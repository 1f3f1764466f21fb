use diesel::prelude::*;

use crate::{
    db::models::user::User,
    db::repositories::users::UsersRepo,
    error::AppError,
    identity::{IdentityProvider, IdentityUser},
    services::context::SessionContext,
};

pub struct UsersService;

impl UsersService {
    /// Internal user for the session, mirrored from the identity provider on first sight.
    pub async fn resolve(
        conn: &mut PgConnection,
        identity: &dyn IdentityProvider,
        session: &SessionContext,
    ) -> Result<User, AppError> {
        if let Some(user) = UsersRepo::find_by_clerk_id(conn, &session.user_id)? {
            return Ok(user);
        }

        let Some(remote) = identity.user(&session.user_id).await? else {
            tracing::warn!(user_id = %session.user_id, "Session user unknown to identity provider");
            return Err(AppError::not_found("User"));
        };

        let user = Self::upsert_from_identity(conn, &remote)?;
        tracing::info!(user_id = %user.id, clerk_user_id = %user.clerk_user_id, "Synced user");
        Ok(user)
    }

    pub fn upsert_from_identity(
        conn: &mut PgConnection,
        remote: &IdentityUser,
    ) -> Result<User, AppError> {
        Ok(UsersRepo::upsert(conn, &remote.to_new_user())?)
    }
}
