use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;

/// Verified session of the calling user, placed in request extensions by the
/// session middleware.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionContext {
    /// External (identity provider) user id.
    pub user_id: String,
    pub org_id: Option<String>,
    pub org_role: Option<String>,
    pub org_slug: Option<String>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: None,
            org_role: None,
            org_slug: None,
        }
    }

    pub fn with_org(mut self, org_id: impl Into<String>, org_role: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self.org_role = Some(org_role.into());
        self
    }

    pub fn is_active_org(&self, organization_id: &str) -> bool {
        self.org_id.as_deref() == Some(organization_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Unauthorized"))
    }
}
