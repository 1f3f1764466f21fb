use crate::error::AppError;
use crate::identity::IdentityProvider;
use crate::services::context::SessionContext;

pub use crate::identity::ADMIN_ROLE;

pub fn is_admin_role(role: Option<&str>) -> bool {
    role == Some(ADMIN_ROLE)
}

/// Proof that the session was cleared to act inside one organization.
///
/// Authorization that needs no database row is resolved into a grant first,
/// so the identity provider is never awaited while a pooled connection is held.
#[derive(Debug, Clone, PartialEq)]
pub struct OrgGrant {
    organization_id: String,
    admin: bool,
}

impl OrgGrant {
    pub(crate) fn new(organization_id: impl Into<String>, admin: bool) -> Self {
        Self {
            organization_id: organization_id.into(),
            admin,
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// True only when admin rights were proven while granting.
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}

/// Grant for any member of the organization.
pub async fn grant_member(
    identity: &dyn IdentityProvider,
    session: &SessionContext,
    organization_id: &str,
) -> Result<OrgGrant, AppError> {
    ensure_org_access(identity, session, organization_id).await?;
    Ok(OrgGrant::new(organization_id, false))
}

/// Grants access when the session's active organization matches, otherwise
/// requires the caller in the organization's membership list.
pub async fn ensure_org_access(
    identity: &dyn IdentityProvider,
    session: &SessionContext,
    organization_id: &str,
) -> Result<(), AppError> {
    if session.is_active_org(organization_id) {
        return Ok(());
    }

    match identity
        .find_membership(organization_id, &session.user_id)
        .await?
    {
        Some(_) => Ok(()),
        None => {
            tracing::warn!(
                user_id = %session.user_id,
                organization_id,
                "Organization access denied"
            );
            Err(AppError::forbidden("You do not have access to this project"))
        }
    }
}

/// The caller's role in an organization, `None` when not a member.
pub async fn org_role(
    identity: &dyn IdentityProvider,
    session: &SessionContext,
    organization_id: &str,
) -> Result<Option<String>, AppError> {
    if session.is_active_org(organization_id) {
        if let Some(role) = &session.org_role {
            return Ok(Some(role.clone()));
        }
    }

    Ok(identity
        .find_membership(organization_id, &session.user_id)
        .await?
        .map(|membership| membership.role))
}
