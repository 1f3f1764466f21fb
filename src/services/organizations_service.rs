use crate::{
    error::AppError,
    identity::{IdentityProvider, Organization},
    services::access::ensure_org_access,
    services::context::SessionContext,
};

pub struct OrganizationsService;

impl OrganizationsService {
    /// `None` when the organization is unknown or the caller is not a member.
    pub async fn get(
        identity: &dyn IdentityProvider,
        session: &SessionContext,
        id_or_slug: &str,
    ) -> Result<Option<Organization>, AppError> {
        let Some(organization) = identity.organization(id_or_slug).await? else {
            return Ok(None);
        };

        match ensure_org_access(identity, session, &organization.id).await {
            Ok(()) => Ok(Some(organization)),
            Err(AppError::Forbidden { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
