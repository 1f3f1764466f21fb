use std::sync::Arc;

use async_trait::async_trait;

use super::{
    IdentityProvider, IdentityUser, Organization, OrganizationMembership, find_user_membership,
};
use crate::cache::MembershipCache;
use crate::error::AppError;

/// Wraps a provider with a Redis membership cache. Cache failures are logged
/// and the request falls through to the wrapped provider.
pub struct CachedIdentityProvider {
    inner: Arc<dyn IdentityProvider>,
    cache: MembershipCache,
}

impl CachedIdentityProvider {
    pub fn new(inner: Arc<dyn IdentityProvider>, cache: MembershipCache) -> Self {
        Self { inner, cache }
    }

    async fn cached(&self, organization_id: &str) -> Option<Vec<OrganizationMembership>> {
        match self.cache.get(organization_id).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(organization_id, error = %e, "Membership cache read failed");
                None
            }
        }
    }

    async fn refresh(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        let memberships = self.inner.organization_memberships(organization_id).await?;
        if let Err(e) = self.cache.put(organization_id, &memberships).await {
            tracing::warn!(organization_id, error = %e, "Membership cache write failed");
        }
        Ok(memberships)
    }
}

#[async_trait]
impl IdentityProvider for CachedIdentityProvider {
    async fn organization_memberships(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        match self.cached(organization_id).await {
            Some(memberships) => Ok(memberships),
            None => self.refresh(organization_id).await,
        }
    }

    async fn organization(&self, id_or_slug: &str) -> Result<Option<Organization>, AppError> {
        self.inner.organization(id_or_slug).await
    }

    async fn user(&self, user_id: &str) -> Result<Option<IdentityUser>, AppError> {
        self.inner.user(user_id).await
    }

    /// A cached list may predate a new member, so a miss is confirmed
    /// against the provider before it becomes a denial.
    async fn find_membership(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Option<OrganizationMembership>, AppError> {
        if let Some(memberships) = self.cached(organization_id).await {
            if let Some(found) = find_user_membership(memberships, user_id) {
                return Ok(Some(found));
            }
        }

        let memberships = self.refresh(organization_id).await?;
        Ok(find_user_membership(memberships, user_id))
    }

    async fn invalidate_memberships(&self, organization_id: &str) -> Result<(), AppError> {
        self.cache.invalidate(organization_id).await
    }
}
