use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{IdentityProvider, IdentityUser, Organization, OrganizationMembership};
use crate::error::AppError;

/// Identity provider backed by process memory. Used by tests and local runs
/// without an identity backend.
#[derive(Default)]
pub struct InMemoryIdentityProvider {
    memberships: RwLock<HashMap<String, Vec<OrganizationMembership>>>,
    organizations: RwLock<HashMap<String, Organization>>,
    users: RwLock<HashMap<String, IdentityUser>>,
    membership_calls: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(self, organization_id: &str, user_id: &str, role: &str) -> Self {
        self.add_member(organization_id, user_id, role);
        self
    }

    pub fn add_member(&self, organization_id: &str, user_id: &str, role: &str) {
        let mut memberships = self.memberships.write().unwrap_or_else(|e| e.into_inner());
        let list = memberships.entry(organization_id.to_string()).or_default();
        list.retain(|m| m.user_id() != user_id);
        list.push(OrganizationMembership::new(user_id, role));
    }

    pub fn remove_member(&self, organization_id: &str, user_id: &str) {
        let mut memberships = self.memberships.write().unwrap_or_else(|e| e.into_inner());
        if let Some(list) = memberships.get_mut(organization_id) {
            list.retain(|m| m.user_id() != user_id);
        }
    }

    pub fn add_organization(&self, organization: Organization) {
        let mut organizations = self.organizations.write().unwrap_or_else(|e| e.into_inner());
        organizations.insert(organization.id.clone(), organization);
    }

    pub fn add_user(&self, user: IdentityUser) {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(user.id.clone(), user);
    }

    /// Number of membership list fetches served so far.
    pub fn membership_calls(&self) -> usize {
        self.membership_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn organization_memberships(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        self.membership_calls.fetch_add(1, Ordering::SeqCst);
        let memberships = self.memberships.read().unwrap_or_else(|e| e.into_inner());
        Ok(memberships.get(organization_id).cloned().unwrap_or_default())
    }

    async fn organization(&self, id_or_slug: &str) -> Result<Option<Organization>, AppError> {
        let organizations = self.organizations.read().unwrap_or_else(|e| e.into_inner());
        Ok(organizations
            .values()
            .find(|org| org.id == id_or_slug || org.slug.as_deref() == Some(id_or_slug))
            .cloned())
    }

    async fn user(&self, user_id: &str) -> Result<Option<IdentityUser>, AppError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(user_id).cloned())
    }
}
