//! Read-only view of the external identity provider: organizations, their
//! membership lists, and user accounts.

pub mod cached;
pub mod clerk;
pub mod memory;
pub mod webhook;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::db::models::user::NewUser;
use crate::error::AppError;

pub use cached::CachedIdentityProvider;
pub use clerk::ClerkClient;
pub use memory::InMemoryIdentityProvider;

/// Organization role that grants project create/delete rights.
pub const ADMIN_ROLE: &str = "org:admin";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUserData {
    pub user_id: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrganizationMembership {
    #[serde(default)]
    pub id: Option<String>,
    pub role: String,
    pub public_user_data: PublicUserData,
}

impl OrganizationMembership {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            role: role.into(),
            public_user_data: PublicUserData {
                user_id: user_id.into(),
                identifier: None,
                first_name: None,
                last_name: None,
                image_url: None,
            },
        }
    }

    pub fn user_id(&self) -> &str {
        &self.public_user_data.user_id
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailAddress {
    pub id: String,
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityUser {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    pub primary_email_address_id: Option<String>,
}

impl IdentityUser {
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// The primary address, or the first one when no primary is flagged.
    pub fn primary_email(&self) -> Option<&str> {
        self.primary_email_address_id
            .as_deref()
            .and_then(|primary| self.email_addresses.iter().find(|e| e.id == primary))
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }

    pub fn to_new_user(&self) -> NewUser {
        NewUser {
            clerk_user_id: self.id.clone(),
            email: self.primary_email().map(str::to_string),
            name: self.full_name(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Linear search of a membership list for one external user id.
pub fn find_user_membership(
    memberships: Vec<OrganizationMembership>,
    user_id: &str,
) -> Option<OrganizationMembership> {
    memberships.into_iter().find(|m| m.user_id() == user_id)
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Full membership list of an organization, every page.
    async fn organization_memberships(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationMembership>, AppError>;

    async fn organization(&self, id_or_slug: &str) -> Result<Option<Organization>, AppError>;

    async fn user(&self, user_id: &str) -> Result<Option<IdentityUser>, AppError>;

    async fn find_membership(
        &self,
        organization_id: &str,
        user_id: &str,
    ) -> Result<Option<OrganizationMembership>, AppError> {
        let memberships = self.organization_memberships(organization_id).await?;
        Ok(find_user_membership(memberships, user_id))
    }

    /// Drops anything remembered about an organization's members.
    async fn invalidate_memberships(&self, _organization_id: &str) -> Result<(), AppError> {
        Ok(())
    }
}
