use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::{IdentityProvider, IdentityUser, Organization, OrganizationMembership};
use crate::config::IdentityConfig;
use crate::error::AppError;

const MEMBERSHIP_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct MembershipPage {
    data: Vec<OrganizationMembership>,
    total_count: usize,
}

/// REST client for the Clerk backend API.
#[derive(Clone)]
pub struct ClerkClient {
    http: reqwest::Client,
    base: Url,
    secret_key: String,
}

impl ClerkClient {
    pub fn new(config: &IdentityConfig) -> Result<Self, AppError> {
        let base = Url::parse(&config.api_url)
            .map_err(|e| AppError::Config(format!("Invalid identity API URL: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!(
                "Identity API URL cannot be used as a base: {}",
                config.api_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base,
            secret_key: config.secret_key.clone(),
        })
    }

    /// Appends path segments to the configured base, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Identity API URL cannot be used as a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `None` on 404, the decoded body on success, an identity error otherwise.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, AppError> {
        let path = url.path().to_string();
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| AppError::identity(format!("GET {} failed: {}", path, e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<T>()
                .await
                .map(Some)
                .map_err(|e| AppError::identity(format!("GET {} returned bad body: {}", path, e))),
            status => Err(AppError::identity(format!(
                "GET {} returned {}",
                path, status
            ))),
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn organization_memberships(
        &self,
        organization_id: &str,
    ) -> Result<Vec<OrganizationMembership>, AppError> {
        let mut memberships = Vec::new();
        let mut offset = 0;

        loop {
            let mut url = self.endpoint(&["organizations", organization_id, "memberships"])?;
            url.query_pairs_mut()
                .append_pair("limit", &MEMBERSHIP_PAGE_SIZE.to_string())
                .append_pair("offset", &offset.to_string());

            let Some(page) = self.get_json::<MembershipPage>(url).await? else {
                // Unknown organization has no members.
                return Ok(memberships);
            };

            let fetched = page.data.len();
            memberships.extend(page.data);
            offset += fetched;

            if fetched == 0 || offset >= page.total_count {
                break;
            }
        }

        tracing::debug!(
            organization_id,
            count = memberships.len(),
            "Fetched organization memberships"
        );
        Ok(memberships)
    }

    async fn organization(&self, id_or_slug: &str) -> Result<Option<Organization>, AppError> {
        let url = self.endpoint(&["organizations", id_or_slug])?;
        self.get_json(url).await
    }

    async fn user(&self, user_id: &str) -> Result<Option<IdentityUser>, AppError> {
        let url = self.endpoint(&["users", user_id])?;
        self.get_json(url).await
    }
}
