use redis::AsyncCommands;

use crate::error::AppError;
use crate::identity::OrganizationMembership;

/// 组织成员缓存键前缀
const MEMBERSHIP_CACHE_PREFIX: &str = "org_memberships:";

pub fn membership_key(organization_id: &str) -> String {
    format!("{}{}", MEMBERSHIP_CACHE_PREFIX, organization_id)
}

/// 组织成员列表缓存
#[derive(Clone)]
pub struct MembershipCache {
    redis_client: redis::Client,
    ttl: u64,
}

impl MembershipCache {
    pub fn new(redis_client: redis::Client, ttl: u64) -> Self {
        Self { redis_client, ttl }
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }

    /// 获取缓存的成员列表
    pub async fn get(
        &self,
        organization_id: &str,
    ) -> Result<Option<Vec<OrganizationMembership>>, AppError> {
        let mut conn = self.get_connection().await?;
        let key = membership_key(organization_id);

        let memberships_json: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get cached memberships: {}", e)))?;

        match memberships_json {
            Some(json) => {
                let memberships = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Failed to deserialize memberships: {}", e))
                })?;
                Ok(Some(memberships))
            }
            None => Ok(None),
        }
    }

    /// 缓存成员列表
    pub async fn put(
        &self,
        organization_id: &str,
        memberships: &[OrganizationMembership],
    ) -> Result<(), AppError> {
        if self.ttl == 0 {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let key = membership_key(organization_id);

        let memberships_json = serde_json::to_string(memberships)
            .map_err(|e| AppError::Internal(format!("Failed to serialize memberships: {}", e)))?;

        let _: () = conn
            .set_ex(&key, memberships_json, self.ttl)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to cache memberships: {}", e)))?;

        Ok(())
    }

    pub async fn invalidate(&self, organization_id: &str) -> Result<(), AppError> {
        let mut conn = self.get_connection().await?;
        let _: i32 = conn
            .del(membership_key(organization_id))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to invalidate memberships: {}", e)))?;
        Ok(())
    }
}
