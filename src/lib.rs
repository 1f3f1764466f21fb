pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod schema;
pub mod services;
pub mod validation;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::cache::MembershipCache;
use crate::config::Config;
use crate::db::{DbConn, DbPool};
use crate::error::AppResult;
use crate::identity::{CachedIdentityProvider, ClerkClient, IdentityProvider};
use crate::identity::webhook::WebhookVerifier;
use crate::middleware::session::SessionVerifier;

pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionVerifier,
    pub redis: Option<redis::Client>,
    pub webhooks: Option<WebhookVerifier>,
}

impl AppState {
    pub fn new(
        db: DbPool,
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        redis: Option<redis::Client>,
    ) -> AppResult<Self> {
        let sessions = SessionVerifier::new(&config.session())?;
        let webhooks = config
            .webhook_signing_secret
            .as_deref()
            .map(WebhookVerifier::new)
            .transpose()?;

        Ok(Self {
            db,
            config: Arc::new(config),
            identity,
            sessions,
            redis,
            webhooks,
        })
    }

    /// Wires the Clerk client, wrapped in the Redis membership cache when one is configured.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let db = db::create_pool(&config.database())?;
        let redis = config
            .redis_url
            .as_deref()
            .map(redis::Client::open)
            .transpose()?;

        let identity_config = config.identity();
        let clerk: Arc<dyn IdentityProvider> = Arc::new(ClerkClient::new(&identity_config)?);
        let identity: Arc<dyn IdentityProvider> = match &redis {
            Some(client) if identity_config.membership_cache_ttl > 0 => {
                Arc::new(CachedIdentityProvider::new(
                    clerk,
                    MembershipCache::new(client.clone(), identity_config.membership_cache_ttl),
                ))
            }
            _ => clerk,
        };

        Self::new(db, config, identity, redis)
    }

    pub fn conn(&self) -> AppResult<DbConn> {
        Ok(self.db.get()?)
    }
}

pub fn init_tracing(config: &Config) {
    let logging = config.logging();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
