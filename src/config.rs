use crate::error::{AppError, AppResult};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub database_connection_timeout: u64,

    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_membership_cache_ttl")]
    pub membership_cache_ttl: u64,

    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    pub session_jwt_key: String,
    #[serde(default = "default_session_algorithm")]
    pub session_jwt_algorithm: String,
    #[serde(default = "default_session_leeway")]
    pub session_leeway: u64,

    #[serde(default = "default_identity_api_url")]
    pub identity_api_url: String,
    pub identity_secret_key: String,
    #[serde(default = "default_identity_timeout")]
    pub identity_timeout_secs: u64,

    #[serde(default)]
    pub webhook_signing_secret: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub key: String,
    pub algorithm: String,
    pub leeway: u64,
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub api_url: String,
    pub secret_key: String,
    pub timeout_secs: u64,
    pub membership_cache_ttl: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connection_timeout() -> u64 {
    30
}
fn default_membership_cache_ttl() -> u64 {
    60
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_session_algorithm() -> String {
    "RS256".to_string()
}
fn default_session_leeway() -> u64 {
    5
}
fn default_identity_api_url() -> String {
    "https://api.clerk.com/v1".to_string()
}
fn default_identity_timeout() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()
            .map_err(|e| AppError::Config(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be > 0".to_string(),
            ));
        }

        if self.database_min_connections > self.database_max_connections {
            return Err(AppError::Config(
                "DATABASE_MIN_CONNECTIONS cannot be greater than DATABASE_MAX_CONNECTIONS"
                    .to_string(),
            ));
        }

        if self.session_jwt_key.trim().is_empty() {
            return Err(AppError::Config("SESSION_JWT_KEY must be set".to_string()));
        }

        if !matches!(self.session_jwt_algorithm.as_str(), "RS256" | "HS256") {
            return Err(AppError::Config(
                "SESSION_JWT_ALGORITHM must be RS256 or HS256".to_string(),
            ));
        }

        if self.identity_secret_key.trim().is_empty() {
            return Err(AppError::Config(
                "IDENTITY_SECRET_KEY must be set".to_string(),
            ));
        }

        url::Url::parse(&self.identity_api_url)
            .map_err(|e| AppError::Config(format!("IDENTITY_API_URL is invalid: {}", e)))?;

        if self.identity_timeout_secs == 0 {
            return Err(AppError::Config(
                "IDENTITY_TIMEOUT_SECS must be > 0".to_string(),
            ));
        }

        if let Some(secret) = &self.webhook_signing_secret {
            if secret.trim().is_empty() {
                return Err(AppError::Config(
                    "WEBHOOK_SIGNING_SECRET cannot be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            key: self.session_jwt_key.clone(),
            algorithm: self.session_jwt_algorithm.clone(),
            leeway: self.session_leeway,
        }
    }

    pub fn identity(&self) -> IdentityConfig {
        IdentityConfig {
            api_url: self.identity_api_url.clone(),
            secret_key: self.identity_secret_key.clone(),
            timeout_secs: self.identity_timeout_secs,
            membership_cache_ttl: self.membership_cache_ttl,
        }
    }

    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            host: self.server_host.clone(),
            port: self.server_port,
            cors_origins: self.cors_origins.clone(),
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }
}
