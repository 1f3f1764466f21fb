use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use headers::{Authorization, Cookie, HeaderMapExt, authorization::Bearer};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::config::SessionConfig;
use crate::error::AppError;
use crate::services::context::SessionContext;

/// Cookie that carries the session token for browser clients.
pub const SESSION_COOKIE: &str = "__session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // external user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_slug: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            org_id: claims.org_id,
            org_role: claims.org_role,
            org_slug: claims.org_slug,
        }
    }
}

pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(config: &SessionConfig) -> Result<Self, AppError> {
        let (key, algorithm) = match config.algorithm.as_str() {
            "RS256" => {
                // PEM keys often arrive through env files with escaped newlines.
                let pem = config.key.replace("\\n", "\n");
                let key = DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AppError::Config(format!("Invalid session public key: {}", e)))?;
                (key, Algorithm::RS256)
            }
            "HS256" => (DecodingKey::from_secret(config.key.as_bytes()), Algorithm::HS256),
            other => {
                return Err(AppError::Config(format!(
                    "Unsupported session algorithm: {}",
                    other
                )));
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway;
        validation.validate_nbf = true;
        validation.validate_aud = false;

        Ok(Self { key, validation })
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, AppError> {
        let token_data = decode::<SessionClaims>(token, &self.key, &self.validation)?;
        Ok(token_data.claims)
    }
}

/// Bearer token first, then the session cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    headers
        .typed_get::<Cookie>()
        .and_then(|cookie| cookie.get(SESSION_COOKIE).map(str::to_string))
}

/// 会话认证中间件
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<axum::body::Body>,
    next: Next<axum::body::Body>,
) -> Result<Response, AppError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| AppError::unauthorized("Unauthorized"))?;

    let claims = state
        .sessions
        .verify(&token)
        .inspect_err(|e| tracing::debug!(error = %e, "Session token rejected"))?;

    request.extensions_mut().insert(SessionContext::from(claims));
    Ok(next.run(request).await)
}
