//! Signed webhook deliveries from the identity provider.
//!
//! Each delivery carries `svix-id`, `svix-timestamp` and `svix-signature`
//! headers. The signature is an HMAC-SHA256 over `{id}.{timestamp}.{body}`
//! keyed with the base64 part of the `whsec_` signing secret.

use axum::http::HeaderMap;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

pub const WEBHOOK_ID_HEADER: &str = "svix-id";
pub const WEBHOOK_TIMESTAMP_HEADER: &str = "svix-timestamp";
pub const WEBHOOK_SIGNATURE_HEADER: &str = "svix-signature";

/// Deliveries older or newer than this many seconds are rejected.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

const SECRET_PREFIX: &str = "whsec_";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: serde_json::Value,
}

impl WebhookEvent {
    /// Organization id carried by `organization.*` and
    /// `organizationMembership.*` payloads.
    pub fn organization_id(&self) -> Option<&str> {
        if self.event_type.starts_with("organizationMembership.") {
            self.data
                .get("organization")
                .and_then(|org| org.get("id"))
                .and_then(|id| id.as_str())
        } else if self.event_type.starts_with("organization.") {
            self.data.get("id").and_then(|id| id.as_str())
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let encoded = secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret);
        let key = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Config(format!("Invalid webhook signing secret: {}", e)))?;
        if key.is_empty() {
            return Err(AppError::Config("Webhook signing secret is empty".into()));
        }
        Ok(Self { key })
    }

    fn mac(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AppError::internal(format!("Invalid HMAC key: {}", e)))?;
        mac.update(msg_id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(body);
        Ok(mac)
    }

    /// Base64 signature for a delivery, without the `v1,` prefix.
    pub fn sign(&self, msg_id: &str, timestamp: &str, body: &[u8]) -> Result<String, AppError> {
        let mac = self.mac(msg_id, timestamp, body)?;
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    pub fn verify(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), AppError> {
        let msg_id = header(headers, WEBHOOK_ID_HEADER)?;
        let timestamp = header(headers, WEBHOOK_TIMESTAMP_HEADER)?;
        let signatures = header(headers, WEBHOOK_SIGNATURE_HEADER)?;

        let sent_at: i64 = timestamp
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid webhook timestamp"))?;
        if now.abs_diff(sent_at) > WEBHOOK_TOLERANCE_SECS.unsigned_abs() {
            return Err(AppError::unauthorized("Webhook timestamp outside tolerance"));
        }

        let expected = self.mac(msg_id, timestamp, body)?;
        let matched = signatures
            .split_whitespace()
            .filter_map(|entry| entry.strip_prefix("v1,"))
            .filter_map(|encoded| STANDARD.decode(encoded).ok())
            .any(|candidate| expected.clone().verify_slice(&candidate).is_ok());

        if matched {
            Ok(())
        } else {
            Err(AppError::unauthorized("Invalid webhook signature"))
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized(format!("Missing {} header", name)))
}
