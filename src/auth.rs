// Credential minting for invoice-probe
// Signs short-lived HS256 identity tokens for the test subject and attaches them as bearer auth

use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ProbeConfig;

/// Subject the seeded backend data belongs to.
pub const DEFAULT_SUBJECT: i64 = 1;

/// Lifetime of every minted token.
pub const TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The build carries no signing backend (the `signing` feature is off).
    /// Dependent probes are skipped rather than failed.
    #[error("token signing unavailable: {0}")]
    Unavailable(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("refusing to send expired token for subject {subject} (exp {exp})")]
    Expired { subject: i64, exp: i64 },
}

/// Identity claim understood by the invoice backend: `{ "id": .., "exp": .. }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(subject: i64, issued_at: DateTime<Utc>) -> Self {
        Self {
            id: subject,
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

#[derive(Clone)]
pub struct TokenMinter {
    secret: String,
}

impl TokenMinter {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Mint a token for `subject` valid for one hour from now.
    pub fn mint(&self, subject: i64) -> Result<String, CredentialError> {
        self.mint_at(subject, Utc::now())
    }

    pub fn mint_at(&self, subject: i64, issued_at: DateTime<Utc>) -> Result<String, CredentialError> {
        let claims = Claims::new(subject, issued_at);
        if claims.is_expired_at(Utc::now()) {
            return Err(CredentialError::Expired {
                subject,
                exp: claims.exp,
            });
        }
        sign(&claims, &self.secret)
    }

    /// Guarded setup step: `Ok(false)` when signing is unavailable in this build.
    pub fn is_available(&self) -> Result<bool, CredentialError> {
        match self.mint(DEFAULT_SUBJECT) {
            Ok(_) => Ok(true),
            Err(CredentialError::Unavailable(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(feature = "signing")]
fn sign(claims: &Claims, secret: &str) -> Result<String, CredentialError> {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| CredentialError::Signing(e.to_string()))
}

#[cfg(not(feature = "signing"))]
fn sign(_claims: &Claims, _secret: &str) -> Result<String, CredentialError> {
    Err(CredentialError::Unavailable(
        "built without the `signing` feature".to_string(),
    ))
}

pub trait AuthStrategy {
    fn apply_auth(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::RequestBuilder, CredentialError>;
}

/// Mints a fresh token for one subject on every request.
pub struct SubjectAuth<'a> {
    pub minter: &'a TokenMinter,
    pub subject: i64,
}

impl AuthStrategy for SubjectAuth<'_> {
    fn apply_auth(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::RequestBuilder, CredentialError> {
        let token = self.minter.mint(self.subject)?;
        debug!(subject = ?extract_subject_from_jwt(&token), "attaching bearer token");
        Ok(req.bearer_auth(token))
    }
}

/// Read the `id` claim out of a JWT without verifying the signature.
pub fn extract_subject_from_jwt(token: &str) -> Option<i64> {
    // header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return None;
    }

    let decoded = general_purpose::URL_SAFE_NO_PAD.decode(parts[1]).ok()?;
    let json: Value = serde_json::from_slice(&decoded).ok()?;

    match json.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
