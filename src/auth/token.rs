use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::JwtConfig;

/// Arbitrary claims supplied by the caller when issuing a token.
pub type ClaimSet = Map<String, Value>;

#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// Malformed, wrongly signed or expired; the sub-cause is not carried.
    #[error("Invalid token")]
    InvalidToken,
    #[error("Failed to generate token: {0}")]
    Encoding(String),
}

/// Claims decoded from a validated token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the username the token was issued to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Absolute expiry (seconds since epoch).
    pub exp: i64,
    /// Any other claims carried by the token.
    #[serde(flatten)]
    pub extra: ClaimSet,
}

/// Issues and validates signed, time-limited bearer tokens.
///
/// Validation is a pure function of the configured secret and the token; no
/// token state is kept on the server.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_minutes: i64,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm: config.algorithm,
            ttl_minutes: config.expires_in_minutes,
        }
    }

    /// Configured time-to-live, in minutes.
    pub fn ttl_minutes(&self) -> i64 {
        self.ttl_minutes
    }

    /// Signs `claims` plus an `exp` of now + `ttl_minutes`.
    pub fn issue(&self, claims: ClaimSet, ttl_minutes: i64) -> Result<String, TokenError> {
        self.issue_at(claims, ttl_minutes, Utc::now())
    }

    /// Issues a token for `subject` with the configured time-to-live.
    pub fn issue_for_subject(&self, subject: &str) -> Result<String, TokenError> {
        let mut claims = ClaimSet::new();
        claims.insert("sub".into(), Value::String(subject.to_string()));
        self.issue(claims, self.ttl_minutes)
    }

    pub(crate) fn issue_at(
        &self,
        mut claims: ClaimSet,
        ttl_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expiration = Duration::try_minutes(ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| TokenError::Encoding("expiry out of range".into()))?;
        claims.insert("exp".into(), Value::from(expiration.timestamp()));

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verifies signature and expiry, returning the decoded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {:?}", e.kind());
                TokenError::InvalidToken
            })
    }
}
