//! Process-wide configuration, loaded once at startup.
//!
//! Every value is read from the environment (a `.env` file is honoured by
//! `main`). Missing or malformed values are reported as a [`ConfigError`] so the
//! server refuses to start rather than failing on the first request.

use chrono::{Duration, Utc};
use jsonwebtoken::Algorithm;
use std::env;

use crate::auth::{MAX_COST, MIN_COST};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while assembling [`Config`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for issuing and validating access tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token time-to-live in minutes.
    pub expires_in_minutes: i64,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt: JwtConfig,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let expires_in_minutes = required("JWT_EXPIRES_IN")?
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                reason: e.to_string(),
            })?;
        if expires_in_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                reason: "must be a positive number of minutes".into(),
            });
        }
        let expiry_representable = Duration::try_minutes(expires_in_minutes)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .is_some();
        if !expiry_representable {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                reason: format!("{} minutes is too far in the future", expires_in_minutes),
            });
        }

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            expires_in_minutes,
            algorithm: parse_algorithm(&required("JWT_ALGORITHM")?)?,
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost = raw.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    reason: e.to_string(),
                })?;
                if !(MIN_COST..=MAX_COST).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        reason: format!("{} is outside {}..={}", cost, MIN_COST, MAX_COST),
                    });
                }
                cost
            }
            None => bcrypt::DEFAULT_COST,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                    name: "SERVER_PORT",
                    reason: e.to_string(),
                })?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

/// Only HMAC algorithms are accepted; the signing secret is a shared key.
fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: "JWT_ALGORITHM",
        reason,
    };
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| invalid(format!("unknown algorithm {}", name)))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(invalid(format!("{:?} is not a symmetric algorithm", other))),
    }
}
