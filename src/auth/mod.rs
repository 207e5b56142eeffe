pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{authorize, AuthMiddleware};
pub use password::{PasswordError, PasswordHasher, MAX_COST, MIN_COST};
pub use service::AuthService;
pub use token::{ClaimSet, Claims, TokenError, TokenService};

/// Form fields of `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Returned on successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    /// The signed bearer token.
    pub access_token: String,
    /// Id of the authenticated user.
    pub id: i32,
}

/// Failures of the authentication core.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown username or wrong password; the two are not distinguished.
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Missing, malformed, expired or wrongly signed bearer token.
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Token(TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
    #[error("Background task failed: {0}")]
    Blocking(String),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> AuthError {
        match error {
            StoreError::Conflict(msg) => AuthError::Conflict(msg),
            other => AuthError::Store(other),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(error: TokenError) -> AuthError {
        match error {
            TokenError::InvalidToken => AuthError::Unauthorized(middleware::INVALID_TOKEN),
            other => AuthError::Token(other),
        }
    }
}
