use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

lazy_static! {
    // Passwords are restricted to ASCII digits; the empty string is accepted.
    static ref DIGITS_ONLY: regex::Regex = regex::Regex::new(r"^\d*$").unwrap();
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// A stored credential record, as returned by the user store.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn public(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// A user ready to be persisted; `password_hash` is produced by the password hasher.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Payload for `POST /register`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Between 3 and 50 characters.
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    /// A valid address of 3 to 50 characters.
    #[validate(email, length(min = 3, max = 50))]
    pub email: String,
    /// Digits only.
    #[validate(regex(path = "DIGITS_ONLY", message = "Password must contain digits only"))]
    pub password: String,
}
