use bcrypt::{hash, verify, DEFAULT_COST};
use thiserror::Error;

/// Cost bounds accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

// Salt and digest of a real bcrypt hash; only the cost prefix varies.
const DECOY_TAIL: &str = ".vGA1O9wmRjrwAVXD98HNOgsNpDczlqm3Jq7KnEd1rVAGv3Fykk1a";

#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
}

/// Salted bcrypt hashing with a configurable cost factor.
///
/// Both operations are CPU-bound; async callers should run them on
/// a blocking thread.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        hash(password, self.cost).map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Checks `password` against a stored hash.
    ///
    /// A malformed or corrupted hash is treated as a mismatch.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Rejecting password check against unreadable hash: {}", e);
                false
            }
        }
    }

    /// A well-formed hash at this hasher's cost that no login password is
    /// expected to match.
    pub fn decoy_hash(&self) -> String {
        format!("$2b${:02}${}", self.cost, DECOY_TAIL)
    }

    /// Runs a full-cost verification whose result is discarded, so a lookup
    /// miss costs as much as a wrong password.
    pub fn verify_decoy(&self, password: &str) {
        let _ = verify(password, &self.decoy_hash());
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
