use std::sync::Arc;

use crate::auth::{AuthService, AuthenticatedUser, PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::models::User;
use crate::store::{MemoryStore, TaskStore, UserStore};

/// Services shared by every worker, built once at startup.
///
/// Registered as `web::Data<AppState>`; `AuthMiddleware` reads the token
/// service from it.
pub struct AppState {
    pub auth: AuthService,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl AppState {
    pub fn new(config: &Config, users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        let auth = AuthService::new(
            users.clone(),
            tokens.clone(),
            PasswordHasher::new(config.bcrypt_cost),
        );
        Self {
            auth,
            tokens,
            users,
            tasks,
        }
    }

    /// State backed by a fresh [`MemoryStore`].
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }

    /// Looks up the user record behind an authenticated identity.
    ///
    /// A valid token whose subject no longer exists is treated as unauthorized.
    pub async fn current_user(&self, identity: &AuthenticatedUser) -> Result<User, AppError> {
        self.users
            .find_by_username(identity.username())
            .await?
            .map(|record| record.public())
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".into()))
    }
}
