use std::sync::Arc;
use validator::Validate;

use super::{AccessToken, AuthError, PasswordHasher, TokenService};
use crate::models::{NewUser, RegisterRequest, User};
use crate::store::UserStore;

/// Login and registration on top of the user store, the password hasher and
/// the token service.
///
/// Holds no per-request state; clones share the same store and token service.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    /// Verifies `username`/`password` and issues an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - unknown user or wrong password
    /// * `Store`, `Token`, `Blocking` - infrastructure failures
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AccessToken, AuthError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                // Burn the same bcrypt work as a real check before rejecting.
                let hasher = self.hasher;
                let presented = password.to_string();
                tokio::task::spawn_blocking(move || hasher.verify_decoy(&presented))
                    .await
                    .map_err(|e| AuthError::Blocking(e.to_string()))?;
                log::debug!("Login rejected: no user named {}", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let hasher = self.hasher;
        let presented = password.to_string();
        let stored = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&presented, &stored))
            .await
            .map_err(|e| AuthError::Blocking(e.to_string()))?;
        if !matches {
            log::debug!("Login rejected: wrong password for {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.tokens.issue_for_subject(&user.username)?;
        log::info!("User {} logged in", user.id);
        Ok(AccessToken {
            access_token,
            id: user.id,
        })
    }

    /// Validates the request, hashes the password and persists the user.
    ///
    /// Uniqueness of username and email is enforced by the store.
    ///
    /// # Errors
    /// * `Validation` - field constraints violated
    /// * `Conflict` - username or email already registered
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        request.validate()?;

        let RegisterRequest {
            username,
            email,
            password,
        } = request;
        let hasher = self.hasher;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Blocking(e.to_string()))??;

        let user = self
            .users
            .insert_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;
        log::info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use crate::store::MemoryStore;
    use futures::future::join_all;
    use jsonwebtoken::Algorithm;
    use pretty_assertions::assert_eq;

    fn setup() -> (Arc<MemoryStore>, Arc<TokenService>, AuthService) {
        let store = Arc::new(MemoryStore::new());
        let tokens = Arc::new(TokenService::new(&JwtConfig {
            secret: "service-test-secret".into(),
            expires_in_minutes: 30,
            algorithm: Algorithm::HS256,
        }));
        let service = AuthService::new(
            store.clone(),
            tokens.clone(),
            PasswordHasher::new(crate::auth::MIN_COST),
        );
        (store, tokens, service)
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: "alice".into(),
            email: "a@x.com".into(),
            password: "12345".into(),
        }
    }

    #[actix_rt::test]
    async fn test_register_stores_hash_not_plaintext() {
        let (store, _, service) = setup();
        let user = service.register(alice()).await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");

        let record = store.find_by_username("alice").await.unwrap().unwrap();
        assert_ne!(record.password_hash, "12345");
        assert!(PasswordHasher::default().verify("12345", &record.password_hash));
    }

    #[actix_rt::test]
    async fn test_register_rejects_invalid_input() {
        let (store, _, service) = setup();
        let mut request = alice();
        request.password = "Password123!".into();

        assert!(matches!(
            service.register(request).await,
            Err(AuthError::Validation(_))
        ));
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_register_twice_conflicts() {
        let (_, _, service) = setup();
        service.register(alice()).await.unwrap();

        assert!(matches!(
            service.register(alice()).await,
            Err(AuthError::Conflict(_))
        ));
    }

    #[actix_rt::test]
    async fn test_concurrent_registrations_have_one_winner() {
        let (store, _, service) = setup();
        let attempts = (0..5).map(|i| {
            let service = service.clone();
            let mut request = alice();
            request.email = format!("a{}@x.com", i);
            async move { service.register(request).await }
        });

        let results = join_all(attempts).await;
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AuthError::Conflict(_))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 4);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_authenticate_issues_token_for_subject() {
        let (_, tokens, service) = setup();
        let user = service.register(alice()).await.unwrap();

        let token = service.authenticate("alice", "12345").await.unwrap();
        assert_eq!(token.id, user.id);

        let claims = tokens.validate(&token.access_token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("alice"));
    }

    #[actix_rt::test]
    async fn test_authenticate_rejects_bad_credentials() {
        let (_, _, service) = setup();
        service.register(alice()).await.unwrap();

        assert!(matches!(
            service.authenticate("nouser", "anything").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("alice", "54321").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
