//! Persistence ports.
//!
//! The auth core and the route handlers only talk to storage through
//! [`UserStore`] and [`TaskStore`]. [`MemoryStore`] backs the tests and
//! [`PgStore`] backs the running server.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewUser, Task, TaskInput, User, UserRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(String),
}

/// Credential and user lookups.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Returns the credential record for `username`, if any.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Persists a new user and returns its public view.
    ///
    /// # Errors
    /// * `Conflict` - username or email is already registered
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    async fn list_tasks_by_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError>;

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError>;

    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, StoreError>;

    /// Returns `None` when no task has this id.
    async fn update_task(&self, id: i32, input: TaskInput) -> Result<Option<Task>, StoreError>;

    /// Returns whether a task was removed.
    async fn delete_task(&self, id: i32) -> Result<bool, StoreError>;
}
