//! PostgreSQL-backed store.
//!
//! Expects the following tables (schema management lives outside this crate):
//!
//! ```sql
//! CREATE TABLE users (
//!     id SERIAL PRIMARY KEY,
//!     username VARCHAR(50) NOT NULL UNIQUE,
//!     email VARCHAR(50) NOT NULL UNIQUE,
//!     password_hash VARCHAR NOT NULL
//! );
//! CREATE TABLE tasks (
//!     id SERIAL PRIMARY KEY,
//!     title VARCHAR(50) NOT NULL,
//!     description VARCHAR(255) NOT NULL,
//!     due_date TIMESTAMPTZ NOT NULL DEFAULT now(),
//!     completed BOOLEAN NOT NULL DEFAULT false,
//!     user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
//! );
//! ```

use async_trait::async_trait;
use sqlx::PgPool;

use super::{StoreError, TaskStore, UserStore};
use crate::models::{NewUser, Task, TaskInput, User, UserRecord};

const TASK_COLUMNS: &str = "id, title, description, due_date, completed, user_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        if let Some(db_err) = error.as_database_error() {
            if db_err.is_unique_violation() {
                let message = match db_err.constraint() {
                    Some("users_email_key") => "Email already registered",
                    _ => "Username already registered",
                };
                return StoreError::Conflict(message.into());
            }
        }
        StoreError::Database(error.to_string())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, username, email",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>("SELECT id, username, email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_tasks_by_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY id",
            TASK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        let task =
            sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(task)
    }

    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (title, description, due_date, completed, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(input.title)
        .bind(input.description)
        .bind(input.due_date)
        .bind(input.completed)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update_task(&self, id: i32, input: TaskInput) -> Result<Option<Task>, StoreError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "UPDATE tasks SET title = $1, description = $2, due_date = $3, completed = $4 \
             WHERE id = $5 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(input.title)
        .bind(input.description)
        .bind(input.due_date)
        .bind(input.completed)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
