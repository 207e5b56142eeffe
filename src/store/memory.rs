use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{StoreError, TaskStore, UserStore};
use crate::models::{NewUser, Task, TaskInput, User, UserRecord};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, UserRecord>,
    tasks: BTreeMap<i32, Task>,
    next_user_id: i32,
    next_task_id: i32,
}

/// In-process store with auto-assigned integer ids.
///
/// Each operation runs under a single lock, so the uniqueness check and the
/// insert of `insert_user` are atomic with respect to concurrent callers.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .users
            .values()
            .find(|record| record.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|r| r.username == user.username) {
            return Err(StoreError::Conflict("Username already registered".into()));
        }
        if tables.users.values().any(|r| r.email == user.email) {
            return Err(StoreError::Conflict("Email already registered".into()));
        }

        tables.next_user_id += 1;
        let record = UserRecord {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        let public = record.public();
        tables.users.insert(record.id, record);
        Ok(public)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.users.values().map(UserRecord::public).collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list_tasks_by_user(&self, user_id: i32) -> Result<Vec<Task>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_task(&self, id: i32) -> Result<Option<Task>, StoreError> {
        Ok(self.lock()?.tasks.get(&id).cloned())
    }

    async fn insert_task(&self, user_id: i32, input: TaskInput) -> Result<Task, StoreError> {
        let mut tables = self.lock()?;
        tables.next_task_id += 1;
        let task = Task::new(tables.next_task_id, input, user_id);
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: i32, input: TaskInput) -> Result<Option<Task>, StoreError> {
        let mut tables = self.lock()?;
        Ok(tables.tasks.get_mut(&id).map(|task| {
            task.apply(input);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.lock()?.tasks.remove(&id).is_some())
    }
}
