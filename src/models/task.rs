use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Input structure for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 3 and 50 characters.
    #[validate(length(min = 3, max = 50))]
    pub title: String,

    /// Must be between 3 and 255 characters.
    #[validate(length(min = 3, max = 255))]
    pub description: String,

    /// Defaults to the time the request was received.
    #[serde(default = "Utc::now")]
    pub due_date: DateTime<Utc>,

    #[serde(default)]
    pub completed: bool,
}

/// Represents a task entity as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub completed: bool,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

impl Task {
    /// Builds a task from `input`, owned by `user_id`.
    pub fn new(id: i32, input: TaskInput, user_id: i32) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            completed: input.completed,
            user_id,
        }
    }

    /// Overwrites the editable fields, keeping id and owner.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.completed = input.completed;
    }
}
