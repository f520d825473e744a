//! Domain types for tasklist: tasks, their identifiers and view filters.

/// Completion filters applied at read time.
pub mod filter;
/// Identifier types.
pub mod id;

pub use crate::filter::{ParseFilterError, TaskFilter};
pub use crate::id::{ParseTaskIdError, TaskId};

use serde::{Deserialize, Serialize};

/// A single to-do item as stored by the remote task store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Identifier assigned by the store on creation.
    pub id: TaskId,
    /// Display text.
    pub title: String,
    /// Completion flag.
    pub completed: bool,
}

impl Task {
    /// Copy of this task with `completed` negated.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this task carrying a new title.
    #[must_use]
    pub fn renamed(&self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self.clone()
        }
    }
}

/// Request body for creating a task; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Display text.
    pub title: String,
    /// Always `false` for tasks created through the client.
    pub completed: bool,
}

impl NewTask {
    /// Build an incomplete task draft from user input.
    ///
    /// Returns `None` when the title is empty or whitespace-only.
    #[must_use]
    pub fn from_input(title: &str) -> Option<Self> {
        if title.trim().is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_owned(),
            completed: false,
        })
    }
}
