use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::Task;

/// View-time predicate selecting tasks by completion state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    /// Every task.
    #[default]
    All,
    /// Only tasks with `completed == true`.
    Completed,
    /// Only tasks with `completed == false`.
    Incomplete,
}

impl TaskFilter {
    /// String representation used in configuration files and on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
        }
    }

    /// Evaluate the predicate against a task.
    #[must_use]
    pub const fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Completed => task.completed,
            Self::Incomplete => !task.completed,
        }
    }

    /// Return the matching tasks in their original order.
    pub fn apply<'a, I>(self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect()
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for unknown filter tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter: {token} (expected all, completed or incomplete)")]
pub struct ParseFilterError {
    /// The rejected input.
    pub token: String,
}

impl FromStr for TaskFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "all" => Ok(Self::All),
            "completed" | "done" => Ok(Self::Completed),
            "incomplete" | "pending" | "todo" => Ok(Self::Incomplete),
            _ => Err(ParseFilterError {
                token: s.to_owned(),
            }),
        }
    }
}
