use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Identifier of a task, assigned by the remote store.
///
/// The wire format allows either a JSON number or a JSON string, so both are
/// kept verbatim and written back in the same shape they were read.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    /// Numeric identifier (`{"id": 42}`).
    Number(u64),
    /// Textual identifier (`{"id": "a1b2"}`).
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => n.fmt(f),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| Self::Text(value.to_owned()))
    }
}

/// Error returned when a task id token is blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task id must not be empty")]
pub struct ParseTaskIdError;

impl FromStr for TaskId {
    type Err = ParseTaskIdError;

    /// Digits-only tokens become [`TaskId::Number`], anything else is kept as text.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseTaskIdError);
        }
        Ok(trimmed
            .parse::<u64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Number))
    }
}
