//! In-progress rename state.

use tasklist_core::{Task, TaskId};

use crate::error::{EditSaveError, SyncError};
use crate::store::TaskStore;
use crate::sync::TaskSync;

/// Pending rename of one task. The task itself is untouched until the draft is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    editing_id: TaskId,
    edit_text: String,
}

impl EditDraft {
    /// Start a draft seeded with the task's current title.
    #[must_use]
    pub fn for_task(task: &Task) -> Self {
        Self {
            editing_id: task.id.clone(),
            edit_text: task.title.clone(),
        }
    }

    /// Task being edited.
    #[must_use]
    pub const fn editing_id(&self) -> &TaskId {
        &self.editing_id
    }

    /// Current draft text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.edit_text
    }

    /// Replace the draft text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.edit_text = text.into();
    }

    pub(crate) fn into_parts(self) -> (TaskId, String) {
        (self.editing_id, self.edit_text)
    }

    pub(crate) const fn from_parts(editing_id: TaskId, edit_text: String) -> Self {
        Self {
            editing_id,
            edit_text,
        }
    }
}

/// Single edit slot shared by every row of a task list view.
///
/// ```text
/// Idle --begin--> Editing --save ok--> Idle
///                 Editing --save err-> Editing (draft kept)
///                 Editing --cancel---> Idle
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    /// No edit in progress.
    #[default]
    Idle,
    /// One task is being renamed.
    Editing(EditDraft),
}

impl EditSession {
    /// Start editing; any draft for another row is discarded and returned.
    pub fn begin(&mut self, draft: EditDraft) -> Option<EditDraft> {
        match std::mem::replace(self, Self::Editing(draft)) {
            Self::Idle => None,
            Self::Editing(previous) => Some(previous),
        }
    }

    /// Abandon the active draft without touching the task.
    pub fn cancel(&mut self) -> Option<EditDraft> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Editing(draft) => Some(draft),
        }
    }

    /// Active draft, if any.
    #[must_use]
    pub const fn draft(&self) -> Option<&EditDraft> {
        match self {
            Self::Idle => None,
            Self::Editing(draft) => Some(draft),
        }
    }

    /// Mutable access to the active draft text.
    pub const fn draft_mut(&mut self) -> Option<&mut EditDraft> {
        match self {
            Self::Idle => None,
            Self::Editing(draft) => Some(draft),
        }
    }

    /// Returns true when `id` is the row being edited.
    #[must_use]
    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.draft().is_some_and(|draft| draft.editing_id() == id)
    }

    /// Commit the active draft through `sync`.
    ///
    /// Returns `Ok(None)` when idle. On failure the draft stays active.
    ///
    /// # Errors
    /// Returns the [`SyncError`] of the failed rename.
    pub async fn save<S: TaskStore>(&mut self, sync: &TaskSync<S>) -> Result<Option<Task>, SyncError> {
        let Self::Editing(draft) = std::mem::take(self) else {
            return Ok(None);
        };
        match sync.save_edit(draft).await {
            Ok(task) => Ok(Some(task)),
            Err(EditSaveError { draft, source }) => {
                *self = Self::Editing(draft);
                Err(source)
            }
        }
    }
}
