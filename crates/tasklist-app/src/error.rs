//! Failure taxonomy of the synchronization model.

use tasklist_core::TaskId;
use thiserror::Error;

use crate::edit::EditDraft;

/// Boxed store error carried as the source of a [`SyncError`].
pub type StoreFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by [`TaskSync`](crate::TaskSync) operations.
///
/// Every variant leaves the local collection in its last-known-good state.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Listing tasks from the store failed.
    #[error("failed to fetch tasks")]
    FetchFailed(#[source] StoreFailure),

    /// The store rejected or could not process a create request.
    #[error("failed to create task")]
    CreateFailed(#[source] StoreFailure),

    /// A toggle or rename round trip failed.
    #[error("failed to update task {id}")]
    UpdateFailed {
        /// Target task.
        id: TaskId,
        /// Underlying store failure.
        #[source]
        source: StoreFailure,
    },

    /// The store did not confirm a delete.
    #[error("failed to delete task {id}")]
    DeleteFailed {
        /// Target task.
        id: TaskId,
        /// Underlying store failure.
        #[source]
        source: StoreFailure,
    },

    /// The id is not part of the local collection.
    #[error("task {0} is not in the local collection")]
    TaskNotFound(TaskId),
}

impl SyncError {
    /// Underlying store failure, if the error came from a round trip.
    #[must_use]
    pub fn store_failure(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::FetchFailed(source)
            | Self::CreateFailed(source)
            | Self::UpdateFailed { source, .. }
            | Self::DeleteFailed { source, .. } => Some(source.as_ref()),
            Self::TaskNotFound(_) => None,
        }
    }
}

/// A failed save hands the draft back so the edit can be retried or cancelled.
#[derive(Debug, Error)]
#[error("failed to save edit for task {}", .draft.editing_id())]
pub struct EditSaveError {
    /// The retained draft.
    pub draft: EditDraft,
    /// Why the save failed.
    #[source]
    pub source: SyncError,
}
