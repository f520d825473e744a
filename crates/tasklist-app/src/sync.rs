//! Task synchronization model shared by every front-end.

use std::sync::atomic::{AtomicU64, Ordering};

use tasklist_core::{NewTask, Task, TaskFilter, TaskId};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::edit::EditDraft;
use crate::error::{EditSaveError, SyncError};
use crate::store::TaskStore;
use crate::task_cache::{Apply, Seq, TaskCache};

/// Behavioural switches for [`TaskSync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Drop responses that are older than data already applied.
    pub discard_stale: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            discard_stale: true,
        }
    }
}

/// Local task collection kept in step with a [`TaskStore`].
///
/// Mutations are confirm-then-apply: the local collection changes only after the
/// store answered successfully. The collection lock is never held across a store
/// call, so operations issued concurrently interleave freely; responses are ordered
/// by the sequence number taken when each request was issued.
pub struct TaskSync<S> {
    store: S,
    cache: Mutex<TaskCache>,
    next_seq: AtomicU64,
}

impl<S> TaskSync<S> {
    /// Create a model with default options and an empty collection.
    pub fn new(store: S) -> Self {
        Self::with_options(store, SyncOptions::default())
    }

    /// Create a model with explicit options.
    pub fn with_options(store: S, options: SyncOptions) -> Self {
        Self {
            store,
            cache: Mutex::new(TaskCache::new(options.discard_stale)),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Expose the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn issue(&self) -> Seq {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current local collection, unfiltered.
    pub async fn tasks(&self) -> Vec<Task> {
        self.cache.lock().await.tasks().to_vec()
    }

    /// Re-filter the retained collection without contacting the store.
    pub async fn visible(&self, filter: TaskFilter) -> Vec<Task> {
        self.cache.lock().await.filtered(filter)
    }

    /// Look up a task in the local collection.
    pub async fn get(&self, id: &TaskId) -> Option<Task> {
        self.cache.lock().await.get(id).cloned()
    }
}

impl<S: TaskStore> TaskSync<S> {
    /// Fetch the full collection, retain it, and return the tasks matching `filter`.
    ///
    /// A response that arrives after a newer list was applied is discarded and the
    /// current local view is returned instead. Creates, updates and deletes
    /// confirmed for requests issued after this one are kept.
    ///
    /// # Errors
    /// Returns [`SyncError::FetchFailed`] when the store cannot be read; the previous
    /// collection is kept.
    pub async fn list(&self, filter: TaskFilter) -> Result<Vec<Task>, SyncError> {
        let seq = self.issue();
        let fetched = match self.store.list_tasks().await {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!(error = %err, "failed to fetch tasks");
                return Err(SyncError::FetchFailed(Box::new(err)));
            }
        };

        let mut cache = self.cache.lock().await;
        if cache.replace_all(seq, fetched) == Apply::Stale {
            debug!(seq, latest = cache.latest_snapshot(), "discarding stale task list");
        }
        Ok(cache.filtered(filter))
    }

    /// Create a task from user input.
    ///
    /// Blank or whitespace-only titles are ignored without a request and yield `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`SyncError::CreateFailed`] when the store rejects the request.
    pub async fn create(&self, title: &str) -> Result<Option<Task>, SyncError> {
        let Some(draft) = NewTask::from_input(title) else {
            debug!("ignoring blank task title");
            return Ok(None);
        };

        let seq = self.issue();
        let created = match self.store.create_task(&draft).await {
            Ok(task) => task,
            Err(err) => {
                warn!(error = %err, "failed to create task");
                return Err(SyncError::CreateFailed(Box::new(err)));
            }
        };

        let outcome = self.cache.lock().await.append(seq, created.clone());
        debug!(id = %created.id, ?outcome, "task created");
        Ok(Some(created))
    }

    /// Flip the completion flag of a cached task.
    ///
    /// # Errors
    /// Returns [`SyncError::TaskNotFound`] when `id` is not cached (no request is sent),
    /// or [`SyncError::UpdateFailed`] when the store rejects the update.
    pub async fn toggle_completion(&self, id: &TaskId) -> Result<Task, SyncError> {
        let current = self.cached(id).await?;
        self.replace_remote(current.toggled()).await
    }

    /// Give a cached task a new title. Empty titles are passed through unchanged.
    ///
    /// # Errors
    /// Returns [`SyncError::TaskNotFound`] when `id` is not cached (no request is sent),
    /// or [`SyncError::UpdateFailed`] when the store rejects the update.
    pub async fn rename(&self, id: &TaskId, title: impl Into<String>) -> Result<Task, SyncError> {
        let current = self.cached(id).await?;
        self.replace_remote(current.renamed(title)).await
    }

    /// Delete a task; the local entry is removed once the store confirms.
    ///
    /// # Errors
    /// Returns [`SyncError::DeleteFailed`] when the store rejects the request; the
    /// entry stays in the collection.
    pub async fn delete(&self, id: &TaskId) -> Result<(), SyncError> {
        let seq = self.issue();
        if let Err(err) = self.store.delete_task(id).await {
            warn!(%id, error = %err, "failed to delete task");
            return Err(SyncError::DeleteFailed {
                id: id.clone(),
                source: Box::new(err),
            });
        }

        let outcome = self.cache.lock().await.remove(seq, id);
        debug!(%id, ?outcome, "task deleted");
        Ok(())
    }

    /// Open an edit draft for a cached task.
    ///
    /// # Errors
    /// Returns [`SyncError::TaskNotFound`] when `id` is not cached.
    pub async fn begin_edit(&self, id: &TaskId) -> Result<EditDraft, SyncError> {
        let task = self.cached(id).await?;
        Ok(EditDraft::for_task(&task))
    }

    /// Commit a draft as a rename.
    ///
    /// # Errors
    /// Returns the draft together with the [`SyncError`] when the rename fails, so the
    /// caller can keep editing.
    pub async fn save_edit(&self, draft: EditDraft) -> Result<Task, EditSaveError> {
        let (id, text) = draft.into_parts();
        match self.rename(&id, text.clone()).await {
            Ok(task) => Ok(task),
            Err(source) => Err(EditSaveError {
                draft: EditDraft::from_parts(id, text),
                source,
            }),
        }
    }

    async fn cached(&self, id: &TaskId) -> Result<Task, SyncError> {
        self.cache
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SyncError::TaskNotFound(id.clone()))
    }

    async fn replace_remote(&self, updated: Task) -> Result<Task, SyncError> {
        let seq = self.issue();
        let confirmed = match self.store.update_task(&updated).await {
            Ok(task) => task,
            Err(err) => {
                warn!(id = %updated.id, error = %err, "failed to update task");
                return Err(SyncError::UpdateFailed {
                    id: updated.id,
                    source: Box::new(err),
                });
            }
        };

        let outcome = self.cache.lock().await.replace(seq, confirmed.clone());
        debug!(id = %confirmed.id, ?outcome, "task updated");
        Ok(confirmed)
    }
}
