//! Storage abstraction over the remote task store.

use tasklist_core::{NewTask, Task, TaskId};
use tasklist_store_http::{HttpTaskStore, StoreError};

/// Async access to the authoritative task collection.
///
/// Implementations perform one round trip per call; each call is a suspension
/// point for the [`TaskSync`](crate::TaskSync) operation that issued it.
#[allow(async_fn_in_trait)]
pub trait TaskStore: Send + Sync {
    /// Error type bubbled up from the backing store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every task in store order.
    ///
    /// # Errors
    /// Returns a store-specific error when listing fails.
    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error>;

    /// Create a task and return it with its store-assigned id.
    ///
    /// # Errors
    /// Returns a store-specific error when the task cannot be created.
    async fn create_task(&self, task: &NewTask) -> Result<Task, Self::Error>;

    /// Replace the task identified by `task.id` with `task`.
    ///
    /// # Errors
    /// Returns a store-specific error when the update is rejected.
    async fn update_task(&self, task: &Task) -> Result<Task, Self::Error>;

    /// Delete a task.
    ///
    /// # Errors
    /// Returns a store-specific error when the delete is rejected.
    async fn delete_task(&self, id: &TaskId) -> Result<(), Self::Error>;
}

impl TaskStore for HttpTaskStore {
    type Error = StoreError;

    async fn list_tasks(&self) -> Result<Vec<Task>, Self::Error> {
        Self::list_tasks(self).await
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, Self::Error> {
        Self::create_task(self, task).await
    }

    async fn update_task(&self, task: &Task) -> Result<Task, Self::Error> {
        Self::update_task(self, task).await
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), Self::Error> {
        Self::delete_task(self, id).await
    }
}
