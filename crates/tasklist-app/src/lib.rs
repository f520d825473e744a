//! Application layer logic for tasklist.
//!
//! This crate provides the task synchronization model, its local cache,
//! the edit-draft state machine and configuration shared by every front-end.

pub mod config;
pub mod edit;
pub mod error;
pub mod store;
pub mod sync;
pub mod task_cache;

// Re-exports for convenience
pub use config::{ProjectConfig, RemoteConfig, ServerConfig, SyncConfig};
pub use edit::{EditDraft, EditSession};
pub use error::{EditSaveError, StoreFailure, SyncError};
pub use store::TaskStore;
pub use sync::{SyncOptions, TaskSync};
pub use task_cache::{Apply, Seq, TaskCache};
