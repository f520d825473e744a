//! Local task collection with response sequencing.

use std::collections::{HashMap, HashSet};

use tasklist_core::{Task, TaskFilter, TaskId};

/// Sequence number handed to every request when it is issued.
pub type Seq = u64;

/// Outcome of applying a store response to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    /// The response changed the cache.
    Applied,
    /// A newer response already covered the same data; nothing changed.
    Stale,
    /// The target task is no longer cached; nothing changed.
    Missing,
}

/// Cached tasks in insertion order plus an id index.
///
/// Every mutation is tagged with the [`Seq`] of the request that produced it.
/// Confirmed creates, updates and deletes stamp their task; fetched snapshots do
/// not. With the staleness guard enabled:
///
/// - a snapshot older than the latest applied snapshot is dropped;
/// - inside a snapshot, a task stamped by a later-issued mutation keeps its local
///   copy, and a deleted id is left out;
/// - a per-task response older than that task's stamp is dropped.
///
/// A confirmed delete always removes its entry. Store ids are never reused, so
/// deleted ids are remembered for good. With the guard disabled the last response
/// to arrive wins.
#[derive(Debug, Clone)]
pub struct TaskCache {
    tasks: Vec<Task>,
    task_index: HashMap<TaskId, usize>,
    stamps: HashMap<TaskId, Seq>,
    deleted: HashSet<TaskId>,
    latest_snapshot: Seq,
    latest_applied: Seq,
    discard_stale: bool,
}

impl Default for TaskCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TaskCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new(discard_stale: bool) -> Self {
        Self {
            tasks: Vec::new(),
            task_index: HashMap::new(),
            stamps: HashMap::new(),
            deleted: HashSet::new(),
            latest_snapshot: 0,
            latest_applied: 0,
            discard_stale,
        }
    }

    /// Cached tasks in insertion order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of cached tasks.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a cached task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.task_index.get(id).and_then(|&idx| self.tasks.get(idx))
    }

    /// Returns cached tasks matching `filter`, preserving order.
    #[must_use]
    pub fn filtered(&self, filter: TaskFilter) -> Vec<Task> {
        filter.apply(&self.tasks)
    }

    /// Sequence number of the most recently applied response.
    #[must_use]
    pub const fn latest_applied(&self) -> Seq {
        self.latest_applied
    }

    /// Sequence number of the most recently applied snapshot.
    #[must_use]
    pub const fn latest_snapshot(&self) -> Seq {
        self.latest_snapshot
    }

    /// Replace the collection with a fetched snapshot, keeping confirmed
    /// mutations issued after the snapshot was requested.
    pub fn replace_all(&mut self, seq: Seq, tasks: Vec<Task>) -> Apply {
        if !self.discard_stale {
            self.tasks = tasks;
            self.rebuild_index();
            self.mark_snapshot(seq);
            return Apply::Applied;
        }
        if seq < self.latest_snapshot {
            return Apply::Stale;
        }

        let mut merged = Vec::with_capacity(tasks.len());
        for task in tasks {
            if self.deleted.contains(&task.id) {
                continue;
            }
            if self.is_stale_for(&task.id, seq) {
                if let Some(local) = self.get(&task.id) {
                    merged.push(local.clone());
                }
                continue;
            }
            merged.push(task);
        }

        // Created after the snapshot was requested, so the store may not have listed it.
        let listed: HashSet<TaskId> = merged.iter().map(|task| task.id.clone()).collect();
        for task in &self.tasks {
            if !listed.contains(&task.id) && self.is_stale_for(&task.id, seq) {
                merged.push(task.clone());
            }
        }

        self.tasks = merged;
        self.rebuild_index();
        self.mark_snapshot(seq);
        Apply::Applied
    }

    /// Append a newly created task, or refresh it in place if a snapshot
    /// already delivered it.
    pub fn append(&mut self, seq: Seq, task: Task) -> Apply {
        if self.is_deleted(&task.id) {
            return Apply::Missing;
        }
        if self.is_stale_for(&task.id, seq) {
            return Apply::Stale;
        }
        self.stamps.insert(task.id.clone(), seq);
        if let Some(&idx) = self.task_index.get(&task.id) {
            self.tasks[idx] = task;
        } else {
            self.task_index.insert(task.id.clone(), self.tasks.len());
            self.tasks.push(task);
        }
        self.mark_applied(seq);
        Apply::Applied
    }

    /// Replace an existing entry with the store's confirmed copy.
    pub fn replace(&mut self, seq: Seq, task: Task) -> Apply {
        if self.is_deleted(&task.id) {
            return Apply::Missing;
        }
        if self.is_stale_for(&task.id, seq) {
            return Apply::Stale;
        }
        let Some(&idx) = self.task_index.get(&task.id) else {
            return Apply::Missing;
        };
        self.stamps.insert(task.id.clone(), seq);
        self.tasks[idx] = task;
        self.mark_applied(seq);
        Apply::Applied
    }

    /// Drop an entry after the store confirmed its deletion.
    pub fn remove(&mut self, seq: Seq, id: &TaskId) -> Apply {
        self.deleted.insert(id.clone());
        let stamp = self.stamps.entry(id.clone()).or_insert(seq);
        *stamp = (*stamp).max(seq);
        self.mark_applied(seq);

        let before = self.tasks.len();
        self.tasks.retain(|task| &task.id != id);
        if self.tasks.len() == before {
            return Apply::Missing;
        }
        self.rebuild_index();
        Apply::Applied
    }

    fn is_deleted(&self, id: &TaskId) -> bool {
        self.discard_stale && self.deleted.contains(id)
    }

    fn is_stale_for(&self, id: &TaskId, seq: Seq) -> bool {
        self.discard_stale && self.stamps.get(id).is_some_and(|&stamp| stamp > seq)
    }

    fn mark_snapshot(&mut self, seq: Seq) {
        self.latest_snapshot = self.latest_snapshot.max(seq);
        self.mark_applied(seq);
    }

    fn mark_applied(&mut self, seq: Seq) {
        self.latest_applied = self.latest_applied.max(seq);
    }

    fn rebuild_index(&mut self) {
        self.task_index.clear();
        for (idx, task) in self.tasks.iter().enumerate() {
            self.task_index.insert(task.id.clone(), idx);
        }
    }
}
