//! Task manager for async operations
//!
//! Tracks running thunk tasks by key with support for:
//! - Exclusive keys: a second spawn under a running key is refused
//! - Manual cancellation, by key or all at once
//! - Collecting outcomes, including panics and cancellations
//!
//! # Example
//!
//! ```ignore
//! use todo_dispatch::tasks::{TaskKey, TaskManager};
//!
//! let mut tasks = TaskManager::new();
//!
//! // Refused while a task under the same key is still running
//! tasks.spawn_exclusive(TaskKey::new("todos/fetch"), async { fetch().await });
//!
//! // Unique key derived from a name
//! let key = tasks.spawn("todos/save", async { save().await });
//!
//! while let Some((key, outcome)) = tasks.join_next().await {
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;

use tokio::task::{AbortHandle, Id, JoinError, JoinSet};

/// Identifies a task for cancellation and deduplication.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    /// Create a new task key.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the key name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Why a task did not complete successfully.
#[derive(Debug, thiserror::Error)]
pub enum ThunkError {
    /// The task ran and returned an error.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// The task panicked.
    #[error("task `{0}` panicked")]
    Panicked(TaskKey),

    /// The task was aborted before it finished.
    #[error("task `{0}` was cancelled")]
    Cancelled(TaskKey),
}

/// Manages async task lifecycle.
///
/// Every task resolves to `anyhow::Result<()>`. A task counts as running
/// until its future completes; its outcome stays pending until collected
/// with [`join_next`](Self::join_next) or [`try_join_next`](Self::try_join_next).
#[derive(Default)]
pub struct TaskManager {
    set: JoinSet<anyhow::Result<()>>,
    keys: HashMap<TaskKey, AbortHandle>,
    ids: HashMap<Id, TaskKey>,
    next_seq: u64,
}

impl TaskManager {
    /// Create an empty task manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a task under a unique key derived from `name`.
    ///
    /// Returns the generated key.
    pub fn spawn<F>(&mut self, name: &str, future: F) -> TaskKey
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.next_seq += 1;
        let key = TaskKey::new(format!("{}#{}", name, self.next_seq));
        self.insert(key.clone(), future);
        key
    }

    /// Spawn a task unless one with the same key is still running.
    ///
    /// Returns `false` (and drops `future` unpolled) when the key is taken.
    /// A finished task does not hold its key, even before its outcome is
    /// collected; both outcomes are reported under the same key.
    pub fn spawn_exclusive<F>(&mut self, key: impl Into<TaskKey>, future: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let key = key.into();
        if self.is_running(&key) {
            return false;
        }
        self.insert(key, future);
        true
    }

    fn insert<F>(&mut self, key: TaskKey, future: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = self.set.spawn(future);
        self.ids.insert(handle.id(), key.clone());
        self.keys.insert(key, handle);
    }

    /// Wait for the next task to finish and return its key and outcome.
    ///
    /// Returns `None` when no outcome is pending.
    pub async fn join_next(&mut self) -> Option<(TaskKey, Result<(), ThunkError>)> {
        loop {
            let joined = self.set.join_next_with_id().await?;
            if let Some(done) = self.collect(joined) {
                return Some(done);
            }
        }
    }

    /// Collect the outcome of a task that has already finished, without waiting.
    pub fn try_join_next(&mut self) -> Option<(TaskKey, Result<(), ThunkError>)> {
        loop {
            let joined = self.set.try_join_next_with_id()?;
            if let Some(done) = self.collect(joined) {
                return Some(done);
            }
        }
    }

    fn collect(
        &mut self,
        joined: Result<(Id, anyhow::Result<()>), JoinError>,
    ) -> Option<(TaskKey, Result<(), ThunkError>)> {
        let id = match &joined {
            Ok((id, _)) => *id,
            Err(err) => err.id(),
        };

        // Tasks cancelled by key were already unregistered.
        let key = self.ids.remove(&id)?;

        // The key may already belong to a newer task.
        if self.keys.get(&key).is_some_and(|handle| handle.id() == id) {
            self.keys.remove(&key);
        }

        let outcome = match joined {
            Ok((_, result)) => result.map_err(ThunkError::from),
            Err(err) if err.is_panic() => Err(ThunkError::Panicked(key.clone())),
            Err(_) => Err(ThunkError::Cancelled(key.clone())),
        };
        Some((key, outcome))
    }

    /// Cancel a task by key.
    ///
    /// If no task exists with the given key, this is a no-op.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.keys.remove(key) {
            self.ids.remove(&handle.id());
            handle.abort();
        }
    }

    /// Cancel all running tasks.
    pub fn cancel_all(&mut self) {
        self.keys.clear();
        self.ids.clear();
        self.set.abort_all();
    }

    /// Check if a task with the given key is still running.
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.keys
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Get the number of tasks whose outcome has not been collected.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no outcome is pending.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get the keys of all tasks that are still running.
    pub fn running_keys(&self) -> impl Iterator<Item = &TaskKey> {
        self.keys
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(key, _)| key)
    }
}

impl fmt::Debug for TaskManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskManager")
            .field("running", &self.running_keys().collect::<Vec<_>>())
            .field("pending", &self.ids.len())
            .finish()
    }
}
