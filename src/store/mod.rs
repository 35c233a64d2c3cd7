//! Persistence collaborators.
//!
//! The provisioning core never owns storage. It reads distros, tasks, and
//! users and writes host intents through these traits; [`MemoryStore`] is a
//! process-local implementation used by the CLI's dry runs and by tests.

use thiserror::Error;

use crate::distro::Distro;
use crate::error::ProvisionError;
use crate::host::{Host, HostIntent};
use crate::task::{ExecutionConfig, Task};
use crate::user::User;

mod memory;

pub use memory::MemoryStore;

/// Errors raised by storage collaborators.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum StoreError {
    /// Raised when the backing store cannot serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Raised when a write would violate a uniqueness constraint.
    #[error("conflicting record: {0}")]
    Conflict(String),
}

impl From<StoreError> for ProvisionError {
    fn from(value: StoreError) -> Self {
        Self::Persistence(value.to_string())
    }
}

/// Read access to distro templates.
pub trait DistroStore {
    /// Returns the distro with `id`, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup itself fails.
    fn find_distro(&self, id: &str) -> Result<Option<Distro>, StoreError>;
}

/// Read access to tasks and their execution configuration.
pub trait TaskStore {
    /// Returns the task with `id`, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup itself fails.
    fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Returns the project configuration the task was created from, or
    /// `None` when it cannot be reconstructed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup itself fails.
    fn execution_config(&self, task: &Task) -> Result<Option<ExecutionConfig>, StoreError>;
}

/// Read access to user accounts.
pub trait UserStore {
    /// Returns the user named `name`, or `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup itself fails.
    fn find_user(&self, name: &str) -> Result<Option<User>, StoreError>;
}

/// Write access for intents and read access for spawned hosts.
pub trait HostStore {
    /// Inserts every intent or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the batch is rejected.
    fn insert_many(&self, intents: &[HostIntent]) -> Result<(), StoreError>;

    /// Returns live hosts spawned for task `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn find_by_task_id(&self, task_id: &str) -> Result<Vec<Host>, StoreError>;

    /// Returns live hosts spawned for build `build_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn find_by_build_id(&self, build_id: &str) -> Result<Vec<Host>, StoreError>;
}

#[cfg(test)]
mod tests;
