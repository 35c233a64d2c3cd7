//! Platform configuration and task documents read from disk.
//!
//! The CLI dry-runs against JSON files instead of a live database. A
//! [`Catalogue`] holds the platform's distros and container pools; a
//! [`TaskDocument`] holds one task, the project configuration it was created
//! from, and the users who may request hosts for it. Both seed a
//! [`MemoryStore`].

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::distro::DistroGroup;
use crate::error::ErrorList;
use crate::pool::{ContainerPoolsConfig, PoolValidationError, validate_pools};
use crate::store::MemoryStore;
use crate::task::{ExecutionConfig, Task};
use crate::user::User;

/// Errors raised while loading a document.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CatalogueError {
    /// Raised when the file cannot be read.
    #[error("failed to read `{path}`: {message}")]
    Read {
        /// Path that failed to read.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// Raised when the file is not a valid document.
    #[error("failed to parse `{path}`: {message}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying error message.
        message: String,
    },
}

/// Distros and container pools as configured on the platform.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Catalogue {
    /// Every configured distro.
    pub distros: DistroGroup,
    /// Container pool configuration.
    pub container_pools: ContainerPoolsConfig,
}

impl Catalogue {
    /// Reads a catalogue from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogueError> {
        load_json(path)
    }

    /// Adds every distro to `store`.
    pub fn seed(&self, store: &MemoryStore) {
        for distro in &self.distros.0 {
            store.put_distro(distro.clone());
        }
        debug!(distros = self.distros.0.len(), "seeded distros");
    }

    /// Runs the structural pool checks and the parent-distro checks and
    /// reports every violation from both.
    ///
    /// # Errors
    ///
    /// Returns a [`PoolValidationError`] listing every violation.
    pub fn validate(&self) -> Result<(), PoolValidationError> {
        let store = MemoryStore::new();
        self.seed(&store);
        let mut violations = self
            .container_pools
            .validate()
            .err()
            .map(ErrorList::into_vec)
            .unwrap_or_default();
        if let Err(errors) = validate_pools(&self.container_pools, &store) {
            violations.extend(errors.into_vec());
        }
        ErrorList::into_result(violations)
    }
}

/// One task with the project configuration and users it needs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct TaskDocument {
    /// The task requesting hosts.
    pub task: Task,
    /// The project configuration the task was created from.
    pub config: ExecutionConfig,
    /// Users who may own spawned hosts.
    pub users: Vec<User>,
}

impl TaskDocument {
    /// Reads a task document from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] when the file cannot be read or parsed.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogueError> {
        load_json(path)
    }

    /// Adds the task, its configuration, and its users to `store`.
    pub fn seed(&self, store: &MemoryStore) {
        store.put_task(self.task.clone());
        store.put_execution_config(self.task.id.clone(), self.config.clone());
        for user in &self.users {
            store.put_user(user.clone());
        }
    }
}

fn load_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CatalogueError> {
    let content = read_to_string_ambient(path).map_err(|message| CatalogueError::Read {
        path: path.to_string(),
        message,
    })?;
    serde_json::from_str(&content).map_err(|err| CatalogueError::Parse {
        path: path.to_string(),
        message: err.to_string(),
    })
}

fn read_to_string_ambient(path: &Utf8Path) -> Result<String, String> {
    let (dir_path, file_path) = if path.is_absolute() {
        let parent = path
            .parent()
            .ok_or_else(|| format!("path has no parent directory: {path}"))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| format!("path has no file name: {path}"))?;
        (parent, Utf8Path::new(file_name))
    } else {
        (Utf8Path::new("."), path)
    };

    let dir =
        Dir::open_ambient_dir(dir_path, ambient_authority()).map_err(|err| err.to_string())?;
    dir.read_to_string(file_path).map_err(|err| err.to_string())
}
