//! Process-local store backed by ordered maps.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::{DistroStore, HostStore, StoreError, TaskStore, UserStore};
use crate::distro::Distro;
use crate::host::{Host, HostIntent, SpawnBinding};
use crate::task::{ExecutionConfig, Task};
use crate::user::User;

/// In-memory implementation of every storage collaborator.
///
/// Intent batches are inserted atomically: a batch containing a name that is
/// already stored, or repeated within the batch, is rejected as a whole.
#[derive(Debug, Default)]
pub struct MemoryStore {
    distros: RwLock<BTreeMap<String, Distro>>,
    tasks: RwLock<BTreeMap<String, Task>>,
    configs: RwLock<BTreeMap<String, ExecutionConfig>>,
    users: RwLock<BTreeMap<String, User>>,
    hosts: RwLock<Vec<Host>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a distro.
    pub fn put_distro(&self, distro: Distro) {
        self.distros
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(distro.id.clone(), distro);
    }

    /// Adds or replaces a task.
    pub fn put_task(&self, task: Task) {
        self.tasks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task.id.clone(), task);
    }

    /// Records the execution configuration returned for `task_id`.
    pub fn put_execution_config(&self, task_id: impl Into<String>, config: ExecutionConfig) {
        self.configs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(task_id.into(), config);
    }

    /// Adds or replaces a user.
    pub fn put_user(&self, user: User) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user.id.clone(), user);
    }

    /// Stores an already materialised host, bypassing batch checks.
    pub fn put_host(&self, host: Host) {
        self.hosts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(host);
    }

    /// Returns a snapshot of every stored host in insertion order.
    #[must_use]
    pub fn hosts(&self) -> Vec<Host> {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn hosts_matching(&self, predicate: impl Fn(&SpawnBinding) -> bool) -> Vec<Host> {
        self.hosts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|host| host.status.is_live())
            .filter(|host| host.intent.spawn_binding().is_some_and(&predicate))
            .cloned()
            .collect()
    }
}

impl DistroStore for MemoryStore {
    fn find_distro(&self, id: &str) -> Result<Option<Distro>, StoreError> {
        Ok(self
            .distros
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }
}

impl TaskStore for MemoryStore {
    fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned())
    }

    fn execution_config(&self, task: &Task) -> Result<Option<ExecutionConfig>, StoreError> {
        Ok(self
            .configs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&task.id)
            .cloned())
    }
}

impl UserStore for MemoryStore {
    fn find_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned())
    }
}

impl HostStore for MemoryStore {
    fn insert_many(&self, intents: &[HostIntent]) -> Result<(), StoreError> {
        let mut hosts = self.hosts.write().unwrap_or_else(PoisonError::into_inner);
        let mut names = hosts
            .iter()
            .map(|host| host.id.as_str())
            .collect::<BTreeSet<_>>();
        for intent in intents {
            if !names.insert(intent.name.as_str()) {
                return Err(StoreError::Conflict(format!(
                    "host {} already exists",
                    intent.name
                )));
            }
        }
        hosts.extend(intents.iter().cloned().map(Host::from_intent));
        debug!(inserted = intents.len(), "stored host intents");
        Ok(())
    }

    fn find_by_task_id(&self, task_id: &str) -> Result<Vec<Host>, StoreError> {
        Ok(self.hosts_matching(
            |binding| matches!(binding, SpawnBinding::Task(id) if id == task_id),
        ))
    }

    fn find_by_build_id(&self, build_id: &str) -> Result<Vec<Host>, StoreError> {
        Ok(self.hosts_matching(
            |binding| matches!(binding, SpawnBinding::Build(id) if id == build_id),
        ))
    }
}
