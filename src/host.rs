//! Host intents and the hosts they become once stored.
//!
//! An intent is the builder's output: a fully merged distro, a generated
//! name, the chosen provider, and exactly one ownership shape. The shapes are
//! mutually exclusive, so they are modelled as an enum rather than a set of
//! optional fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::distro::Distro;
use crate::provider::Provider;

/// A fully specified, not yet executed host-creation request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HostIntent {
    /// Generated instance name; also the stored host's identifier.
    pub name: String,
    /// Distro with merged provider settings and the chosen provider.
    pub distro: Distro,
    /// Provider that will realise the intent.
    pub provider: Provider,
    /// Who owns the host and how its lifetime is bounded.
    pub ownership: Ownership,
}

/// Ownership of a spawned host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Ownership {
    /// Requested interactively by a user; no teardown deadline.
    User(UserOwnership),
    /// Requested by a running task; torn down on a deadline.
    Task(TaskOwnership),
}

/// Ownership details for a user-requested host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct UserOwnership {
    /// Owning user.
    pub user_name: String,
    /// Provisioning directive for the host agent.
    pub provision: ProvisionOptions,
}

/// Instructions for provisioning a user-owned host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProvisionOptions {
    /// Whether to install the platform CLI on the host.
    pub load_cli: bool,
    /// Task the host was requested from.
    pub task_id: String,
    /// User the CLI is configured for.
    pub owner_id: String,
}

/// Ownership details for a task-spawned host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TaskOwnership {
    /// Anonymous owner: the originating task's identifier.
    pub owner: String,
    /// Task or build the host's lifetime is tied to.
    pub binding: SpawnBinding,
    /// Instant by which setup must finish.
    pub setup_deadline: DateTime<Utc>,
    /// Instant at which the host is torn down.
    pub teardown_deadline: DateTime<Utc>,
    /// Provisioning attempts allowed.
    pub retries: u32,
    /// Always `true`; marks the host as spawned by a task.
    pub spawned_by_task: bool,
}

/// Lifetime binding of a task-spawned host.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnBinding {
    /// Bound to a task identifier.
    Task(String),
    /// Bound to a build identifier.
    Build(String),
}

impl HostIntent {
    /// Whether the intent is owned by a user.
    #[must_use]
    pub const fn is_user_owned(&self) -> bool {
        matches!(self.ownership, Ownership::User(_))
    }

    /// Task-ownership details, if the host is task-owned.
    #[must_use]
    pub const fn task_ownership(&self) -> Option<&TaskOwnership> {
        match &self.ownership {
            Ownership::Task(ownership) => Some(ownership),
            Ownership::User(_) => None,
        }
    }

    /// Task or build binding, if the host is task-owned.
    #[must_use]
    pub fn spawn_binding(&self) -> Option<&SpawnBinding> {
        self.task_ownership().map(|ownership| &ownership.binding)
    }

    /// Teardown deadline; user-owned hosts have none.
    #[must_use]
    pub fn teardown_deadline(&self) -> Option<DateTime<Utc>> {
        self.task_ownership()
            .map(|ownership| ownership.teardown_deadline)
    }
}

/// Lifecycle state of a stored host.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    /// Stored as an intent; nothing has been created yet.
    #[default]
    Uninitialized,
    /// The provider is creating the instance.
    Building,
    /// Setup scripts are running.
    Provisioning,
    /// Ready for work.
    Running,
    /// Torn down.
    Terminated,
}

impl HostStatus {
    /// Whether the host still exists or is on its way to existing.
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Terminated)
    }
}

/// A stored host.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Host {
    /// Host identifier; equal to the intent's name.
    pub id: String,
    /// Current lifecycle state.
    pub status: HostStatus,
    /// The intent the host was created from.
    pub intent: HostIntent,
}

impl Host {
    /// Materialises a freshly inserted intent.
    #[must_use]
    pub fn from_intent(intent: HostIntent) -> Self {
        Self {
            id: intent.name.clone(),
            status: HostStatus::Uninitialized,
            intent,
        }
    }
}
