//! Tasks and the project configuration they run.
//!
//! Tasks are owned elsewhere; this module models only what host spawning
//! reads: the task's identity and build, the commands its project declares
//! for it, and the raw execution state behind its display status.

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, ProvisionError};
use crate::request::Params;
use crate::store::TaskStore;

mod status;

pub use status::{DisplayStatus, ResultCounts};

/// Raw execution state recorded for a task.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting to be handed to an agent.
    #[default]
    Undispatched,
    /// Handed to an agent that has not started it yet.
    Dispatched,
    /// Running.
    Started,
    /// Finished successfully.
    #[serde(rename = "success")]
    Succeeded,
    /// Finished unsuccessfully.
    Failed,
}

/// How a finished task ended.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EndDetails {
    /// Failure category; `system` marks infrastructure failures.
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the task hit a timeout.
    pub timed_out: bool,
    /// Free-form detail, for example `heartbeat` for a lost agent.
    #[serde(rename = "desc")]
    pub description: String,
}

/// Outcome of a single test.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TestResult {
    /// Test status; `fail` marks a failure.
    pub status: String,
}

/// A task as host spawning sees it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Task {
    /// Task identifier.
    pub id: String,
    /// Build the task belongs to.
    pub build_id: String,
    /// Project task name; selects the task's commands.
    pub display_name: String,
    /// Raw execution state.
    pub status: TaskStatus,
    /// Whether the task is scheduled to run.
    pub activated: bool,
    /// How the task ended.
    pub details: EndDetails,
    /// Test outcomes reported by the task.
    pub test_results: Vec<TestResult>,
}

impl Task {
    /// Fetches a task from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::NotFound`] when no task has `id`, or
    /// [`ProvisionError::Persistence`] when the lookup fails.
    pub fn resolve<S>(store: &S, id: &str) -> Result<Self, ProvisionError>
    where
        S: TaskStore + ?Sized,
    {
        store
            .find_task(id)?
            .ok_or_else(|| ProvisionError::not_found(EntityKind::Task, id))
    }

    /// Whether any reported test failed.
    #[must_use]
    pub fn has_failed_tests(&self) -> bool {
        self.test_results.iter().any(|result| result.status == "fail")
    }
}

/// A command invocation declared by a project task.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Command name, for example `host.create`.
    pub command: String,
    /// Untyped parameters.
    pub params: Params,
}

/// A task declared by a project.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ProjectTask {
    /// Task name; matches [`Task::display_name`].
    pub name: String,
    /// Commands in execution order.
    pub commands: Vec<CommandConfig>,
}

/// A project's declared tasks.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Project {
    /// Declared tasks.
    pub tasks: Vec<ProjectTask>,
}

impl Project {
    /// Looks up a declared task by name.
    #[must_use]
    pub fn find_task(&self, name: &str) -> Option<&ProjectTask> {
        self.tasks.iter().find(|task| task.name == name)
    }
}

/// The configuration a task was created from.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Project the task belongs to.
    pub project: Project,
}
