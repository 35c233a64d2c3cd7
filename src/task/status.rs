//! Display status for tasks.

use serde::{Deserialize, Serialize};

use super::{Task, TaskStatus};

/// Status shown to users, derived from a task's raw execution state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStatus {
    /// Not scheduled.
    Inactive,
    /// Scheduled but not yet handed out.
    Unstarted,
    /// Handed to an agent.
    Dispatched,
    /// Running.
    Started,
    /// Finished successfully.
    Succeeded,
    /// Failed in its own commands.
    Failed,
    /// Failed because of infrastructure.
    SystemFailed,
    /// Lost its agent's heartbeat.
    SystemUnresponsive,
    /// Timed out in infrastructure commands.
    SystemTimedOut,
    /// Timed out in its own commands.
    TestTimedOut,
}

impl Task {
    /// Maps the raw status, activation, and end details onto the status
    /// users see.
    #[must_use]
    pub fn result_status(&self) -> DisplayStatus {
        match self.status {
            TaskStatus::Undispatched if self.activated => DisplayStatus::Unstarted,
            TaskStatus::Undispatched => DisplayStatus::Inactive,
            TaskStatus::Dispatched => DisplayStatus::Dispatched,
            TaskStatus::Started => DisplayStatus::Started,
            TaskStatus::Succeeded => DisplayStatus::Succeeded,
            TaskStatus::Failed => self.failure_status(),
        }
    }

    fn failure_status(&self) -> DisplayStatus {
        let details = &self.details;
        if details.kind != "system" {
            return if details.timed_out {
                DisplayStatus::TestTimedOut
            } else {
                DisplayStatus::Failed
            };
        }
        if !details.timed_out {
            return DisplayStatus::SystemFailed;
        }
        if details.description == "heartbeat" {
            DisplayStatus::SystemUnresponsive
        } else if self.has_failed_tests() {
            DisplayStatus::Failed
        } else {
            DisplayStatus::SystemTimedOut
        }
    }
}

/// Tally of display statuses over a set of tasks.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResultCounts {
    /// Tasks counted, including dispatched ones.
    pub total: u32,
    /// Inactive tasks.
    pub inactive: u32,
    /// Unstarted tasks.
    pub unstarted: u32,
    /// Started tasks.
    pub started: u32,
    /// Succeeded tasks.
    pub succeeded: u32,
    /// Failed tasks.
    pub failed: u32,
    /// System-failed tasks.
    pub system_failed: u32,
    /// Unresponsive tasks.
    pub system_unresponsive: u32,
    /// System-timed-out tasks.
    pub system_timed_out: u32,
    /// Test-timed-out tasks.
    pub test_timed_out: u32,
}

impl ResultCounts {
    /// Counts `tasks` by display status.
    #[must_use]
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = Self::default();
        for task in tasks {
            counts.total += 1;
            let slot = match task.result_status() {
                DisplayStatus::Inactive => &mut counts.inactive,
                DisplayStatus::Unstarted => &mut counts.unstarted,
                DisplayStatus::Started => &mut counts.started,
                DisplayStatus::Succeeded => &mut counts.succeeded,
                DisplayStatus::Failed => &mut counts.failed,
                DisplayStatus::SystemFailed => &mut counts.system_failed,
                DisplayStatus::SystemUnresponsive => &mut counts.system_unresponsive,
                DisplayStatus::SystemTimedOut => &mut counts.system_timed_out,
                DisplayStatus::TestTimedOut => &mut counts.test_timed_out,
                DisplayStatus::Dispatched => continue,
            };
            *slot += 1;
        }
        counts
    }

    /// Whether any task was counted.
    #[must_use]
    pub const fn is_loggable(&self) -> bool {
        self.total > 0
    }
}
