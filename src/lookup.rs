//! Hosts spawned on behalf of a task.

use tracing::warn;

use crate::error::{ErrorList, ProvisionError};
use crate::host::Host;
use crate::store::{HostStore, TaskStore};
use crate::task::Task;

/// Lists the live hosts spawned for `task_id` or for its build, build hosts
/// first.
///
/// Both queries always run. If either fails the call fails with every
/// failure and no hosts.
///
/// # Errors
///
/// Returns [`ProvisionError::NotFound`] when the task does not exist,
/// [`ProvisionError::Persistence`] when the task lookup fails, and
/// [`ProvisionError::Aggregate`] when either host query fails.
pub fn list_hosts_for_task<S>(store: &S, task_id: &str) -> Result<Vec<Host>, ProvisionError>
where
    S: TaskStore + HostStore + ?Sized,
{
    let task = Task::resolve(store, task_id)?;

    let by_task = store.find_by_task_id(&task.id);
    let by_build = store.find_by_build_id(&task.build_id);

    let mut failures = Vec::new();
    let mut hosts = Vec::new();
    for result in [by_build, by_task] {
        match result {
            Ok(found) => hosts.extend(found),
            Err(err) => {
                warn!(task = %task.id, %err, "spawned host query failed");
                failures.push(ProvisionError::from(err));
            }
        }
    }
    if let Some(errors) = ErrorList::from_vec(failures) {
        return Err(ProvisionError::Aggregate(errors));
    }
    Ok(hosts)
}
