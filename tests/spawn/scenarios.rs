//! BDD scenarios for spawning hosts from a task.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SpawnContext, spawn_context};

#[scenario(
    path = "tests/features/spawn.feature",
    name = "Create task-scoped hosts from a distro template"
)]
fn scenario_task_scoped_hosts(spawn_context: SpawnContext) {
    drop(spawn_context);
}

#[scenario(
    path = "tests/features/spawn.feature",
    name = "Bind build-scoped hosts to the build"
)]
fn scenario_build_scoped_hosts(spawn_context: SpawnContext) {
    drop(spawn_context);
}

#[scenario(
    path = "tests/features/spawn.feature",
    name = "Give users their hosts with a named key"
)]
fn scenario_user_owned_hosts(spawn_context: SpawnContext) {
    drop(spawn_context);
}

#[scenario(
    path = "tests/features/spawn.feature",
    name = "Abort the batch on a malformed directive"
)]
fn scenario_malformed_directive(spawn_context: SpawnContext) {
    drop(spawn_context);
}

#[scenario(
    path = "tests/features/spawn.feature",
    name = "List spawned hosts with build hosts first"
)]
fn scenario_list_build_first(spawn_context: SpawnContext) {
    drop(spawn_context);
}

#[scenario(
    path = "tests/features/spawn.feature",
    name = "Report every failing host query"
)]
fn scenario_failing_host_queries(spawn_context: SpawnContext) {
    drop(spawn_context);
}
