//! BDD step definitions for spawning hosts from a task.

use std::collections::BTreeSet;

use hostspawn::test_support::FailureMode;
use hostspawn::{SpawnBinding, list_hosts_for_task};
use rstest_bdd_macros::{given, then, when};

use super::test_helpers::{
    DISTRO_ID, Directive, EXISTING_BUILD_HOST, IntentSummary, ListingOutcome, Requester,
    SpawnContext, SpawnFailure, SpawnFailureKind, SpawnOutcome, SpawnTestError, TASK_ID,
};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] SpawnTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

fn check(condition: bool, message: impl FnOnce() -> String) -> Result<(), StepError> {
    if condition {
        Ok(())
    } else {
        Err(StepError::Assertion(message()))
    }
}

fn stored_intents(spawn_context: &SpawnContext) -> Result<&[IntentSummary], StepError> {
    match &spawn_context.outcome {
        Some(SpawnOutcome::Stored { intents, .. }) => Ok(intents),
        Some(SpawnOutcome::Failed { failure, .. }) => Err(StepError::Assertion(format!(
            "expected stored intents, got failure: {}",
            failure.message
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

fn listing_failure(spawn_context: &SpawnContext) -> Result<&SpawnFailure, StepError> {
    let Some(ListingOutcome::Failed(failure)) = &spawn_context.listing else {
        return Err(StepError::Assertion(format!(
            "expected a failed listing, got {:?}",
            spawn_context.listing
        )));
    };
    Ok(failure)
}

#[given("a task whose configuration declares \"{count}\" hosts of distro \"{distro}\"")]
fn task_declares_hosts(mut spawn_context: SpawnContext, count: u32, distro: String) -> SpawnContext {
    spawn_context.directives.push(Directive {
        count,
        distro,
        build_scoped: false,
    });
    spawn_context
}

#[given("the directive is scoped to the build")]
fn directive_scoped_to_build(mut spawn_context: SpawnContext) -> SpawnContext {
    if let Some(last) = spawn_context.directives.last_mut() {
        last.build_scoped = true;
    }
    spawn_context
}

#[given("user \"{user}\" requests the hosts with key \"{key}\"")]
fn user_requests_hosts(mut spawn_context: SpawnContext, user: String, key: String) -> SpawnContext {
    spawn_context.requester = Some(Requester {
        user_name: user,
        key_name: key,
    });
    spawn_context
}

#[given("the configuration also declares a directive asking for \"{count}\" hosts")]
fn configuration_declares_oversized_directive(
    mut spawn_context: SpawnContext,
    count: u32,
) -> SpawnContext {
    spawn_context.directives.push(Directive {
        count,
        distro: String::from(DISTRO_ID),
        build_scoped: false,
    });
    spawn_context
}

#[given("a build-scoped host already runs for the build")]
fn build_host_running(mut spawn_context: SpawnContext) -> SpawnContext {
    spawn_context.build_host_running = true;
    spawn_context
}

#[given("both spawned host queries fail")]
fn host_queries_fail(mut spawn_context: SpawnContext) -> SpawnContext {
    spawn_context.failures.push(FailureMode::TaskHosts);
    spawn_context.failures.push(FailureMode::BuildHosts);
    spawn_context
}

#[when("the task requests its hosts")]
fn task_requests_hosts(mut spawn_context: SpawnContext) -> Result<SpawnContext, StepError> {
    let store = spawn_context.seeded_store();
    let result = spawn_context.request_hosts(&store);
    spawn_context.record_request(&store, &result);
    Ok(spawn_context)
}

#[when("the task's spawned hosts are listed")]
fn spawned_hosts_listed(mut spawn_context: SpawnContext) -> Result<SpawnContext, StepError> {
    let store = spawn_context.seeded_store();
    if spawn_context.requested {
        spawn_context
            .request_hosts(&store)
            .map_err(|err| StepError::Assertion(format!("replaying the request failed: {err}")))?;
    }
    let result = list_hosts_for_task(&store, TASK_ID);
    spawn_context.record_listing(&result);
    Ok(spawn_context)
}

#[then("\"{count}\" host intents are stored in one batch")]
fn intents_stored(spawn_context: &SpawnContext, count: usize) -> Result<(), StepError> {
    let Some(SpawnOutcome::Stored {
        intents,
        stored_hosts,
        insert_calls,
    }) = &spawn_context.outcome
    else {
        return Err(StepError::Assertion(format!(
            "expected stored intents, got {:?}",
            spawn_context.outcome
        )));
    };
    check(intents.len() == count, || {
        format!("expected {count} intents, got {}", intents.len())
    })?;
    check(*stored_hosts == count, || {
        format!("expected {count} stored hosts, got {stored_hosts}")
    })?;
    check(*insert_calls == 1, || {
        format!("expected one insert, got {insert_calls}")
    })
}

#[then("every intent is owned by the task")]
fn intents_owned_by_task(spawn_context: &SpawnContext) -> Result<(), StepError> {
    let expected = SpawnBinding::Task(String::from(TASK_ID));
    for intent in stored_intents(spawn_context)? {
        let owned = intent.task_owner.as_deref() == Some(TASK_ID)
            && intent.binding.as_ref() == Some(&expected);
        check(owned, || {
            format!("{} is not owned by {TASK_ID}: {intent:?}", intent.name)
        })?;
    }
    Ok(())
}

#[then("every intent tears down \"{secs}\" seconds from now")]
fn intents_tear_down_after(spawn_context: &SpawnContext, secs: i64) -> Result<(), StepError> {
    for intent in stored_intents(spawn_context)? {
        check(intent.teardown_secs == Some(secs), || {
            format!(
                "{} tears down after {:?} seconds, expected {secs}",
                intent.name, intent.teardown_secs
            )
        })?;
    }
    Ok(())
}

#[then("the intent names are distinct")]
fn intent_names_distinct(spawn_context: &SpawnContext) -> Result<(), StepError> {
    let intents = stored_intents(spawn_context)?;
    let names = intents
        .iter()
        .map(|intent| intent.name.as_str())
        .collect::<BTreeSet<_>>();
    check(names.len() == intents.len(), || {
        format!("duplicate names among {names:?}")
    })
}

#[then("every intent is bound to build \"{build}\"")]
fn intents_bound_to_build(spawn_context: &SpawnContext, build: String) -> Result<(), StepError> {
    let expected = SpawnBinding::Build(build);
    for intent in stored_intents(spawn_context)? {
        check(intent.binding.as_ref() == Some(&expected), || {
            format!("{} is bound to {:?}", intent.name, intent.binding)
        })?;
    }
    Ok(())
}

#[then("every intent is owned by user \"{user}\"")]
fn intents_owned_by_user(spawn_context: &SpawnContext, user: String) -> Result<(), StepError> {
    for intent in stored_intents(spawn_context)? {
        let owned = intent.user_owner.as_deref() == Some(user.as_str());
        check(owned && intent.teardown_secs.is_none(), || {
            format!("{} is not owned by {user}: {intent:?}", intent.name)
        })?;
    }
    Ok(())
}

#[then("the setup script installs \"{key}\"")]
fn setup_installs_key(spawn_context: &SpawnContext, key: String) -> Result<(), StepError> {
    let expected = spawn_context
        .requester
        .as_ref()
        .map(Requester::key_material)
        .unwrap_or_default();
    check(expected == key, || {
        format!("scenario key {key} differs from the stored key {expected}")
    })?;
    for intent in stored_intents(spawn_context)? {
        check(intent.setup.contains(&key), || {
            format!("setup for {} lacks the key: {}", intent.name, intent.setup)
        })?;
    }
    Ok(())
}

#[then("the request fails with a decode error")]
fn request_fails_to_decode(spawn_context: &SpawnContext) -> Result<(), StepError> {
    let Some(SpawnOutcome::Failed { failure, .. }) = &spawn_context.outcome else {
        return Err(StepError::Assertion(format!(
            "expected a failure, got {:?}",
            spawn_context.outcome
        )));
    };
    check(failure.kind == SpawnFailureKind::Decode, || {
        format!("expected a decode error, got {failure:?}")
    })
}

#[then("nothing is stored")]
fn nothing_stored(spawn_context: &SpawnContext) -> Result<(), StepError> {
    let Some(SpawnOutcome::Failed {
        stored_hosts,
        insert_calls,
        ..
    }) = &spawn_context.outcome
    else {
        return Err(StepError::Assertion(format!(
            "expected a failure, got {:?}",
            spawn_context.outcome
        )));
    };
    check(*stored_hosts == 0, || {
        format!("expected no hosts, found {stored_hosts}")
    })?;
    check(*insert_calls == 0, || {
        format!("expected no insert, got {insert_calls}")
    })
}

#[then("\"{count}\" hosts are listed with the build host first")]
fn hosts_listed_build_first(spawn_context: &SpawnContext, count: usize) -> Result<(), StepError> {
    let Some(ListingOutcome::Listed(hosts)) = &spawn_context.listing else {
        return Err(StepError::Assertion(format!(
            "expected a listing, got {:?}",
            spawn_context.listing
        )));
    };
    check(hosts.len() == count, || {
        format!("expected {count} hosts, got {hosts:?}")
    })?;
    let first = hosts.first().map(String::as_str);
    check(first == Some(EXISTING_BUILD_HOST), || {
        format!("expected the build host first, got {first:?}")
    })
}

#[then("the listing fails with \"{count}\" errors")]
fn listing_fails(spawn_context: &SpawnContext, count: usize) -> Result<(), StepError> {
    let failure = listing_failure(spawn_context)?;
    check(
        failure.kind == SpawnFailureKind::Aggregate && failure.errors == count,
        || format!("expected {count} aggregated errors, got {failure:?}"),
    )
}
