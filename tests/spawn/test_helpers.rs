//! Shared fixtures for host spawning scenarios.
//!
//! The context only records what the scenario set up and what happened. Each
//! `When` step seeds a fresh store from that record, so no store handle or
//! `Result` is carried between steps.

use hostspawn::task::CommandConfig;
use hostspawn::test_support::{
    FIXED_EPOCH_SECS, FailureMode, FixedClock, ScriptedStore, ec2_distro, execution_config,
    host_create, task, user_with_key,
};
use hostspawn::{
    ConfigError, Host, HostIntent, IntentBuilder, Ownership, Provider, ProvisionError,
    SpawnBinding, SpawnConfig, TaskOwnership, User,
};
use rstest::fixture;
use serde_json::json;
use thiserror::Error;

pub const DISTRO_ID: &str = "ubuntu2204";
pub const TASK_ID: &str = "task-1";
pub const BUILD_ID: &str = "build-7";
pub const DISPLAY_NAME: &str = "integration";
pub const EXISTING_BUILD_HOST: &str = "evg-build-host";

/// One `host.create` directive declared by the task.
#[derive(Clone, Debug)]
pub struct Directive {
    pub count: u32,
    pub distro: String,
    pub build_scoped: bool,
}

impl Directive {
    fn command(&self) -> CommandConfig {
        let scope = if self.build_scoped { "build" } else { "task" };
        host_create(json!({
            "distro": self.distro,
            "num_hosts": self.count,
            "scope": scope,
        }))
    }
}

/// User asking for the hosts and the key they name.
#[derive(Clone, Debug)]
pub struct Requester {
    pub user_name: String,
    pub key_name: String,
}

impl Requester {
    /// Key material stored under the requester's key name.
    pub fn key_material(&self) -> String {
        format!("ssh-ed25519 AAAA {}@{}", self.user_name, self.key_name)
    }

    fn user(&self) -> User {
        user_with_key(&self.user_name, &self.key_name, &self.key_material())
    }
}

/// What a stored intent looked like, reduced to the facts scenarios check.
#[derive(Clone, Debug)]
pub struct IntentSummary {
    pub name: String,
    pub task_owner: Option<String>,
    pub user_owner: Option<String>,
    pub binding: Option<SpawnBinding>,
    pub teardown_secs: Option<i64>,
    pub setup: String,
}

impl IntentSummary {
    fn from_intent(intent: &HostIntent) -> Self {
        let user_owner = match &intent.ownership {
            Ownership::User(ownership) => Some(ownership.user_name.clone()),
            Ownership::Task(_) => None,
        };
        Self {
            name: intent.name.clone(),
            task_owner: intent
                .task_ownership()
                .map(|ownership| ownership.owner.clone()),
            user_owner,
            binding: intent.spawn_binding().cloned(),
            teardown_secs: intent
                .teardown_deadline()
                .map(|deadline| deadline.timestamp() - FIXED_EPOCH_SECS),
            setup: intent.distro.setup.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpawnFailureKind {
    NotFound,
    Configuration,
    Decode,
    Persistence,
    InvalidInput,
    Aggregate,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpawnFailure {
    pub kind: SpawnFailureKind,
    pub message: String,
    pub errors: usize,
}

impl SpawnFailure {
    fn from_error(err: &ProvisionError) -> Self {
        let (kind, errors) = match err {
            ProvisionError::NotFound { .. } => (SpawnFailureKind::NotFound, 1),
            ProvisionError::Configuration(_) => (SpawnFailureKind::Configuration, 1),
            ProvisionError::Decode(_) => (SpawnFailureKind::Decode, 1),
            ProvisionError::Persistence(_) => (SpawnFailureKind::Persistence, 1),
            ProvisionError::InvalidInput(_) => (SpawnFailureKind::InvalidInput, 1),
            ProvisionError::Aggregate(list) => (SpawnFailureKind::Aggregate, list.len()),
        };
        Self {
            kind,
            message: err.to_string(),
            errors,
        }
    }
}

#[derive(Clone, Debug)]
pub enum SpawnOutcome {
    Stored {
        intents: Vec<IntentSummary>,
        stored_hosts: usize,
        insert_calls: u32,
    },
    Failed {
        failure: SpawnFailure,
        stored_hosts: usize,
        insert_calls: u32,
    },
}

#[derive(Clone, Debug)]
pub enum ListingOutcome {
    Listed(Vec<String>),
    Failed(SpawnFailure),
}

#[derive(Clone, Debug)]
pub struct SpawnContext {
    pub config: SpawnConfig,
    pub directives: Vec<Directive>,
    pub requester: Option<Requester>,
    pub failures: Vec<FailureMode>,
    pub build_host_running: bool,
    pub requested: bool,
    pub outcome: Option<SpawnOutcome>,
    pub listing: Option<ListingOutcome>,
}

impl SpawnContext {
    /// Seeds a store with the task, its distro, its directives, and whatever
    /// the scenario arranged.
    pub fn seeded_store(&self) -> ScriptedStore {
        let store = ScriptedStore::new();
        let memory = store.memory();
        memory.put_task(task(TASK_ID, BUILD_ID, DISPLAY_NAME));
        memory.put_distro(ec2_distro(DISTRO_ID));
        memory.put_execution_config(
            TASK_ID,
            execution_config(
                DISPLAY_NAME,
                self.directives.iter().map(Directive::command).collect(),
            ),
        );
        if let Some(requester) = &self.requester {
            memory.put_user(requester.user());
        }
        if self.build_host_running {
            memory.put_host(build_host());
        }
        for mode in &self.failures {
            store.fail(*mode);
        }
        store
    }

    /// Runs the task's directives against `store`.
    pub fn request_hosts(&self, store: &ScriptedStore) -> Result<Vec<HostIntent>, ProvisionError> {
        let origin = task(TASK_ID, BUILD_ID, DISPLAY_NAME);
        let user = self.requester.as_ref().map(Requester::user);
        let key = self
            .requester
            .as_ref()
            .map_or("", |requester| requester.key_name.as_str());
        IntentBuilder::new(store, &self.config)
            .with_clock(FixedClock::default())
            .build_intents(Some(&origin), user.as_ref(), key)
    }

    /// Records the result of a request made against `store`.
    pub fn record_request(
        &mut self,
        store: &ScriptedStore,
        result: &Result<Vec<HostIntent>, ProvisionError>,
    ) {
        let stored_hosts = store.memory().hosts().len();
        let insert_calls = store.insert_calls();
        self.requested = true;
        self.outcome = Some(match result {
            Ok(intents) => SpawnOutcome::Stored {
                intents: intents.iter().map(IntentSummary::from_intent).collect(),
                stored_hosts,
                insert_calls,
            },
            Err(err) => SpawnOutcome::Failed {
                failure: SpawnFailure::from_error(err),
                stored_hosts,
                insert_calls,
            },
        });
    }

    /// Records the result of listing the task's hosts.
    pub fn record_listing(&mut self, result: &Result<Vec<Host>, ProvisionError>) {
        self.listing = Some(match result {
            Ok(hosts) => ListingOutcome::Listed(hosts.iter().map(|host| host.id.clone()).collect()),
            Err(err) => ListingOutcome::Failed(SpawnFailure::from_error(err)),
        });
    }
}

fn build_host() -> Host {
    let now = FixedClock::default().0;
    Host::from_intent(HostIntent {
        name: String::from(EXISTING_BUILD_HOST),
        distro: ec2_distro(DISTRO_ID),
        provider: Provider::Ec2OnDemand,
        ownership: Ownership::Task(TaskOwnership {
            owner: String::from("task-0"),
            binding: SpawnBinding::Build(String::from(BUILD_ID)),
            setup_deadline: now,
            teardown_deadline: now,
            retries: 0,
            spawned_by_task: true,
        }),
    })
}

#[derive(Debug, Error)]
pub enum SpawnTestError {
    #[error("invalid spawn configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type SpawnContextResult = Result<SpawnContext, SpawnTestError>;

#[fixture]
pub fn spawn_context_result() -> SpawnContextResult {
    build_spawn_context()
}

#[fixture]
pub fn spawn_context(spawn_context_result: SpawnContextResult) -> SpawnContext {
    spawn_context_result
        .unwrap_or_else(|err| panic!("spawn context fixture should initialise: {err}"))
}

fn build_spawn_context() -> SpawnContextResult {
    let config = SpawnConfig {
        name_seed: Some(42),
        ..SpawnConfig::builtin_defaults()
    };
    config.validate()?;

    Ok(SpawnContext {
        config,
        directives: Vec::new(),
        requester: None,
        failures: Vec::new(),
        build_host_running: false,
        requested: false,
        outcome: None,
        listing: None,
    })
}
