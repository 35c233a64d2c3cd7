//! Test support utilities shared across unit and integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::clock::Clock;
use crate::distro::Distro;
use crate::host::{Host, HostIntent};
use crate::provider::Provider;
use crate::request::Params;
use crate::settings::SettingsBag;
use crate::store::{DistroStore, HostStore, MemoryStore, StoreError, TaskStore, UserStore};
use crate::task::{CommandConfig, ExecutionConfig, Project, ProjectTask, Task};
use crate::user::{PublicKey, User};

/// Seconds since the epoch of [`FixedClock::default`]: 2024-01-02T03:04:05Z.
pub const FIXED_EPOCH_SECS: i64 = 1_704_164_645;

/// Clock frozen at a single instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freezes time `secs` seconds after the Unix epoch.
    #[must_use]
    pub fn at_timestamp(secs: i64) -> Self {
        Self(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at_timestamp(FIXED_EPOCH_SECS)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Store operation that a [`ScriptedStore`] can be told to fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureMode {
    /// `find_distro`.
    DistroLookup,
    /// `find_task`.
    TaskLookup,
    /// `execution_config`.
    ExecutionConfig,
    /// `find_user`.
    UserLookup,
    /// `insert_many`.
    Insert,
    /// `find_by_task_id`.
    TaskHosts,
    /// `find_by_build_id`.
    BuildHosts,
}

impl FailureMode {
    const fn flag(self) -> u8 {
        match self {
            Self::DistroLookup => 0b000_0001,
            Self::TaskLookup => 0b000_0010,
            Self::ExecutionConfig => 0b000_0100,
            Self::UserLookup => 0b000_1000,
            Self::Insert => 0b001_0000,
            Self::TaskHosts => 0b010_0000,
            Self::BuildHosts => 0b100_0000,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Failures(u8);

impl Failures {
    const fn set(&mut self, mode: FailureMode) {
        self.0 |= mode.flag();
    }

    const fn contains(self, mode: FailureMode) -> bool {
        self.0 & mode.flag() != 0
    }
}

#[derive(Debug, Default)]
struct Counters {
    failures: Failures,
    insert_calls: u32,
}

/// In-memory store with failure injection and call counting.
///
/// Clones share state, so a scenario can keep a handle while the code under
/// test borrows another.
#[derive(Clone, Debug, Default)]
pub struct ScriptedStore {
    memory: Arc<MemoryStore>,
    state: Arc<Mutex<Counters>>,
}

impl ScriptedStore {
    /// Creates an empty store that fails nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The backing store, for seeding and inspection.
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    /// Makes every later call of `mode` fail.
    pub fn fail(&self, mode: FailureMode) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .failures
            .set(mode);
    }

    /// Number of `insert_many` calls seen, including failed ones.
    #[must_use]
    pub fn insert_calls(&self) -> u32 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_calls
    }

    fn check(&self, mode: FailureMode) -> Result<(), StoreError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.failures.contains(mode) {
            return Err(StoreError::Unavailable(format!("simulated {mode:?} failure")));
        }
        Ok(())
    }
}

impl DistroStore for ScriptedStore {
    fn find_distro(&self, id: &str) -> Result<Option<Distro>, StoreError> {
        self.check(FailureMode::DistroLookup)?;
        self.memory.find_distro(id)
    }
}

impl TaskStore for ScriptedStore {
    fn find_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        self.check(FailureMode::TaskLookup)?;
        self.memory.find_task(id)
    }

    fn execution_config(&self, task: &Task) -> Result<Option<ExecutionConfig>, StoreError> {
        self.check(FailureMode::ExecutionConfig)?;
        self.memory.execution_config(task)
    }
}

impl UserStore for ScriptedStore {
    fn find_user(&self, name: &str) -> Result<Option<User>, StoreError> {
        self.check(FailureMode::UserLookup)?;
        self.memory.find_user(name)
    }
}

impl HostStore for ScriptedStore {
    fn insert_many(&self, intents: &[HostIntent]) -> Result<(), StoreError> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert_calls += 1;
        self.check(FailureMode::Insert)?;
        self.memory.insert_many(intents)
    }

    fn find_by_task_id(&self, task_id: &str) -> Result<Vec<Host>, StoreError> {
        self.check(FailureMode::TaskHosts)?;
        self.memory.find_by_task_id(task_id)
    }

    fn find_by_build_id(&self, build_id: &str) -> Result<Vec<Host>, StoreError> {
        self.check(FailureMode::BuildHosts)?;
        self.memory.find_by_build_id(build_id)
    }
}

/// An EC2 distro with a complete settings bag.
#[must_use]
pub fn ec2_distro(id: &str) -> Distro {
    let settings = serde_json::json!({
        "ami": "ami-template",
        "instance_type": "m5.large",
        "key_name": "distro-key",
        "region": "us-east-1",
        "security_group_ids": ["sg-template"],
        "subnet_id": "subnet-template",
        "mount_points": [{ "device_name": "/dev/xvda", "size": 100 }],
        "bid_price": 0.1,
    });
    let provider_settings = match settings {
        Value::Object(bag) => bag,
        _ => SettingsBag::new(),
    };
    Distro {
        id: id.to_owned(),
        arch: String::from("linux_amd64"),
        work_dir: String::from("/data/mci"),
        provider: Some(Provider::Ec2Auto),
        provider_settings,
        setup: String::from("#!/bin/bash\nset -e"),
        user: String::from("ubuntu"),
        spawn_allowed: true,
        ..Distro::default()
    }
}

/// A task named `display_name` in build `build_id`.
#[must_use]
pub fn task(id: &str, build_id: &str, display_name: &str) -> Task {
    Task {
        id: id.to_owned(),
        build_id: build_id.to_owned(),
        display_name: display_name.to_owned(),
        activated: true,
        ..Task::default()
    }
}

/// A `host.create` command with `params`; non-object values yield empty
/// parameters.
#[must_use]
pub fn host_create(params: Value) -> CommandConfig {
    command(crate::command::CREATE_HOST_COMMAND, params)
}

/// An arbitrary command with parameters taken from `raw`.
#[must_use]
pub fn command(name: &str, raw: Value) -> CommandConfig {
    let params = match raw {
        Value::Object(map) => map,
        _ => Params::new(),
    };
    CommandConfig {
        command: name.to_owned(),
        params,
    }
}

/// A project declaring one task with `commands`.
#[must_use]
pub fn execution_config(task_name: &str, commands: Vec<CommandConfig>) -> ExecutionConfig {
    ExecutionConfig {
        project: Project {
            tasks: vec![ProjectTask {
                name: task_name.to_owned(),
                commands,
            }],
        },
    }
}

/// A user with one named key.
#[must_use]
pub fn user_with_key(id: &str, key_name: &str, key: &str) -> User {
    User {
        id: id.to_owned(),
        public_keys: vec![PublicKey {
            name: key_name.to_owned(),
            key: key.to_owned(),
        }],
    }
}
