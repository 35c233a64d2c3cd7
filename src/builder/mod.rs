//! Turns `host.create` directives into host intents.
//!
//! [`IntentBuilder::build_intents`] drives the whole flow for one task:
//! resolve the requester's public key, find the task's declared commands,
//! decode every directive, build one intent per requested replica, and hand
//! the batch to the host store in a single insert.
//! [`IntentBuilder::make_intent_host`] builds a single intent: it merges the
//! request onto the named distro, fixes the provider, decides ownership, and
//! names the host.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::clock::{Clock, RandomSource, SeededRandom, SystemClock, ThreadRandom};
use crate::command::host_create_requests;
use crate::config::SpawnConfig;
use crate::distro::Distro;
use crate::error::ProvisionError;
use crate::host::{
    HostIntent, Ownership, ProvisionOptions, SpawnBinding, TaskOwnership, UserOwnership,
};
use crate::merge::apply_overrides;
use crate::provider::Provider;
use crate::request::{HostCreationRequest, Scope};
use crate::settings::{Ec2Settings, ProviderSettings};
use crate::store::{DistroStore, HostStore, TaskStore};
use crate::task::Task;
use crate::user::User;

/// Builds host intents against a store, a clock, and a name randomness
/// source.
pub struct IntentBuilder<'a, S: ?Sized, C = SystemClock, R = Box<dyn RandomSource>> {
    store: &'a S,
    config: &'a SpawnConfig,
    clock: C,
    random: R,
}

impl<'a, S> IntentBuilder<'a, S>
where
    S: DistroStore + TaskStore + HostStore + ?Sized,
{
    /// Creates a builder on wall-clock time. Names use a seeded generator
    /// when `config.name_seed` is set and thread-local entropy otherwise.
    #[must_use]
    pub fn new(store: &'a S, config: &'a SpawnConfig) -> Self {
        let random = config.name_seed.map_or_else(
            || Box::new(ThreadRandom) as Box<dyn RandomSource>,
            |seed| Box::new(SeededRandom::new(seed)),
        );
        Self {
            store,
            config,
            clock: SystemClock,
            random,
        }
    }
}

impl<'a, S, C, R> IntentBuilder<'a, S, C, R>
where
    S: DistroStore + TaskStore + HostStore + ?Sized,
    C: Clock,
    R: RandomSource,
{
    /// Replaces the clock used for deadlines and name timestamps.
    #[must_use]
    pub fn with_clock<C2: Clock>(self, clock: C2) -> IntentBuilder<'a, S, C2, R> {
        IntentBuilder {
            store: self.store,
            config: self.config,
            clock,
            random: self.random,
        }
    }

    /// Replaces the source of name suffixes.
    #[must_use]
    pub fn with_random<R2: RandomSource>(self, random: R2) -> IntentBuilder<'a, S, C, R2> {
        IntentBuilder {
            store: self.store,
            config: self.config,
            clock: self.clock,
            random,
        }
    }

    /// Creates and stores every host the task's `host.create` directives ask
    /// for, returning the stored intents.
    ///
    /// `key_name_or_value` is looked up among `user`'s public keys; when the
    /// lookup fails, or there is no user, the value itself is used as the
    /// key. Without a user every host is task-owned.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::InvalidInput`] when `task` is `None`,
    /// [`ProvisionError::Configuration`] when the task's commands cannot be
    /// found or a distro's settings are malformed, [`ProvisionError::Decode`]
    /// for the first invalid directive, [`ProvisionError::NotFound`] for a
    /// missing distro or task, and [`ProvisionError::Persistence`] when a
    /// lookup or the insert fails. Nothing is stored on error.
    pub fn build_intents(
        &self,
        task: Option<&Task>,
        user: Option<&User>,
        key_name_or_value: &str,
    ) -> Result<Vec<HostIntent>, ProvisionError> {
        let Some(origin) = task else {
            return Err(ProvisionError::InvalidInput(String::from(
                "no task to create hosts from",
            )));
        };
        let public_key = resolve_public_key(user, key_name_or_value);

        let execution = self.store.execution_config(origin)?.ok_or_else(|| {
            ProvisionError::Configuration(format!(
                "unable to load configuration for task {}",
                origin.id
            ))
        })?;
        let project_task = execution
            .project
            .find_task(&origin.display_name)
            .ok_or_else(|| {
                ProvisionError::Configuration(format!(
                    "unable to find configuration for task {}",
                    origin.id
                ))
            })?;
        let requests = host_create_requests(&project_task.commands, self.config)?;

        let user_id = user.map_or("", |owner| owner.id.as_str());
        let mut intents = Vec::new();
        for request in &requests {
            for _ in 0..request.num_hosts {
                intents.push(self.make_intent_host(&origin.id, user_id, public_key, request)?);
            }
        }

        self.store.insert_many(&intents)?;
        info!(task = %origin.id, hosts = intents.len(), "stored host intents for task");
        Ok(intents)
    }

    /// Builds a single intent for `request`.
    ///
    /// A non-empty `user_id` makes the host user-owned; otherwise it is owned
    /// by `task_id` and bound to the task or its build per the request's
    /// scope. `public_key`, when present, is installed for the distro's login
    /// user by the setup script of the in-memory template only.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::NotFound`] when the distro, or for build
    /// scope the task, does not exist, [`ProvisionError::Configuration`]
    /// when the distro's settings do not decode, and
    /// [`ProvisionError::Persistence`] when a lookup fails.
    pub fn make_intent_host(
        &self,
        task_id: &str,
        user_id: &str,
        public_key: Option<&str>,
        request: &HostCreationRequest,
    ) -> Result<HostIntent, ProvisionError> {
        let provider = Provider::ec2(request.spot);
        let (mut distro, mut settings) = if request.distro.is_empty() {
            (Distro::default(), Ec2Settings::default())
        } else {
            let template = Distro::resolve(self.store, &request.distro)?;
            let decoded = Ec2Settings::from_bag(provider, &template.provider_settings)?;
            (template, decoded)
        };
        distro.provider = Some(provider);

        if let Some(key) = public_key.filter(|key| !key.is_empty()) {
            distro.append_authorized_key(key);
        }

        apply_overrides(&mut settings, request);
        distro.store_settings(&ProviderSettings::Ec2(settings))?;

        let ownership = if user_id.is_empty() {
            self.task_ownership(task_id, request)?
        } else {
            Ownership::User(UserOwnership {
                user_name: user_id.to_owned(),
                provision: ProvisionOptions {
                    load_cli: true,
                    task_id: task_id.to_owned(),
                    owner_id: user_id.to_owned(),
                },
            })
        };

        let name = distro.generate_name(provider, &self.clock, &self.random);
        debug!(%name, %provider, distro = %distro.id, "built host intent");
        Ok(HostIntent {
            name,
            distro,
            provider,
            ownership,
        })
    }

    fn task_ownership(
        &self,
        task_id: &str,
        request: &HostCreationRequest,
    ) -> Result<Ownership, ProvisionError> {
        let binding = match request.scope {
            Scope::Build => SpawnBinding::Build(Task::resolve(self.store, task_id)?.build_id),
            Scope::Task => SpawnBinding::Task(task_id.to_owned()),
        };
        let now = self.clock.now();
        Ok(Ownership::Task(TaskOwnership {
            owner: task_id.to_owned(),
            binding,
            setup_deadline: deadline(now, request.setup_timeout_secs)?,
            teardown_deadline: deadline(now, request.teardown_timeout_secs)?,
            retries: request.retries,
            spawned_by_task: true,
        }))
    }
}

fn resolve_public_key<'k>(user: Option<&'k User>, key_name_or_value: &'k str) -> Option<&'k str> {
    if key_name_or_value.is_empty() {
        return None;
    }
    let Some(owner) = user else {
        return Some(key_name_or_value);
    };
    let key = owner.public_key(key_name_or_value).unwrap_or_else(|err| {
        debug!(%err, "using supplied value as a literal public key");
        key_name_or_value
    });
    Some(key)
}

fn deadline(now: DateTime<Utc>, secs: u64) -> Result<DateTime<Utc>, ProvisionError> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| {
            ProvisionError::InvalidInput(format!("timeout of {secs} seconds is out of range"))
        })
}
