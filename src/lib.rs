//! Core library for turning `host.create` directives into host intents.
//!
//! A running task, or a user acting on its behalf, asks for hosts by
//! declaring `host.create` commands. The crate decodes those directives,
//! merges each one onto its distro template, decides who owns the resulting
//! host and when it is torn down, names it, and hands the batch to a host
//! store. It never talks to a cloud provider; executing an intent is someone
//! else's job.

pub mod builder;
pub mod catalogue;
pub mod clock;
pub mod command;
pub mod config;
pub mod distro;
pub mod error;
pub mod host;
pub mod lookup;
pub mod merge;
pub mod pool;
pub mod provider;
pub mod request;
pub mod settings;
pub mod store;
pub mod task;
pub mod test_support;
pub mod user;

pub use builder::IntentBuilder;
pub use catalogue::{Catalogue, CatalogueError, TaskDocument};
pub use clock::{Clock, RandomSource, SeededRandom, SystemClock, ThreadRandom};
pub use command::{CREATE_HOST_COMMAND, host_create_requests};
pub use config::{ConfigError, SpawnConfig};
pub use distro::{Distro, DistroGroup, Expansion};
pub use error::{EntityKind, ErrorList, ProvisionError};
pub use host::{
    Host, HostIntent, HostStatus, Ownership, ProvisionOptions, SpawnBinding, TaskOwnership,
    UserOwnership,
};
pub use lookup::list_hosts_for_task;
pub use merge::{EC2_OVERRIDES, FieldOverride, apply_overrides};
pub use pool::{
    ContainerPool, ContainerPoolsConfig, PoolValidationError, PoolViolation, validate_pools,
};
pub use provider::Provider;
pub use request::{HostCreationRequest, RequestError, Scope};
pub use settings::{Ec2Settings, ProviderSettings, SettingsError};
pub use store::{DistroStore, HostStore, MemoryStore, StoreError, TaskStore, UserStore};
pub use task::{DisplayStatus, ExecutionConfig, ResultCounts, Task};
pub use user::User;
