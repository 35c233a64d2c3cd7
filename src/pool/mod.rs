//! Container pools and their structural validation.
//!
//! A container pool runs containers on hosts of one parent distro. The parent
//! must be an ordinary distro: a parent that is itself backed by a container
//! pool would nest pooling, which the platform cannot schedule.
//!
//! Pool membership is passed in explicitly as a [`ContainerPoolsConfig`];
//! nothing here reads process-wide settings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ErrorList, ProvisionError};
use crate::store::DistroStore;

/// Group of container-based execution units backed by one parent distro.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ContainerPool {
    /// Unique pool identifier.
    pub id: String,
    /// Identifier of the parent distro whose hosts run the containers.
    pub distro: String,
    /// Most containers one parent host may run.
    pub max_containers: u32,
}

/// The platform's container pool configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ContainerPoolsConfig {
    /// Configured pools in declaration order.
    pub pools: Vec<ContainerPool>,
}

/// A single misconfiguration found while validating pools.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PoolViolation {
    /// Raised when a pool has a blank identifier.
    #[error("container pool at position {index} has no id")]
    MissingId {
        /// Zero-based position in the configuration.
        index: usize,
    },
    /// Raised when a pool names no parent distro.
    #[error("container pool {pool} has no parent distro")]
    MissingDistro {
        /// Offending pool.
        pool: String,
    },
    /// Raised when two pools share an identifier.
    #[error("container pool id {pool} is declared more than once")]
    DuplicateId {
        /// Repeated pool identifier.
        pool: String,
    },
    /// Raised when a pool allows no containers.
    #[error("container pool {pool} must allow at least one container")]
    NoCapacity {
        /// Offending pool.
        pool: String,
    },
    /// Raised when the parent distro lookup fails.
    #[error("error finding distro {distro} for container pool {pool}: {message}")]
    DistroLookup {
        /// Offending pool.
        pool: String,
        /// Parent distro identifier.
        distro: String,
        /// Storage failure message.
        message: String,
    },
    /// Raised when the parent distro does not exist.
    #[error("distro {distro} for container pool {pool} does not exist")]
    DistroMissing {
        /// Offending pool.
        pool: String,
        /// Parent distro identifier.
        distro: String,
    },
    /// Raised when the parent distro itself belongs to a container pool.
    #[error(
        "container pool {pool} has invalid distro {distro}: it is backed by container pool {nested}"
    )]
    NestedPool {
        /// Offending pool.
        pool: String,
        /// Parent distro identifier.
        distro: String,
        /// Pool the parent distro refers to.
        nested: String,
    },
}

impl PoolViolation {
    /// Identifier of the pool the violation concerns, when it has one.
    #[must_use]
    pub fn pool(&self) -> Option<&str> {
        match self {
            Self::MissingId { .. } => None,
            Self::MissingDistro { pool }
            | Self::DuplicateId { pool }
            | Self::NoCapacity { pool }
            | Self::DistroLookup { pool, .. }
            | Self::DistroMissing { pool, .. }
            | Self::NestedPool { pool, .. } => Some(pool),
        }
    }
}

/// Every violation found in one validation pass.
pub type PoolValidationError = ErrorList<PoolViolation>;

impl From<PoolValidationError> for ProvisionError {
    fn from(value: PoolValidationError) -> Self {
        Self::Configuration(value.to_string())
    }
}

impl ContainerPoolsConfig {
    /// Looks up a pool by identifier.
    #[must_use]
    pub fn pool(&self, id: &str) -> Option<&ContainerPool> {
        self.pools.iter().find(|pool| pool.id == id)
    }

    /// Whether any pool runs on hosts of `distro_id`.
    #[must_use]
    pub fn has_parent(&self, distro_id: &str) -> bool {
        self.pools.iter().any(|pool| pool.distro == distro_id)
    }

    /// Checks each pool's own fields: identifiers present and unique, a
    /// parent distro named, and room for at least one container.
    ///
    /// # Errors
    ///
    /// Returns every violation found, in declaration order.
    pub fn validate(&self) -> Result<(), PoolValidationError> {
        let mut seen = BTreeSet::new();
        let mut violations = Vec::new();
        for (index, pool) in self.pools.iter().enumerate() {
            if pool.id.trim().is_empty() {
                violations.push(PoolViolation::MissingId { index });
                continue;
            }
            if !seen.insert(pool.id.as_str()) {
                violations.push(PoolViolation::DuplicateId {
                    pool: pool.id.clone(),
                });
            }
            if pool.distro.trim().is_empty() {
                violations.push(PoolViolation::MissingDistro {
                    pool: pool.id.clone(),
                });
            }
            if pool.max_containers == 0 {
                violations.push(PoolViolation::NoCapacity {
                    pool: pool.id.clone(),
                });
            }
        }
        ErrorList::into_result(violations)
    }
}

/// Resolves every pool's parent distro and rejects parents that are
/// themselves backed by a container pool.
///
/// All pools are checked before returning so callers see the complete list of
/// misconfigurations in one pass. Pools naming no parent are left to
/// [`ContainerPoolsConfig::validate`].
///
/// # Errors
///
/// Returns a [`PoolValidationError`] listing each pool whose parent cannot be
/// resolved or would nest pooling.
pub fn validate_pools<S>(
    pools: &ContainerPoolsConfig,
    distros: &S,
) -> Result<(), PoolValidationError>
where
    S: DistroStore + ?Sized,
{
    let mut violations = Vec::new();
    for pool in &pools.pools {
        if pool.distro.trim().is_empty() {
            continue;
        }
        match distros.find_distro(&pool.distro) {
            Err(err) => violations.push(PoolViolation::DistroLookup {
                pool: pool.id.clone(),
                distro: pool.distro.clone(),
                message: err.to_string(),
            }),
            Ok(None) => violations.push(PoolViolation::DistroMissing {
                pool: pool.id.clone(),
                distro: pool.distro.clone(),
            }),
            Ok(Some(distro)) if !distro.container_pool.is_empty() => {
                violations.push(PoolViolation::NestedPool {
                    pool: pool.id.clone(),
                    distro: distro.id,
                    nested: distro.container_pool,
                });
            }
            Ok(Some(_)) => {
                debug!(pool = %pool.id, distro = %pool.distro, "container pool parent ok");
            }
        }
    }
    for violation in &violations {
        warn!(%violation, "invalid container pool");
    }
    ErrorList::into_result(violations)
}
