//! Compute providers that can realise a host intent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend that realises a host: a cloud, a container runtime, or a static
/// registration.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum Provider {
    /// EC2, choosing between spot and on-demand capacity automatically.
    #[serde(rename = "ec2-auto")]
    Ec2Auto,
    /// EC2 on-demand capacity.
    #[serde(rename = "ec2-ondemand")]
    Ec2OnDemand,
    /// EC2 spot capacity.
    #[serde(rename = "ec2-spot")]
    Ec2Spot,
    /// Containers scheduled onto a parent host.
    #[serde(rename = "docker")]
    Docker,
    /// In-process container double used by integration environments.
    #[serde(rename = "docker-mock")]
    DockerMock,
    /// Google Compute Engine.
    #[serde(rename = "gce")]
    Gce,
    /// `OpenStack` compute.
    #[serde(rename = "openstack")]
    Openstack,
    /// `VMware` vSphere.
    #[serde(rename = "vsphere")]
    Vsphere,
    /// Pre-registered machines that are never created on demand.
    #[serde(rename = "static")]
    Static,
    /// In-process provider double.
    #[serde(rename = "mock")]
    Mock,
}

/// Providers that create hosts on demand rather than registering them.
pub const SPAWNABLE: [Provider; 8] = [
    Provider::Ec2OnDemand,
    Provider::Ec2Spot,
    Provider::Ec2Auto,
    Provider::Gce,
    Provider::Openstack,
    Provider::Vsphere,
    Provider::Mock,
    Provider::Docker,
];

/// Longest instance name Compute Engine accepts.
pub const GCE_MAX_NAME_LENGTH: usize = 63;

impl Provider {
    /// All known providers.
    pub const ALL: [Self; 10] = [
        Self::Ec2Auto,
        Self::Ec2OnDemand,
        Self::Ec2Spot,
        Self::Docker,
        Self::DockerMock,
        Self::Gce,
        Self::Openstack,
        Self::Vsphere,
        Self::Static,
        Self::Mock,
    ];

    /// Returns the identifier used in configuration and storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ec2Auto => "ec2-auto",
            Self::Ec2OnDemand => "ec2-ondemand",
            Self::Ec2Spot => "ec2-spot",
            Self::Docker => "docker",
            Self::DockerMock => "docker-mock",
            Self::Gce => "gce",
            Self::Openstack => "openstack",
            Self::Vsphere => "vsphere",
            Self::Static => "static",
            Self::Mock => "mock",
        }
    }

    /// Picks the EC2 capacity flavour for a `host.create` request.
    #[must_use]
    pub const fn ec2(spot: bool) -> Self {
        if spot { Self::Ec2Spot } else { Self::Ec2OnDemand }
    }

    /// Whether hosts for this provider are spawned on demand.
    #[must_use]
    pub fn is_spawnable(self) -> bool {
        SPAWNABLE.contains(&self)
    }

    /// Whether this provider runs hosts as containers on a parent.
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Docker | Self::DockerMock)
    }

    /// Returns the identifier restriction the provider enforces, if any.
    #[must_use]
    pub const fn name_constraint(self) -> Option<NameConstraint> {
        match self {
            Self::Gce => Some(NameConstraint {
                max_len: GCE_MAX_NAME_LENGTH,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unrecognised provider identifier.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown provider '{0}'")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str() == value.trim())
            .ok_or_else(|| UnknownProvider(value.to_owned()))
    }
}

/// Restrictive instance-name rule: lowercase ASCII alphanumerics, `_` and
/// `-`, capped at `max_len` characters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct NameConstraint {
    /// Maximum name length in characters.
    pub max_len: usize,
}

impl NameConstraint {
    /// Whether `ch` may appear in a constrained name.
    #[must_use]
    pub const fn allows(ch: char) -> bool {
        ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
    }

    /// Lower-cases `name`, strips disallowed characters, and truncates the
    /// result to `max_len`.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        name.to_lowercase()
            .chars()
            .filter(|ch| Self::allows(*ch))
            .take(self.max_len)
            .collect()
    }

    /// Whether `name` already satisfies the rule.
    #[must_use]
    pub fn accepts(&self, name: &str) -> bool {
        name.chars().count() <= self.max_len && name.chars().all(Self::allows)
    }
}
