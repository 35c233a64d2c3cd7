//! Typed `host.create` directives.
//!
//! A task declares host creation as a generic command whose parameters are
//! an untyped map. [`HostCreationRequest::decode`] turns that map into a
//! typed request and [`HostCreationRequest::validate_and_default`] fills in
//! configured defaults and rejects requests the builder cannot honour.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::SpawnConfig;
use crate::error::ProvisionError;

/// Untyped command parameters as declared in a task's configuration.
pub type Params = serde_json::Map<String, Value>;

/// Lifetime binding for a task-owned host.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The host lives as long as the originating task.
    #[default]
    Task,
    /// The host lives as long as the originating task's build.
    Build,
}

/// Block storage device requested alongside the host.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EbsDevice {
    /// Device path, for example `/dev/xvdb`.
    pub device_name: String,
    /// Provisioned IOPS.
    #[serde(rename = "ebs_iops")]
    pub iops: u64,
    /// Size in GiB.
    #[serde(rename = "ebs_size")]
    pub size_gib: u64,
    /// Snapshot to restore from.
    #[serde(rename = "ebs_snapshot_id")]
    pub snapshot_id: String,
}

/// A single decoded `host.create` directive.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HostCreationRequest {
    /// Number of identical hosts to create.
    pub num_hosts: u32,
    /// Distro used as the template; empty when the request is self-contained.
    pub distro: String,
    /// Whether to request spot capacity.
    pub spot: bool,
    /// Machine image identifier.
    pub ami: String,
    /// Access key half of the credential pair.
    pub aws_access_key_id: String,
    /// Secret half of the credential pair.
    pub aws_secret_access_key: String,
    /// Block devices to attach in addition to the distro's own.
    #[serde(rename = "ebs_block_device")]
    pub ebs_devices: Vec<EbsDevice>,
    /// Instance type.
    pub instance_type: String,
    /// Key pair to install; never inherited from the distro.
    pub key_name: String,
    /// Region to launch in.
    pub region: String,
    /// Security groups applied to the instance.
    #[serde(rename = "security_group_ids")]
    pub security_groups: Vec<String>,
    /// Subnet to launch in.
    #[serde(rename = "subnet_id")]
    pub subnet: String,
    /// User-data script run on first boot.
    pub userdata_command: String,
    /// Virtual network identifier.
    #[serde(rename = "vpc_id")]
    pub vpc: String,
    /// Lifetime binding for task-owned hosts.
    pub scope: Scope,
    /// Seconds the host may take to finish setup.
    pub setup_timeout_secs: u64,
    /// Seconds after which the host is torn down.
    pub teardown_timeout_secs: u64,
    /// Provisioning attempts allowed before giving up.
    pub retries: u32,
}

/// Errors raised while decoding or validating a directive.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when the parameter map does not match the request shape.
    #[error("{0}")]
    Shape(String),
    /// Raised when more hosts are requested than one directive may create.
    #[error("num_hosts must be between 1 and {max}, got {requested}")]
    TooManyHosts {
        /// Hosts requested.
        requested: u32,
        /// Configured ceiling.
        max: u32,
    },
    /// Raised when a timeout exceeds its configured ceiling.
    #[error("{field} must be at most {max} seconds, got {requested}")]
    TimeoutTooLong {
        /// Name of the offending parameter.
        field: &'static str,
        /// Seconds requested.
        requested: u64,
        /// Configured ceiling.
        max: u64,
    },
    /// Raised when neither a distro nor an image is given.
    #[error("either distro or ami must be set")]
    MissingTemplate,
    /// Raised when a distro-less request omits the instance type.
    #[error("instance_type is required when no distro is set")]
    MissingInstanceType,
    /// Raised when only one half of the credential pair is given.
    #[error("aws_access_key_id and aws_secret_access_key must be set together")]
    PartialCredentials,
}

impl From<RequestError> for ProvisionError {
    fn from(value: RequestError) -> Self {
        Self::Decode(value.to_string())
    }
}

impl HostCreationRequest {
    /// Structurally decodes a directive's parameters. Unknown keys are
    /// ignored; missing keys take their zero value.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Shape`] when a known key holds a value of the
    /// wrong type.
    pub fn decode(params: &Params) -> Result<Self, RequestError> {
        serde_json::from_value(Value::Object(params.clone()))
            .map_err(|err| RequestError::Shape(err.to_string()))
    }

    /// Applies configured defaults and enforces the directive's limits.
    ///
    /// A zero host count becomes one and zero timeouts take the configured
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] describing the first violated rule.
    pub fn validate_and_default(&mut self, config: &SpawnConfig) -> Result<(), RequestError> {
        if self.num_hosts == 0 {
            self.num_hosts = 1;
        }
        if self.num_hosts > config.max_hosts_per_command {
            return Err(RequestError::TooManyHosts {
                requested: self.num_hosts,
                max: config.max_hosts_per_command,
            });
        }

        if self.setup_timeout_secs == 0 {
            self.setup_timeout_secs = config.default_setup_timeout_secs;
        }
        if self.setup_timeout_secs > config.max_setup_timeout_secs {
            return Err(RequestError::TimeoutTooLong {
                field: "setup_timeout_secs",
                requested: self.setup_timeout_secs,
                max: config.max_setup_timeout_secs,
            });
        }
        if self.teardown_timeout_secs == 0 {
            self.teardown_timeout_secs = config.default_teardown_timeout_secs;
        }
        if self.teardown_timeout_secs > config.max_teardown_timeout_secs {
            return Err(RequestError::TimeoutTooLong {
                field: "teardown_timeout_secs",
                requested: self.teardown_timeout_secs,
                max: config.max_teardown_timeout_secs,
            });
        }

        if self.distro.is_empty() {
            if self.ami.is_empty() {
                return Err(RequestError::MissingTemplate);
            }
            if self.instance_type.is_empty() {
                return Err(RequestError::MissingInstanceType);
            }
        }
        if self.aws_access_key_id.is_empty() != self.aws_secret_access_key.is_empty() {
            return Err(RequestError::PartialCredentials);
        }
        Ok(())
    }

    /// Whether both halves of the credential pair are set.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.aws_access_key_id.is_empty() && !self.aws_secret_access_key.is_empty()
    }
}
