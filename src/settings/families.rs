//! Settings shapes for the non-EC2 providers.

use serde::{Deserialize, Serialize};

/// Google Compute Engine settings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GceSettings {
    /// Project that owns the instances.
    pub project_id: String,
    /// Zone to launch in.
    pub zone: String,
    /// Exact image to boot.
    pub image_name: String,
    /// Image family, used when `image_name` is empty.
    pub image_family: String,
    /// Predefined machine type.
    pub instance_type: String,
    /// Custom machine vCPU count.
    pub num_cpus: u32,
    /// Custom machine memory in MiB.
    pub memory_mb: u32,
    /// Boot disk type.
    pub disk_type: String,
    /// Boot disk size in GiB.
    pub disk_size_gb: u32,
    /// Network tags applied to the instance.
    pub network_tags: Vec<String>,
}

/// Container settings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Image the container starts from.
    pub image_url: String,
}

/// `OpenStack` settings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct OpenstackSettings {
    /// Image to boot.
    pub image_name: String,
    /// Flavour of the instance.
    pub flavor_name: String,
    /// Key pair installed on the instance.
    pub key_name: String,
    /// Security groups applied to the instance.
    pub security_groups: Vec<String>,
}

/// vSphere settings.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VsphereSettings {
    /// Template virtual machine to clone.
    pub template: String,
    /// Datastore for the clone.
    pub datastore: String,
    /// Resource pool for the clone.
    pub resource_pool: String,
    /// vCPU count.
    pub num_cpus: u32,
    /// Memory in MiB.
    pub memory_mb: u32,
}

/// Statically registered machines.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StaticSettings {
    /// Registered hosts.
    pub hosts: Vec<StaticHost>,
}

/// One statically registered host.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StaticHost {
    /// Hostname or address.
    pub name: String,
}
