//! EC2 settings shape.

use serde::{Deserialize, Serialize};

use super::{SettingsBag, SettingsError, decode_as};
use crate::provider::Provider;

/// Settings understood by the EC2 providers.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Ec2Settings {
    /// Machine image identifier.
    pub ami: String,
    /// Access key half of the credential pair.
    pub aws_access_key_id: String,
    /// Secret half of the credential pair.
    pub aws_secret_access_key: String,
    /// Block devices attached at launch.
    pub mount_points: Vec<MountPoint>,
    /// Instance type, for example `m5.large`.
    pub instance_type: String,
    /// Key pair installed for the default login user.
    pub key_name: String,
    /// Region to launch in.
    pub region: String,
    /// Security groups applied to the instance.
    pub security_group_ids: Vec<String>,
    /// Subnet to launch in.
    pub subnet_id: String,
    /// User-data script run on first boot.
    pub user_data: String,
    /// Virtual network name.
    pub vpc_name: String,
    /// Whether the instance launches inside a VPC.
    pub is_vpc: bool,
    /// Maximum spot price; ignored for on-demand capacity.
    pub bid_price: f64,
}

/// Block storage device attached at launch.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MountPoint {
    /// Device path, for example `/dev/xvdb`.
    pub device_name: String,
    /// Instance-store virtual name.
    pub virtual_name: String,
    /// Size in GiB.
    #[serde(rename = "size")]
    pub size_gib: u64,
    /// Provisioned IOPS.
    pub iops: u64,
    /// Snapshot to restore from.
    pub snapshot_id: String,
}

impl Ec2Settings {
    /// Decodes EC2 settings from a distro's settings bag.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Decode`] when a known key holds a value of
    /// the wrong shape.
    pub fn from_bag(provider: Provider, bag: &SettingsBag) -> Result<Self, SettingsError> {
        decode_as(provider, bag)
    }
}
