//! Request overrides for EC2 settings.
//!
//! Precedence lives in [`EC2_OVERRIDES`], one entry per field: a request
//! field replaces the distro's value only when the request actually sets it.
//! Two entries differ. Requested block devices are appended to the distro's
//! own, and the key name is always taken from the request so a spawned host
//! never inherits the distro's long-lived key pair.

use crate::request::{EbsDevice, HostCreationRequest};
use crate::settings::{Ec2Settings, MountPoint};

/// One row of the merge table.
#[derive(Clone, Copy, Debug)]
pub struct FieldOverride {
    /// Settings field the row writes.
    pub field: &'static str,
    /// Whether the request carries a value for the field.
    pub is_set: fn(&HostCreationRequest) -> bool,
    /// Writes the request's value into the settings.
    pub apply: fn(&mut Ec2Settings, &HostCreationRequest),
}

const fn always(_: &HostCreationRequest) -> bool {
    true
}

/// Merge rules, applied in order.
pub static EC2_OVERRIDES: &[FieldOverride] = &[
    FieldOverride {
        field: "ami",
        is_set: |request| !request.ami.is_empty(),
        apply: |settings, request| settings.ami.clone_from(&request.ami),
    },
    FieldOverride {
        field: "aws_access_key_id",
        is_set: HostCreationRequest::has_credentials,
        apply: |settings, request| {
            settings
                .aws_access_key_id
                .clone_from(&request.aws_access_key_id);
            settings
                .aws_secret_access_key
                .clone_from(&request.aws_secret_access_key);
        },
    },
    FieldOverride {
        field: "mount_points",
        is_set: |request| !request.ebs_devices.is_empty(),
        apply: |settings, request| {
            settings
                .mount_points
                .extend(request.ebs_devices.iter().map(mount_point));
        },
    },
    FieldOverride {
        field: "instance_type",
        is_set: |request| !request.instance_type.is_empty(),
        apply: |settings, request| settings.instance_type.clone_from(&request.instance_type),
    },
    FieldOverride {
        field: "key_name",
        is_set: always,
        apply: |settings, request| settings.key_name.clone_from(&request.key_name),
    },
    FieldOverride {
        field: "region",
        is_set: |request| !request.region.is_empty(),
        apply: |settings, request| settings.region.clone_from(&request.region),
    },
    FieldOverride {
        field: "security_group_ids",
        is_set: |request| !request.security_groups.is_empty(),
        apply: |settings, request| {
            settings
                .security_group_ids
                .clone_from(&request.security_groups);
        },
    },
    FieldOverride {
        field: "subnet_id",
        is_set: |request| !request.subnet.is_empty(),
        apply: |settings, request| settings.subnet_id.clone_from(&request.subnet),
    },
    FieldOverride {
        field: "user_data",
        is_set: |request| !request.userdata_command.is_empty(),
        apply: |settings, request| settings.user_data.clone_from(&request.userdata_command),
    },
    FieldOverride {
        field: "vpc_name",
        is_set: |request| !request.vpc.is_empty(),
        apply: |settings, request| settings.vpc_name.clone_from(&request.vpc),
    },
];

fn mount_point(device: &EbsDevice) -> MountPoint {
    MountPoint {
        device_name: device.device_name.clone(),
        virtual_name: String::new(),
        size_gib: device.size_gib,
        iops: device.iops,
        snapshot_id: device.snapshot_id.clone(),
    }
}

/// Applies every row of [`EC2_OVERRIDES`] whose request field is set.
pub fn apply_overrides(settings: &mut Ec2Settings, request: &HostCreationRequest) {
    for row in EC2_OVERRIDES {
        if (row.is_set)(request) {
            (row.apply)(settings, request);
        }
    }
}

/// Looks up a row by the settings field it writes.
#[must_use]
pub fn override_for(field: &str) -> Option<&'static FieldOverride> {
    EC2_OVERRIDES.iter().find(|row| row.field == field)
}
