//! Unit tests for provider settings conversion.

use super::*;
use rstest::rstest;
use serde_json::json;

fn bag(value: Value) -> SettingsBag {
    let Value::Object(map) = value else {
        panic!("test bag must be a JSON object");
    };
    map
}

#[rstest]
fn ec2_bag_decodes_known_fields_and_ignores_others() {
    let source = bag(json!({
        "ami": "ami-123",
        "instance_type": "m5.large",
        "security_group_ids": ["sg-1", "sg-2"],
        "mount_points": [{"device_name": "/dev/xvdb", "size": 100}],
        "unrelated": true
    }));

    let decoded =
        ProviderSettings::decode(Provider::Ec2OnDemand, &source).expect("bag should decode");
    let ProviderSettings::Ec2(settings) = decoded else {
        panic!("expected EC2 settings, got {decoded:?}");
    };

    assert_eq!(settings.ami, "ami-123");
    assert_eq!(settings.instance_type, "m5.large");
    assert_eq!(settings.security_group_ids, vec!["sg-1", "sg-2"]);
    assert_eq!(settings.mount_points.len(), 1);
    assert_eq!(
        settings.mount_points.first().map(|mount| mount.size_gib),
        Some(100)
    );
}

#[rstest]
fn wrong_value_shape_is_a_decode_error() {
    let source = bag(json!({ "security_group_ids": "sg-1" }));
    let err = ProviderSettings::decode(Provider::Ec2Spot, &source)
        .expect_err("string is not a list of groups");
    assert!(matches!(
        err,
        SettingsError::Decode {
            provider: Provider::Ec2Spot,
            ..
        }
    ));
    assert!(matches!(
        ProvisionError::from(err),
        ProvisionError::Configuration(_)
    ));
}

#[rstest]
#[case(Provider::Gce, json!({"project_id": "p", "zone": "us-east1-b"}))]
#[case(Provider::Docker, json!({"image_url": "https://images/ubuntu.tgz"}))]
#[case(Provider::Static, json!({"hosts": [{"name": "mac-1"}]}))]
#[case(Provider::Vsphere, json!({"template": "ubuntu", "num_cpus": 4}))]
#[case(Provider::Openstack, json!({"image_name": "ubuntu", "flavor_name": "m1"}))]
fn each_family_decodes_and_encodes_its_own_keys(#[case] provider: Provider, #[case] raw: Value) {
    let source = bag(raw);
    let settings = ProviderSettings::decode(provider, &source).expect("bag should decode");
    let encoded = settings.encode().expect("settings should encode");
    for (key, value) in &source {
        assert_eq!(encoded.get(key), Some(value), "key {key} should survive");
    }
}

#[rstest]
fn mock_provider_takes_no_settings() {
    let source = bag(json!({"anything": 1}));
    let settings = ProviderSettings::decode(Provider::Mock, &source).expect("mock decodes");
    assert_eq!(settings, ProviderSettings::None);
    assert!(settings.encode().expect("empty encode").is_empty());
}

#[rstest]
fn encoding_writes_empty_fields() {
    let encoded = ProviderSettings::Ec2(Ec2Settings::default())
        .encode()
        .expect("defaults encode");
    assert_eq!(encoded.get("key_name"), Some(&json!("")));
    assert_eq!(encoded.get("mount_points"), Some(&json!([])));
}
