//! Unit tests for the in-memory store.

use super::*;
use crate::host::{HostStatus, Ownership, ProvisionOptions, UserOwnership};
use crate::provider::Provider;
use crate::test_support::ec2_distro;
use rstest::rstest;

fn user_intent(name: &str) -> HostIntent {
    HostIntent {
        name: name.to_owned(),
        distro: ec2_distro("d1"),
        provider: Provider::Ec2OnDemand,
        ownership: Ownership::User(UserOwnership {
            user_name: String::from("alice"),
            provision: ProvisionOptions {
                load_cli: true,
                task_id: String::from("t1"),
                owner_id: String::from("alice"),
            },
        }),
    }
}

#[rstest]
fn inserted_intents_become_uninitialised_hosts() {
    let store = MemoryStore::new();
    store
        .insert_many(&[user_intent("h1"), user_intent("h2")])
        .expect("insert");
    let hosts = store.hosts();
    assert_eq!(hosts.len(), 2);
    assert!(hosts.iter().all(|host| host.status == HostStatus::Uninitialized));
    assert_eq!(hosts.first().map(|host| host.id.as_str()), Some("h1"));
}

#[rstest]
fn duplicate_names_reject_the_whole_batch() {
    let store = MemoryStore::new();
    store.insert_many(&[user_intent("h1")]).expect("first batch");
    let err = store
        .insert_many(&[user_intent("h2"), user_intent("h1")])
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.hosts().len(), 1);
}

#[rstest]
fn duplicates_within_a_batch_are_rejected() {
    let store = MemoryStore::new();
    let err = store
        .insert_many(&[user_intent("h1"), user_intent("h1")])
        .expect_err("duplicate");
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.hosts().is_empty());
}

#[rstest]
fn user_owned_hosts_are_not_task_spawned() {
    let store = MemoryStore::new();
    store.insert_many(&[user_intent("h1")]).expect("insert");
    assert_eq!(store.find_by_task_id("t1"), Ok(Vec::new()));
}

#[rstest]
fn missing_records_are_none() {
    let store = MemoryStore::new();
    assert_eq!(store.find_distro("d1"), Ok(None));
    assert_eq!(store.find_task("t1"), Ok(None));
    assert_eq!(store.find_user("alice"), Ok(None));
    store.put_distro(ec2_distro("d1"));
    assert_eq!(store.find_distro("d1"), Ok(Some(ec2_distro("d1"))));
}

#[rstest]
fn store_errors_are_persistence_errors() {
    let err = ProvisionError::from(StoreError::Unavailable(String::from("down")));
    assert_eq!(
        err,
        ProvisionError::Persistence(String::from("store unavailable: down"))
    );
}
