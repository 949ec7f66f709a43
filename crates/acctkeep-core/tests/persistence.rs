//! End-to-end persistence tests against the file backend.
//!
//! Each test builds a store over a temporary directory, mutates it, then
//! opens a second store over the same directory to simulate a restart.

#![allow(clippy::unwrap_used)]

use std::fs;

use acctkeep_core::{
    AccountField, AccountPatch, AccountStore, AccountType, FileStorage, parse_labels,
    validate_account,
};

#[test]
fn accounts_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = AccountStore::new(FileStorage::new(dir.path()));
    let local = store.add();
    store.update(
        &local.id,
        AccountPatch::new()
            .login("alice")
            .password(Some("hunter2".to_string()))
            .labels(parse_labels("dev; ops")),
    );
    let directory = store.add();
    store.update(
        &directory.id,
        AccountPatch::new().kind(AccountType::Ldap).login("bob"),
    );
    let before = store.accounts().to_vec();
    drop(store);

    let reopened = AccountStore::new(FileStorage::new(dir.path()));
    assert_eq!(reopened.accounts(), before.as_slice());
    assert_eq!(reopened.accounts()[1].password, None);
}

#[test]
fn stored_file_is_json_array() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = AccountStore::new(FileStorage::new(dir.path()));
    let account = store.add();
    store.update(&account.id, AccountPatch::new().login("carol"));

    let raw = fs::read_to_string(dir.path().join("accounts.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let records = value.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["login"], "carol");
    assert_eq!(records[0]["type"], "Local");
    assert_eq!(records[0]["password"], "");
    assert_eq!(records[0]["id"], account.id.as_str());
}

#[test]
fn corrupt_file_starts_empty_and_recovers_on_next_write() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("accounts.json"), "[{\"id\":").unwrap();

    let mut store = AccountStore::new(FileStorage::new(dir.path()));
    assert!(store.is_empty());

    store.add();
    let reopened = AccountStore::new(FileStorage::new(dir.path()));
    assert_eq!(reopened.len(), 1);
}

#[test]
fn delete_is_persisted() {
    let dir = tempfile::tempdir().unwrap();

    let mut store = AccountStore::new(FileStorage::new(dir.path()));
    let keep = store.add();
    let gone = store.add();
    assert!(store.delete(&gone.id));

    let reopened = AccountStore::new(FileStorage::new(dir.path()));
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.accounts()[0].id, keep.id);
}

#[test]
fn fresh_account_is_not_valid_until_filled_in() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = AccountStore::new(FileStorage::new(dir.path()));

    let account = store.add();
    let report = validate_account(&account);
    assert!(!report.is_valid());
    assert!(report.error(AccountField::Login).is_some());
    assert!(report.error(AccountField::Password).is_some());

    store.update(
        &account.id,
        AccountPatch::new()
            .login("dave")
            .password(Some("s3cret".to_string())),
    );
    assert!(validate_account(store.get(&account.id).unwrap()).is_valid());
}
