//! In-memory account list mirrored to a storage slot.

use tracing::{debug, error, info, warn};

use super::model::{Account, AccountId, AccountPatch};
use crate::storage::KeyValueStorage;
use crate::{Error, Result};

/// Storage key used when none is given.
pub const DEFAULT_KEY: &str = "accounts";

type Listener = Box<dyn FnMut(&[Account])>;

/// Owns the account list and keeps it in sync with a storage slot.
///
/// The whole list is written as one JSON array after every mutation.
/// Storage failures never reach callers of the mutating operations: they
/// are logged and the in-memory list stays authoritative.
pub struct AccountStore<S: KeyValueStorage> {
    storage: S,
    key: String,
    accounts: Vec<Account>,
    listeners: Vec<Listener>,
    clock: fn() -> i64,
}

impl<S: KeyValueStorage> AccountStore<S> {
    /// Create a store over `storage` using the default key and load it.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::open(storage, DEFAULT_KEY.to_string())
    }

    /// Create a store over `storage` using a custom key and load it.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is empty.
    pub fn with_key(storage: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::Config("storage key must not be empty".to_string()));
        }
        Ok(Self::open(storage, key))
    }

    fn open(storage: S, key: String) -> Self {
        let mut store = Self {
            storage,
            key,
            accounts: Vec::new(),
            listeners: Vec::new(),
            clock: now_millis,
        };
        store.load();
        store
    }

    /// Replace the millisecond clock used to derive new IDs.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Storage key of the slot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Consume the store and return its storage.
    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Current accounts, in order.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Find an account by ID.
    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether there are no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Register a listener called with the full list after each change.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Account]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Reload the list from storage.
    ///
    /// An absent or empty slot leaves the current list untouched. A slot
    /// that cannot be read or parsed empties the list.
    pub fn load(&mut self) {
        match self.read_slot() {
            Ok(Some(accounts)) => {
                debug!("Loaded {} accounts from '{}'", accounts.len(), self.key);
                self.accounts = accounts;
                self.notify();
            }
            Ok(None) => {
                debug!("No saved accounts under '{}'", self.key);
            }
            Err(e) => {
                error!("Failed to load accounts from storage: {e}");
                self.accounts.clear();
                self.notify();
            }
        }
    }

    /// Write the list to storage, logging any failure.
    pub fn save(&mut self) {
        if let Err(e) = self.try_save() {
            error!("Failed to save accounts to storage: {e}");
        }
    }

    /// Write the list to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails. The
    /// in-memory list is unchanged either way.
    pub fn try_save(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.accounts)?;
        self.storage.set(&self.key, &json)?;
        debug!("Saved {} accounts to '{}'", self.accounts.len(), self.key);
        Ok(())
    }

    /// Append a blank local account and persist.
    pub fn add(&mut self) -> Account {
        let account = Account::new(self.next_id());
        self.accounts.push(account.clone());
        info!("Added account {}", account.id);

        self.save();
        self.notify();
        account
    }

    /// Merge `patch` into the account with `id` and persist.
    ///
    /// Switching to LDAP clears the password. Returns `false` without
    /// touching storage when no account has that ID.
    pub fn update(&mut self, id: &AccountId, patch: AccountPatch) -> bool {
        let Some(account) = self.accounts.iter_mut().find(|a| &a.id == id) else {
            warn!("Update of unknown account {id} ignored");
            return false;
        };

        account.apply(patch.normalized());
        debug!("Updated account {id}");

        self.save();
        self.notify();
        true
    }

    /// Remove the account with `id` and persist.
    ///
    /// Returns `false` without touching storage when no account has that ID.
    pub fn delete(&mut self, id: &AccountId) -> bool {
        let Some(index) = self.accounts.iter().position(|a| &a.id == id) else {
            warn!("Delete of unknown account {id} ignored");
            return false;
        };

        self.accounts.remove(index);
        info!("Deleted account {id}");

        self.save();
        self.notify();
        true
    }

    fn read_slot(&self) -> Result<Option<Vec<Account>>> {
        match self.storage.get(&self.key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    /// Creation time in milliseconds, bumped past any ID already taken.
    fn next_id(&self) -> AccountId {
        let mut millis = (self.clock)();
        loop {
            let id = AccountId::from_millis(millis);
            if self.get(&id).is_none() {
                return id;
            }
            millis += 1;
        }
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.accounts);
        }
    }
}

impl<S: KeyValueStorage + std::fmt::Debug> std::fmt::Debug for AccountStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .field("accounts", &self.accounts)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::account::model::{AccountLabel, AccountType};
    use crate::storage::{MemoryStorage, StorageError};

    fn fixed_clock() -> i64 {
        1700000000000
    }

    fn store() -> AccountStore<MemoryStorage> {
        AccountStore::new(MemoryStorage::new()).with_clock(fixed_clock)
    }

    fn stored(store: &AccountStore<MemoryStorage>) -> Vec<Account> {
        let raw = store.storage().get(DEFAULT_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn new_store_is_empty() {
            let store = store();
            assert!(store.is_empty());
            assert_eq!(store.key(), "accounts");
        }

        #[test]
        fn empty_key_rejected() {
            let result = AccountStore::with_key(MemoryStorage::new(), "  ");
            assert!(matches!(result, Err(Error::Config(_))));
        }

        #[test]
        fn custom_key_loads_existing_slot() {
            let mut storage = MemoryStorage::new();
            storage
                .set(
                    "team",
                    r#"[{"id":"5","labels":[],"type":"Local","login":"u","password":"p"}]"#,
                )
                .unwrap();

            let store = AccountStore::with_key(storage, "team").unwrap();
            assert_eq!(store.len(), 1);
            assert_eq!(store.key(), "team");
        }

        #[test]
        fn custom_key_used_for_save() {
            let mut store = AccountStore::with_key(MemoryStorage::new(), "team").unwrap();
            store.add();
            assert!(store.storage().get("team").unwrap().is_some());
            assert!(store.storage().get(DEFAULT_KEY).unwrap().is_none());
        }
    }

    mod add_tests {
        use super::*;

        #[test]
        fn add_creates_blank_local_account() {
            let mut store = store();
            let account = store.add();

            assert_eq!(account.kind, AccountType::Local);
            assert_eq!(account.password.as_deref(), Some(""));
            assert!(account.login.is_empty());
            assert!(account.labels.is_empty());
            assert_eq!(account.id.as_str(), "1700000000000");
        }

        #[test]
        fn add_appends_and_persists() {
            let mut store = store();
            let first = store.add();
            let second = store.add();

            assert_eq!(store.len(), 2);
            assert_eq!(store.accounts()[0].id, first.id);
            assert_eq!(store.accounts()[1].id, second.id);
            assert_eq!(stored(&store), store.accounts());
        }

        #[test]
        fn add_ids_are_unique_under_same_clock() {
            let mut store = store();
            let ids: Vec<_> = (0..5).map(|_| store.add().id).collect();

            for (i, id) in ids.iter().enumerate() {
                assert!(!ids[i + 1..].contains(id));
            }
            assert_eq!(ids[1].as_str(), "1700000000001");
        }

        #[test]
        fn add_with_real_clock_is_unique() {
            let mut store = AccountStore::new(MemoryStorage::new());
            let a = store.add();
            let b = store.add();
            assert_ne!(a.id, b.id);
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn update_merges_fields() {
            let mut store = store();
            let id = store.add().id;

            let found = store.update(
                &id,
                AccountPatch::new()
                    .login("jdoe")
                    .labels(vec![AccountLabel::new("ops")]),
            );

            assert!(found);
            let account = store.get(&id).unwrap();
            assert_eq!(account.login, "jdoe");
            assert_eq!(account.labels, vec![AccountLabel::new("ops")]);
            assert_eq!(account.password.as_deref(), Some(""));
            assert_eq!(stored(&store)[0], *account);
        }

        #[test]
        fn switching_to_ldap_clears_password() {
            let mut store = store();
            let id = store.add().id;
            store.update(&id, AccountPatch::new().password(Some("old".to_string())));

            store.update(
                &id,
                AccountPatch::new()
                    .kind(AccountType::Ldap)
                    .password(Some("x".to_string())),
            );

            let account = store.get(&id).unwrap();
            assert_eq!(account.kind, AccountType::Ldap);
            assert_eq!(account.password, None);
            assert_eq!(stored(&store)[0].password, None);
        }

        #[test]
        fn switching_to_local_keeps_null_password() {
            let mut store = store();
            let id = store.add().id;
            store.update(&id, AccountPatch::new().kind(AccountType::Ldap));
            store.update(&id, AccountPatch::new().kind(AccountType::Local));
            assert_eq!(store.get(&id).unwrap().password, None);
        }

        #[test]
        fn update_unknown_id_is_noop() {
            let mut store = store();
            store.add();
            let before = store.accounts().to_vec();

            let found = store.update(&AccountId::new("nope"), AccountPatch::new().login("x"));

            assert!(!found);
            assert_eq!(store.accounts(), before.as_slice());
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn delete_removes_and_persists() {
            let mut store = store();
            let first = store.add().id;
            let second = store.add().id;

            assert!(store.delete(&first));

            assert_eq!(store.len(), 1);
            assert_eq!(store.accounts()[0].id, second);
            assert_eq!(stored(&store).len(), 1);
        }

        #[test]
        fn delete_unknown_id_is_noop() {
            let mut store = store();
            store.add();
            let before = store.accounts().to_vec();

            assert!(!store.delete(&AccountId::new("missing")));
            assert_eq!(store.accounts(), before.as_slice());
        }
    }

    mod persistence_tests {
        use super::*;

        #[test]
        fn reload_restores_sequence() {
            let mut store = store();
            let id = store.add().id;
            store.update(&id, AccountPatch::new().login("jdoe"));
            store.add();
            let before = store.accounts().to_vec();

            let reloaded = AccountStore::new(store.into_storage());
            assert_eq!(reloaded.accounts(), before.as_slice());
        }

        #[test]
        fn corrupt_slot_loads_empty() {
            let mut storage = MemoryStorage::new();
            storage.set(DEFAULT_KEY, "{not json").unwrap();

            let store = AccountStore::new(storage);
            assert!(store.is_empty());
        }

        #[test]
        fn corrupt_slot_clears_existing_list() {
            let mut store = store();
            store.add();
            store.storage_mut().set(DEFAULT_KEY, "[{\"id\": 1}]").unwrap();

            store.load();
            assert!(store.is_empty());
        }

        #[test]
        fn absent_slot_keeps_existing_list() {
            let mut store = store();
            store.add();
            store.storage_mut().remove(DEFAULT_KEY);

            store.load();
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn empty_slot_treated_as_absent() {
            let mut store = store();
            store.add();
            store.storage_mut().set(DEFAULT_KEY, "").unwrap();

            store.load();
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn loads_hand_written_json() {
            let mut storage = MemoryStorage::new();
            storage
                .set(
                    DEFAULT_KEY,
                    r#"[{"id":"1","labels":[{"text":"a"}],"type":"LDAP","login":"u","password":null}]"#,
                )
                .unwrap();

            let store = AccountStore::new(storage);
            let account = store.get(&AccountId::new("1")).unwrap();
            assert_eq!(account.kind, AccountType::Ldap);
            assert_eq!(account.password, None);
            assert_eq!(account.labels, vec![AccountLabel::new("a")]);
        }

        #[test]
        fn write_failure_keeps_memory_state() {
            let mut store = store();
            store.add();
            let saved = stored(&store);

            store.storage_mut().set_quota(Some(1));
            let account = store.add();

            assert_eq!(store.len(), 2);
            assert_eq!(store.get(&account.id), Some(&account));
            assert_eq!(stored(&store), saved);
        }

        #[test]
        fn try_save_reports_quota() {
            let mut store = AccountStore::new(MemoryStorage::with_quota(4));
            store.add();

            let err = store.try_save().unwrap_err();
            assert!(matches!(
                err,
                Error::Storage(StorageError::QuotaExceeded { .. })
            ));
        }
    }

    mod listener_tests {
        use super::*;

        #[test]
        fn listeners_see_each_change() {
            let mut store = store();
            let seen = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&seen);
            store.subscribe(move |accounts| sink.borrow_mut().push(accounts.len()));

            let id = store.add().id;
            store.update(&id, AccountPatch::new().login("a"));
            store.delete(&id);

            assert_eq!(*seen.borrow(), vec![1, 1, 0]);
        }

        #[test]
        fn noop_operations_do_not_notify() {
            let mut store = store();
            let calls = Rc::new(RefCell::new(0));
            let sink = Rc::clone(&calls);
            store.subscribe(move |_| *sink.borrow_mut() += 1);

            store.update(&AccountId::new("x"), AccountPatch::new().login("a"));
            store.delete(&AccountId::new("x"));

            assert_eq!(*calls.borrow(), 0);
        }
    }
}
