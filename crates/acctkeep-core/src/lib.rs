//! # acctkeep-core
//!
//! Core logic for `acctkeep`, a manager for LDAP and local account records.
//!
//! This crate provides:
//! - Account model and partial updates
//! - Label parsing and formatting
//! - Advisory field validation
//! - An account store mirrored to key-value storage
//! - Memory and file storage backends
//!
//! ## Example
//!
//! ```
//! use acctkeep_core::{AccountPatch, AccountStore, MemoryStorage, parse_labels};
//!
//! let mut store = AccountStore::new(MemoryStorage::new());
//! let account = store.add();
//! store.update(
//!     &account.id,
//!     AccountPatch::new().login("jdoe").labels(parse_labels("ops; prod")),
//! );
//! assert_eq!(store.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod storage;

pub use account::{
    Account, AccountField, AccountId, AccountLabel, AccountPatch, AccountStore, AccountType,
    DEFAULT_KEY, ValidationError, ValidationReport, labels_to_string, parse_labels,
    validate_account,
};
pub use error::{Error, Result};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError, StorageResult};
