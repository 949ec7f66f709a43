//! Account management module.
//!
//! Provides the account model, label codec, validation and the store.

mod labels;
mod model;
mod store;
mod validation;

pub use labels::{labels_to_string, parse_labels};
pub use model::{Account, AccountId, AccountLabel, AccountPatch, AccountType};
pub use store::{AccountStore, DEFAULT_KEY};
pub use validation::{
    AccountField, MAX_LABELS_LEN, MAX_LOGIN_LEN, MAX_PASSWORD_LEN, ValidationError,
    ValidationReport, validate_account,
};
