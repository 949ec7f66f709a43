//! Account model types.

use serde::{Deserialize, Serialize};

/// Unique identifier for an account.
///
/// Serialized as a bare string holding the creation time in milliseconds
/// since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account ID from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create an account ID from a millisecond timestamp.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.to_string())
    }

    /// Get the string form of the ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Authentication type of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountType {
    /// Directory-backed account; the password lives in the directory.
    #[serde(rename = "LDAP")]
    Ldap,
    /// Local account with its own password.
    #[default]
    Local,
}

impl AccountType {
    /// Get display name for the account type.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Ldap => "LDAP",
            Self::Local => "Local",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.display_name())
    }
}

/// A free-text tag attached to an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountLabel {
    /// Label text.
    pub text: String,
}

impl AccountLabel {
    /// Creates a new label.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A stored credential record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, fixed at creation.
    pub id: AccountId,
    /// Labels in display order.
    pub labels: Vec<AccountLabel>,
    /// Authentication type.
    #[serde(rename = "type")]
    pub kind: AccountType,
    /// Login name.
    pub login: String,
    /// Password; `None` for LDAP accounts.
    pub password: Option<String>,
}

impl Account {
    /// Create a blank local account with the given ID.
    ///
    /// Login and password are empty strings and there are no labels.
    #[must_use]
    pub fn new(id: AccountId) -> Self {
        Self {
            id,
            labels: Vec::new(),
            kind: AccountType::Local,
            login: String::new(),
            password: Some(String::new()),
        }
    }

    /// Merge a patch over this account.
    ///
    /// Fields present in the patch replace the current values, absent fields
    /// are left alone. No business rules are applied here; see
    /// [`AccountPatch::normalized`].
    pub fn apply(&mut self, patch: AccountPatch) {
        if let Some(labels) = patch.labels {
            self.labels = labels;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(login) = patch.login {
            self.login = login;
        }
        if let Some(password) = patch.password {
            self.password = password;
        }
    }
}

/// Partial update of an account's mutable fields.
///
/// `password` is doubly optional: `None` leaves the password untouched,
/// `Some(None)` clears it, `Some(Some(_))` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// New labels.
    pub labels: Option<Vec<AccountLabel>>,
    /// New account type.
    pub kind: Option<AccountType>,
    /// New login.
    pub login: Option<String>,
    /// New password.
    pub password: Option<Option<String>>,
}

impl AccountPatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the labels.
    #[must_use]
    pub fn labels(mut self, labels: Vec<AccountLabel>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set the account type.
    #[must_use]
    pub const fn kind(mut self, kind: AccountType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Set the login.
    #[must_use]
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Set the password, or clear it with `None`.
    #[must_use]
    pub fn password(mut self, password: Option<String>) -> Self {
        self.password = Some(password);
        self
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.labels.is_none()
            && self.kind.is_none()
            && self.login.is_none()
            && self.password.is_none()
    }

    /// Apply the type/password policy.
    ///
    /// A patch that switches the type to LDAP always clears the password,
    /// whatever password it also carries.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.kind == Some(AccountType::Ldap) {
            self.password = Some(None);
        }
        self
    }
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
    use super::*;

    mod account_id_tests {
        use super::*;

        #[test]
        fn from_millis() {
            let id = AccountId::from_millis(1700000000123);
            assert_eq!(id.as_str(), "1700000000123");
        }

        #[test]
        fn display() {
            let id = AccountId::new("123");
            assert_eq!(format!("{id}"), "123");
        }

        #[test]
        fn serializes_as_plain_string() {
            let id = AccountId::new("42");
            assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
        }
    }

    mod account_type_tests {
        use super::*;

        #[test]
        fn default_is_local() {
            assert_eq!(AccountType::default(), AccountType::Local);
        }

        #[test]
        fn wire_names() {
            assert_eq!(serde_json::to_string(&AccountType::Ldap).unwrap(), "\"LDAP\"");
            assert_eq!(serde_json::to_string(&AccountType::Local).unwrap(), "\"Local\"");
        }

        #[test]
        fn rejects_unknown_name() {
            let result: Result<AccountType, _> = serde_json::from_str("\"ldap\"");
            assert!(result.is_err());
        }
    }

    mod account_tests {
        use super::*;

        #[test]
        fn new_is_blank_local() {
            let account = Account::new(AccountId::new("1"));
            assert_eq!(account.kind, AccountType::Local);
            assert!(account.login.is_empty());
            assert_eq!(account.password.as_deref(), Some(""));
            assert!(account.labels.is_empty());
        }

        #[test]
        fn json_shape() {
            let mut account = Account::new(AccountId::new("7"));
            account.kind = AccountType::Ldap;
            account.password = None;
            account.login = "jdoe".to_string();
            account.labels = vec![AccountLabel::new("ops")];

            let value = serde_json::to_value(&account).unwrap();
            assert_eq!(
                value,
                serde_json::json!({
                    "id": "7",
                    "labels": [{ "text": "ops" }],
                    "type": "LDAP",
                    "login": "jdoe",
                    "password": null
                })
            );
        }

        #[test]
        fn apply_replaces_only_present_fields() {
            let mut account = Account::new(AccountId::new("1"));
            account.login = "old".to_string();
            account.labels = vec![AccountLabel::new("keep")];

            account.apply(AccountPatch::new().login("new"));

            assert_eq!(account.login, "new");
            assert_eq!(account.labels, vec![AccountLabel::new("keep")]);
            assert_eq!(account.password.as_deref(), Some(""));
        }

        #[test]
        fn apply_can_clear_password() {
            let mut account = Account::new(AccountId::new("1"));
            account.apply(AccountPatch::new().password(None));
            assert_eq!(account.password, None);
        }

        #[test]
        fn apply_is_structural_only() {
            let mut account = Account::new(AccountId::new("1"));
            account.apply(AccountPatch {
                kind: Some(AccountType::Ldap),
                password: Some(Some("secret".to_string())),
                ..AccountPatch::default()
            });
            assert_eq!(account.kind, AccountType::Ldap);
            assert_eq!(account.password.as_deref(), Some("secret"));
        }
    }

    mod patch_tests {
        use super::*;

        #[test]
        fn empty_patch() {
            assert!(AccountPatch::new().is_empty());
            assert!(!AccountPatch::new().login("x").is_empty());
        }

        #[test]
        fn ldap_clears_password() {
            let patch = AccountPatch::new()
                .kind(AccountType::Ldap)
                .password(Some("x".to_string()))
                .normalized();
            assert_eq!(patch.password, Some(None));
        }

        #[test]
        fn local_keeps_password() {
            let patch = AccountPatch::new()
                .kind(AccountType::Local)
                .password(Some("x".to_string()))
                .normalized();
            assert_eq!(patch.password, Some(Some("x".to_string())));
        }

        #[test]
        fn no_type_leaves_password_untouched() {
            let patch = AccountPatch::new().login("a").normalized();
            assert_eq!(patch.password, None);
        }
    }
}
