//! Account validation.

use std::collections::BTreeMap;

use super::labels::labels_to_string;
use super::model::{Account, AccountType};

/// Maximum login length, in characters.
///
/// All limits count Unicode scalar values, not UTF-16 code units, so a
/// character outside the BMP counts once.
pub const MAX_LOGIN_LEN: usize = 100;

/// Maximum password length, in characters.
pub const MAX_PASSWORD_LEN: usize = 100;

/// Maximum length of the formatted label string, in characters.
pub const MAX_LABELS_LEN: usize = 50;

/// Account field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountField {
    /// The `login` field.
    Login,
    /// The `password` field.
    Password,
    /// The `labels` field.
    Labels,
}

impl AccountField {
    /// Field name as it appears in the stored record.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Password => "password",
            Self::Labels => "labels",
        }
    }
}

impl std::fmt::Display for AccountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation error for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Login is empty or whitespace.
    EmptyLogin,
    /// Login exceeds [`MAX_LOGIN_LEN`].
    LoginTooLong,
    /// Local account without a password.
    EmptyPassword,
    /// Password exceeds [`MAX_PASSWORD_LEN`].
    PasswordTooLong,
    /// Formatted labels exceed [`MAX_LABELS_LEN`].
    LabelsTooLong,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyLogin => "Login is required",
            Self::LoginTooLong => "Login must not exceed 100 characters",
            Self::EmptyPassword => "Password is required",
            Self::PasswordTooLong => "Password must not exceed 100 characters",
            Self::LabelsTooLong => "Labels must not exceed 50 characters",
        }
    }

    /// Get the field this error relates to.
    #[must_use]
    pub const fn field(&self) -> AccountField {
        match self {
            Self::EmptyLogin | Self::LoginTooLong => AccountField::Login,
            Self::EmptyPassword | Self::PasswordTooLong => AccountField::Password,
            Self::LabelsTooLong => AccountField::Labels,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of validating an account: at most one error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<AccountField, ValidationError>,
}

impl ValidationReport {
    /// Whether no field has an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Error for a single field, if any.
    #[must_use]
    pub fn error(&self, field: AccountField) -> Option<ValidationError> {
        self.errors.get(&field).copied()
    }

    /// All errors, keyed by field.
    #[must_use]
    pub const fn errors(&self) -> &BTreeMap<AccountField, ValidationError> {
        &self.errors
    }

    /// Errors as field name to message pairs.
    #[must_use]
    pub fn messages(&self) -> BTreeMap<&'static str, &'static str> {
        self.errors
            .iter()
            .map(|(field, error)| (field.name(), error.message()))
            .collect()
    }

    fn push(&mut self, error: ValidationError) {
        self.errors.entry(error.field()).or_insert(error);
    }
}

/// Validate an account.
///
/// Passwords are only checked for local accounts. The check is advisory:
/// the store accepts invalid records.
#[must_use]
pub fn validate_account(account: &Account) -> ValidationReport {
    let mut report = ValidationReport::default();

    if account.login.trim().is_empty() {
        report.push(ValidationError::EmptyLogin);
    } else if char_len(&account.login) > MAX_LOGIN_LEN {
        report.push(ValidationError::LoginTooLong);
    }

    if account.kind == AccountType::Local {
        match account.password.as_deref() {
            None => report.push(ValidationError::EmptyPassword),
            Some(password) if password.trim().is_empty() => {
                report.push(ValidationError::EmptyPassword);
            }
            Some(password) if char_len(password) > MAX_PASSWORD_LEN => {
                report.push(ValidationError::PasswordTooLong);
            }
            Some(_) => {}
        }
    }

    if char_len(&labels_to_string(&account.labels)) > MAX_LABELS_LEN {
        report.push(ValidationError::LabelsTooLong);
    }

    report
}

fn char_len(s: &str) -> usize {
    s.chars().count()
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
    use crate::account::model::{AccountId, AccountLabel};

    fn local(login: &str, password: Option<&str>) -> Account {
        let mut account = Account::new(AccountId::new("1"));
        account.login = login.to_string();
        account.password = password.map(str::to_string);
        account
    }

    fn ldap(login: &str) -> Account {
        let mut account = local(login, None);
        account.kind = AccountType::Ldap;
        account
    }

    #[test]
    fn test_valid_local_account() {
        let report = validate_account(&local("jdoe", Some("secret")));
        assert!(report.is_valid());
        assert!(report.messages().is_empty());
    }

    #[test]
    fn test_valid_ldap_account() {
        assert!(validate_account(&ldap("jdoe")).is_valid());
    }

    #[test]
    fn test_blank_login() {
        let report = validate_account(&local("   ", Some("secret")));
        assert!(!report.is_valid());
        assert_eq!(
            report.error(AccountField::Login),
            Some(ValidationError::EmptyLogin)
        );
    }

    #[test]
    fn test_ldap_blank_login_reports_login_only() {
        let report = validate_account(&ldap(""));
        assert_eq!(report.errors().len(), 1);
        assert_eq!(
            report.error(AccountField::Login),
            Some(ValidationError::EmptyLogin)
        );
        assert_eq!(report.error(AccountField::Password), None);
    }

    #[test]
    fn test_login_too_long() {
        let report = validate_account(&local(&"a".repeat(101), Some("p")));
        assert_eq!(
            report.error(AccountField::Login),
            Some(ValidationError::LoginTooLong)
        );
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn test_login_at_limit() {
        let report = validate_account(&local(&"a".repeat(100), Some("p")));
        assert!(report.is_valid());
    }

    #[test]
    fn test_length_counts_characters() {
        let report = validate_account(&local(&"é".repeat(100), Some("p")));
        assert!(report.is_valid());
    }

    #[test]
    fn test_length_counts_scalar_values_outside_bmp() {
        let report = validate_account(&local(&"😀".repeat(100), Some("p")));
        assert!(report.is_valid());

        let report = validate_account(&local(&"😀".repeat(101), Some("p")));
        assert_eq!(
            report.error(AccountField::Login),
            Some(ValidationError::LoginTooLong)
        );
    }

    #[test]
    fn test_local_missing_password() {
        let report = validate_account(&local("jdoe", None));
        assert_eq!(
            report.error(AccountField::Password),
            Some(ValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_local_blank_password() {
        let report = validate_account(&local("jdoe", Some("  ")));
        assert_eq!(
            report.error(AccountField::Password),
            Some(ValidationError::EmptyPassword)
        );
    }

    #[test]
    fn test_password_too_long() {
        let report = validate_account(&local("jdoe", Some(&"p".repeat(101))));
        assert_eq!(
            report.error(AccountField::Password),
            Some(ValidationError::PasswordTooLong)
        );
    }

    #[test]
    fn test_ldap_password_not_checked() {
        let mut account = ldap("jdoe");
        account.password = Some("p".repeat(500));
        assert!(validate_account(&account).is_valid());
    }

    #[test]
    fn test_labels_too_long() {
        let mut account = local("jdoe", Some("secret"));
        // 5 labels of 9 chars plus 4 separators of 2 chars = 53
        account.labels = (0..5).map(|_| AccountLabel::new("abcdefghi")).collect();
        let report = validate_account(&account);
        assert_eq!(
            report.error(AccountField::Labels),
            Some(ValidationError::LabelsTooLong)
        );
    }

    #[test]
    fn test_labels_at_limit() {
        let mut account = local("jdoe", Some("secret"));
        account.labels = vec![AccountLabel::new("x".repeat(50))];
        assert!(validate_account(&account).is_valid());
    }

    #[test]
    fn test_messages_keyed_by_field_name() {
        let mut account = local("", None);
        account.labels = vec![AccountLabel::new("x".repeat(51))];
        let messages = validate_account(&account).messages();
        assert_eq!(messages.get("login"), Some(&"Login is required"));
        assert_eq!(messages.get("password"), Some(&"Password is required"));
        assert_eq!(
            messages.get("labels"),
            Some(&"Labels must not exceed 50 characters")
        );
    }
}
