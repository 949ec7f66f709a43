//! Plain-text rendering of accounts for the terminal.

use std::fmt::Write;

use acctkeep_core::{Account, ValidationReport, labels_to_string, validate_account};

/// Placeholder for empty values.
const EMPTY: &str = "-";

/// One-line summary of an account.
///
/// Passwords are never printed; only whether one is set.
#[must_use]
pub fn account_line(account: &Account) -> String {
    let login = if account.login.is_empty() {
        EMPTY
    } else {
        account.login.as_str()
    };
    let password = match account.password.as_deref() {
        None => "none",
        Some("") => "empty",
        Some(_) => "set",
    };
    let labels = labels_to_string(&account.labels);
    let labels = if labels.is_empty() { EMPTY } else { labels.as_str() };

    format!(
        "{:<15} {:<5} {:<20} password:{:<6} labels:{}",
        account.id, account.kind, login, password, labels
    )
}

/// Account summary followed by its validation state.
#[must_use]
pub fn account_with_status(account: &Account) -> String {
    let report = validate_account(account);
    let mut out = account_line(account);
    if report.is_valid() {
        out.push_str("  [ok]");
    } else {
        out.push_str("  [invalid]");
    }
    out
}

/// Field errors of a report, one per line, indented.
#[must_use]
pub fn report_lines(report: &ValidationReport) -> String {
    let mut out = String::new();
    for (field, message) in report.messages() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}
