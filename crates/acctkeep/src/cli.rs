//! Command-line arguments.

use std::path::PathBuf;

use acctkeep_core::{AccountPatch, AccountType, parse_labels};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Manage LDAP and local account records.
#[derive(Parser, Debug)]
#[command(name = "acctkeep")]
#[command(about = "Manage LDAP and local account records", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Data directory (overrides config)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Storage key (overrides config)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all accounts
    List,
    /// Create an account, optionally filling in fields
    Add(FieldArgs),
    /// Change fields of an account
    Update {
        /// Account ID
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an account
    Delete {
        /// Account ID
        id: String,
    },
    /// Check one account, or all of them
    Validate {
        /// Account ID
        id: Option<String>,
    },
    /// Normalize a semicolon-separated label string
    Labels {
        /// Label text, e.g. "ops; prod"
        text: String,
    },
}

/// Account type as written on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    /// Directory account without a stored password
    Ldap,
    /// Local account with its own password
    Local,
}

impl From<TypeArg> for AccountType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Ldap => Self::Ldap,
            TypeArg::Local => Self::Local,
        }
    }
}

/// Field values shared by `add` and `update`.
#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Account type
    #[arg(short = 't', long = "type", value_enum)]
    pub kind: Option<TypeArg>,

    /// Login name
    #[arg(short, long)]
    pub login: Option<String>,

    /// Password
    #[arg(short, long, conflicts_with = "clear_password")]
    pub password: Option<String>,

    /// Remove the stored password
    #[arg(long)]
    pub clear_password: bool,

    /// Labels separated by semicolons
    #[arg(long)]
    pub labels: Option<String>,
}

impl FieldArgs {
    /// Build the patch described by these arguments.
    #[must_use]
    pub fn to_patch(&self) -> AccountPatch {
        let mut patch = AccountPatch::new();
        if let Some(kind) = self.kind {
            patch = patch.kind(kind.into());
        }
        if let Some(login) = &self.login {
            patch = patch.login(login.clone());
        }
        if self.clear_password {
            patch = patch.password(None);
        } else if let Some(password) = &self.password {
            patch = patch.password(Some(password.clone()));
        }
        if let Some(labels) = &self.labels {
            patch = patch.labels(parse_labels(labels));
        }
        patch
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use acctkeep_core::AccountLabel;
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_update() {
        let cli = Cli::try_parse_from([
            "acctkeep", "update", "17", "--type", "ldap", "--login", "bob",
        ])
        .unwrap();

        let Command::Update { id, fields } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(id, "17");
        let patch = fields.to_patch();
        assert_eq!(patch.kind, Some(AccountType::Ldap));
        assert_eq!(patch.login.as_deref(), Some("bob"));
        assert_eq!(patch.password, None);
    }

    #[test]
    fn test_empty_fields_give_empty_patch() {
        assert!(FieldArgs::default().to_patch().is_empty());
    }

    #[test]
    fn test_labels_are_parsed() {
        let fields = FieldArgs {
            labels: Some(" a ;; b ".to_string()),
            ..FieldArgs::default()
        };
        assert_eq!(
            fields.to_patch().labels,
            Some(vec![AccountLabel::new("a"), AccountLabel::new("b")])
        );
    }

    #[test]
    fn test_clear_password() {
        let cli = Cli::try_parse_from(["acctkeep", "update", "1", "--clear-password"]).unwrap();
        let Command::Update { fields, .. } = cli.command else {
            panic!("expected update");
        };
        assert_eq!(fields.to_patch().password, Some(None));
    }

    #[test]
    fn test_password_conflicts_with_clear() {
        let result = Cli::try_parse_from([
            "acctkeep", "add", "--password", "x", "--clear-password",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from(["acctkeep", "--data-dir", "/tmp/x", "--key", "team", "list"])
            .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(cli.key.as_deref(), Some("team"));
        assert!(matches!(cli.command, Command::List));
    }
}
