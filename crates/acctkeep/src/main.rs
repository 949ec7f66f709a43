//! `acctkeep` - manage LDAP and local account records from the terminal.
//!
//! The binary is the composition root: it reads configuration, sets up
//! logging, builds the storage backend and owns the single `AccountStore`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod config;
mod view;

use std::process::ExitCode;

use acctkeep_core::{
    AccountId, AccountStore, FileStorage, KeyValueStorage, labels_to_string, parse_labels,
    validate_account,
};
use anyhow::{Context, bail};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use config::AppConfig;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut config = AppConfig::load(&config_path)?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    debug!("Configuration loaded from {}", config_path.display());

    // Override with CLI args
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(key) = cli.key {
        config.storage_key = key;
    }

    info!(
        "Using account storage '{}' in {}",
        config.storage_key,
        config.data_dir.display()
    );
    let mut store = open_store(&config)?;

    run(&mut store, cli.command)
}

/// Build the file-backed store, rejecting keys the backend cannot hold.
fn open_store(config: &AppConfig) -> anyhow::Result<AccountStore<FileStorage>> {
    let storage = FileStorage::new(&config.data_dir);
    storage.path_for(&config.storage_key)?;
    Ok(AccountStore::with_key(storage, config.storage_key.clone())?)
}

/// Confirm the last change reached storage.
///
/// The store only logs write failures; a command must not report success
/// for a change that will be gone on the next run.
fn persist<S: KeyValueStorage>(store: &mut AccountStore<S>) -> anyhow::Result<()> {
    store
        .try_save()
        .with_context(|| format!("failed to save accounts to '{}'", store.key()))
}

/// Execute one command against the store.
fn run<S: KeyValueStorage>(
    store: &mut AccountStore<S>,
    command: Command,
) -> anyhow::Result<ExitCode> {
    match command {
        Command::List => {
            if store.is_empty() {
                println!("No accounts.");
            }
            for account in store.accounts() {
                println!("{}", view::account_with_status(account));
            }
        }
        Command::Add(fields) => {
            let account = store.add();
            let patch = fields.to_patch();
            if !patch.is_empty() {
                store.update(&account.id, patch);
            }
            persist(store)?;
            if let Some(account) = store.get(&account.id) {
                println!("{}", view::account_with_status(account));
            }
        }
        Command::Update { id, fields } => {
            let id = AccountId::new(id);
            let patch = fields.to_patch();
            if patch.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            if !store.update(&id, patch) {
                bail!("no account with id {id}");
            }
            persist(store)?;
            if let Some(account) = store.get(&id) {
                println!("{}", view::account_with_status(account));
            }
        }
        Command::Delete { id } => {
            let id = AccountId::new(id);
            if !store.delete(&id) {
                bail!("no account with id {id}");
            }
            persist(store)?;
            println!("Deleted {id}");
        }
        Command::Validate { id } => {
            if !validate(store, id.map(AccountId::new))? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Labels { text } => {
            println!("{}", labels_to_string(&parse_labels(&text)));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Print validation results; returns whether every checked account is valid.
fn validate<S: KeyValueStorage>(
    store: &AccountStore<S>,
    id: Option<AccountId>,
) -> anyhow::Result<bool> {
    let accounts: Vec<_> = match &id {
        Some(id) => match store.get(id) {
            Some(account) => vec![account],
            None => bail!("no account with id {id}"),
        },
        None => store.accounts().iter().collect(),
    };

    let mut all_valid = true;
    for account in accounts {
        let report = validate_account(account);
        println!("{}", view::account_with_status(account));
        if !report.is_valid() {
            all_valid = false;
            print!("{}", view::report_lines(&report));
        }
    }

    Ok(all_valid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use acctkeep_core::{AccountType, MemoryStorage};

    use super::*;
    use cli::FieldArgs;

    fn store() -> AccountStore<MemoryStorage> {
        AccountStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_add_with_fields() {
        let mut store = store();
        let fields = FieldArgs {
            login: Some("alice".to_string()),
            password: Some("pw".to_string()),
            ..FieldArgs::default()
        };

        run(&mut store, Command::Add(fields)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.accounts()[0].login, "alice");
        assert_eq!(store.accounts()[0].password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_add_ldap_drops_password() {
        let mut store = store();
        let fields = FieldArgs {
            kind: Some(cli::TypeArg::Ldap),
            password: Some("pw".to_string()),
            ..FieldArgs::default()
        };

        run(&mut store, Command::Add(fields)).unwrap();

        assert_eq!(store.accounts()[0].kind, AccountType::Ldap);
        assert_eq!(store.accounts()[0].password, None);
    }

    #[test]
    fn test_update_unknown_is_error() {
        let mut store = store();
        let fields = FieldArgs {
            login: Some("x".to_string()),
            ..FieldArgs::default()
        };
        let command = Command::Update {
            id: "missing".to_string(),
            fields,
        };
        assert!(run(&mut store, command).is_err());
    }

    #[test]
    fn test_update_without_fields_is_error() {
        let mut store = store();
        let id = store.add().id.to_string();
        let command = Command::Update {
            id,
            fields: FieldArgs::default(),
        };
        assert!(run(&mut store, command).is_err());
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        let id = store.add().id.to_string();

        run(&mut store, Command::Delete { id: id.clone() }).unwrap();
        assert!(store.is_empty());
        assert!(run(&mut store, Command::Delete { id }).is_err());
    }

    #[test]
    fn test_validate_results() {
        let mut store = store();
        let id = store.add().id;

        assert!(!validate(&store, None).unwrap());

        store.update(
            &id,
            acctkeep_core::AccountPatch::new()
                .login("alice")
                .password(Some("pw".to_string())),
        );
        assert!(validate(&store, Some(id)).unwrap());
    }

    #[test]
    fn test_add_fails_when_storage_rejects_write() {
        let mut store = AccountStore::new(MemoryStorage::with_quota(4));

        let result = run(&mut store, Command::Add(FieldArgs::default()));

        assert!(result.is_err());
        assert_eq!(store.storage().get(acctkeep_core::DEFAULT_KEY).unwrap(), None);
    }

    #[test]
    fn test_delete_fails_when_storage_rejects_write() {
        let mut store = store();
        let id = store.add().id.to_string();
        store.storage_mut().set_quota(Some(1));

        assert!(run(&mut store, Command::Delete { id }).is_err());
    }

    #[test]
    fn test_open_store_rejects_unusable_key() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            storage_key: "team/a".to_string(),
            ..AppConfig::default()
        };

        assert!(open_store(&config).is_err());
    }

    #[test]
    fn test_open_store_add_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            data_dir: dir.path().to_path_buf(),
            storage_key: "team".to_string(),
            ..AppConfig::default()
        };

        let mut store = open_store(&config).unwrap();
        run(&mut store, Command::Add(FieldArgs::default())).unwrap();

        let reopened = open_store(&config).unwrap();
        assert_eq!(reopened.len(), 1);
        assert!(dir.path().join("team.json").exists());
    }

    #[test]
    fn test_validate_unknown_id() {
        let store = store();
        assert!(validate(&store, Some(AccountId::new("nope"))).is_err());
    }
}
