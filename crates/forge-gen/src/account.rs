//! Account persistence
//!
//! The account is stored as `.forge/account.toml` so credits and tier carry
//! over between CLI invocations. The in-memory [`Account`] stays a plain
//! value; this store only loads and saves snapshots of it.

use crate::entitlement::Account;
use forge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ACCOUNT_FILE: &str = "account.toml";

/// File-based account store
pub struct AccountStore {
    root: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct AccountFile {
    account: Account,
}

impl AccountStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Default store location
    pub fn default_store() -> Self {
        Self::new(".forge")
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(ACCOUNT_FILE)
    }

    /// Load the saved account, if any
    pub fn load(&self) -> Result<Option<Account>> {
        let path = self.path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let file: AccountFile = toml::from_str(&content).map_err(|e| {
            ForgeError::ConfigError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Some(file.account))
    }

    /// Load the saved account, or `initial` when nothing is saved yet
    pub fn load_or(&self, initial: Account) -> Result<Account> {
        Ok(self.load()?.unwrap_or(initial))
    }

    pub fn save(&self, account: &Account) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let content = toml::to_string_pretty(&AccountFile { account: *account })?;
        std::fs::write(self.path(), content)?;
        Ok(())
    }
}
