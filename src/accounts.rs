//! Account store: user identity and credentials, including the protected
//! administrator account.

use crate::model::Account;
use crate::store::{self, DataDir};
use log::info;
use std::collections::HashMap;
use std::path::PathBuf;

pub const ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "adminpass";
const SAMPLE_USERNAME: &str = "testuser";
const SAMPLE_PASSWORD: &str = "password123";

#[derive(Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    Refused,
    NotFound,
}

pub struct AccountStore {
    path: PathBuf,
    accounts: HashMap<String, Account>,
    // First-run bootstrap default; tracks update_admin_password within this
    // process.
    default_admin_password: String,
}

impl AccountStore {
    /// Loads the store and runs the first-run bootstrap: the admin account is
    /// inserted with the default password if absent, and a sample account is
    /// seeded when the store would otherwise contain only the admin. The
    /// bootstrap is idempotent against an already-populated file.
    pub fn open(dir: &DataDir) -> Self {
        let path = dir.users_file();
        let accounts = store::load_or_default(&path);
        let mut store = AccountStore {
            path,
            accounts,
            default_admin_password: DEFAULT_ADMIN_PASSWORD.to_owned(),
        };
        store.bootstrap();
        store
    }

    fn bootstrap(&mut self) {
        let mut dirty = false;
        if !self.accounts.contains_key(ADMIN_USERNAME) {
            info!("seeding administrator account");
            self.accounts.insert(
                ADMIN_USERNAME.to_owned(),
                Account {
                    username: ADMIN_USERNAME.to_owned(),
                    password: self.default_admin_password.clone(),
                },
            );
            dirty = true;
        }
        if self.accounts.len() == 1 {
            self.accounts.insert(
                SAMPLE_USERNAME.to_owned(),
                Account {
                    username: SAMPLE_USERNAME.to_owned(),
                    password: SAMPLE_PASSWORD.to_owned(),
                },
            );
            dirty = true;
        }
        if dirty {
            self.persist();
        }
    }

    fn persist(&self) {
        store::save(&self.path, &self.accounts);
    }

    /// Inserts a new account. Returns false without touching the store when
    /// the username is already taken.
    pub fn register(&mut self, username: &str, password: &str) -> bool {
        if self.accounts.contains_key(username) {
            return false;
        }
        self.accounts.insert(
            username.to_owned(),
            Account {
                username: username.to_owned(),
                password: password.to_owned(),
            },
        );
        self.persist();
        true
    }

    /// Exact match on the stored plaintext password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Account> {
        self.accounts
            .get(username)
            .filter(|account| account.password == password)
    }

    /// True only for the exact administrator username and its current
    /// password.
    pub fn is_admin(&self, username: &str, password: &str) -> bool {
        username == ADMIN_USERNAME
            && self
                .accounts
                .get(ADMIN_USERNAME)
                .map(|admin| admin.password == password)
                .unwrap_or(false)
    }

    pub fn update_password(&mut self, username: &str, new_password: &str) -> bool {
        match self.accounts.get_mut(username) {
            Some(account) => {
                account.password = new_password.to_owned();
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Updates the administrator's password and the in-memory bootstrap
    /// default along with it.
    pub fn update_admin_password(&mut self, new_password: &str) -> bool {
        if self.update_password(ADMIN_USERNAME, new_password) {
            self.default_admin_password = new_password.to_owned();
            true
        } else {
            false
        }
    }

    /// Removes an account. The administrator is a protected key and is always
    /// refused.
    pub fn delete(&mut self, username: &str) -> RemoveOutcome {
        if username == ADMIN_USERNAME {
            return RemoveOutcome::Refused;
        }
        if self.accounts.remove(username).is_some() {
            self.persist();
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        }
    }

    pub fn list_all(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        accounts
    }
}
