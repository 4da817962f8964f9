//! Login and registration use-cases.
//!
//! # Responsibility
//! - Validate credentials against the user store.
//! - Create new accounts and persist them immediately.
//!
//! # Invariants
//! - Usernames are trimmed; passwords are compared verbatim.
//! - A rejected registration never mutates the store.
//! - New usernames carry no path separators or control characters.
//! - No rate limiting or lockout is applied.

use crate::model::account::Account;
use crate::repo::user_store::{StoreError, UserStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Auth use-case error.
#[derive(Debug)]
pub enum AuthError {
    /// Unknown username or wrong password.
    InvalidCredentials,
    /// Username or password empty after trimming.
    EmptyField,
    /// Username contains a path separator or control character.
    InvalidUsername(String),
    /// Registration target already exists.
    DuplicateUsername(String),
    /// Registration could not be persisted.
    Store(StoreError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid username or password"),
            Self::EmptyField => write!(f, "username and password must not be empty"),
            Self::InvalidUsername(name) => {
                write!(f, "username contains invalid characters: `{name}`")
            }
            Self::DuplicateUsername(name) => write!(f, "username already exists: `{name}`"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Auth gate over a borrowed user store.
pub struct AuthService<'store> {
    store: &'store mut UserStore,
}

impl<'store> AuthService<'store> {
    pub fn new(store: &'store mut UserStore) -> Self {
        Self { store }
    }

    /// Returns a copy of the stored account when credentials match.
    pub fn login(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let username = username.trim();
        match self.store.get(username) {
            Some(account) if account.password == password => {
                info!("event=auth_login module=auth status=ok");
                Ok(account.clone())
            }
            _ => {
                warn!("event=auth_login module=auth status=error error_code=invalid_credentials");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Creates and persists a new account.
    ///
    /// # Errors
    /// - `EmptyField` when either input is blank.
    /// - `InvalidUsername` when the username contains `/`, `\`, `:` or a
    ///   control character.
    /// - `DuplicateUsername` when the trimmed username is taken.
    /// - `Store` when the write fails; the new account is rolled back.
    pub fn register(&mut self, username: &str, password: &str) -> Result<Account, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.trim().is_empty() {
            warn!("event=auth_register module=auth status=error error_code=empty_field");
            return Err(AuthError::EmptyField);
        }
        if !is_valid_username(username) {
            warn!("event=auth_register module=auth status=error error_code=invalid_username");
            return Err(AuthError::InvalidUsername(username.to_string()));
        }
        if self.store.contains(username) {
            warn!("event=auth_register module=auth status=error error_code=duplicate_username");
            return Err(AuthError::DuplicateUsername(username.to_string()));
        }

        let account = Account::new(password);
        self.store.insert(username, account.clone());
        if let Err(err) = self.store.persist() {
            self.store.remove(username);
            return Err(err.into());
        }

        info!(
            "event=auth_register module=auth status=ok users={}",
            self.store.len()
        );
        Ok(account)
    }
}

fn is_valid_username(username: &str) -> bool {
    !username
        .chars()
        .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
}
