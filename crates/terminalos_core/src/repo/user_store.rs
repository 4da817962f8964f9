//! User store contracts and JSON file implementation.
//!
//! # Responsibility
//! - Load the full username → account mapping once at startup.
//! - Persist the full mapping after every account-mutating step.
//!
//! # Invariants
//! - Writes replace the whole file via temp-file + rename; readers never see
//!   a partially written store.
//! - `UserStore` is the single owner of in-memory accounts; sessions write
//!   into it and it serializes the same map.
//!
//! # See also
//! - `crate::shell::session` for the flush contract.

use crate::model::account::Account;
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Username → account mapping, sorted for stable, diffable output.
pub type UserMap = BTreeMap<String, Account>;

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence error for the user store.
#[derive(Debug)]
pub enum StoreError {
    Io { path: PathBuf, source: io::Error },
    Serde(serde_json::Error),
    /// Flush target no longer exists in the store.
    MissingAccount(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "user store I/O failed at `{}`: {source}", path.display())
            }
            Self::Serde(err) => write!(f, "invalid user store data: {err}"),
            Self::MissingAccount(name) => write!(f, "account not found in store: `{name}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serde(err) => Some(err),
            Self::MissingAccount(_) => None,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// Backend contract for loading and saving the whole user map.
pub trait UserRepository {
    /// Loads the full map; a missing backing store yields an empty map.
    fn load(&self) -> StoreResult<UserMap>;
    /// Replaces the full persisted contents with `users`.
    fn save(&self, users: &UserMap) -> StoreResult<()>;
}

/// JSON file-backed repository.
pub struct JsonFileUserRepository {
    path: PathBuf,
}

impl JsonFileUserRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl UserRepository for JsonFileUserRepository {
    fn load(&self) -> StoreResult<UserMap> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(UserMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(UserMap::new()),
            Err(err) => Err(self.io_error(err)),
        }
    }

    fn save(&self, users: &UserMap) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let mut body = serde_json::to_vec_pretty(users)?;
        body.push(b'\n');

        let temp_path = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&temp_path).map_err(|err| self.io_error(err))?;
            file.write_all(&body).map_err(|err| self.io_error(err))?;
            file.sync_all().map_err(|err| self.io_error(err))?;
        }
        fs::rename(&temp_path, &self.path).map_err(|err| self.io_error(err))?;
        Ok(())
    }
}

/// In-memory repository, shareable so callers can inspect saved snapshots.
/// Test support only; front ends use `JsonFileUserRepository`.
#[doc(hidden)]
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    saved: Arc<Mutex<UserMap>>,
    save_count: Arc<Mutex<usize>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the repository as if `users` had been persisted earlier.
    pub fn with_users(users: UserMap) -> Self {
        Self {
            saved: Arc::new(Mutex::new(users)),
            save_count: Arc::default(),
        }
    }

    /// Returns the last persisted map.
    pub fn snapshot(&self) -> UserMap {
        self.saved
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        self.save_count.lock().map(|guard| *guard).unwrap_or(0)
    }
}

impl UserRepository for MemoryUserRepository {
    fn load(&self) -> StoreResult<UserMap> {
        Ok(self.snapshot())
    }

    fn save(&self, users: &UserMap) -> StoreResult<()> {
        if let Ok(mut guard) = self.saved.lock() {
            *guard = users.clone();
        }
        if let Ok(mut count) = self.save_count.lock() {
            *count += 1;
        }
        Ok(())
    }
}

/// Loaded user map bound to its persistence backend.
pub struct UserStore {
    users: UserMap,
    repo: Box<dyn UserRepository>,
}

impl UserStore {
    /// Loads the full map from `repo`.
    ///
    /// # Side effects
    /// - Writes the map back immediately so an unwritable store fails here,
    ///   at startup, instead of on the first command.
    pub fn open(repo: impl UserRepository + 'static) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=store_open module=store status=start");

        let store = Self::load_and_probe(Box::new(repo));
        match &store {
            Ok(store) => info!(
                "event=store_open module=store status=ok users={} duration_ms={}",
                store.users.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_open module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        store
    }

    /// Opens the JSON store at `path`.
    pub fn open_file(path: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open(JsonFileUserRepository::new(path))
    }

    fn load_and_probe(repo: Box<dyn UserRepository>) -> StoreResult<Self> {
        let users = repo.load()?;
        repo.save(&users)?;
        Ok(Self { users, repo })
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.users.get(username)
    }

    pub fn get_mut(&mut self, username: &str) -> Option<&mut Account> {
        self.users.get_mut(username)
    }

    /// Inserts or replaces one account in memory, returning the previous one.
    pub fn insert(&mut self, username: impl Into<String>, account: Account) -> Option<Account> {
        self.users.insert(username.into(), account)
    }

    pub fn remove(&mut self, username: &str) -> Option<Account> {
        self.users.remove(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &UserMap {
        &self.users
    }

    /// Writes the full in-memory map through the backend.
    pub fn persist(&self) -> StoreResult<()> {
        match self.repo.save(&self.users) {
            Ok(()) => {
                info!(
                    "event=store_persist module=store status=ok users={}",
                    self.users.len()
                );
                Ok(())
            }
            Err(err) => {
                error!("event=store_persist module=store status=error error={err}");
                Err(err)
            }
        }
    }
}
