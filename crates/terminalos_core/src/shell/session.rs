//! Per-login session state.
//!
//! # Responsibility
//! - Hold the mutable fields command handlers touch (language, calculator
//!   history, notes) plus the transient command history.
//! - Flush those fields into the bound account and persist the store.
//!
//! # Invariants
//! - A session is bound to exactly one username for its lifetime.
//! - Flush writes the last `HISTORY_CAP` history entries, the full notes
//!   list and the language, then persists unconditionally.

use crate::activity::ActivityLog;
use crate::model::account::{capped_history, Account, Language};
use crate::repo::user_store::{StoreError, StoreResult, UserStore};
use log::{error, info};
use uuid::Uuid;

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    username: String,
    pub language: Language,
    pub history: Vec<i64>,
    pub notes: Vec<String>,
    command_history: Vec<String>,
    activity: ActivityLog,
}

impl Session {
    /// Binds a new session to `username`, seeded from `account`.
    pub fn start(username: impl Into<String>, account: &Account, activity: ActivityLog) -> Self {
        let session = Self {
            id: Uuid::new_v4(),
            username: username.into(),
            language: account.language,
            history: account.history.clone(),
            notes: account.notes.clone(),
            command_history: Vec::new(),
            activity,
        };
        info!(
            "event=session_start module=session status=ok session_id={} language={}",
            session.id,
            session.language.code()
        );
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Submitted top-level lines, oldest first.
    pub fn command_history(&self) -> &[String] {
        &self.command_history
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub(crate) fn record_command(&mut self, line: &str) {
        self.command_history.push(line.to_string());
        self.activity.record(&format!("Command entered: {line}"));
    }

    /// Writes session fields into the bound account and persists the store.
    pub fn flush(&self, store: &mut UserStore) -> StoreResult<()> {
        let account = store
            .get_mut(&self.username)
            .ok_or_else(|| StoreError::MissingAccount(self.username.clone()))?;
        account.language = self.language;
        account.history = capped_history(&self.history);
        account.notes = self.notes.clone();

        match store.persist() {
            Ok(()) => {
                self.activity.record("User data saved.");
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=session_flush module=session status=error session_id={} error={}",
                    self.id, err
                );
                Err(err)
            }
        }
    }
}
