//! Account domain model.
//!
//! # Responsibility
//! - Define the persisted per-user record (credentials + preferences + data).
//! - Provide the language preference used to localize terminal output.
//!
//! # Invariants
//! - `password` is stored verbatim; no hashing is applied.
//! - `history` holds at most `HISTORY_CAP` entries once flushed.
//! - `language` serializes as its integer code (`0` English, `1` Serbian).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of calculator results retained in a persisted account.
pub const HISTORY_CAP: usize = 1000;

/// Output language preference for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Language {
    /// Primary language, code `0`.
    #[default]
    English,
    /// Secondary language, code `1`.
    Serbian,
}

impl Language {
    /// Picks the variant of a message matching this language.
    pub fn pick<'a>(self, en: &'a str, sr: &'a str) -> &'a str {
        match self {
            Self::English => en,
            Self::Serbian => sr,
        }
    }

    /// Integer code used by the persisted store.
    pub fn code(self) -> u8 {
        match self {
            Self::English => 0,
            Self::Serbian => 1,
        }
    }
}

impl From<Language> for u8 {
    fn from(value: Language) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for Language {
    type Error = UnknownLanguageCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::English),
            1 => Ok(Self::Serbian),
            other => Err(UnknownLanguageCode(other)),
        }
    }
}

/// Persisted language code outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownLanguageCode(pub u8);

impl Display for UnknownLanguageCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown language code `{}`; expected 0 or 1", self.0)
    }
}

impl Error for UnknownLanguageCode {}

/// Persisted record for one registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Plaintext password compared verbatim on login.
    pub password: String,
    #[serde(default)]
    pub language: Language,
    /// Calculator results, most recent last.
    #[serde(default)]
    pub history: Vec<i64>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Account {
    /// Creates a fresh account with default preferences and no data.
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            language: Language::English,
            history: Vec::new(),
            notes: Vec::new(),
        }
    }
}

/// Returns the last `HISTORY_CAP` entries of `history`, order preserved.
pub fn capped_history(history: &[i64]) -> Vec<i64> {
    let start = history.len().saturating_sub(HISTORY_CAP);
    history[start..].to_vec()
}
