//! Recoverable command errors.
//!
//! # Invariants
//! - No command error ends a session; each is rendered where it occurs and
//!   control returns to the prompt that was active.

use crate::collab::joke::JokeError;
use crate::model::account::Language;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;

/// Which argument was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentIssue {
    /// Missing, non-numeric or outside `1..=100`.
    PasswordLength,
    /// Not a number in `1..=max`.
    NoteIndex { max: usize },
    /// Calculator operand is not an integer.
    Operand,
    /// Calculator result does not fit in `i64`.
    Overflow,
    /// Package spec is not a plain requirement.
    PackageSpec(String),
}

#[derive(Debug)]
pub enum CommandError {
    InvalidArgument(ArgumentIssue),
    DivisionByZero,
    ExternalServiceFailure(JokeError),
    SubprocessFailure(io::Error),
    /// ASCII art font could not be loaded.
    AsciiArt(String),
}

impl CommandError {
    /// User-facing message in `language`.
    pub fn localized(&self, language: Language) -> String {
        match self {
            Self::InvalidArgument(ArgumentIssue::PasswordLength) => language
                .pick(
                    "Invalid length! Usage: password <1-100>",
                    "Nevažeća dužina! Upotreba: password <1-100>",
                )
                .to_string(),
            Self::InvalidArgument(ArgumentIssue::NoteIndex { max }) => match language {
                Language::English => format!("Invalid note number! Expected 1-{max}."),
                Language::Serbian => format!("Nevažeći broj beleške! Očekivano 1-{max}."),
            },
            Self::InvalidArgument(ArgumentIssue::Operand) => language
                .pick(
                    "Please enter a whole number.",
                    "Unesite ceo broj.",
                )
                .to_string(),
            Self::InvalidArgument(ArgumentIssue::Overflow) => language
                .pick(
                    "Calculation error: result out of range.",
                    "Greška prilikom računanja: rezultat van opsega.",
                )
                .to_string(),
            Self::InvalidArgument(ArgumentIssue::PackageSpec(spec)) => match language {
                Language::English => format!("Invalid package name: {spec}"),
                Language::Serbian => format!("Nevažeće ime paketa: {spec}"),
            },
            Self::DivisionByZero => language
                .pick("Error: Division by zero!", "Greška: Deljenje nulom!")
                .to_string(),
            Self::ExternalServiceFailure(JokeError::MissingJoke) => language
                .pick("No joke found.", "Nema pronađene šale.")
                .to_string(),
            Self::ExternalServiceFailure(JokeError::Status(_)) => language
                .pick("Failed to fetch joke.", "Nije uspelo preuzimanje šale.")
                .to_string(),
            Self::ExternalServiceFailure(err @ JokeError::Transport(_)) => match language {
                Language::English => format!("Error fetching joke: {err}"),
                Language::Serbian => format!("Greška prilikom preuzimanja šale: {err}"),
            },
            Self::SubprocessFailure(err) => format!("Error: {err}"),
            Self::AsciiArt(err) => match language {
                Language::English => format!("Error generating ASCII art: {err}"),
                Language::Serbian => {
                    format!("Greška prilikom generisanja ASCII umetnosti: {err}")
                }
            },
        }
    }

    /// Stable code used in diagnostic events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::DivisionByZero => "division_by_zero",
            Self::ExternalServiceFailure(_) => "external_service_failure",
            Self::SubprocessFailure(_) => "subprocess_failure",
            Self::AsciiArt(_) => "ascii_art_failure",
        }
    }
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(issue) => write!(f, "invalid argument: {issue:?}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::ExternalServiceFailure(err) => write!(f, "{err}"),
            Self::SubprocessFailure(err) => write!(f, "subprocess failed: {err}"),
            Self::AsciiArt(err) => write!(f, "ascii art font unavailable: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ExternalServiceFailure(err) => Some(err),
            Self::SubprocessFailure(err) => Some(err),
            _ => None,
        }
    }
}

impl From<JokeError> for CommandError {
    fn from(value: JokeError) -> Self {
        Self::ExternalServiceFailure(value)
    }
}

impl From<ArgumentIssue> for CommandError {
    fn from(value: ArgumentIssue) -> Self {
        Self::InvalidArgument(value)
    }
}
