//! Command registry.
//!
//! # Responsibility
//! - Map one submitted line to a closed `Command` value.
//! - Validate the package spec handed to the installer.
//!
//! # Invariants
//! - Only the lowercased first token selects the command.
//! - `pip_install` is tested only after every plain command missed.
//! - Argument text keeps its original casing.

use crate::model::account::Language;
use crate::shell::error::ArgumentIssue;
use once_cell::sync::Lazy;
use regex::Regex;

static PACKAGE_SPEC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?(?:\[[A-Za-z0-9._,-]+\])?(?:(?:==|>=|<=|~=|!=|>|<)[A-Za-z0-9.*+!_-]+)?$",
    )
    .expect("valid package spec regex")
});

const PIP_INSTALL: &str = "pip_install";

/// Every top-level command the terminal understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Calc,
    /// Raw length argument, validated by the handler.
    Password(Option<String>),
    Note,
    SetLanguage(Language),
    Time,
    /// Optional text to frame instead of the default banner.
    Ascii(Option<String>),
    AsciiAnim,
    Neofetch,
    RandomJoke,
    Fortune,
    Logout,
    Quit,
    Clear,
    /// Green color demo.
    Color,
    /// Red color demo.
    ColorAlert,
    ColorReset,
    Hack,
    HackFbi,
    PipInstall(String),
    Unknown(String),
}

impl Command {
    /// Parses one non-empty line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (token, rest) = match line.split_once(char::is_whitespace) {
            Some((token, rest)) => (token, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match token.to_lowercase().as_str() {
            "help" => Self::Help,
            "calc" => Self::Calc,
            "password" => Self::Password(argument),
            "note" => Self::Note,
            "en" => Self::SetLanguage(Language::English),
            "sr" => Self::SetLanguage(Language::Serbian),
            "time" => Self::Time,
            "ascii" => Self::Ascii(argument),
            "ascii_anim" => Self::AsciiAnim,
            "neofetch" => Self::Neofetch,
            "random_joke" => Self::RandomJoke,
            "fortune" => Self::Fortune,
            "logout" => Self::Logout,
            "quit" | "exit" => Self::Quit,
            "clear" => Self::Clear,
            "color" => Self::Color,
            "colora" => Self::ColorAlert,
            "cquit" => Self::ColorReset,
            "hack" => Self::Hack,
            "hackfbi" => Self::HackFbi,
            PIP_INSTALL => match argument {
                Some(package) => Self::PipInstall(package),
                None => Self::Unknown(line.to_string()),
            },
            _ => Self::Unknown(line.to_string()),
        }
    }

    /// Short name used in diagnostic events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Calc => "calc",
            Self::Password(_) => "password",
            Self::Note => "note",
            Self::SetLanguage(Language::English) => "en",
            Self::SetLanguage(Language::Serbian) => "sr",
            Self::Time => "time",
            Self::Ascii(_) => "ascii",
            Self::AsciiAnim => "ascii_anim",
            Self::Neofetch => "neofetch",
            Self::RandomJoke => "random_joke",
            Self::Fortune => "fortune",
            Self::Logout => "logout",
            Self::Quit => "quit",
            Self::Clear => "clear",
            Self::Color => "color",
            Self::ColorAlert => "colora",
            Self::ColorReset => "cquit",
            Self::Hack => "hack",
            Self::HackFbi => "hackfbi",
            Self::PipInstall(_) => PIP_INSTALL,
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Accepts a single requirement like `requests`, `black[d]` or `numpy==1.26`.
///
/// Anything with whitespace or a leading `-` is rejected so installer
/// options can never be smuggled in.
pub fn validate_package_spec(spec: &str) -> Result<&str, ArgumentIssue> {
    if PACKAGE_SPEC_RE.is_match(spec) {
        Ok(spec)
    } else {
        Err(ArgumentIssue::PackageSpec(spec.to_string()))
    }
}

/// Localized command reference shown by `help`.
pub fn help_lines(language: Language) -> Vec<&'static str> {
    match language {
        Language::English => vec![
            "=== Commands ===",
            "calc         - calculator",
            "time         - live clock",
            "neofetch     - show logo animation",
            "ascii [text] - show ASCII banner or render text as ASCII art",
            "ascii_anim   - simple ASCII animation",
            "password <n> - generate random password (1-100)",
            "note         - simple note manager",
            "clear        - clear terminal output",
            "random_joke  - show random joke",
            "fortune      - show a fortune cookie message",
            "logout       - logout current user",
            "en           - set English language",
            "sr           - set Serbian language",
            "color/colora - green/red text demo (cquit resets)",
            "hack/hackfbi - hacker progress effects",
            "pip_install <package> - install Python package",
            "quit/exit    - exit program",
        ],
        Language::Serbian => vec![
            "=== Komande ===",
            "calc         - kalkulator",
            "time         - živ časovnik",
            "neofetch     - prikaz logo animacije",
            "ascii [text] - prikaži ASCII baner ili tekst kao ASCII umetnost",
            "ascii_anim   - jednostavna ASCII animacija",
            "password <n> - generiše slučajnu lozinku (1-100)",
            "note         - menadžer beleški",
            "clear        - očisti terminal",
            "random_joke  - prikaz nasumične šale",
            "fortune      - prikaži poruku iz fortune cookie",
            "logout       - odjava korisnika",
            "en           - postavi engleski jezik",
            "sr           - postavi srpski jezik",
            "color/colora - demonstracija zelenog/crvenog teksta (cquit resetuje)",
            "hack/hackfbi - hakerski efekti napretka",
            "pip_install <package> - instaliraj Python paket",
            "quit/exit    - izlaz iz programa",
        ],
    }
}
