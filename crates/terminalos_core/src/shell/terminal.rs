//! Terminal loop: one submitted line per turn.
//!
//! # Responsibility
//! - Dispatch top-level commands through one exhaustive `match`.
//! - Route lines to the active calculator/notes sub-machine.
//! - Own the single active ticker and cancel it on the next input.
//! - Flush the session after each top-level command completes.
//!
//! # Invariants
//! - Handler errors are rendered and logged; they never end the session.
//! - Flush runs whenever a line leaves the terminal at the top-level prompt,
//!   whether or not anything changed.
//! - After `logout`/`quit`/`close`, further input is ignored.

use crate::activity::ActivityLog;
use crate::collab::installer::{PackageInstaller, PipInstaller};
use crate::collab::joke::{HttpJokeSource, JokeSource};
use crate::config::AppConfig;
use crate::model::account::Language;
use crate::repo::user_store::{StoreError, StoreResult, UserStore};
use crate::shell::calc::CalcMachine;
use crate::shell::command::{help_lines, validate_package_spec, Command};
use crate::shell::error::CommandError;
use crate::shell::extras::{
    ascii_art, generate_password, parse_password_length, pick_fortune, BANNER,
};
use crate::shell::notes::NoteMachine;
use crate::shell::output::{LineStyle, Output, Screen};
use crate::shell::session::Session;
use crate::shell::ticker::{Ticker, TickerKind, COLOR_RESET_LINE};
use crate::shell::Step;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// What the front end should do after a submitted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    /// Return to the login screen.
    Logout,
    /// Terminate the process.
    Quit,
}

/// External collaborators and randomness used by command handlers.
pub struct Collaborators {
    pub jokes: Box<dyn JokeSource>,
    pub installer: Box<dyn PackageInstaller>,
    pub rng: StdRng,
}

impl Collaborators {
    pub fn new(
        jokes: impl JokeSource + 'static,
        installer: impl PackageInstaller + 'static,
        rng: StdRng,
    ) -> Self {
        Self {
            jokes: Box::new(jokes),
            installer: Box::new(installer),
            rng,
        }
    }

    /// Production collaborators: HTTP joke source, pip installer, OS entropy.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            HttpJokeSource::new(config.joke_url.clone(), config.joke_timeout),
            PipInstaller::new(config.python.clone()),
            StdRng::from_entropy(),
        )
    }
}

enum Mode {
    Shell,
    Calc(CalcMachine),
    Notes(NoteMachine),
}

pub struct Terminal<'store> {
    store: &'store mut UserStore,
    session: Session,
    mode: Mode,
    ticker: Option<Ticker>,
    screen: Screen,
    collab: Collaborators,
    ended: Option<Outcome>,
}

impl<'store> Terminal<'store> {
    /// Starts a session for an existing account and renders the welcome.
    pub fn start(
        store: &'store mut UserStore,
        username: &str,
        activity: ActivityLog,
        collab: Collaborators,
    ) -> StoreResult<Self> {
        let account = store
            .get(username)
            .ok_or_else(|| StoreError::MissingAccount(username.to_string()))?;
        let session = Session::start(username, account, activity);

        let mut terminal = Self {
            store,
            session,
            mode: Mode::Shell,
            ticker: None,
            screen: Screen::new(),
            collab,
            ended: None,
        };
        terminal.render_banner();
        let language = terminal.session.language;
        terminal.screen.info(match language {
            Language::English => format!("Welcome, {username}!"),
            Language::Serbian => format!("Dobrodošli, {username}!"),
        });
        terminal.screen.info(language.pick(
            "Type 'help' for commands.",
            "Ukucajte 'help' za komande.",
        ));
        terminal
            .session
            .activity()
            .record(&format!("User {username} logged in."));
        Ok(terminal)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &UserStore {
        &*self.store
    }

    pub fn language(&self) -> Language {
        self.session.language
    }

    /// Takes all output rendered since the last drain.
    pub fn drain_output(&mut self) -> Vec<Output> {
        self.screen.drain()
    }

    /// Input prompt matching the active mode.
    pub fn prompt_label(&self) -> &'static str {
        match self.mode {
            Mode::Shell => "> ",
            Mode::Calc(_) => "calc> ",
            Mode::Notes(_) => "notes> ",
        }
    }

    pub fn active_ticker(&self) -> Option<TickerKind> {
        self.ticker.as_ref().map(Ticker::kind)
    }

    pub fn tick_interval(&self) -> Option<Duration> {
        self.ticker.as_ref().map(Ticker::interval)
    }

    pub fn is_ended(&self) -> bool {
        self.ended.is_some()
    }

    /// Renders one frame of the active ticker, if any. A hack ticker is
    /// dropped once its last frame is rendered.
    pub fn tick(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.advance(self.session.language, &mut self.screen);
            if ticker.is_finished() {
                self.ticker = None;
            }
        }
    }

    /// Handles one submitted line.
    pub fn submit(&mut self, line: &str) -> Outcome {
        if let Some(outcome) = self.ended {
            return outcome;
        }
        self.cancel_ticker();

        let language = self.session.language;
        match std::mem::replace(&mut self.mode, Mode::Shell) {
            Mode::Shell => {
                let line = line.trim();
                if line.is_empty() {
                    return Outcome::Continue;
                }
                self.run_command(line)
            }
            Mode::Calc(mut machine) => {
                match machine.step(line, &mut self.session.history, language, &mut self.screen) {
                    Step::Stay => self.mode = Mode::Calc(machine),
                    Step::Exit => self.flush(),
                }
                Outcome::Continue
            }
            Mode::Notes(mut machine) => {
                match machine.step(line, &mut self.session.notes, language, &mut self.screen) {
                    Step::Stay => self.mode = Mode::Notes(machine),
                    Step::Exit => self.flush(),
                }
                Outcome::Continue
            }
        }
    }

    /// Ends the session without a `quit` command (e.g. input closed).
    pub fn close(&mut self) {
        if self.ended.is_some() {
            return;
        }
        self.ticker = None;
        self.mode = Mode::Shell;
        self.session
            .activity()
            .record(&format!("User {} exited program.", self.session.username()));
        self.flush();
        self.ended = Some(Outcome::Quit);
    }

    fn run_command(&mut self, line: &str) -> Outcome {
        self.screen.prompt(line);
        self.session.record_command(line);

        let command = Command::parse(line);
        debug!(
            "event=command_dispatch module=shell status=start session_id={} command={}",
            self.session.id(),
            command.name()
        );
        let outcome = self.dispatch(command);

        if matches!(self.mode, Mode::Shell) {
            self.flush();
        }
        if outcome != Outcome::Continue {
            info!(
                "event=session_end module=shell status=ok session_id={} outcome={:?}",
                self.session.id(),
                outcome
            );
            self.ended = Some(outcome);
        }
        outcome
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        let language = self.session.language;
        let command_name = command.name();
        let result: Result<(), CommandError> = match command {
            Command::Help => {
                for line in help_lines(language) {
                    self.screen.info(line);
                }
                Ok(())
            }
            Command::Calc => {
                self.mode = Mode::Calc(CalcMachine::enter(language, &mut self.screen));
                Ok(())
            }
            Command::Password(raw) => parse_password_length(raw.as_deref())
                .map(|length| {
                    let password = generate_password(&mut self.collab.rng, length);
                    self.screen.info(match language {
                        Language::English => format!("Generated password: {password}"),
                        Language::Serbian => format!("Generisana lozinka: {password}"),
                    });
                })
                .map_err(CommandError::from),
            Command::Note => {
                self.mode = Mode::Notes(NoteMachine::enter(language, &mut self.screen));
                Ok(())
            }
            Command::SetLanguage(target) => {
                self.session.language = target;
                self.screen.info(target.pick(
                    "Language set to English.",
                    "Jezik postavljen na srpski.",
                ));
                Ok(())
            }
            Command::Time => {
                self.screen.info(language.pick(
                    "Press Enter to stop the clock.",
                    "Pritisnite Enter za zaustavljanje časovnika.",
                ));
                self.start_ticker(TickerKind::Clock);
                Ok(())
            }
            Command::Ascii(None) => {
                self.render_banner();
                Ok(())
            }
            Command::Ascii(Some(text)) => ascii_art(&text).map(|lines| {
                self.screen.info(language.pick(
                    "Generated ASCII art:",
                    "Generisana ASCII umetnost:",
                ));
                for line in lines {
                    self.screen.line(LineStyle::Highlight, line);
                }
            }),
            Command::AsciiAnim => {
                self.start_ticker(TickerKind::AsciiAnim);
                Ok(())
            }
            Command::Neofetch => {
                self.start_ticker(TickerKind::Neofetch);
                Ok(())
            }
            Command::RandomJoke => self
                .collab
                .jokes
                .fetch_joke()
                .map(|joke| self.screen.info(joke))
                .map_err(CommandError::from),
            Command::Fortune => {
                let fortune = pick_fortune(&mut self.collab.rng, language);
                self.screen.info(format!("Fortune: {fortune}"));
                Ok(())
            }
            Command::Logout => {
                self.session
                    .activity()
                    .record(&format!("User {} logged out.", self.session.username()));
                self.screen
                    .info(language.pick("Logging out...", "Odjavljivanje..."));
                return self.finish(command_name, Ok(()), Outcome::Logout);
            }
            Command::Quit => {
                self.session
                    .activity()
                    .record(&format!("User {} exited program.", self.session.username()));
                self.screen
                    .info(language.pick("Exiting program...", "Izlaz iz programa..."));
                return self.finish(command_name, Ok(()), Outcome::Quit);
            }
            Command::Clear => {
                self.screen.clear();
                self.screen
                    .info(language.pick("Terminal cleared.", "Terminal očišćen."));
                Ok(())
            }
            Command::Color => {
                self.screen.line(LineStyle::Success, "This is green text.");
                self.screen.plain(COLOR_RESET_LINE);
                self.screen.info(language.pick(
                    "Color demonstration complete.",
                    "Demonstracija boja završena.",
                ));
                Ok(())
            }
            Command::ColorAlert => {
                self.screen.line(LineStyle::Alert, "This is red text.");
                self.screen.plain(COLOR_RESET_LINE);
                self.screen.info(language.pick(
                    "Red color demonstration complete.",
                    "Demonstracija crvene boje završena.",
                ));
                Ok(())
            }
            Command::ColorReset => {
                self.screen.plain(COLOR_RESET_LINE);
                self.screen
                    .info(language.pick("Color reset complete.", "Boja resetovana."));
                Ok(())
            }
            Command::Hack => {
                self.start_ticker(TickerKind::MatrixHack);
                Ok(())
            }
            Command::HackFbi => {
                self.start_ticker(TickerKind::FbiHack);
                Ok(())
            }
            Command::PipInstall(package) => self.install_package(&package),
            Command::Unknown(_) => {
                self.screen.error(language.pick(
                    "Unknown command. Type 'help' for available commands.",
                    "Nepoznata komanda. Ukucajte 'help' za dostupne komande.",
                ));
                Ok(())
            }
        };
        self.finish(command_name, result, Outcome::Continue)
    }

    fn finish(
        &mut self,
        command_name: &str,
        result: Result<(), CommandError>,
        outcome: Outcome,
    ) -> Outcome {
        match result {
            Ok(()) => debug!(
                "event=command_dispatch module=shell status=ok command={command_name}"
            ),
            Err(err) => {
                warn!(
                    "event=command_dispatch module=shell status=error command={} error_code={} error={}",
                    command_name,
                    err.code(),
                    err
                );
                self.screen.error(err.localized(self.session.language));
            }
        }
        outcome
    }

    fn install_package(&mut self, package: &str) -> Result<(), CommandError> {
        let package = validate_package_spec(package)?;
        self.screen
            .info(format!("Installing package: {package} ..."));
        let output = self
            .collab
            .installer
            .install(package)
            .map_err(CommandError::SubprocessFailure)?;
        let stdout = output.stdout.trim_end();
        if !stdout.is_empty() {
            self.screen.info(stdout);
        }
        let stderr = output.stderr.trim_end();
        if !stderr.is_empty() {
            self.screen.error(stderr);
        }
        Ok(())
    }

    fn render_banner(&mut self) {
        for line in BANNER {
            self.screen.line(LineStyle::Banner, line);
        }
    }

    fn start_ticker(&mut self, kind: TickerKind) {
        let mut ticker = Ticker::new(kind);
        if kind != TickerKind::Clock {
            ticker.advance(self.session.language, &mut self.screen);
        }
        self.ticker = Some(ticker);
    }

    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            if ticker.kind() == TickerKind::Clock {
                self.screen.info(self.session.language.pick(
                    "Clock stopped.",
                    "Časovnik zaustavljen.",
                ));
            }
        }
    }

    fn flush(&mut self) {
        if let Err(err) = self.session.flush(&mut *self.store) {
            self.screen.error(match self.session.language {
                Language::English => format!("Failed to save user data: {err}"),
                Language::Serbian => format!("Čuvanje podataka nije uspelo: {err}"),
            });
        }
    }
}
