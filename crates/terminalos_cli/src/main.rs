//! Console front end for TerminalOS.
//!
//! # Responsibility
//! - Resolve config, start diagnostics logging and open the user store.
//! - Run the login/register screen, then pump one `Terminal` per session.
//! - Drive tick timers while a clock or animation is active.
//!
//! # Invariants
//! - Only the main thread touches the store and the terminal; a helper thread
//!   owns the line editor and answers one read request at a time.
//! - Passwords are read masked and never enter the recall history.
//! - Startup failures exit with status 1; nothing after startup is fatal.

use log::{error, info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::config::{ColorMode, Configurer};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};
use std::borrow::Cow;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use terminalos_core::{
    init_logging, logging_status, ActivityLog, AppConfig, AuthError, AuthService,
    Collaborators, LineStyle, Outcome, Output, Terminal, UserStore,
};

const RESET: &str = "\x1b[0m";

fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("terminalos: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("terminalos: {err}");
        return ExitCode::FAILURE;
    }
    if let Some((level, dir)) = logging_status() {
        info!(
            "event=app_start module=cli status=ok version={} log_level={} log_dir={}",
            terminalos_core::core_version(),
            level,
            dir.display()
        );
    }
    let mut store = match UserStore::open_file(config.store_path()) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("terminalos: {err}");
            return ExitCode::FAILURE;
        }
    };

    let console = Console::spawn();
    println!("Loading TerminalOS... v{}", terminalos_core::core_version());

    while let Some(username) = login_screen(&mut store, &console) {
        let activity = ActivityLog::for_user(config.activity_dir(), &username);
        let terminal = Terminal::start(
            &mut store,
            &username,
            activity,
            Collaborators::from_config(&config),
        );
        let outcome = match terminal {
            Ok(mut terminal) => run_session(&mut terminal, &console),
            Err(err) => {
                error!("event=session_start module=cli status=error error={err}");
                eprintln!("terminalos: {err}");
                Outcome::Logout
            }
        };
        if outcome == Outcome::Quit {
            break;
        }
    }

    info!("event=app_exit module=cli status=ok");
    ExitCode::SUCCESS
}

enum InputRequest {
    Line(String),
    /// Read without echoing the typed characters.
    Secret(String),
    /// Make a submitted command available to Up/Down recall.
    Remember(String),
}

/// Channel pair to the editor thread. A `None` reply means input is closed.
struct Console {
    requests: Sender<InputRequest>,
    replies: Receiver<Option<String>>,
}

impl Console {
    fn spawn() -> Self {
        let (requests, request_rx) = mpsc::channel();
        let (reply_tx, replies) = mpsc::channel();
        thread::spawn(move || run_editor(request_rx, reply_tx));
        Self { requests, replies }
    }

    /// Asks for one line without waiting for it.
    fn request(&self, request: InputRequest) -> bool {
        self.requests.send(request).is_ok()
    }

    fn ask(&self, prompt: &str) -> Option<String> {
        if !self.request(InputRequest::Line(prompt.to_string())) {
            return None;
        }
        self.replies.recv().ok().flatten()
    }

    fn ask_secret(&self, prompt: &str) -> Option<String> {
        if !self.request(InputRequest::Secret(prompt.to_string())) {
            return None;
        }
        self.replies.recv().ok().flatten()
    }

    fn remember(&self, line: &str) {
        self.request(InputRequest::Remember(line.to_string()));
    }
}

/// Line editor helper that masks input while a secret is being read.
#[derive(Default)]
struct InputHelper {
    masking: bool,
}

impl Completer for InputHelper {
    type Candidate = Pair;
}

impl Hinter for InputHelper {
    type Hint = String;
}

impl Highlighter for InputHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Cow::Owned("*".repeat(line.chars().count()))
        } else {
            Cow::Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

impl Validator for InputHelper {}

impl Helper for InputHelper {}

fn run_editor(requests: Receiver<InputRequest>, replies: Sender<Option<String>>) {
    let mut editor: Editor<InputHelper, DefaultHistory> = match Editor::new() {
        Ok(editor) => editor,
        Err(err) => {
            error!("event=editor_init module=cli status=error error={err}");
            let _ = replies.send(None);
            return;
        }
    };
    editor.set_helper(Some(InputHelper::default()));
    editor.set_color_mode(ColorMode::Forced);

    for request in requests {
        let reply = match request {
            InputRequest::Remember(line) => {
                if let Err(err) = editor.add_history_entry(line.as_str()) {
                    warn!("event=history_add module=cli status=error error={err}");
                }
                continue;
            }
            InputRequest::Line(prompt) => read_line(&mut editor, &prompt, false),
            InputRequest::Secret(prompt) => read_line(&mut editor, &prompt, true),
        };
        if replies.send(reply).is_err() {
            break;
        }
    }
}

fn read_line(
    editor: &mut Editor<InputHelper, DefaultHistory>,
    prompt: &str,
    masked: bool,
) -> Option<String> {
    if let Some(helper) = editor.helper_mut() {
        helper.masking = masked;
    }
    let line = editor.readline(prompt);
    if let Some(helper) = editor.helper_mut() {
        helper.masking = false;
    }
    match line {
        Ok(line) => Some(line),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => None,
        Err(err) => {
            error!("event=readline module=cli status=error error={err}");
            None
        }
    }
}

/// Returns the logged-in username, or `None` when the user quits.
fn login_screen(store: &mut UserStore, console: &Console) -> Option<String> {
    println!();
    println!("Please Login or Register");
    loop {
        let action = console.ask("[login/register/quit]: ")?;
        let action = action.trim().to_lowercase();
        if action == "quit" || action == "exit" {
            return None;
        }
        if action != "login" && action != "register" {
            println!("Unknown option.");
            continue;
        }

        let username = console.ask("Username: ")?;
        let password = console.ask_secret("Password: ")?;
        let mut auth = AuthService::new(store);
        if action == "login" {
            match auth.login(&username, &password) {
                Ok(_) => {
                    let username = username.trim().to_string();
                    println!("Welcome back, {username}!");
                    return Some(username);
                }
                Err(err) => print_auth_error(&err),
            }
        } else {
            match auth.register(&username, &password) {
                Ok(_) => println!("User {} registered! Please login.", username.trim()),
                Err(err) => print_auth_error(&err),
            }
        }
    }
}

fn print_auth_error(err: &AuthError) {
    let message = match err {
        AuthError::InvalidCredentials => "Invalid username or password!".to_string(),
        AuthError::EmptyField => "Please enter username and password.".to_string(),
        AuthError::InvalidUsername(_) => {
            "Username must not contain '/', '\\', ':' or control characters.".to_string()
        }
        AuthError::DuplicateUsername(_) => "Username already exists!".to_string(),
        AuthError::Store(err) => format!("Could not save account: {err}"),
    };
    println!("{}{message}{RESET}", style_code(LineStyle::Error));
}

fn run_session(terminal: &mut Terminal<'_>, console: &Console) -> Outcome {
    let mut remembered = terminal.session().command_history().len();
    loop {
        render(terminal.drain_output());
        if !console.request(InputRequest::Line(terminal.prompt_label().to_string())) {
            return close_session(terminal);
        }

        let received = loop {
            let Some(interval) = terminal.tick_interval() else {
                break console.replies.recv().ok().flatten();
            };
            match console.replies.recv_timeout(interval) {
                Ok(line) => break line,
                Err(RecvTimeoutError::Timeout) => {
                    terminal.tick();
                    render(terminal.drain_output());
                }
                Err(RecvTimeoutError::Disconnected) => break None,
            }
        };

        let Some(line) = received else {
            return close_session(terminal);
        };
        let outcome = terminal.submit(&line);
        for command in &terminal.session().command_history()[remembered..] {
            console.remember(command);
        }
        remembered = terminal.session().command_history().len();
        if outcome != Outcome::Continue {
            render(terminal.drain_output());
            return outcome;
        }
    }
}

fn close_session(terminal: &mut Terminal<'_>) -> Outcome {
    terminal.close();
    render(terminal.drain_output());
    Outcome::Quit
}

fn render(items: Vec<Output>) {
    let mut stdout = io::stdout().lock();
    for item in items {
        let _ = match item {
            Output::Clear => write!(stdout, "\x1b[2J\x1b[H"),
            Output::Line { style, text } => {
                writeln!(stdout, "{}{text}{RESET}", style_code(style))
            }
        };
    }
    let _ = stdout.flush();
}

fn style_code(style: LineStyle) -> &'static str {
    match style {
        LineStyle::Plain => "",
        LineStyle::Prompt => "\x1b[1;36m",
        LineStyle::Info => "\x1b[92m",
        LineStyle::Error => "\x1b[1;31m",
        LineStyle::Banner => "\x1b[1;36m",
        LineStyle::Highlight => "\x1b[1;33m",
        LineStyle::Dim => "\x1b[90m",
        LineStyle::Success => "\x1b[1;32m",
        LineStyle::Alert => "\x1b[1;31m",
    }
}

#[cfg(test)]
mod tests {
    use super::InputHelper;
    use rustyline::highlight::Highlighter;

    #[test]
    fn secret_input_is_masked() {
        let helper = InputHelper { masking: true };
        assert_eq!(helper.highlight("pässw0rd", 8), "********");
        assert!(helper.highlight_char("pw", 2, false));
    }

    #[test]
    fn command_input_is_shown_verbatim() {
        let helper = InputHelper::default();
        assert_eq!(helper.highlight("calc", 4), "calc");
        assert!(!helper.highlight_char("calc", 4, false));
    }
}
