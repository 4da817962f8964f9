use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::rc::Rc;
use terminalos_core::{
    Account, ActivityLog, Collaborators, InstallOutput, JokeError, JokeSource, Language,
    LineStyle, MemoryUserRepository, Outcome, Output, PackageInstaller, Terminal, TickerKind,
    UserMap, UserStore, HISTORY_CAP,
};

struct FixedJoke(Option<&'static str>);

impl JokeSource for FixedJoke {
    fn fetch_joke(&self) -> Result<String, JokeError> {
        self.0
            .map(str::to_string)
            .ok_or(JokeError::MissingJoke)
    }
}

struct OfflineJokes;

impl JokeSource for OfflineJokes {
    fn fetch_joke(&self) -> Result<String, JokeError> {
        Err(JokeError::Transport("connection refused".to_string()))
    }
}

#[derive(Clone, Default)]
struct RecordingInstaller {
    calls: Rc<RefCell<Vec<String>>>,
    fail_spawn: bool,
}

impl PackageInstaller for RecordingInstaller {
    fn install(&self, package: &str) -> io::Result<InstallOutput> {
        self.calls.borrow_mut().push(package.to_string());
        if self.fail_spawn {
            return Err(io::Error::new(io::ErrorKind::NotFound, "python3 not found"));
        }
        Ok(InstallOutput {
            success: true,
            stdout: format!("Successfully installed {package}\n"),
            stderr: "WARNING: running as root\n".to_string(),
        })
    }
}

fn collab_with(jokes: impl JokeSource + 'static, installer: RecordingInstaller) -> Collaborators {
    Collaborators::new(jokes, installer, StdRng::seed_from_u64(42))
}

fn collab() -> Collaborators {
    collab_with(FixedJoke(Some("A joke.")), RecordingInstaller::default())
}

fn store_with(name: &str, account: Account) -> (UserStore, MemoryUserRepository) {
    let mut users = UserMap::new();
    users.insert(name.to_string(), account);
    let repo = MemoryUserRepository::with_users(users);
    let store = UserStore::open(repo.clone()).unwrap();
    (store, repo)
}

fn texts(items: Vec<Output>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Output::Line { text, .. } => Some(text),
            Output::Clear => None,
        })
        .collect()
}

fn errors(items: &[Output]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Output::Line {
                style: LineStyle::Error,
                text,
            } => Some(text.clone()),
            _ => None,
        })
        .collect()
}

fn submit_all(terminal: &mut Terminal<'_>, lines: &[&str]) -> Vec<Output> {
    for line in lines {
        assert_eq!(terminal.submit(line), Outcome::Continue, "line `{line}`");
    }
    terminal.drain_output()
}

#[test]
fn start_renders_welcome() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    let lines = texts(terminal.drain_output());
    assert!(lines.contains(&"Welcome, alice!".to_string()));
    assert!(lines.contains(&"Type 'help' for commands.".to_string()));
}

#[test]
fn calc_add_then_divide_by_zero_keeps_history() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    let out = submit_all(&mut terminal, &["calc", "add", "4", "5"]);
    assert!(texts(out).contains(&"Sum: 9".to_string()));
    assert_eq!(terminal.session().history, vec![9]);

    let out = submit_all(&mut terminal, &["divide", "4", "0"]);
    assert_eq!(errors(&out), vec!["Error: Division by zero!".to_string()]);
    assert_eq!(terminal.session().history, vec![9]);
    assert_eq!(terminal.prompt_label(), "calc> ");

    submit_all(&mut terminal, &["q"]);
    assert_eq!(terminal.prompt_label(), "> ");
    assert_eq!(repo.snapshot()["alice"].history, vec![9]);
}

#[test]
fn calc_accepts_original_letter_shortcuts() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(
        &mut terminal,
        &["calc", "n", "1", "2", "m", "1", "2", "e", "3", "4", "d", "-7", "2", "h"],
    );
    assert_eq!(terminal.session().history, vec![3, -1, 12, -4]);
}

#[test]
fn store_is_persisted_after_every_top_level_command() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    let base = repo.save_count();

    submit_all(&mut terminal, &["help"]);
    assert_eq!(repo.save_count(), base + 1);

    submit_all(&mut terminal, &["no_such_command"]);
    assert_eq!(repo.save_count(), base + 2);

    submit_all(&mut terminal, &["calc", "+", "1", "1"]);
    assert_eq!(repo.save_count(), base + 2, "no flush while inside calc");

    submit_all(&mut terminal, &["quit"]);
    assert_eq!(repo.save_count(), base + 3);
    assert_eq!(repo.snapshot()["alice"].history, vec![2]);

    submit_all(&mut terminal, &["   "]);
    assert_eq!(repo.save_count(), base + 3, "blank lines are ignored");
}

#[test]
fn flushed_history_is_capped_to_most_recent_entries() {
    let mut account = Account::new("pw");
    account.history = (0..HISTORY_CAP as i64).collect();
    let (mut store, repo) = store_with("dave", account);
    let mut terminal =
        Terminal::start(&mut store, "dave", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["calc", "add", "500", "500", "add", "1", "1", "q"]);

    let persisted = &repo.snapshot()["dave"].history;
    assert_eq!(persisted.len(), HISTORY_CAP);
    assert_eq!(persisted[0], 2);
    assert_eq!(&persisted[HISTORY_CAP - 3..], &[999, 1000, 2]);
    assert_eq!(terminal.session().history.len(), HISTORY_CAP + 2);
}

#[test]
fn notes_write_read_delete_round_trip() {
    let (mut store, repo) = store_with("erin", Account::new("pw"));
    let mut terminal =
        Terminal::start(&mut store, "erin", ActivityLog::disabled(), collab()).unwrap();

    submit_all(
        &mut terminal,
        &["note", "write", "  first  ", "write second", "write third"],
    );
    let out = submit_all(&mut terminal, &["read"]);
    let lines = texts(out);
    assert!(lines.contains(&"1) first".to_string()));
    assert!(lines.contains(&"3) third".to_string()));

    let out = submit_all(&mut terminal, &["delete 9"]);
    assert_eq!(errors(&out).len(), 1);
    assert_eq!(terminal.session().notes.len(), 3);

    submit_all(&mut terminal, &["delete", "2", "exit"]);
    assert_eq!(
        repo.snapshot()["erin"].notes,
        vec!["first".to_string(), "third".to_string()]
    );
}

#[test]
fn password_command_validates_length() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    terminal.drain_output();

    let lines = texts(submit_all(&mut terminal, &["password 16"]));
    let generated = lines
        .iter()
        .find_map(|line| line.strip_prefix("Generated password: "))
        .unwrap();
    assert_eq!(generated.chars().count(), 16);

    for bad in ["password 0", "password 101", "password", "password abc"] {
        let out = submit_all(&mut terminal, &[bad]);
        assert_eq!(errors(&out).len(), 1, "`{bad}` should be rejected");
    }
}

#[test]
fn language_toggle_localizes_and_persists() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    let lines = texts(submit_all(&mut terminal, &["SR"]));
    assert!(lines.contains(&"Jezik postavljen na srpski.".to_string()));
    assert_eq!(repo.snapshot()["alice"].language, Language::Serbian);

    let lines = texts(submit_all(&mut terminal, &["help"]));
    assert!(lines.contains(&"=== Komande ===".to_string()));

    let out = submit_all(&mut terminal, &["bogus"]);
    assert_eq!(
        errors(&out),
        vec!["Nepoznata komanda. Ukucajte 'help' za dostupne komande.".to_string()]
    );

    submit_all(&mut terminal, &["en"]);
    assert_eq!(repo.snapshot()["alice"].language, Language::English);
}

#[test]
fn joke_failures_are_rendered_not_fatal() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));

    let collab = collab_with(FixedJoke(None), RecordingInstaller::default());
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab).unwrap();
    let out = submit_all(&mut terminal, &["random_joke"]);
    assert_eq!(errors(&out), vec!["No joke found.".to_string()]);
    drop(terminal);

    let collab = collab_with(OfflineJokes, RecordingInstaller::default());
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab).unwrap();
    let out = submit_all(&mut terminal, &["random_joke", "fortune"]);
    let errs = errors(&out);
    assert_eq!(errs.len(), 1);
    assert!(errs[0].starts_with("Error fetching joke:"));
    assert!(texts(out).iter().any(|line| line.starts_with("Fortune: ")));
}

#[test]
fn joke_success_is_rendered() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    let lines = texts(submit_all(&mut terminal, &["random_joke"]));
    assert!(lines.contains(&"A joke.".to_string()));
}

#[test]
fn pip_install_surfaces_output_and_failures() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let installer = RecordingInstaller::default();
    let calls = installer.calls.clone();
    let mut terminal = Terminal::start(
        &mut store,
        "alice",
        ActivityLog::disabled(),
        collab_with(FixedJoke(None), installer),
    )
    .unwrap();

    let out = submit_all(&mut terminal, &["pip_install Requests"]);
    assert_eq!(errors(&out), vec!["WARNING: running as root".to_string()]);
    assert!(texts(out).contains(&"Successfully installed Requests".to_string()));

    let out = submit_all(&mut terminal, &["pip_install --index-url http://evil"]);
    assert_eq!(errors(&out).len(), 1);
    assert_eq!(*calls.borrow(), vec!["Requests".to_string()]);
    drop(terminal);

    let failing = RecordingInstaller {
        fail_spawn: true,
        ..RecordingInstaller::default()
    };
    let mut terminal = Terminal::start(
        &mut store,
        "alice",
        ActivityLog::disabled(),
        collab_with(FixedJoke(None), failing),
    )
    .unwrap();
    let out = submit_all(&mut terminal, &["pip_install numpy"]);
    assert_eq!(errors(&out), vec!["Error: python3 not found".to_string()]);
}

#[test]
fn next_input_cancels_active_ticker() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["time"]);
    assert_eq!(terminal.active_ticker(), Some(TickerKind::Clock));
    terminal.tick();
    let clock = Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap();
    assert!(texts(terminal.drain_output())
        .iter()
        .any(|line| clock.is_match(line)));

    let lines = texts(submit_all(&mut terminal, &[""]));
    assert_eq!(lines, vec!["Clock stopped.".to_string()]);
    assert_eq!(terminal.active_ticker(), None);

    submit_all(&mut terminal, &["ascii_anim"]);
    assert_eq!(terminal.active_ticker(), Some(TickerKind::AsciiAnim));
    submit_all(&mut terminal, &["neofetch"]);
    assert_eq!(terminal.active_ticker(), Some(TickerKind::Neofetch));
    submit_all(&mut terminal, &["help"]);
    assert_eq!(terminal.active_ticker(), None);
}

#[test]
fn clear_emits_clear_without_state_change() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    let before = repo.snapshot();

    let out = submit_all(&mut terminal, &["clear"]);
    assert!(out.contains(&Output::Clear));
    assert_eq!(repo.snapshot(), before);
}

#[test]
fn logout_and_quit_end_the_session() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["note", "write keep me", "exit"]);
    assert_eq!(terminal.submit("LOGOUT"), Outcome::Logout);
    assert!(terminal.is_ended());
    assert_eq!(terminal.submit("help"), Outcome::Logout);
    assert_eq!(repo.snapshot()["alice"].notes, vec!["keep me".to_string()]);
    drop(terminal);

    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    assert_eq!(terminal.session().notes, vec!["keep me".to_string()]);
    assert_eq!(terminal.submit("exit"), Outcome::Quit);
}

#[test]
fn command_history_tracks_top_level_lines_only() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["help", "calc", "add", "1", "2", "q", "fortune"]);
    assert_eq!(
        terminal.session().command_history(),
        &["help".to_string(), "calc".to_string(), "fortune".to_string()]
    );
}

#[test]
fn close_flushes_pending_sub_machine_state() {
    let (mut store, repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["calc", "add", "20", "22"]);
    terminal.close();
    assert!(terminal.is_ended());
    assert_eq!(repo.snapshot()["alice"].history, vec![42]);
}

#[test]
fn activity_log_and_store_file_track_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("users.json");
    let mut store = UserStore::open_file(&store_path).unwrap();
    terminalos_core::AuthService::new(&mut store)
        .register("frank", "pw")
        .unwrap();

    let activity = ActivityLog::for_user(dir.path(), "frank");
    let log_path = activity.path().unwrap().to_path_buf();
    let mut terminal = Terminal::start(&mut store, "frank", activity, collab()).unwrap();
    submit_all(&mut terminal, &["sr", "fortune"]);
    assert_eq!(terminal.submit("logout"), Outcome::Logout);
    drop(terminal);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(json["frank"]["language"], 1);

    let entry = Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\] .+$").unwrap();
    let log = fs::read_to_string(log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert!(lines.iter().all(|line| entry.is_match(line)));
    assert!(lines[0].ends_with("User frank logged in."));
    assert!(lines.iter().any(|line| line.ends_with("Command entered: fortune")));
    assert!(lines.iter().any(|line| line.ends_with("User data saved.")));
    assert!(lines.iter().any(|line| line.ends_with("User frank logged out.")));
}

#[test]
fn hack_renders_ten_progress_lines_then_completion() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    terminal.drain_output();

    assert_eq!(terminal.submit("hack"), Outcome::Continue);
    assert_eq!(terminal.active_ticker(), Some(TickerKind::MatrixHack));
    assert_eq!(
        terminal.tick_interval(),
        Some(std::time::Duration::from_millis(100))
    );
    while terminal.active_ticker().is_some() {
        terminal.tick();
    }

    let out = terminal.drain_output();
    let progress: Vec<String> = out
        .iter()
        .filter_map(|item| match item {
            Output::Line {
                style: LineStyle::Success,
                text,
            } => Some(text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 10);
    assert_eq!(progress[0], "Matrix hack... 1/10");
    assert_eq!(progress[9], "Matrix hack... 10/10");
    let lines = texts(out);
    assert_eq!(
        &lines[lines.len() - 2..],
        &[
            "Text color reset to default.".to_string(),
            "Matrix hack complete!".to_string()
        ]
    );
}

#[test]
fn hackfbi_completion_is_localized_and_input_stops_it() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();

    submit_all(&mut terminal, &["sr", "hackfbi"]);
    assert_eq!(terminal.active_ticker(), Some(TickerKind::FbiHack));
    for _ in 0..20 {
        terminal.tick();
    }
    let lines = texts(terminal.drain_output());
    assert_eq!(lines.last().map(String::as_str), Some("FBI uspešno hakovan!"));
    assert_eq!(terminal.active_ticker(), None);

    submit_all(&mut terminal, &["hackfbi", "help"]);
    assert_eq!(terminal.active_ticker(), None);
}

#[test]
fn color_commands_render_styled_demo_lines() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    terminal.drain_output();

    let out = submit_all(&mut terminal, &["color"]);
    assert!(out.contains(&Output::Line {
        style: LineStyle::Success,
        text: "This is green text.".to_string(),
    }));
    assert!(texts(out).contains(&"Color demonstration complete.".to_string()));

    let out = submit_all(&mut terminal, &["colora"]);
    assert!(out.contains(&Output::Line {
        style: LineStyle::Alert,
        text: "This is red text.".to_string(),
    }));

    let lines = texts(submit_all(&mut terminal, &["cquit"]));
    assert!(lines.contains(&"Color reset complete.".to_string()));
    assert!(errors(&submit_all(&mut terminal, &["color"])).is_empty());
}

#[test]
fn ascii_text_is_rendered_as_lettering() {
    let (mut store, _repo) = store_with("alice", Account::new("pw1"));
    let mut terminal =
        Terminal::start(&mut store, "alice", ActivityLog::disabled(), collab()).unwrap();
    terminal.drain_output();

    let out = submit_all(&mut terminal, &["ascii Hi"]);
    let art: Vec<&String> = out
        .iter()
        .filter_map(|item| match item {
            Output::Line {
                style: LineStyle::Highlight,
                text,
            } => Some(text),
            _ => None,
        })
        .collect();
    assert!(art.len() >= 4);
    assert!(texts(out).contains(&"Generated ASCII art:".to_string()));
}
