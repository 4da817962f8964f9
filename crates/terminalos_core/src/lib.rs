//! Core logic for TerminalOS.
//! This crate owns accounts, authentication, the command dispatcher and
//! user-data persistence; front ends only read lines and render output.

pub mod activity;
pub mod collab;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod shell;

pub use activity::ActivityLog;
pub use collab::installer::{InstallOutput, PackageInstaller, PipInstaller};
pub use collab::joke::{HttpJokeSource, JokeError, JokeSource};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::{Account, Language, HISTORY_CAP};
pub use repo::user_store::{
    JsonFileUserRepository, MemoryUserRepository, StoreError, StoreResult, UserMap,
    UserRepository, UserStore,
};
pub use service::auth_service::{AuthError, AuthService};
pub use shell::command::Command;
pub use shell::error::{ArgumentIssue, CommandError};
pub use shell::output::{LineStyle, Output};
pub use shell::terminal::{Collaborators, Outcome, Terminal};
pub use shell::ticker::TickerKind;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
