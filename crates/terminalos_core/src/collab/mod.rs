//! External collaborators reached by shell commands.
//!
//! # Responsibility
//! - Define narrow traits for the joke service and the package installer.
//! - Provide the production implementations (HTTP, subprocess).

pub mod installer;
pub mod joke;
