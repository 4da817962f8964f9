//! Domain model for persisted user data.
//!
//! # Responsibility
//! - Define canonical data structures shared by store, auth and shell layers.
//!
//! # Invariants
//! - Every account is keyed by a unique, case-sensitive username.

pub mod account;
