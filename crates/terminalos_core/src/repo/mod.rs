//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the load/save contract for the user map.
//! - Isolate file format details from auth and shell orchestration.
//!
//! # Invariants
//! - The store is always written in full, never patched.

pub mod user_store;
