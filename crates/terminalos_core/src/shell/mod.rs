//! Simulated shell: command registry, session state and terminal loop.
//!
//! # Responsibility
//! - Turn one line of input into state changes and rendered output.
//! - Model multi-step commands (calculator, notes) as explicit state machines
//!   so blocking-console and event-driven front ends drive them the same way.
//!
//! # Invariants
//! - No two commands ever execute concurrently; every entry point takes
//!   `&mut Terminal`.

pub mod calc;
pub mod command;
pub mod error;
pub mod extras;
pub mod notes;
pub mod output;
pub mod session;
pub mod terminal;
pub mod ticker;

/// Result of feeding one line to a sub-machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep routing input to the sub-machine.
    Stay,
    /// Hand control back to the top-level prompt.
    Exit,
}
