// src/shell/mod.rs

//! Interactive interpreter around the execution core.
//!
//! The synchronous [`Session`] holds all interpreter state (config, job
//! table, executor) and reacts to one [`ShellEvent`] at a time, writing
//! user-facing lines to any `io::Write`. The async [`Runtime`] produces
//! those events from stdin and signals.

pub mod runtime;
pub mod session;

pub use runtime::Runtime;
pub use session::Session;

/// Events the interpreter reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A complete line of input.
    Line(String),
    /// At least one child terminated (`SIGCHLD`).
    ChildTerminated,
    /// Ctrl-C while waiting at the prompt.
    Interrupted,
    /// Stdin was closed.
    EndOfInput,
}

/// Whether the interpreter keeps reading input after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
