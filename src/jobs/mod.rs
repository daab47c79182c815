// src/jobs/mod.rs

//! Background job tracking.
//!
//! - [`table`] owns the mapping from process handle to [`Job`] and can poll
//!   its entries for termination.
//! - [`reaper`] reacts to `SIGCHLD` and reclaims terminated children while
//!   the shell sits at the prompt.
//!
//! Both paths mutate the same [`JobTable`], always from the shell's single
//! task: the signal handler itself only records that a notification
//! arrived, and the table is touched once the main loop picks it up.

pub mod reaper;
pub mod table;

pub use reaper::SignalReaper;
pub use table::{Job, JobTable, JobTableOverflow};
