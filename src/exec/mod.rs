// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`pipeline`] owns [`PipelineExecutor`]: it expands arguments, creates
//!   the inter-stage pipes, forks one process per stage and either waits for
//!   all of them or hands the last one to the job table.
//! - [`child`] is the code a forked stage runs before its image is
//!   replaced.
//! - [`redirect`] opens and installs the input/output files of the
//!   boundary stages.

mod child;
pub mod pipeline;
pub mod redirect;

pub use pipeline::PipelineExecutor;
pub use redirect::Stream;
