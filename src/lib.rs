// src/lib.rs

pub mod cli;
pub mod cmdline;
pub mod config;
pub mod errors;
pub mod exec;
pub mod expand;
pub mod fs;
pub mod jobs;
pub mod logging;
pub mod shell;
pub mod types;

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_or_default;
use crate::shell::{Flow, Runtime, Session, ShellEvent};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus CLI overrides)
/// - the interpreter session
/// - either the `-c` batch mode or the interactive runtime
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_or_default(args.config.as_deref()).context("loading configuration")?;
    if let Some(prompt) = args.prompt {
        cfg.set_prompt(prompt);
    }
    debug!(?cfg, "configuration resolved");

    let mut session = Session::new(cfg);
    session.set_dry_run(args.dry_run);

    if let Some(lines) = args.command {
        return run_batch(session, &lines);
    }

    let runtime = Runtime::new(session)?;
    runtime.run().await?;
    Ok(())
}

/// Run each line of `lines` in order, without prompts.
fn run_batch(mut session: Session, lines: &str) -> Result<()> {
    let mut stdout = io::stdout();
    for line in lines.lines() {
        session.poll_jobs(&mut stdout)?;
        if session.step(ShellEvent::Line(line.to_string()), &mut stdout)? == Flow::Exit {
            break;
        }
        stdout.flush()?;
    }
    info!(
        remaining_jobs = session.jobs().len(),
        "batch finished; background jobs keep running"
    );
    Ok(())
}
