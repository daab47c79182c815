// src/shell/session.rs

use std::io::Write;

use nix::unistd::Pid;
use tracing::{debug, error};

use crate::cmdline::parse_line;
use crate::config::ConfigFile;
use crate::errors::{Result, ShellError};
use crate::exec::PipelineExecutor;
use crate::expand::ArgumentExpander;
use crate::jobs::{JobTable, SignalReaper};
use crate::types::{ExecutionOutcome, PipelineSpec};

use super::{Flow, ShellEvent};

/// Interpreter state and per-event behaviour.
///
/// Owns the single [`JobTable`]; both the synchronous poll before each
/// prompt and the `SIGCHLD`-driven reclaim go through `&mut self`, so the
/// table is never mutated from two places at once.
#[derive(Debug)]
pub struct Session {
    config: ConfigFile,
    jobs: JobTable,
    executor: PipelineExecutor,
    dry_run: bool,
}

impl Session {
    pub fn new(config: ConfigFile) -> Self {
        let expander = ArgumentExpander::new(config.expand());
        Self::with_expander(config, expander)
    }

    pub fn with_expander(config: ConfigFile, expander: ArgumentExpander) -> Self {
        let jobs = JobTable::new(config.jobs().max_jobs);
        Self {
            config,
            jobs,
            executor: PipelineExecutor::new(expander),
            dry_run: false,
        }
    }

    /// Parse and print lines without executing them.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn prompt(&self) -> &str {
        &self.config.shell().prompt
    }

    pub fn jobs(&self) -> &JobTable {
        &self.jobs
    }

    /// React to one event.
    ///
    /// Only fatal conditions (pipe/fork failure, broken output) are returned
    /// as errors; everything else is reported on `out` and the session
    /// continues.
    pub fn step(&mut self, event: ShellEvent, out: &mut dyn Write) -> Result<Flow> {
        match event {
            ShellEvent::Line(line) => self.handle_line(&line, out),
            ShellEvent::ChildTerminated => {
                let reclaimed = SignalReaper::reclaim(&mut self.jobs);
                self.announce(&reclaimed, out)?;
                Ok(Flow::Continue)
            }
            ShellEvent::Interrupted => {
                writeln!(out)?;
                Ok(Flow::Continue)
            }
            ShellEvent::EndOfInput => {
                writeln!(out, "exit")?;
                Ok(Flow::Exit)
            }
        }
    }

    /// Synchronous check run before every prompt.
    ///
    /// Returns how many jobs were announced.
    pub fn poll_jobs(&mut self, out: &mut dyn Write) -> Result<usize> {
        let finished = self.jobs.reap_finished();
        self.announce(&finished, out)?;
        Ok(finished.len())
    }

    fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow> {
        let trimmed = line.trim();
        match trimmed {
            "exit" => {
                writeln!(out, "exit")?;
                return Ok(Flow::Exit);
            }
            "jobs" => {
                self.list_jobs(out)?;
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        let spec = match parse_line(trimmed) {
            Ok(Some(spec)) => spec,
            Ok(None) => return Ok(Flow::Continue),
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(Flow::Continue);
            }
        };

        if self.config.shell().echo_parsed || self.dry_run {
            echo_parsed(&spec, out)?;
        }
        if self.dry_run {
            return Ok(Flow::Continue);
        }

        // Output written so far must reach the terminal before children
        // start writing to it.
        out.flush()?;

        match self.executor.execute(&spec, &mut self.jobs) {
            Ok(ExecutionOutcome::Foreground { stages }) => {
                debug!(?stages, "foreground pipeline finished");
            }
            Ok(ExecutionOutcome::Background { pid, overflow, .. }) => {
                writeln!(out, "[background process started: PID {pid}]")?;
                if let Some(overflow) = overflow {
                    writeln!(out, "error: {overflow}")?;
                }
            }
            Err(err) if err.is_fatal() => {
                error!(error = %err, "cannot create processes");
                return Err(err);
            }
            Err(ShellError::ExpansionFailed(msg)) => {
                writeln!(out, "pipeshell: {msg}")?;
            }
            Err(err) => return Err(err),
        }

        Ok(Flow::Continue)
    }

    fn list_jobs(&self, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Background jobs:")?;
        for (pid, label) in self.jobs.list() {
            writeln!(out, "PID: {pid}, Command: {label}")?;
        }
        Ok(())
    }

    fn announce(&self, pids: &[Pid], out: &mut dyn Write) -> Result<()> {
        if !self.config.jobs().notify {
            return Ok(());
        }
        for pid in pids {
            writeln!(out, "Process {pid} finished.")?;
        }
        Ok(())
    }
}

/// Debug echo of a parsed pipeline.
fn echo_parsed(spec: &PipelineSpec, out: &mut dyn Write) -> Result<()> {
    if let Some(input) = &spec.input {
        writeln!(out, "in: {}", input.display())?;
    }
    if let Some(output) = &spec.output {
        writeln!(out, "out: {}", output.display())?;
    }
    if spec.background {
        writeln!(out, "background (&)")?;
    }
    for (i, stage) in spec.stages.iter().enumerate() {
        write!(out, "seq[{i}]:")?;
        for arg in &stage.argv {
            write!(out, " '{arg}'")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
