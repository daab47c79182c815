// src/exec/pipeline.rs

//! Launch a [`PipelineSpec`] as one process per stage.

use std::ffi::CString;
use std::os::fd::OwnedFd;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, Pid, fork, pipe2};
use tracing::{debug, info, warn};

use crate::errors::{Result, ShellError};
use crate::exec::child::{StageIo, exec_stage};
use crate::expand::ArgumentExpander;
use crate::jobs::JobTable;
use crate::types::{ChildState, ExecutionOutcome, PipelineSpec, StageReport};

/// Creates the processes of a pipeline and wires them together.
///
/// Pipe and fork failures are returned as
/// [`ShellError::ResourceExhausted`], which the interpreter treats as fatal.
/// Problems inside a child (missing program, unreadable input file) only
/// show up as that child's exit status.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    expander: ArgumentExpander,
}

/// A stage ready to be forked: argv expanded and converted for `execvp`.
#[derive(Debug)]
struct PreparedStage {
    program: String,
    argv: Vec<CString>,
}

impl PipelineExecutor {
    pub fn new(expander: ArgumentExpander) -> Self {
        Self { expander }
    }

    /// Run `spec`.
    ///
    /// Foreground pipelines block until every stage has terminated, waiting
    /// in launch order. Background pipelines return right after the last
    /// fork; only the last stage is registered in `jobs`.
    pub fn execute(&self, spec: &PipelineSpec, jobs: &mut JobTable) -> Result<ExecutionOutcome> {
        // Expand every stage before forking anything, so a bad argument
        // never leaves half a pipeline running.
        let stages = spec
            .stages
            .iter()
            .map(|stage| self.prepare(&stage.argv))
            .collect::<Result<Vec<_>>>()?;

        let mut reports = launch(spec, &stages)?;

        if spec.background {
            if let Some(pid) = reports.last().map(|r| r.pid) {
                return Ok(register_background(spec, pid, reports, jobs));
            }
        }

        for report in &mut reports {
            report.finish(wait_for(report.pid));
            debug!(
                pid = %report.pid,
                program = %report.program,
                state = %report.state,
                "stage finished"
            );
        }

        Ok(ExecutionOutcome::Foreground { stages: reports })
    }

    fn prepare(&self, argv: &[String]) -> Result<PreparedStage> {
        let expanded = self.expander.expand(argv);
        let program = expanded.first().cloned().unwrap_or_default();
        let argv = expanded
            .into_iter()
            .map(|arg| {
                CString::new(arg).map_err(|err| {
                    ShellError::ExpansionFailed(format!(
                        "argument contains a NUL byte at offset {}",
                        err.nul_position()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if argv.is_empty() {
            return Err(ShellError::ExpansionFailed("empty command".to_string()));
        }
        Ok(PreparedStage { program, argv })
    }
}

/// Fork every stage left to right, carrying the read end of each pipe into
/// the next stage. Returns one `Running` report per stage, in launch order.
fn launch(spec: &PipelineSpec, stages: &[PreparedStage]) -> Result<Vec<StageReport>> {
    let last = stages.len().saturating_sub(1);
    let mut reports = Vec::with_capacity(stages.len());
    let mut carried: Option<OwnedFd> = None;

    for (i, stage) in stages.iter().enumerate() {
        let next_pipe = if i < last { Some(stage_pipe()?) } else { None };

        let io = StageIo {
            stdin: carried.take(),
            pipe: next_pipe,
            input: if i == 0 { spec.input.as_deref() } else { None },
            output: if i == last { spec.output.as_deref() } else { None },
        };

        // SAFETY: the child only performs raw system calls before exec or
        // `_exit` (see `exec::child`).
        let forked = unsafe { fork() }.map_err(|source| ShellError::ResourceExhausted {
            op: "fork",
            source,
        })?;

        match forked {
            ForkResult::Child => exec_stage(io, &stage.argv),
            ForkResult::Parent { child } => {
                debug!(stage = i, pid = %child, program = %stage.program, "launched stage");
                reports.push(StageReport::running(child, stage.program.as_str()));

                // The child owns its copies now. Keep only the read end
                // destined for the next stage.
                let StageIo { stdin, pipe, .. } = io;
                drop(stdin);
                carried = pipe.map(|(read, write)| {
                    drop(write);
                    read
                });
            }
        }
    }

    Ok(reports)
}

/// Create the pipe between two adjacent stages.
///
/// Both ends are created close-on-exec in one call: the stages that use
/// them get fresh descriptors through `dup2`, and no other process image
/// may inherit them.
fn stage_pipe() -> Result<(OwnedFd, OwnedFd)> {
    pipe2(OFlag::O_CLOEXEC).map_err(|source| ShellError::ResourceExhausted { op: "pipe", source })
}

fn register_background(
    spec: &PipelineSpec,
    pid: Pid,
    stages: Vec<StageReport>,
    jobs: &mut JobTable,
) -> ExecutionOutcome {
    let label = spec.label().to_string();

    let overflow = match jobs.register(pid, label.clone()) {
        Ok(()) => {
            info!(%pid, %label, "background job started");
            None
        }
        Err(overflow) => {
            warn!(%pid, capacity = overflow.capacity, "job table full; job not tracked");
            Some(overflow)
        }
    };

    ExecutionOutcome::Background {
        pid,
        label,
        stages,
        overflow,
    }
}

/// Block until `pid` terminates.
fn wait_for(pid: Pid) -> ChildState {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(state) = ChildState::from_wait_status(status) {
                    return state;
                }
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => return ChildState::Unknown,
            Err(err) => {
                warn!(%pid, error = %err, "waitpid failed");
                return ChildState::Unknown;
            }
        }
    }
}
