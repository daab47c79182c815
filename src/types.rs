// src/types.rs

//! Data model shared by the executor, the job table and the front end.

use std::fmt;
use std::path::PathBuf;

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

use crate::jobs::JobTableOverflow;

/// Exit status a child uses when replacing its image with the command fails.
pub const EXIT_EXEC_FAILED: i32 = 127;

/// Exit status a child uses when a file redirection cannot be installed.
pub const EXIT_REDIRECT_FAILED: i32 = 126;

/// One command of a pipeline: `argv[0]` is the program, the rest its
/// arguments. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub argv: Vec<String>,
}

impl StageSpec {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// The program name as typed (before expansion).
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }
}

/// A fully parsed command line, as handed over by the parser.
///
/// - `input` applies to the first stage only.
/// - `output` applies to the last stage only.
/// - `background` decides between blocking and job registration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PipelineSpec {
    pub stages: Vec<StageSpec>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub background: bool,
}

impl PipelineSpec {
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    /// Label used for job listings: `argv[0]` of the first stage.
    pub fn label(&self) -> &str {
        self.stages.first().map(StageSpec::program).unwrap_or_default()
    }
}

/// Lifecycle of one forked stage, as seen by the parent.
///
/// A stage is `Running` from the moment `fork` returns until its status is
/// collected. The interval between fork and exec belongs to the child and is
/// not observable here: `ExecFailed` and `RedirectFailed` are inferred from
/// the distinguished exit statuses [`EXIT_EXEC_FAILED`] and
/// [`EXIT_REDIRECT_FAILED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    Running,
    Exited(i32),
    Signaled(i32),
    ExecFailed,
    RedirectFailed,
    /// The status was collected by someone else (e.g. the reaper).
    Unknown,
}

impl ChildState {
    /// Map a `waitpid` result onto a terminal state.
    ///
    /// Returns `None` for statuses that do not end the process
    /// (`StillAlive`, stops, continues, ptrace events).
    pub fn from_wait_status(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, EXIT_EXEC_FAILED) => Some(ChildState::ExecFailed),
            WaitStatus::Exited(_, EXIT_REDIRECT_FAILED) => Some(ChildState::RedirectFailed),
            WaitStatus::Exited(_, code) => Some(ChildState::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ChildState::Signaled(signal as i32)),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChildState::Running)
    }
}

impl fmt::Display for ChildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildState::Running => write!(f, "running"),
            ChildState::Exited(code) => write!(f, "exited with status {code}"),
            ChildState::Signaled(sig) => write!(f, "killed by signal {sig}"),
            ChildState::ExecFailed => write!(f, "could not be executed"),
            ChildState::RedirectFailed => write!(f, "redirection failed"),
            ChildState::Unknown => write!(f, "status unknown"),
        }
    }
}

/// Report for one launched stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub pid: Pid,
    pub program: String,
    pub state: ChildState,
}

impl StageReport {
    /// A stage that was just forked.
    pub fn running(pid: Pid, program: impl Into<String>) -> Self {
        Self {
            pid,
            program: program.into(),
            state: ChildState::Running,
        }
    }

    /// Move to a terminal state. A terminal state is never left again.
    pub fn finish(&mut self, state: ChildState) {
        if !self.state.is_terminal() {
            self.state = state;
        }
    }
}

/// What `PipelineExecutor::execute` did with a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Every stage was waited for, in launch order.
    Foreground { stages: Vec<StageReport> },
    /// The pipeline keeps running; `pid` is its last stage and the only
    /// one registered as a job. Every stage is still `Running`.
    ///
    /// `overflow` is set when the job table was full and the job is not
    /// tracked.
    Background {
        pid: Pid,
        label: String,
        stages: Vec<StageReport>,
        overflow: Option<JobTableOverflow>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn distinguished_statuses_map_to_failure_states() {
        let pid = Pid::from_raw(42);
        assert_eq!(
            ChildState::from_wait_status(WaitStatus::Exited(pid, EXIT_EXEC_FAILED)),
            Some(ChildState::ExecFailed)
        );
        assert_eq!(
            ChildState::from_wait_status(WaitStatus::Exited(pid, EXIT_REDIRECT_FAILED)),
            Some(ChildState::RedirectFailed)
        );
        assert_eq!(
            ChildState::from_wait_status(WaitStatus::Exited(pid, 3)),
            Some(ChildState::Exited(3))
        );
        assert_eq!(
            ChildState::from_wait_status(WaitStatus::Signaled(pid, Signal::SIGKILL, false)),
            Some(ChildState::Signaled(9))
        );
        assert_eq!(ChildState::from_wait_status(WaitStatus::StillAlive), None);
    }

    #[test]
    fn label_is_first_program() {
        let spec = PipelineSpec::new(vec![
            StageSpec::new(["ls", "-l"]),
            StageSpec::new(["wc"]),
        ]);
        assert_eq!(spec.label(), "ls");
    }

    #[test]
    fn stage_report_moves_from_running_to_terminal_once() {
        let mut report = StageReport::running(Pid::from_raw(7), "cat");
        assert_eq!(report.state, ChildState::Running);
        assert!(!report.state.is_terminal());

        report.finish(ChildState::Exited(0));
        assert_eq!(report.state, ChildState::Exited(0));

        // A later status (e.g. ECHILD after the reaper ran) does not
        // overwrite the first one.
        report.finish(ChildState::Unknown);
        assert_eq!(report.state, ChildState::Exited(0));
    }
}
