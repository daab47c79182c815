#![allow(dead_code)]

use nix::sys::signal::{Signal, kill};
use nix::sys::wait::waitpid;
use nix::unistd::Pid;
use pipeshell::config::ExpandSection;
use pipeshell::exec::PipelineExecutor;
use pipeshell::expand::ArgumentExpander;
use pipeshell::types::{ChildState, ExecutionOutcome};

pub fn executor() -> PipelineExecutor {
    PipelineExecutor::new(ArgumentExpander::new(ExpandSection::default()))
}

/// States of a foreground outcome, in launch order.
pub fn states(outcome: &ExecutionOutcome) -> Vec<ChildState> {
    match outcome {
        ExecutionOutcome::Foreground { stages } => stages.iter().map(|s| s.state).collect(),
        other => panic!("expected a foreground outcome, got {other:?}"),
    }
}

/// Pid of a background outcome, asserting whether it was tracked.
pub fn background_pid(outcome: &ExecutionOutcome, expect_tracked: bool) -> Pid {
    match outcome {
        ExecutionOutcome::Background { pid, overflow, .. } => {
            assert_eq!(overflow.is_none(), expect_tracked, "unexpected tracking for {pid}");
            *pid
        }
        other => panic!("expected a background outcome, got {other:?}"),
    }
}

/// Kill a child of this test process and collect it.
pub fn kill_and_wait(pid: Pid) {
    let _ = kill(pid, Signal::SIGKILL);
    let _ = waitpid(pid, None);
}
