// src/jobs/reaper.rs

//! Asynchronous reclamation of terminated children.
//!
//! The work is split in two stages:
//!
//! 1. The real `SIGCHLD` handler is tokio's signal driver. It runs in signal
//!    context and only records that the signal was delivered.
//! 2. [`SignalReaper::reclaim`] runs on the shell's task once
//!    [`SignalReaper::notified`] resolves. It drains every terminated child
//!    with non-blocking `waitpid` and updates the [`JobTable`].
//!
//! Signals coalesce, so one notification may stand for several children;
//! the drain loop does not assume a one-to-one mapping.

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::jobs::JobTable;

#[derive(Debug)]
pub struct SignalReaper {
    sigchld: Signal,
}

impl SignalReaper {
    /// Register the `SIGCHLD` listener. Must run inside a tokio runtime.
    pub fn install() -> Result<Self> {
        let sigchld = signal(SignalKind::child())?;
        debug!("SIGCHLD listener installed");
        Ok(Self { sigchld })
    }

    /// Resolve once at least one `SIGCHLD` arrived since the last call.
    ///
    /// Cancel safe, so it can sit in a `select!` next to line input.
    pub async fn notified(&mut self) {
        // The stream only ends if the driver shuts down, i.e. at runtime exit.
        let _ = self.sigchld.recv().await;
    }

    /// Reclaim every terminated child and return the tracked jobs that
    /// ended, in the order they were collected.
    ///
    /// Children that are not in the table (earlier stages of background
    /// pipelines, jobs that overflowed the table) are reaped as well so they
    /// do not linger as zombies. Must not run while a foreground pipeline is
    /// being waited for, as it would steal its statuses.
    pub fn reclaim(jobs: &mut JobTable) -> Vec<Pid> {
        let mut reclaimed = Vec::new();

        for pid in drain_terminated() {
            if jobs.remove(pid).is_some() {
                reclaimed.push(pid);
            } else {
                debug!(%pid, "reaped untracked child");
            }
        }

        // Tracked jobs whose status someone else consumed.
        reclaimed.extend(jobs.reap_finished());
        reclaimed
    }
}

/// Collect all children that have already terminated, without blocking.
fn drain_terminated() -> Vec<Pid> {
    let mut pids = Vec::new();
    loop {
        match waitpid(None::<Pid>, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => break,
            Ok(WaitStatus::Exited(pid, code)) => {
                debug!(%pid, code, "child exited");
                pids.push(pid);
            }
            Ok(WaitStatus::Signaled(pid, signal, _)) => {
                debug!(%pid, ?signal, "child killed by signal");
                pids.push(pid);
            }
            Ok(other) => {
                debug!(status = ?other, "ignoring non-terminal wait status");
            }
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => break,
            Err(err) => {
                warn!(error = %err, "waitpid failed while draining children");
                break;
            }
        }
    }
    pids
}
