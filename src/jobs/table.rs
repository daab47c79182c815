// src/jobs/table.rs

use std::time::SystemTime;

use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::Pid;
use thiserror::Error;
use tracing::{debug, warn};

/// A background pipeline, identified by its last stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    /// `argv[0]` of the first stage, shown by `jobs`.
    pub label: String,
    /// Advisory only.
    pub started_at: SystemTime,
}

/// Returned by [`JobTable::register`] when the table is full.
///
/// The process keeps running; it is simply not tracked.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("too many background jobs (limit {capacity}); process {pid} is not tracked")]
pub struct JobTableOverflow {
    pub pid: Pid,
    pub capacity: usize,
}

/// Insertion-ordered set of running background jobs.
#[derive(Debug)]
pub struct JobTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl JobTable {
    pub const DEFAULT_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|j| j.pid == pid)
    }

    /// Start tracking `pid`. Existing entries are never touched on overflow.
    pub fn register(
        &mut self,
        pid: Pid,
        label: impl Into<String>,
    ) -> Result<(), JobTableOverflow> {
        if self.jobs.len() >= self.capacity {
            return Err(JobTableOverflow {
                pid,
                capacity: self.capacity,
            });
        }
        let label = label.into();
        debug!(%pid, %label, "tracking background job");
        self.jobs.push(Job {
            pid,
            label,
            started_at: SystemTime::now(),
        });
        Ok(())
    }

    /// Stop tracking `pid`, returning its entry if it was tracked.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let idx = self.jobs.iter().position(|j| j.pid == pid)?;
        Some(self.jobs.remove(idx))
    }

    /// Poll every tracked job without blocking; drop and return the ones
    /// that have terminated, in table order.
    ///
    /// A job whose status was already collected elsewhere (`ECHILD`) counts
    /// as terminated.
    pub fn reap_finished(&mut self) -> Vec<Pid> {
        let mut finished = Vec::new();
        self.jobs.retain(|job| {
            if poll_terminated(job.pid) {
                finished.push(job.pid);
                false
            } else {
                true
            }
        });
        finished
    }

    /// Current `(pid, label)` pairs in table order.
    pub fn list(&self) -> Vec<(Pid, &str)> {
        self.jobs.iter().map(|j| (j.pid, j.label.as_str())).collect()
    }
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

fn poll_terminated(pid: Pid) -> bool {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::Exited(..)) | Ok(WaitStatus::Signaled(..)) => {
            debug!(%pid, "background job terminated");
            true
        }
        Ok(_) => false,
        Err(Errno::ECHILD) => {
            debug!(%pid, "background job already reclaimed");
            true
        }
        Err(Errno::EINTR) => false,
        Err(err) => {
            warn!(%pid, error = %err, "waitpid failed while polling job");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::{Duration, Instant};

    fn spawn(cmd: &str, args: &[&str]) -> Pid {
        let child = Command::new(cmd).args(args).spawn().unwrap();
        Pid::from_raw(child.id() as i32)
    }

    #[test]
    fn register_and_list_in_order() {
        let mut table = JobTable::new(4);
        table.register(Pid::from_raw(10), "sleep").unwrap();
        table.register(Pid::from_raw(11), "yes").unwrap();

        assert_eq!(
            table.list(),
            vec![(Pid::from_raw(10), "sleep"), (Pid::from_raw(11), "yes")]
        );
        assert!(table.contains(Pid::from_raw(11)));
    }

    #[test]
    fn overflow_is_reported_and_keeps_existing_entries() {
        let mut table = JobTable::new(2);
        table.register(Pid::from_raw(1000), "a").unwrap();
        table.register(Pid::from_raw(1001), "b").unwrap();

        let err = table.register(Pid::from_raw(1002), "c").unwrap_err();
        assert_eq!(err.capacity, 2);
        assert_eq!(err.pid, Pid::from_raw(1002));
        assert!(err.to_string().contains("not tracked"));

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.list(),
            vec![(Pid::from_raw(1000), "a"), (Pid::from_raw(1001), "b")]
        );
    }

    #[test]
    fn remove_returns_entry_once() {
        let mut table = JobTable::default();
        table.register(Pid::from_raw(7), "cat").unwrap();
        assert_eq!(table.remove(Pid::from_raw(7)).map(|j| j.label), Some("cat".to_string()));
        assert!(table.remove(Pid::from_raw(7)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn reap_finished_collects_exited_child_and_is_idempotent() {
        let mut table = JobTable::default();
        let done = spawn("true", &[]);
        table.register(done, "true").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut reaped = Vec::new();
        while reaped.is_empty() && Instant::now() < deadline {
            reaped = table.reap_finished();
            std::thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(reaped, vec![done]);
        assert!(table.is_empty());
        assert!(table.reap_finished().is_empty());
    }

    #[test]
    fn reap_finished_leaves_running_jobs() {
        let mut table = JobTable::default();
        let running = spawn("sleep", &["5"]);
        table.register(running, "sleep").unwrap();

        assert!(table.reap_finished().is_empty());
        assert_eq!(table.len(), 1);

        nix::sys::signal::kill(running, nix::sys::signal::Signal::SIGKILL).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !table.is_empty() && Instant::now() < deadline {
            table.reap_finished();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(table.is_empty());
    }

    #[test]
    fn foreign_pid_counts_as_reclaimed() {
        // pid 1 is never our child, so waitpid reports ECHILD.
        let mut table = JobTable::default();
        table.register(Pid::from_raw(1), "init").unwrap();
        assert_eq!(table.reap_finished(), vec![Pid::from_raw(1)]);
    }
}
