// src/shell/runtime.rs

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, info};

use crate::errors::Result;
use crate::jobs::SignalReaper;
use crate::shell::{Flow, Session, ShellEvent};

/// Async driver around a [`Session`].
///
/// Multiplexes three sources on the current task:
/// - lines of input
/// - `SIGCHLD` notifications (deferred reaping)
/// - `SIGINT`, which must not terminate the interpreter
///
/// Everything runs on one task, so the job table is only ever touched by
/// whichever event is being handled.
pub struct Runtime {
    session: Session,
    reaper: SignalReaper,
}

impl Runtime {
    /// Must be called inside a tokio runtime.
    pub fn new(session: Session) -> Result<Self> {
        let reaper = SignalReaper::install()?;
        Ok(Self { session, reaper })
    }

    /// Read-eval loop on the process's stdin and stdout.
    pub async fn run(self) -> Result<()> {
        self.run_with(BufReader::new(tokio::io::stdin()), io::stdout())
            .await
    }

    /// Read-eval loop over `input`, writing prompts and notices to `out`.
    /// Returns when input ends or `exit` is entered.
    pub async fn run_with<R, W>(mut self, input: R, mut out: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        info!("pipeshell started");

        let mut lines = input.lines();
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut show_prompt = true;

        loop {
            if show_prompt {
                self.session.poll_jobs(&mut out)?;
                write!(out, "{}", self.session.prompt())?;
                out.flush()?;
            }

            let event = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(line) => ShellEvent::Line(line),
                    None => ShellEvent::EndOfInput,
                },
                _ = self.reaper.notified() => ShellEvent::ChildTerminated,
                _ = sigint.recv() => ShellEvent::Interrupted,
            };
            debug!(?event, "shell event");

            let from_sigchld = event == ShellEvent::ChildTerminated;
            let tracked_before = self.session.jobs().len();

            if self.session.step(event, &mut out)? == Flow::Exit {
                break;
            }

            show_prompt = prompt_again(from_sigchld, tracked_before, self.session.jobs().len());
            out.flush()?;
        }

        out.flush()?;
        info!(remaining_jobs = self.session.jobs().len(), "pipeshell exiting");
        Ok(())
    }
}

/// Whether to print the prompt after handling an event.
///
/// Input always gets a fresh prompt. A `SIGCHLD` only does when a tracked
/// job was reclaimed, i.e. a notice was printed over the old prompt.
fn prompt_again(from_sigchld: bool, tracked_before: usize, tracked_after: usize) -> bool {
    !from_sigchld || tracked_after < tracked_before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_always_reprompts() {
        assert!(prompt_again(false, 0, 0));
        assert!(prompt_again(false, 2, 3));
    }

    #[test]
    fn sigchld_reprompts_only_after_a_notice() {
        assert!(prompt_again(true, 2, 1));
        assert!(!prompt_again(true, 2, 2));
        assert!(!prompt_again(true, 0, 0));
    }
}
