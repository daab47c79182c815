// src/exec/child.rs

//! Child side of a stage launch.
//!
//! Everything in this file runs between `fork` and `exec` in a process that
//! may have been forked from a multi-threaded parent. It sticks to raw
//! system calls and takes no locks of its own: no `tracing`, no std stdio
//! handles. Arguments are converted to `CString`s by the parent before
//! forking. Two calls still allocate: `execvp` builds its pointer array and
//! opening a redirection target copies long paths (384 bytes or more) to the
//! heap. Both rely on the C library's `malloc` being usable after `fork`,
//! which glibc guarantees.
//!
//! The child never returns into the parent's control flow: it either
//! becomes the command or exits with [`EXIT_EXEC_FAILED`] /
//! [`EXIT_REDIRECT_FAILED`].

use std::ffi::CString;
use std::fs::File;
use std::io::{self, Write};
use std::mem::ManuallyDrop;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{dup2, execvp};

use crate::exec::redirect::{self, Stream};
use crate::types::{EXIT_EXEC_FAILED, EXIT_REDIRECT_FAILED};

/// Descriptors and redirections handed to one stage.
#[derive(Debug)]
pub(crate) struct StageIo<'a> {
    /// Read end carried over from the previous stage.
    pub stdin: Option<OwnedFd>,
    /// `(read, write)` of the pipe towards the next stage. The read end
    /// belongs to the next stage and is closed here.
    pub pipe: Option<(OwnedFd, OwnedFd)>,
    /// Input file (first stage only).
    pub input: Option<&'a Path>,
    /// Output file (last stage only).
    pub output: Option<&'a Path>,
}

/// Wire up the standard streams and replace the process image.
///
/// File redirections are applied after the pipe wiring, so a file always
/// wins over a pipe on the same stream.
pub(crate) fn exec_stage(io: StageIo<'_>, argv: &[CString]) -> ! {
    let program = argv[0].as_bytes();

    if let Some(read) = io.stdin {
        if let Err(err) = install(read, libc::STDIN_FILENO) {
            die("dup2 (input)", program, err.desc(), EXIT_REDIRECT_FAILED);
        }
    }

    if let Some((read, write)) = io.pipe {
        drop(read);
        if let Err(err) = install(write, libc::STDOUT_FILENO) {
            die("dup2 (output)", program, err.desc(), EXIT_REDIRECT_FAILED);
        }
    }

    for (stream, path) in [(Stream::Stdin, io.input), (Stream::Stdout, io.output)] {
        let Some(path) = path else { continue };
        if let Err(err) = redirect::apply(stream, path) {
            die(
                stream.describe(),
                path.as_os_str().as_bytes(),
                io_desc(&err),
                EXIT_REDIRECT_FAILED,
            );
        }
    }

    // The interpreter runs with SIGPIPE ignored; commands expect the default.
    // SAFETY: restoring a default disposition installs no handler code.
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    let err = match execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    die("execvp", program, err.desc(), EXIT_EXEC_FAILED)
}

/// Move `fd` onto the standard slot `target`, closing the original.
fn install(fd: OwnedFd, target: RawFd) -> nix::Result<()> {
    if fd.as_raw_fd() == target {
        let _ = fd.into_raw_fd();
        return Ok(());
    }
    dup2(fd.as_raw_fd(), target)?;
    Ok(())
}

fn io_desc(err: &io::Error) -> &'static str {
    err.raw_os_error()
        .map(|code| Errno::from_raw(code).desc())
        .unwrap_or("unknown error")
}

/// Print `pipeshell: <op> <subject>: <desc>` and exit without unwinding or
/// running the parent's exit handlers.
fn die(op: &str, subject: &[u8], desc: &str, status: i32) -> ! {
    // SAFETY: fd 2 stays open for the whole life of the child and the
    // `ManuallyDrop` keeps this handle from closing it.
    let mut stderr = ManuallyDrop::new(unsafe { File::from_raw_fd(libc::STDERR_FILENO) });
    for part in [
        b"pipeshell: ".as_slice(),
        op.as_bytes(),
        b" ".as_slice(),
        subject,
        b": ".as_slice(),
        desc.as_bytes(),
        b"\n".as_slice(),
    ] {
        let _ = stderr.write_all(part);
    }
    // SAFETY: `_exit` is async-signal-safe and never returns.
    unsafe { libc::_exit(status) }
}
