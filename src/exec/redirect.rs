// src/exec/redirect.rs

//! File redirection for the boundary stages of a pipeline.
//!
//! [`apply`] is meant to run inside a freshly forked child, before the
//! image is replaced: it opens the file, installs it on the standard stream
//! and closes the original descriptor. It only issues system calls (no
//! locks, no allocation for ordinary path lengths).

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use nix::libc;
use nix::unistd::dup2;

/// Standard stream a redirection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdin,
    Stdout,
}

impl Stream {
    pub fn fd(self) -> RawFd {
        match self {
            Stream::Stdin => libc::STDIN_FILENO,
            Stream::Stdout => libc::STDOUT_FILENO,
        }
    }

    /// Operation name used in child diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Stream::Stdin => "open (input file)",
            Stream::Stdout => "open (output file)",
        }
    }
}

/// Open the file backing `stream`.
///
/// - `Stdin`: read-only; the file must exist and be readable.
/// - `Stdout`: write-only, created with mode `0644` if missing and
///   truncated to zero length if present, whether or not anything is
///   written afterwards.
pub fn open_target(stream: Stream, path: &Path) -> io::Result<File> {
    match stream {
        Stream::Stdin => File::open(path),
        Stream::Stdout => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(path),
    }
}

/// Open `path` and install it as this process's `stream`.
///
/// Returns the standard descriptor that now refers to the file.
pub fn apply(stream: Stream, path: &Path) -> io::Result<RawFd> {
    let file = open_target(stream, path)?;
    let target = stream.fd();
    if file.as_raw_fd() != target {
        dup2(file.as_raw_fd(), target).map_err(io::Error::from)?;
        drop(file);
    } else {
        // Already in the right slot: keep it open past this scope.
        let _ = file.into_raw_fd();
    }
    Ok(target)
}
