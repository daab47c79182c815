// src/errors.rs

//! Crate-wide error aliases and helpers.

use nix::errno::Errno;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Pipe or process creation failed; the interpreter cannot go on.
    #[error("{op}: {source}")]
    ResourceExhausted {
        op: &'static str,
        #[source]
        source: Errno,
    },

    /// An argument could not be handed to `exec` (e.g. interior NUL byte).
    #[error("cannot prepare arguments: {0}")]
    ExpansionFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShellError {
    /// Whether this error must terminate the whole interpreter.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::ResourceExhausted { .. })
    }
}

pub type Result<T> = std::result::Result<T, ShellError>;
