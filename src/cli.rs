// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pipeshell`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pipeshell",
    version,
    about = "A small interactive shell: pipelines, redirections and background jobs.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `pipeshell.toml` in the current working directory, if it
    /// exists; built-in defaults otherwise.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PIPESHELL_LOG` or `warn` is used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Override the prompt from the config file.
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Run the given lines (newline separated) instead of reading stdin.
    #[arg(short = 'c', long, value_name = "LINES")]
    pub command: Option<String>,

    /// Parse and print each line, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["pipeshell"]).unwrap();
        assert_eq!(args.config, None);
        assert_eq!(args.log_level, None);
        assert!(!args.dry_run);
    }

    #[test]
    fn command_and_level() {
        let args = CliArgs::try_parse_from([
            "pipeshell",
            "-c",
            "echo hi",
            "--log-level",
            "debug",
            "--config",
            "x.toml",
        ])
        .unwrap();
        assert_eq!(args.command.as_deref(), Some("echo hi"));
        assert_eq!(args.log_level, Some(LogLevel::Debug));
        assert_eq!(args.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn rejects_unknown_level() {
        assert!(CliArgs::try_parse_from(["pipeshell", "--log-level", "loud"]).is_err());
    }
}
