// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, ShellError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ShellError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.shell, raw.jobs, raw.expand))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_shell(cfg)?;
    validate_jobs(cfg)?;
    Ok(())
}

fn validate_shell(cfg: &RawConfigFile) -> Result<()> {
    if cfg.shell.prompt.is_empty() {
        return Err(ShellError::ConfigError(
            "[shell].prompt must not be empty".to_string(),
        ));
    }
    if cfg.shell.prompt.contains('\n') {
        return Err(ShellError::ConfigError(
            "[shell].prompt must be a single line".to_string(),
        ));
    }
    Ok(())
}

fn validate_jobs(cfg: &RawConfigFile) -> Result<()> {
    if cfg.jobs.max_jobs == 0 {
        return Err(ShellError::ConfigError(
            "[jobs].max_jobs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
