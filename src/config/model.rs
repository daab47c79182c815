// src/config/model.rs

use serde::Deserialize;

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// [shell]
/// prompt = "pipeshell> "
/// echo_parsed = false
///
/// [jobs]
/// max_jobs = 100
/// notify = true
///
/// [expand]
/// braces = true
/// wildcards = true
/// tilde = true
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub shell: ShellSection,

    #[serde(default)]
    pub jobs: JobsSection,

    #[serde(default)]
    pub expand: ExpandSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    shell: ShellSection,
    jobs: JobsSection,
    expand: ExpandSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        shell: ShellSection,
        jobs: JobsSection,
        expand: ExpandSection,
    ) -> Self {
        Self { shell, jobs, expand }
    }

    pub fn shell(&self) -> &ShellSection {
        &self.shell
    }

    pub fn jobs(&self) -> &JobsSection {
        &self.jobs
    }

    pub fn expand(&self) -> ExpandSection {
        self.expand
    }

    /// Replace the prompt (used for the `--prompt` CLI override).
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.shell.prompt = prompt.into();
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.shell, raw.jobs, raw.expand)
    }
}

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellSection {
    /// Text printed before each line is read.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Print the parsed pipeline (`in:`, `out:`, `seq[i]:`) before running it.
    #[serde(default)]
    pub echo_parsed: bool,
}

fn default_prompt() -> String {
    "pipeshell> ".to_string()
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            echo_parsed: false,
        }
    }
}

/// `[jobs]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsSection {
    /// Maximum number of background jobs tracked at once.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,

    /// Announce reclaimed background jobs.
    #[serde(default = "default_true")]
    pub notify: bool,
}

fn default_max_jobs() -> usize {
    100
}

fn default_true() -> bool {
    true
}

impl Default for JobsSection {
    fn default() -> Self {
        Self {
            max_jobs: default_max_jobs(),
            notify: true,
        }
    }
}

/// `[expand]` section: which argument expansions run before exec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExpandSection {
    #[serde(default = "default_true")]
    pub braces: bool,

    #[serde(default = "default_true")]
    pub wildcards: bool,

    #[serde(default = "default_true")]
    pub tilde: bool,
}

impl Default for ExpandSection {
    fn default() -> Self {
        Self {
            braces: true,
            wildcards: true,
            tilde: true,
        }
    }
}
