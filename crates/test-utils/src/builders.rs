#![allow(dead_code)]

use std::path::PathBuf;

use pipeshell::config::{ConfigFile, RawConfigFile};
use pipeshell::types::{PipelineSpec, StageSpec};

/// Builder for `PipelineSpec` to simplify test setup.
///
/// ```ignore
/// let spec = PipelineBuilder::new()
///     .stage(["printf", "a b\n"])
///     .stage(["cut", "-d", " ", "-f2"])
///     .output(&out)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    spec: PipelineSpec,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.stages.push(StageSpec::new(argv));
        self
    }

    /// Append `count` copies of the same stage.
    pub fn repeat(mut self, count: usize, argv: &[&str]) -> Self {
        for _ in 0..count {
            self.spec.stages.push(StageSpec::new(argv.iter().copied()));
        }
        self
    }

    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.input = Some(path.into());
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.spec.output = Some(path.into());
        self
    }

    pub fn background(mut self) -> Self {
        self.spec.background = true;
        self
    }

    pub fn build(self) -> PipelineSpec {
        self.spec
    }
}

/// Builder for `ConfigFile`.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.config.shell.prompt = prompt.to_string();
        self
    }

    pub fn echo_parsed(mut self, val: bool) -> Self {
        self.config.shell.echo_parsed = val;
        self
    }

    pub fn max_jobs(mut self, max: usize) -> Self {
        self.config.jobs.max_jobs = max;
        self
    }

    pub fn notify(mut self, val: bool) -> Self {
        self.config.jobs.notify = val;
        self
    }

    pub fn wildcards(mut self, val: bool) -> Self {
        self.config.expand.wildcards = val;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
