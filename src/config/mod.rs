// src/config/mod.rs

//! Configuration loading and validation for pipeshell.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate value ranges before the shell starts (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{DEFAULT_CONFIG_FILE, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ExpandSection, JobsSection, RawConfigFile, ShellSection};
