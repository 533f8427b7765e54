//! Configuration model for dockrun
//!
//! Defines the structure for XDG-compliant layered configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::executor::Engine;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Executables for each engine
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default invocation flags
    #[serde(default)]
    pub defaults: Defaults,
}

/// Executable names for the container engine and compose tool
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Container engine executable
    #[serde(default = "default_docker")]
    pub docker: String,

    /// Compose tool executable
    #[serde(default = "default_compose")]
    pub compose: String,
}

fn default_docker() -> String {
    Engine::Docker.default_program().to_string()
}

fn default_compose() -> String {
    Engine::Compose.default_program().to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            docker: default_docker(),
            compose: default_compose(),
        }
    }
}

impl EngineConfig {
    /// Executable configured for `engine`
    pub fn program(&self, engine: Engine) -> &str {
        match engine {
            Engine::Docker => &self.docker,
            Engine::Compose => &self.compose,
        }
    }
}

/// Default flags applied when the command line doesn't set them
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Defaults {
    /// Echo the command line before running
    #[serde(default)]
    pub show_command: bool,

    /// Stream output live instead of capturing it
    #[serde(default)]
    pub pipe_stdout: bool,

    /// Working directory; empty means the current directory.
    /// `~` and `$VAR` references are expanded.
    #[serde(default)]
    pub working_dir: String,
}

impl Defaults {
    /// Resolve the working directory, preferring `override_dir`
    ///
    /// Returns an empty path when neither is set, which keeps the caller's
    /// current directory.
    pub fn resolve_working_dir(&self, override_dir: Option<&str>) -> Result<PathBuf> {
        let raw = override_dir.unwrap_or(&self.working_dir);
        if raw.is_empty() {
            return Ok(PathBuf::new());
        }

        let expanded = shellexpand::full(raw)
            .with_context(|| format!("Failed to expand working directory '{}'", raw))?;
        Ok(PathBuf::from(expanded.as_ref()))
    }
}
