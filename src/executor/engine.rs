//! Container engine and compose tool entry points
//!
//! The two entry points differ only in the executable they run. Executable
//! names come from [`EngineConfig`], so `docker` can be swapped for `podman`
//! or `docker-compose` for any compatible tool.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::runner::{run, Invocation};
use crate::config::{Config, EngineConfig};
use crate::error::InvocationError;

/// Which tool an invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Container engine (`docker`)
    Docker,
    /// Compose tool (`docker-compose`)
    Compose,
}

impl Engine {
    /// Executable used when nothing is configured
    pub fn default_program(&self) -> &'static str {
        match self {
            Engine::Docker => "docker",
            Engine::Compose => "docker-compose",
        }
    }

    /// All engines, in display order
    pub fn all() -> [Engine; 2] {
        [Engine::Docker, Engine::Compose]
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Docker => write!(f, "docker"),
            Engine::Compose => write!(f, "compose"),
        }
    }
}

/// Runs engine commands with configured executable names
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    engines: EngineConfig,
}

impl CommandRunner {
    /// Create a runner using the default executables
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner from loaded configuration
    pub fn with_config(config: &Config) -> Self {
        Self {
            engines: config.engine.clone(),
        }
    }

    /// Override the executable for one engine
    pub fn with_program(mut self, engine: Engine, program: impl Into<String>) -> Self {
        match engine {
            Engine::Docker => self.engines.docker = program.into(),
            Engine::Compose => self.engines.compose = program.into(),
        }
        self
    }

    /// Executable this runner uses for `engine`
    pub fn program(&self, engine: Engine) -> &str {
        self.engines.program(engine)
    }

    /// Build the invocation for `engine` without running it
    pub fn invocation<I, S>(
        &self,
        engine: Engine,
        working_dir: impl AsRef<Path>,
        show_command: bool,
        pipe_stdout: bool,
        args: I,
    ) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Invocation::new(self.program(engine), args)
            .in_dir(working_dir)
            .with_show_command(show_command)
            .with_pipe_stdout(pipe_stdout)
    }

    /// Run a command against `engine`
    pub async fn run<I, S>(
        &self,
        engine: Engine,
        working_dir: impl AsRef<Path>,
        show_command: bool,
        pipe_stdout: bool,
        args: I,
    ) -> Result<(), InvocationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = self.invocation(engine, working_dir, show_command, pipe_stdout, args);
        run(&invocation).await
    }

    /// Run a container engine command
    pub async fn docker<I, S>(
        &self,
        working_dir: impl AsRef<Path>,
        show_command: bool,
        pipe_stdout: bool,
        args: I,
    ) -> Result<(), InvocationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Engine::Docker, working_dir, show_command, pipe_stdout, args)
            .await
    }

    /// Run a compose tool command
    pub async fn compose<I, S>(
        &self,
        working_dir: impl AsRef<Path>,
        show_command: bool,
        pipe_stdout: bool,
        args: I,
    ) -> Result<(), InvocationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run(Engine::Compose, working_dir, show_command, pipe_stdout, args)
            .await
    }
}

/// Run `docker` with `args` in `working_dir`
pub async fn run_docker_command<I, S>(
    working_dir: impl AsRef<Path>,
    show_command: bool,
    pipe_stdout: bool,
    args: I,
) -> Result<(), InvocationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandRunner::new()
        .docker(working_dir, show_command, pipe_stdout, args)
        .await
}

/// Run `docker-compose` with `args` in `working_dir`
pub async fn run_compose_command<I, S>(
    working_dir: impl AsRef<Path>,
    show_command: bool,
    pipe_stdout: bool,
    args: I,
) -> Result<(), InvocationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    CommandRunner::new()
        .compose(working_dir, show_command, pipe_stdout, args)
        .await
}
