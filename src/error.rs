//! Error types for dockrun
//!
//! Every way a single invocation can fail is one variant of [`InvocationError`].
//! [`ErrorInfo`] is the serializable view used for machine-readable output.

use serde::Serialize;
use thiserror::Error;

use crate::executor::Stream;

/// Failure of one command invocation
#[derive(Error, Debug)]
pub enum InvocationError {
    /// No arguments were given; the first one is expected to be a subcommand
    #[error("No arguments given for {program}")]
    MissingArguments { program: String },

    /// The child process or its output pipes could not be created
    #[error("Failed to spawn command: {command}: {error}")]
    SpawnFailed { command: String, error: String },

    /// Reading one of the output streams failed after the process started
    #[error("Failed reading {stream} of {command}: {source}")]
    Stream {
        command: String,
        stream: Stream,
        #[source]
        source: std::io::Error,
    },

    /// The process ran to completion with a non-zero exit code
    #[error("{command}\nFailed [{exit_code}] {output}")]
    NonZeroExit {
        command: String,
        exit_code: i32,
        output: String,
    },

    /// Waiting for the process to terminate failed
    #[error("Failed waiting for {command}: {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the host output failed
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl InvocationError {
    /// Exit code of the child, only known for [`InvocationError::NonZeroExit`]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            InvocationError::NonZeroExit { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    /// Command line of the failed invocation, if one was formed
    pub fn command(&self) -> Option<&str> {
        match self {
            InvocationError::SpawnFailed { command, .. }
            | InvocationError::Stream { command, .. }
            | InvocationError::NonZeroExit { command, .. }
            | InvocationError::WaitFailed { command, .. } => Some(command),
            InvocationError::MissingArguments { .. } | InvocationError::Output(_) => None,
        }
    }

    /// Captured output, only present for a non-zero exit in capture mode
    pub fn output(&self) -> Option<&str> {
        match self {
            InvocationError::NonZeroExit { output, .. } => Some(output),
            _ => None,
        }
    }
}

/// Serializable error info for JSON output
#[derive(Debug, Serialize, Clone)]
pub struct ErrorInfo {
    pub message: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl From<&InvocationError> for ErrorInfo {
    fn from(err: &InvocationError) -> Self {
        match err {
            InvocationError::MissingArguments { program } => ErrorInfo {
                message: format!("No arguments given for {}", program),
                error_type: "missing_arguments".to_string(),
                command: None,
                suggestion: Some(format!("Pass a subcommand to {}, e.g. 'ps'", program)),
                exit_code: None,
                output: None,
            },
            InvocationError::SpawnFailed { command, error } => ErrorInfo {
                message: format!("Failed to spawn command: {}", command),
                error_type: "spawn_failed".to_string(),
                command: Some(command.clone()),
                suggestion: suggest_spawn_fix(command, error)
                    .or_else(|| Some(format!("Check if the command exists: {}", error))),
                exit_code: None,
                output: None,
            },
            InvocationError::Stream {
                command,
                stream,
                source,
            } => ErrorInfo {
                message: format!("Failed reading {}: {}", stream, source),
                error_type: "stream_io".to_string(),
                command: Some(command.clone()),
                suggestion: None,
                exit_code: None,
                output: None,
            },
            InvocationError::NonZeroExit {
                command,
                exit_code,
                output,
            } => ErrorInfo {
                message: format!("Command failed with exit code {}: {}", exit_code, command),
                error_type: "non_zero_exit".to_string(),
                command: Some(command.clone()),
                suggestion: suggest_fix(command, output),
                exit_code: Some(*exit_code),
                output: Some(output.clone()),
            },
            InvocationError::WaitFailed { command, source } => ErrorInfo {
                message: format!("Failed waiting for process: {}", source),
                error_type: "wait_failed".to_string(),
                command: Some(command.clone()),
                suggestion: None,
                exit_code: None,
                output: None,
            },
            InvocationError::Output(e) => ErrorInfo {
                message: format!("Output error: {}", e),
                error_type: "output_io".to_string(),
                command: None,
                suggestion: None,
                exit_code: None,
                output: None,
            },
        }
    }
}

/// Suggest fixes for a command that could not be started
///
/// Only meaningful for spawn errors: once the engine has run, a "not found"
/// in its output refers to images, manifests or container contents.
pub fn suggest_spawn_fix(command: &str, error: &str) -> Option<String> {
    if error.contains("No such file or directory") || error.contains("not found") {
        let hint = if command.starts_with("docker-compose") {
            "'docker-compose' not found. Install it or point engine.compose at another executable."
        } else if command.starts_with("docker") {
            "'docker' not found. Install Docker and check PATH."
        } else {
            "Executable not found. Check PATH and the working directory."
        };
        return Some(hint.to_string());
    }

    if error.contains("Permission denied") {
        return Some("Executable is not runnable. Check its permissions.".to_string());
    }

    None
}

/// Suggest fixes for common container engine failures, based on their output
pub fn suggest_fix(command: &str, output: &str) -> Option<String> {
    if output.contains("Cannot connect to the Docker daemon")
        || output.contains("Is the docker daemon running")
    {
        return Some(
            "Docker daemon is not running. Start Docker Desktop or the Docker service."
                .to_string(),
        );
    }

    if output.contains("No such container") {
        return Some(
            "Container not found. Try running 'up' first to start the services.".to_string(),
        );
    }

    if output.contains("port is already allocated") || output.contains("address already in use")
    {
        return Some(
            "Port conflict. Stop the conflicting service or use a different port.".to_string(),
        );
    }

    if output.contains("permission denied") || output.contains("Permission denied") {
        if output.contains("docker.sock") {
            return Some(
                "Cannot access the Docker socket. Add your user to the 'docker' group."
                    .to_string(),
            );
        }
        return Some(
            "Permission denied. Check file permissions or run with appropriate access.".to_string(),
        );
    }

    if output.contains("no configuration file provided")
        || output.contains("Can't find a suitable configuration file")
    {
        return Some(
            "No compose file found. Check the working directory or pass -f <file>.".to_string(),
        );
    }

    None
}
