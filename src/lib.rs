//! dockrun - container engine and compose command runner
//!
//! Runs `docker` and `docker-compose` invocations as subprocesses, drains
//! their stdout and stderr concurrently, and returns a single pass/fail
//! result:
//!
//! - **Capture mode** - output is buffered and only surfaced in the error
//!   when the command exits non-zero
//! - **Pass-through mode** - output is written to the host's stdout as it
//!   arrives and nothing is retained
//!
//! ```no_run
//! # async fn demo() -> Result<(), dockrun::InvocationError> {
//! dockrun::run_compose_command("/srv/stack", true, false, ["up", "-d"]).await?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{ErrorInfo, InvocationError};
pub use executor::{
    run, run_compose_command, run_docker_command, run_sync, run_with_output, CommandRunner,
    Engine, Invocation, Stream,
};
