//! Configuration module for dockrun
//!
//! Provides XDG-compliant layered configuration loading for engine
//! executables and default invocation flags.

pub mod loader;
pub mod model;

pub use loader::{config_paths, find_config_files, load_config};
pub use model::*;
