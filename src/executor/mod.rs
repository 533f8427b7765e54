//! Command execution module
//!
//! Provides subprocess execution with:
//! - Concurrent stdout/stderr draining
//! - Live pass-through or buffered capture of output
//! - Container engine and compose tool entry points

pub mod engine;
pub mod runner;

pub use engine::*;
pub use runner::*;
