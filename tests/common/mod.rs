//! Common test utilities for dockrun tests

#![allow(dead_code)]

use std::path::PathBuf;

use dockrun::{CommandRunner, Engine, Invocation};
use tempfile::TempDir;

/// Invocation of `sh -c <script>`
pub fn sh(script: &str) -> Invocation {
    Invocation::new("sh", ["-c", script])
}

/// Runner whose docker and compose executables are both `sh`
pub fn sh_runner() -> CommandRunner {
    CommandRunner::new()
        .with_program(Engine::Docker, "sh")
        .with_program(Engine::Compose, "sh")
}

/// Creates a temporary directory containing a compose file
pub fn create_compose_project(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("docker-compose.yml"), content)
        .expect("Failed to write docker-compose.yml");
    let path = dir.path().to_path_buf();
    (dir, path)
}

/// Lines of `text` that start with `prefix`, in order
pub fn lines_with_prefix<'a>(text: &'a str, prefix: &str) -> Vec<&'a str> {
    text.lines().filter(|l| l.starts_with(prefix)).collect()
}

/// Sample compose file for testing
pub const SAMPLE_COMPOSE: &str = r#"
services:
  web:
    image: nginx:alpine
    ports:
      - "8080:80"
"#;

/// Script writing alternately to stdout and stderr
pub const ALTERNATING_SCRIPT: &str = r#"
for i in 1 2 3 4 5 6 7 8 9 10; do
    echo "out$i"
    echo "err$i" >&2
done
exit 7
"#;
