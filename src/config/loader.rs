//! Configuration loader with XDG-compliant path resolution
//!
//! Loads configuration from multiple locations with layered priority:
//! 1. `/etc/dockrun/config.toml` (lowest priority)
//! 2. `~/.config/dockrun/config.toml`
//! 3. `~/.dockrun.toml`
//! 4. `./.dockrun.toml` (highest priority)

use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use super::model::Config;

/// Application name used for XDG directories
const APP_NAME: &str = "dockrun";

/// Prefix for environment variable overrides
const ENV_PREFIX: &str = "DOCKRUN_";

/// Get XDG config search paths in priority order (lowest to highest)
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from(format!("/etc/{}/config.toml", APP_NAME)));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_NAME).join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{}.toml", APP_NAME)));
    }

    paths.push(PathBuf::from(format!(".{}.toml", APP_NAME)));

    paths
}

/// Load configuration with XDG layering
///
/// Later files override earlier ones. An explicit `override_path` sits
/// above all of them, and environment variables prefixed with `DOCKRUN_`
/// override everything. Nested keys are separated by `__`, so
/// `DOCKRUN_ENGINE__DOCKER=podman` maps to `engine.docker`.
pub fn load_config(override_path: Option<&str>) -> Result<Config> {
    let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

    for path in config_paths() {
        if path.exists() {
            tracing::debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }
    }

    if let Some(path) = override_path {
        let path = PathBuf::from(path);
        if path.exists() {
            tracing::debug!("Loading override config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        } else {
            tracing::warn!("Override config not found: {}", path.display());
        }
    }

    // DOCKRUN_LOG configures logging, not the config tree
    figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["LOG"]).split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Find all existing config files (for debugging/introspection)
pub fn find_config_files() -> Vec<PathBuf> {
    config_paths().into_iter().filter(|p| p.exists()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_paths_returns_expected_paths() {
        let paths = config_paths();

        assert!(paths.len() >= 2);
        assert!(paths[0].to_string_lossy().contains("/etc/"));
        assert!(paths
            .last()
            .unwrap()
            .to_string_lossy()
            .contains(".dockrun.toml"));
    }

    #[test]
    fn test_load_config_from_override() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("test-config.toml");

        fs::write(
            &config_path,
            r#"
            [engine]
            docker = "podman"
            compose = "podman-compose"

            [defaults]
            show_command = true
            working_dir = "/srv/stack"
            "#,
        )
        .unwrap();

        let config = load_config(Some(config_path.to_str().unwrap())).unwrap();

        assert_eq!(config.engine.docker, "podman");
        assert_eq!(config.engine.compose, "podman-compose");
        assert!(config.defaults.show_command);
        assert_eq!(config.defaults.working_dir, "/srv/stack");
    }

    #[test]
    fn test_missing_override_file_uses_defaults() {
        let config = load_config(Some("/nonexistent/dockrun.toml")).unwrap();
        assert_eq!(config.engine.compose, "docker-compose");
    }

    #[test]
    fn test_invalid_override_file_fails() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("broken.toml");
        fs::write(&config_path, "[defaults]\nshow_command = \"maybe\"\n").unwrap();

        assert!(load_config(Some(config_path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_env_override() {
        // Only this test sets pipe_stdout through the environment
        std::env::set_var("DOCKRUN_DEFAULTS__PIPE_STDOUT", "true");

        let config = load_config(None).unwrap();

        std::env::remove_var("DOCKRUN_DEFAULTS__PIPE_STDOUT");

        assert!(config.defaults.pipe_stdout);
    }

    #[test]
    fn test_find_config_files_does_not_panic() {
        let _files = find_config_files();
    }
}
