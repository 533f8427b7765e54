//! CLI command definitions using clap
//!
//! Defines all CLI subcommands and their arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Defaults;

/// Run docker and docker-compose commands with captured output.
///
/// Output is captured and only shown when the command fails, unless
/// `--stream` passes it through live.
#[derive(Parser, Debug)]
#[command(name = "dockrun")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (overrides default XDG paths)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// How failures are reported on stderr
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub error_format: ErrorFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a container engine command (docker by default)
    Docker(InvokeArgs),

    /// Run a compose tool command (docker-compose by default)
    Compose(InvokeArgs),

    /// Show which executables are configured and where they resolve
    Detect(DetectArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),
}

/// Arguments shared by the `docker` and `compose` subcommands
#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Working directory for the command (defaults to config, then cwd)
    #[arg(short = 'C', long = "dir")]
    pub working_dir: Option<String>,

    /// Print the command line before running it
    #[arg(short, long)]
    pub show_command: bool,

    /// Stream output live instead of capturing it
    #[arg(long, conflicts_with = "capture")]
    pub stream: bool,

    /// Capture output even if the config enables streaming
    #[arg(long)]
    pub capture: bool,

    /// Arguments passed verbatim to the executable
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl InvokeArgs {
    /// Whether to echo the command line, given config defaults
    pub fn show_command(&self, defaults: &Defaults) -> bool {
        self.show_command || defaults.show_command
    }

    /// Whether to pass output through, given config defaults
    pub fn pipe_stdout(&self, defaults: &Defaults) -> bool {
        if self.capture {
            false
        } else {
            self.stream || defaults.pipe_stdout
        }
    }
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON output
    Json,
    /// Plain text
    Plain,
}

/// Failure report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorFormat {
    /// Colored human-readable message
    Text,
    /// Serialized error info
    Json,
}

/// Arguments for the `detect` subcommand
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the `config` subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output format (plain prints TOML)
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_docker() {
        let cli = Cli::parse_from(["dockrun", "docker", "ps", "-a"]);
        if let Commands::Docker(args) = cli.command {
            assert_eq!(args.args, vec!["ps", "-a"]);
            assert!(args.working_dir.is_none());
            assert!(!args.show_command);
            assert!(!args.stream);
        } else {
            panic!("Expected Docker command");
        }
    }

    #[test]
    fn test_cli_parse_compose_with_flags() {
        let cli = Cli::parse_from([
            "dockrun", "compose", "-C", "/srv/app", "-s", "--stream", "up", "-d",
        ]);
        if let Commands::Compose(args) = cli.command {
            assert_eq!(args.working_dir, Some("/srv/app".to_string()));
            assert!(args.show_command);
            assert!(args.stream);
            assert_eq!(args.args, vec!["up", "-d"]);
        } else {
            panic!("Expected Compose command");
        }
    }

    #[test]
    fn test_cli_parse_after_double_dash() {
        let cli = Cli::parse_from(["dockrun", "docker", "--", "-c", "echo hi"]);
        if let Commands::Docker(args) = cli.command {
            assert_eq!(args.args, vec!["-c", "echo hi"]);
        } else {
            panic!("Expected Docker command");
        }
    }

    #[test]
    fn test_cli_requires_arguments() {
        assert!(Cli::try_parse_from(["dockrun", "docker"]).is_err());
    }

    #[test]
    fn test_cli_stream_conflicts_with_capture() {
        assert!(Cli::try_parse_from(["dockrun", "docker", "--stream", "--capture", "ps"]).is_err());
    }

    #[test]
    fn test_flags_merge_with_defaults() {
        let cli = Cli::parse_from(["dockrun", "docker", "ps"]);
        let Commands::Docker(args) = cli.command else {
            panic!("Expected Docker command");
        };

        let defaults = Defaults {
            show_command: true,
            pipe_stdout: true,
            ..Default::default()
        };
        assert!(args.show_command(&defaults));
        assert!(args.pipe_stdout(&defaults));
        assert!(!args.pipe_stdout(&Defaults::default()));
    }

    #[test]
    fn test_capture_overrides_default_stream() {
        let cli = Cli::parse_from(["dockrun", "compose", "--capture", "ps"]);
        let Commands::Compose(args) = cli.command else {
            panic!("Expected Compose command");
        };

        let defaults = Defaults {
            pipe_stdout: true,
            ..Default::default()
        };
        assert!(!args.pipe_stdout(&defaults));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "dockrun",
            "-v",
            "-c",
            "/etc/dockrun.toml",
            "--error-format",
            "json",
            "detect",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some("/etc/dockrun.toml".to_string()));
        assert_eq!(cli.error_format, ErrorFormat::Json);
        assert!(matches!(cli.command, Commands::Detect(_)));
    }

    #[test]
    fn test_cli_parse_config_json() {
        let cli = Cli::parse_from(["dockrun", "config", "-f", "json"]);
        if let Commands::Config(args) = cli.command {
            assert!(matches!(args.format, OutputFormat::Json));
        } else {
            panic!("Expected Config command");
        }
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }
}
