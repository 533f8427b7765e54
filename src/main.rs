//! dockrun CLI entry point
//!
//! Usage:
//!   dockrun docker [-C DIR] [-s] [--stream] ARGS...    Run a docker command
//!   dockrun compose [-C DIR] [-s] [--stream] ARGS...   Run a docker-compose command
//!   dockrun detect                                     Show resolved executables
//!   dockrun config                                     Show configuration

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use dockrun::cli::commands::{ConfigArgs, DetectArgs, ErrorFormat, InvokeArgs, OutputFormat};
use dockrun::cli::{Cli, Commands};
use dockrun::config::{find_config_files, load_config, Config};
use dockrun::error::{ErrorInfo, InvocationError};
use dockrun::executor::{CommandRunner, Engine};
use dockrun::logging::init_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_json) {
        eprintln!("{}: {:#}", "warning".yellow().bold(), e);
    }

    let error_format = cli.error_format;

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, error_format);
            ExitCode::from(exit_status(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Docker(args) => {
            run_engine(Engine::Docker, args, &config).await?;
        }
        Commands::Compose(args) => {
            run_engine(Engine::Compose, args, &config).await?;
        }
        Commands::Detect(args) => {
            detect_engines(args, &config)?;
        }
        Commands::Config(args) => {
            show_config(args, &config)?;
        }
    }

    Ok(())
}

/// Run one engine command with config defaults applied
async fn run_engine(engine: Engine, args: InvokeArgs, config: &Config) -> Result<()> {
    let working_dir = config
        .defaults
        .resolve_working_dir(args.working_dir.as_deref())?;

    let runner = CommandRunner::with_config(config);
    runner
        .run(
            engine,
            &working_dir,
            args.show_command(&config.defaults),
            args.pipe_stdout(&config.defaults),
            &args.args,
        )
        .await?;

    Ok(())
}

/// Show which executables are configured and where they resolve on PATH
fn detect_engines(args: DetectArgs, config: &Config) -> Result<()> {
    let found: Vec<(Engine, &str, Option<std::path::PathBuf>)> = Engine::all()
        .into_iter()
        .map(|engine| {
            let program = config.engine.program(engine);
            (engine, program, which::which(program).ok())
        })
        .collect();

    match args.format {
        OutputFormat::Json => {
            let entries: Vec<_> = found
                .iter()
                .map(|(engine, program, path)| {
                    serde_json::json!({
                        "engine": engine,
                        "program": program,
                        "path": path,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Plain => {
            for (engine, _, path) in &found {
                if let Some(path) = path {
                    println!("{}={}", engine, path.display());
                }
            }
        }
        OutputFormat::Table => {
            for (engine, program, path) in &found {
                match path {
                    Some(path) => println!(
                        "  {:8} {} ({})",
                        engine.to_string().cyan(),
                        program,
                        path.display().to_string().green()
                    ),
                    None => println!(
                        "  {:8} {} ({})",
                        engine.to_string().cyan(),
                        program,
                        "not found".yellow()
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Show the resolved configuration
fn show_config(args: ConfigArgs, config: &Config) -> Result<()> {
    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "config": config,
                "files": find_config_files(),
            }))?;
            println!("{}", json);
        }
        OutputFormat::Plain => {
            let text = toml::to_string_pretty(config).context("Failed to render config as TOML")?;
            print!("{}", text);
        }
        OutputFormat::Table => {
            println!("{}: {}", "Docker".cyan(), config.engine.docker);
            println!("{}: {}", "Compose".cyan(), config.engine.compose);
            println!("{}: {}", "Show command".cyan(), config.defaults.show_command);
            println!("{}: {}", "Stream output".cyan(), config.defaults.pipe_stdout);
            let dir = if config.defaults.working_dir.is_empty() {
                "(current directory)"
            } else {
                config.defaults.working_dir.as_str()
            };
            println!("{}: {}", "Working dir".cyan(), dir);

            let files = find_config_files();
            println!();
            println!("{}:", "Config files".cyan());
            if files.is_empty() {
                println!("  None");
            } else {
                for file in &files {
                    println!("  - {}", file.display());
                }
            }
        }
    }

    Ok(())
}

/// Print a failure on stderr in the requested format
fn report_error(err: &anyhow::Error, format: ErrorFormat) {
    let invocation_err = err.downcast_ref::<InvocationError>();

    match (format, invocation_err) {
        (ErrorFormat::Json, Some(e)) => {
            let info = ErrorInfo::from(e);
            match serde_json::to_string_pretty(&info) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}: {:#}", "error".red().bold(), err),
            }
        }
        (ErrorFormat::Json, None) => {
            let json = serde_json::json!({
                "message": format!("{:#}", err),
                "error_type": "error",
            });
            eprintln!("{}", json);
        }
        (ErrorFormat::Text, Some(e)) => {
            let info = ErrorInfo::from(e);
            eprintln!("{}: {}", "error".red().bold(), info.message);
            if let Some(output) = info.output.as_deref().filter(|o| !o.is_empty()) {
                eprint!("{}", output);
                if !output.ends_with('\n') {
                    eprintln!();
                }
            }
            if let Some(suggestion) = info.suggestion {
                eprintln!("{}: {}", "hint".yellow(), suggestion);
            }
        }
        (ErrorFormat::Text, None) => {
            eprintln!("{}: {:#}", "error".red().bold(), err);
        }
    }
}

/// Process exit status for a failure
///
/// A non-zero child exit code is passed through; everything else is 1.
fn exit_status(err: &anyhow::Error) -> u8 {
    match err
        .downcast_ref::<InvocationError>()
        .and_then(InvocationError::exit_code)
    {
        Some(code) if (1..=255).contains(&code) => code as u8,
        _ => 1,
    }
}
