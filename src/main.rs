use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use runconfig::config;
use runconfig::preflight::{self, CheckOptions, CheckStatus};

#[derive(Parser)]
#[command(name = "runconfig")]
#[command(version = "0.1.0")]
#[command(about = "Run-configuration loader and preflight checks for browser e2e suites", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Show {
        /// Path to a config file (default: runconfig.{yaml,yml,json} in the working directory)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Run preflight checks without executing any test
    Check {
        /// Path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Emit the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,

        /// Skip the dev server probe
        #[arg(long, default_value = "false")]
        skip_server: bool,

        /// Wait for the readiness URL of an already-running server
        #[arg(long, default_value = "false")]
        wait_server: bool,
    },

    /// Write a starter config file with the default values
    Init {
        /// Destination path
        #[arg(default_value = "runconfig.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value = "false")]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { config, format } => {
            let (loaded, source) = config::load_effective(config.as_deref())?;

            match &source {
                Some(path) => println!(
                    "{} Configuration from: {}",
                    "▶".green().bold(),
                    path.display().to_string().cyan()
                ),
                None => println!(
                    "{} Using built-in defaults (no config file found)",
                    "▶".green().bold()
                ),
            }

            let rendered = match format.as_str() {
                "yaml" => config::to_yaml_string(&loaded)?,
                "json" => config::to_json_string(&loaded)?,
                _ => anyhow::bail!("Unknown format: {}", format),
            };
            println!("{}", rendered);
        }

        Commands::Check {
            config,
            json,
            skip_server,
            wait_server,
        } => {
            let (loaded, source) = config::load_effective(config.as_deref())?;
            let options = CheckOptions {
                skip_server,
                wait_server,
            };
            let report = preflight::run_checks(&loaded, source.as_deref(), &options).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match &report.config_path {
                    Some(path) => println!("{} Checking: {}", "▶".green().bold(), path.cyan()),
                    None => println!("{} Checking built-in defaults", "▶".green().bold()),
                }

                for check in &report.checks {
                    match &check.status {
                        CheckStatus::Passed => match &check.detail {
                            Some(detail) => {
                                println!("  {} {}: {}", "✓".green(), check.name, detail)
                            }
                            None => println!("  {} {}", "✓".green(), check.name),
                        },
                        CheckStatus::Failed { error } => {
                            println!("  {} {}: {}", "✗".red().bold(), check.name, error.red())
                        }
                        CheckStatus::Skipped { reason } => {
                            println!("  {} {}: {}", "-".yellow(), check.name, reason.yellow())
                        }
                    }
                }

                if report.passed() {
                    println!("\n{} All checks passed", "✅".green().bold());
                }
            }

            if !report.passed() {
                anyhow::bail!("{} preflight check(s) failed", report.failures().len());
            }
        }

        Commands::Init { path, force } => {
            config::write_default_config(&path, force)?;
            println!(
                "{} Wrote {}",
                "✅".green().bold(),
                path.display().to_string().cyan()
            );
        }
    }

    Ok(())
}
