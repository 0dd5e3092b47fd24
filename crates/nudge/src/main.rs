// SPDX-FileCopyrightText: 2026 Nudge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! nudge - push notification extension driver.
//!
//! Runs the notification pipeline once per invocation against the configured
//! SQLite credential store and chat database.

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nudge - decode chat pushes into notification content.
#[derive(Parser, Debug)]
#[command(name = "nudge", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Process one push request and print the delivered content as JSON.
    Process {
        /// Read the request from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Print the current badge count.
    Badge {
        /// Count this thread as unread too.
        #[arg(long)]
        thread: Option<String>,
    },
    /// List active accounts, one per line.
    Accounts,
    /// Print the effective configuration as TOML.
    Config,
    /// Check configuration and database access.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => nudge_config::load_and_validate_path(path),
        None => nudge_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            nudge_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.extension.log_level);

    let result = match cli.command {
        Some(Commands::Process { input, pretty }) => {
            commands::process(&config, input.as_deref(), pretty).await
        }
        Some(Commands::Badge { thread }) => commands::badge(&config, thread.as_deref()).await,
        Some(Commands::Accounts) => commands::accounts(&config).await,
        Some(Commands::Config) => commands::print_config(&config),
        Some(Commands::Doctor { plain }) => match doctor::run_doctor(&config, plain).await {
            Ok(0) => Ok(()),
            Ok(_) => std::process::exit(2),
            Err(e) => Err(e),
        },
        None => {
            println!("nudge: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nudge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_process_with_input() {
        let cli = Cli::try_parse_from(["nudge", "--config", "x.toml", "process", "--input", "push.json"])
            .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("x.toml")));
        match cli.command {
            Some(Commands::Process { input, pretty }) => {
                assert_eq!(input.as_deref(), Some(std::path::Path::new("push.json")));
                assert!(!pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_badge_thread() {
        let cli = Cli::try_parse_from(["nudge", "badge", "--thread", "account=a@b.c|sender=d@e.f"])
            .unwrap();
        assert!(matches!(cli.command, Some(Commands::Badge { thread: Some(_) })));
    }

    #[test]
    fn default_config_is_valid() {
        let config = nudge_config::load_and_validate_str("").expect("defaults should validate");
        assert_eq!(config.extension.category, "MESSAGE");
    }
}
