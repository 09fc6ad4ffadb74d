//! querycache CLI - inspect configuration and exercise the cache engine.

mod commands;
mod error;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use querycache::ConfigFile;

use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "querycache", version = querycache::VERSION, about = "Namespaced query cache diagnostics")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.querycache/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config,

    /// Write a configuration file with default settings
    Init,

    /// Run a put/get/remove/clear round against the configured engine
    Probe {
        /// Namespace the probe adapter is bound to
        #[arg(long, default_value = "orders")]
        namespace: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let path = match cli.config {
        Some(path) => path,
        None => ConfigFile::default_path()?,
    };

    match cli.command {
        Commands::Config => commands::config::run(&path),
        Commands::Init => commands::init::run(&path),
        Commands::Probe { namespace, json } => commands::probe::run(&path, &namespace, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_probe_defaults() {
        let cli = Cli::try_parse_from(["querycache", "probe"]).unwrap();
        match cli.command {
            Commands::Probe { namespace, json } => {
                assert_eq!(namespace, "orders");
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["querycache", "config", "-v", "--config", "/tmp/qc.ini"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/qc.ini")));
    }
}
