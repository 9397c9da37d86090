//! picmeta CLI - image metadata extraction.
//!
//! picmeta reads raster images and reports their file facts, structural
//! properties, dominant colours and decoded EXIF/GPS tags as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Analyze a single image
//! picmeta analyze photo.jpg
//!
//! # Analyze a directory
//! picmeta analyze ./photos/ --output results.jsonl --format jsonl
//!
//! # Human-readable key names
//! picmeta analyze photo.jpg --labels human
//!
//! # View configuration
//! picmeta config show
//!
//! # Guided menu
//! picmeta
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

mod cli;
mod logging;

/// picmeta - extract file facts, EXIF/GPS tags and dominant colours from images.
#[derive(Parser, Debug)]
#[command(name = "picmeta")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "PICMETA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract metadata from an image or a directory of images
    Analyze(cli::analyze::AnalyzeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(picmeta_core::Config::default_path);

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = if config_path.exists() {
        match picmeta_core::Config::load_from(&config_path) {
            Ok(config) => config,
            Err(e) if cli.config.is_none() => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `picmeta config path`."
                );
                picmeta_core::Config::default()
            }
            Err(e) => return Err(e.into()),
        }
    } else if cli.config.is_some() {
        anyhow::bail!("Config file not found: {}", config_path.display());
    } else {
        picmeta_core::Config::default()
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("picmeta v{}", picmeta_core::VERSION);

    match cli.command {
        Some(Commands::Analyze(args)) => {
            cli::analyze::execute(args, config).await?;
            Ok(())
        }
        Some(Commands::Config(args)) => cli::config::execute(args, &config, &config_path),
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(&config, &config_path).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "picmeta",
            "analyze",
            "photo.jpg",
            "--format",
            "jsonl",
            "--colors",
            "8",
            "--labels",
            "human",
            "--no-colors",
        ])
        .unwrap();

        let Some(Commands::Analyze(args)) = cli.command else {
            panic!("Expected analyze command");
        };
        assert_eq!(args.input, PathBuf::from("photo.jpg"));
        assert_eq!(args.format, Some(cli::analyze::OutputFormat::Jsonl));
        assert_eq!(args.colors, Some(8));
        assert_eq!(args.labels, Some(cli::analyze::Labels::Human));
        assert!(args.no_colors);
    }

    #[test]
    fn bare_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["picmeta", "--verbose"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}
