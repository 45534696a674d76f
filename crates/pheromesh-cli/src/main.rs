//! Pheromesh CLI - run ant colonies over generated grids.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "pheromesh")]
#[command(author, version, about = "Pheromesh - ant colony shortest paths on an actor mesh", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default pheromesh.toml
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Run the colony and report pheromone levels
    Run(commands::run::RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::run::run(args, cli.verbose))
        }
    }
}

/// Logs go to stderr so reports on stdout stay clean.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_flags() {
        let cli = Cli::try_parse_from([
            "pheromesh", "-v", "run", "--ants", "8", "--dimension", "4", "--goal", "12",
            "--seed", "3", "--format", "dot",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.ants, Some(8));
        assert_eq!(args.dimension, Some(4));
        assert_eq!(args.goal, Some(12));
        assert_eq!(args.seed, Some(3));
        assert_eq!(args.format, Some(OutputFormat::Dot));
        assert_eq!(args.iterations, None);
    }

    #[test]
    fn parses_init() {
        let cli = Cli::try_parse_from(["pheromesh", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Commands::Init { path: None, force: true }));
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["pheromesh", "run", "--format", "svg"]).is_err());
    }
}
