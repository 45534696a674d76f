//! Run the colony over a generated grid.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pheromesh_core::grid::square_grid;
use pheromesh_runtime::prelude::*;
use std::path::PathBuf;

use crate::config::{Config, OutputFormat};

/// Flags for `pheromesh run`. Anything left unset comes from the config
/// file, then from defaults.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Ants released per round
    #[arg(short, long)]
    pub ants: Option<usize>,

    /// Pheromone each arriving ant lays per edge
    #[arg(long)]
    pub deposit: Option<f64>,

    /// Number of rounds
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Pheromone removed from every edge after each round
    #[arg(long)]
    pub decay: Option<f64>,

    /// Grid side length
    #[arg(short, long)]
    pub dimension: Option<u32>,

    /// Home node id
    #[arg(long)]
    pub start: Option<u32>,

    /// Goal node id (default: far corner)
    #[arg(long)]
    pub goal: Option<u32>,

    /// Seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Withdraw ants after visiting this many nodes
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Give up on a round after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Report format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file (default: pheromesh.toml in this or a parent directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// Overlay the flags onto `config`.
    fn apply(&self, config: &mut Config) {
        let colony = &mut config.colony;
        if let Some(ants) = self.ants {
            colony.ant_count = ants;
        }
        if let Some(deposit) = self.deposit {
            colony.deposit = deposit;
        }
        if let Some(iterations) = self.iterations {
            colony.iterations = iterations;
        }
        if self.seed.is_some() {
            colony.seed = self.seed;
        }
        if self.max_steps.is_some() {
            colony.max_steps = self.max_steps;
        }
        if self.timeout_ms.is_some() {
            colony.round_timeout_ms = self.timeout_ms;
        }

        let grid = &mut config.grid;
        if let Some(dimension) = self.dimension {
            grid.dimension = dimension;
            // A goal from the file belongs to the file's grid size.
            if self.goal.is_none() {
                grid.goal = None;
            }
        }
        if let Some(start) = self.start {
            grid.home = start;
        }
        if self.goal.is_some() {
            grid.goal = self.goal;
        }
        if let Some(decay) = self.decay {
            grid.decay_factor = decay;
        }

        if let Some(format) = self.format {
            config.output.format = format;
        }
        if self.output.is_some() {
            config.output.path = self.output.clone();
        }
    }
}

pub async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);

    let options = config.grid.to_options();
    let spec = square_grid(&options).context("Invalid grid")?;
    let iterations = config.colony.iterations;
    let mut colony =
        Colony::new(&spec, config.colony.clone()).context("Failed to start colony")?;

    eprintln!(
        "{} Running {} ants for {} rounds on a {}x{} grid ({} -> {})...",
        "→".blue(),
        config.colony.ant_count.to_string().cyan(),
        iterations.to_string().cyan(),
        options.dimension,
        options.dimension,
        options.home,
        options.goal
    );

    let pb = ProgressBar::new(iterations);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rounds")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let summary = colony
        .run_with_callback(iterations, |report| {
            if verbose {
                pb.println(format!(
                    "  round {}: {} arrived, {} withdrawn, mean path {:.1}",
                    report.round, report.arrived, report.withdrawn, report.mean_unlooped_len
                ));
            }
            pb.inc(1);
            true
        })
        .await;
    pb.finish_and_clear();
    let summary = summary.context("Colony run failed")?;

    let rendered = match config.output.format {
        OutputFormat::Text => render_text(&summary, colony.graph()),
        OutputFormat::Json => export::to_json(colony.graph())?,
        OutputFormat::Dot => export::to_dot(colony.graph()),
    };

    match &config.output.path {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", rendered),
    }

    colony.shutdown().await;
    Ok(())
}

/// Human-readable summary: run totals, best path and strongest edges.
fn render_text(summary: &RunSummary, graph: &Graph) -> String {
    let report = edge_report(&graph.snapshot());
    let stats = &report.stats;
    let mut out = String::new();

    out.push_str(&format!("{} Run complete!\n", "✓".green().bold()));
    out.push_str(&format!(
        "  Rounds: {}  arrived: {}  withdrawn: {}\n",
        summary.rounds().to_string().cyan(),
        summary.total_arrived().to_string().green(),
        summary.total_withdrawn().to_string().yellow()
    ));
    if let Some(best) = summary.shortest_unlooped() {
        let path: Vec<String> = best.iter().map(|n| n.to_string()).collect();
        out.push_str(&format!(
            "  Shortest path ({} nodes): {}\n",
            best.len(),
            path.join(" -> ").cyan()
        ));
    }
    out.push_str(&format!(
        "  Pheromone: total {:.2}, mean {:.2}, median {:.2}, max {:.2}\n\n",
        stats.total, stats.mean, stats.median, stats.max
    ));

    out.push_str(&format!("{}\n", "Strongest edges".bold()));
    for edge in report.edges.iter().take(10) {
        out.push_str(&format!(
            "  {:>4} -> {:<4} {:>10.3}\n",
            edge.start.as_u32(),
            edge.end.as_u32(),
            edge.pheromone
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let mut config = Config::default();
        config.colony.ant_count = 40;
        config.grid.goal = Some(15);
        config.grid.dimension = 4;

        let args = RunArgs {
            ants: Some(5),
            dimension: Some(3),
            decay: Some(0.1),
            seed: Some(8),
            format: Some(OutputFormat::Json),
            ..Default::default()
        };
        args.apply(&mut config);

        assert_eq!(config.colony.ant_count, 5);
        assert_eq!(config.colony.seed, Some(8));
        assert_eq!(config.grid.dimension, 3);
        // The file's goal was for a 4x4 grid.
        assert_eq!(config.grid.goal, None);
        assert_eq!(config.grid.to_options().goal, 8);
        assert_eq!(config.grid.decay_factor, 0.1);
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn unset_flags_keep_file_values() {
        let mut config = Config::default();
        config.colony.iterations = 12;
        config.grid.goal = Some(30);
        RunArgs::default().apply(&mut config);
        assert_eq!(config.colony.iterations, 12);
        assert_eq!(config.grid.goal, Some(30));
    }

    #[tokio::test]
    async fn run_writes_dot_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("mesh.dot");
        // Explicit config so no pheromesh.toml from a parent directory leaks in.
        let config_path = dir.path().join("pheromesh.toml");
        Config::default().save(&config_path).unwrap();

        let args = RunArgs {
            ants: Some(4),
            iterations: Some(3),
            dimension: Some(3),
            seed: Some(1),
            format: Some(OutputFormat::Dot),
            output: Some(output.clone()),
            config: Some(config_path),
            ..Default::default()
        };
        run(args, false).await.unwrap();

        let dot = std::fs::read_to_string(&output).unwrap();
        assert!(dot.contains("0: HOME"));
        assert!(dot.contains("8: GOAL"));
    }

    /// Drop colour escapes, whether or not colouring is on for this process.
    fn strip_ansi(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                // CSI sequences end at their first letter.
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[tokio::test]
    async fn oversized_grid_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pheromesh.toml");
        Config::default().save(&config_path).unwrap();

        let args = RunArgs {
            dimension: Some(70_000),
            config: Some(config_path),
            ..Default::default()
        };
        let err = run(args, false).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid grid"));
    }

    #[tokio::test]
    async fn text_report_names_the_best_path() {
        let spec = square_grid(&pheromesh_core::grid::GridOptions::new(3)).unwrap();
        let mut colony = Colony::new(&spec, ColonyConfig::default().with_ant_count(3).with_seed(4))
            .unwrap();
        let summary = colony.run(2).await.unwrap();

        let text = strip_ansi(&render_text(&summary, colony.graph()));
        assert!(text.contains("Rounds: 2"));
        assert!(text.contains("Shortest path"));
        assert!(text.contains("Strongest edges"));
    }
}
