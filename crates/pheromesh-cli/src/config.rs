//! Configuration management for the Pheromesh CLI.
//!
//! `pheromesh.toml` has three sections: `[colony]` (run parameters),
//! `[grid]` (the generated graph) and `[output]` (report format).
//! Flags given on the command line override file values.

use anyhow::{Context, Result};
use pheromesh_core::grid::GridOptions;
use pheromesh_runtime::config::ColonyConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pheromesh.toml";

/// Pheromesh project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub colony: ColonyConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_dimension")]
    pub dimension: u32,
    #[serde(default)]
    pub home: u32,
    /// Defaults to the far corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<u32>,
    #[serde(default = "default_decay")]
    pub decay_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write the report here instead of stdout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// How the final pheromone state is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Strongest edges as a table.
    #[default]
    Text,
    /// Full edge report as JSON.
    Json,
    /// Graphviz DOT.
    Dot,
}

// Default value functions
fn default_dimension() -> u32 { 6 }
fn default_decay() -> f64 { 0.3 }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            home: 0,
            goal: None,
            decay_factor: default_decay(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            path: None,
        }
    }
}

impl GridConfig {
    pub fn to_options(&self) -> GridOptions {
        let options = GridOptions::new(self.dimension)
            .with_home(self.home)
            .with_decay(self.decay_factor);
        match self.goal {
            Some(goal) => options.with_goal(goal),
            None => options,
        }
    }
}

impl Config {
    /// Load `explicit` if given, else pheromesh.toml from the current or a
    /// parent directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match find_config_file() {
                Some(path) => Self::from_file(&path),
                None => Ok(Config::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Find pheromesh.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?;
    find_config_from(&dir)
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[colony]"));
        assert!(text.contains("[grid]"));
        assert!(text.contains("[output]"));
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [colony]
            ant_count = 40
            seed = 11

            [grid]
            dimension = 4
            goal = 12

            [output]
            format = "dot"
            "#,
        )
        .unwrap();
        assert_eq!(config.colony.ant_count, 40);
        assert_eq!(config.colony.seed, Some(11));
        assert_eq!(config.colony.iterations, 500);
        assert_eq!(config.grid.dimension, 4);
        assert_eq!(config.grid.decay_factor, 0.3);
        assert_eq!(config.output.format, OutputFormat::Dot);

        let options = config.grid.to_options();
        assert_eq!(options.goal, 12);
        assert_eq!(options.home, 0);
    }

    #[test]
    fn grid_goal_defaults_to_far_corner() {
        let options = GridConfig::default().to_options();
        assert_eq!(options.dimension, 6);
        assert_eq!(options.goal, 35);
    }

    #[test]
    fn save_then_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.colony.deposit = 2.5;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.colony.deposit, 2.5);
    }

    #[test]
    fn search_walks_up_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[grid]\ndimension = 3\n").unwrap();

        let found = find_config_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[colony\nant_count = ").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }
}
