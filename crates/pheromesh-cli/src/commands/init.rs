//! Write a default pheromesh.toml.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<PathBuf>, force: bool) -> Result<()> {
    let base_path = match path {
        Some(p) => p,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Pheromesh project...", "→".blue());
    let config_path = write_default(&base_path, force)?;
    match config_path {
        Some(path) => println!("  {} Created {}", "✓".green(), path.display()),
        None => println!(
            "  {} {} already exists (use --force to overwrite)",
            "•".yellow(),
            base_path.join(CONFIG_FILE).display()
        ),
    }

    println!();
    println!("Next steps:");
    println!("  {} edit {} to taste", "1.".blue(), CONFIG_FILE);
    println!("  {} pheromesh run", "2.".blue());
    println!("  {} pheromesh run --format dot --output mesh.dot", "3.".blue());

    Ok(())
}

/// Write the default config into `dir`. Returns the path written, or
/// `None` when a file already exists and `force` is off.
fn write_default(dir: &Path, force: bool) -> Result<Option<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Ok(None);
    }
    Config::default().save(&config_path)?;
    Ok(Some(config_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_default(dir.path(), false).unwrap().unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn keeps_existing_file_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[colony]\nant_count = 3\n").unwrap();

        assert!(write_default(dir.path(), false).unwrap().is_none());
        assert_eq!(Config::from_file(&path).unwrap().colony.ant_count, 3);

        assert!(write_default(dir.path(), true).unwrap().is_some());
        assert_eq!(Config::from_file(&path).unwrap().colony.ant_count, 20);
    }
}
