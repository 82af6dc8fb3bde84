//! Utility functions for CLI commands.

use std::path::Path;

use anyhow::Context;
use sslforslr_dataset::{load_config, AudioDatasetLoader};

/// Loads a dataset config and builds its loader.
pub fn open_loader(config: &Path) -> anyhow::Result<AudioDatasetLoader> {
    let cfg = load_config(config)
        .with_context(|| format!("failed to load config {}", config.display()))?;
    let loader = AudioDatasetLoader::new(cfg).context("failed to build dataset")?;
    Ok(loader)
}

/// Prints a result as JSON or YAML on stdout.
pub fn output_result<T: serde::Serialize>(result: &T, as_json: bool) -> anyhow::Result<()> {
    let output = if as_json {
        serde_json::to_string_pretty(result)? + "\n"
    } else {
        serde_yaml::to_string(result)?
    };
    print!("{}", output);
    Ok(())
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}
