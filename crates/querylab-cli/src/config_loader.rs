//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use querylab_core::config::{CliConfigOverrides, LayeredConfig, DEFAULT_CONFIG_FILE};
use std::path::Path;

/// Load layered configuration with CLI overrides.
///
/// An explicit `config_file` must exist; otherwise `querylab.toml` in the
/// working directory is used when present.
pub fn load_config(
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let config = match config_file {
        Some(path) => LayeredConfig::with_defaults()
            .load_from_file(path)
            .with_context(|| format!("Failed to load configuration file {}", path.display()))?,
        None => LayeredConfig::with_defaults()
            .load_from_file_if_exists(DEFAULT_CONFIG_FILE)
            .context("Failed to load configuration file")?,
    };

    let mut config = config.load_from_env();
    config.update_from_cli(overrides);

    tracing::debug!(dataset = %config.dataset.value, mode = %config.index_mode.value, "Configuration loaded");
    Ok(config)
}
