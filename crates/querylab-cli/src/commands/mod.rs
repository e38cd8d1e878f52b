//! Command implementations

mod config;
mod evaluate;
mod index;
mod search;
mod status;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use crate::progress::IndexSpinner;
use anyhow::{Context, Result};
use querylab_core::config::{CliConfigOverrides, LayeredConfig};
use querylab_retrieval::Scaffold;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let overrides = CliConfigOverrides {
        dataset: cli.dataset,
        index_path: cli.index_path,
        ..Default::default()
    };
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Index(args) => index::execute(args, &output, config_file, overrides),
        Commands::Search(args) => search::execute(args, &output, config_file, overrides),
        Commands::Evaluate(args) => evaluate::execute(args, &output, config_file, overrides),
        Commands::Status(args) => status::execute(args, &output, config_file, overrides),
        Commands::Config => config::execute(&output, config_file, overrides),
    }
}

/// Load the dataset and build or reuse its index behind a spinner
fn open_scaffold(config: &LayeredConfig, force: bool, output: &OutputWriter) -> Result<Scaffold> {
    let spinner = IndexSpinner::new(output.is_json());
    let scaffold = Scaffold::open_with_progress(config, force, |progress| spinner.update(&progress));
    spinner.finish();

    scaffold.with_context(|| format!("Failed to open dataset '{}'", config.dataset.value))
}

/// Config file a command reads, for display
fn describe_config_file(config_file: Option<&Path>) -> String {
    config_file
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| querylab_core::config::DEFAULT_CONFIG_FILE.to_string())
}
