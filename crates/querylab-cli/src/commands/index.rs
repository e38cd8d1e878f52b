//! Index command implementation

use super::open_scaffold;
use crate::cli::IndexArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::IndexOutput;
use anyhow::Result;
use querylab_core::config::CliConfigOverrides;
use std::path::Path;

pub fn execute(
    args: IndexArgs,
    output: &OutputWriter,
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        index_mode: args.mode.map(Into::into),
        ..overrides
    };
    let config = load_config(config_file, overrides)?;

    let scaffold = open_scaffold(&config, args.force, output)?;
    let stats = scaffold.index().stats();
    let state = scaffold.index().state();

    if output.is_json() {
        output.result(IndexOutput {
            dataset: scaffold.dataset().name().to_string(),
            mode: stats.mode,
            path: stats.path.clone(),
            document_count: stats.document_count,
            segment_count: stats.segment_count,
            freshly_built: stats.freshly_built,
            fingerprint: state.map(|s| s.fingerprint.clone()),
            truncated_count: state.map(|s| s.truncated_count),
        })?;
        return Ok(());
    }

    if stats.freshly_built {
        output.success(format!("Indexed {} documents", stats.document_count));
    } else {
        output.success("Reused existing index");
        if !args.force {
            output.info("Use --force to rebuild it");
        }
    }

    output.section("Index Information");
    output.kv("Dataset", scaffold.dataset().name());
    output.kv("Mode", stats.mode);
    if let Some(path) = &stats.path {
        output.kv("Path", path.display());
    }
    output.kv("Documents", stats.document_count);
    output.kv("Segments", stats.segment_count);
    if let Some(state) = state {
        output.kv("Fingerprint", &state.fingerprint);
        if state.truncated_count > 0 {
            output.warning(format!(
                "{} documents had metadata truncated to the configured limits",
                state.truncated_count
            ));
        }
    }

    Ok(())
}
