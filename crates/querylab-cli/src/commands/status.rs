//! Status command implementation

use crate::cli::StatusArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{DatasetFiles, FileStatus, IndexStatus, StatusOutput};
use anyhow::{Context, Result};
use querylab_core::config::CliConfigOverrides;
use querylab_core::models::IndexMode;
use querylab_retrieval::IndexHandle;
use std::path::Path;

pub fn execute(
    args: StatusArgs,
    output: &OutputWriter,
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let config = load_config(config_file, overrides)?;
    let spec = config.dataset_spec()?;

    let files = DatasetFiles {
        corpus: file_status(&spec.corpus),
        topics: file_status(&spec.topics),
        qrels: file_status(&spec.qrels),
        exclude_topics: spec.exclude_topics.as_deref().map(file_status),
    };

    let index_path = config.index_path.value.clone();
    let index = if config.index_mode.value == IndexMode::Disk && IndexHandle::exists(&index_path) {
        let handle = IndexHandle::open(&index_path).context("Failed to open index")?;
        let stats = handle.stats();
        let state = handle.state();
        IndexStatus {
            built: true,
            built_for: state.map(|s| s.dataset.clone()),
            document_count: Some(stats.document_count),
            built_at: state.map(|s| s.built_at),
            segment_count: args.verbose.then_some(stats.segment_count),
            fingerprint: if args.verbose { state.map(|s| s.fingerprint.clone()) } else { None },
        }
    } else {
        IndexStatus {
            built: false,
            built_for: None,
            document_count: None,
            built_at: None,
            segment_count: None,
            fingerprint: None,
        }
    };

    if output.is_json() {
        output.result(StatusOutput {
            dataset: spec.name.clone(),
            files,
            index_mode: config.index_mode.value,
            index_path,
            index,
        })?;
        return Ok(());
    }

    output.section("Dataset");
    output.kv("Name", &spec.name);
    show_file(output, "Corpus", &files.corpus);
    show_file(output, "Topics", &files.topics);
    show_file(output, "Qrels", &files.qrels);
    if let Some(excluded) = &files.exclude_topics {
        show_file(output, "Excluded topics", excluded);
    }

    output.section("Index Status");
    output.kv("Mode", config.index_mode.value);
    match config.index_mode.value {
        IndexMode::Memory => {
            output.kv("Status", "Built in memory on every run");
        }
        IndexMode::Disk if index.built => {
            output.kv("Path", index_path.display());
            output.kv("Status", "Built");
            if let Some(dataset) = &index.built_for {
                output.kv("Built For", dataset);
                if dataset != &spec.name {
                    output.warning("The index was built for a different dataset");
                }
            }
            if let Some(built_at) = index.built_at {
                output.kv("Built At", built_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            if let Some(count) = index.document_count {
                output.kv("Documents", count);
            }
            if let Some(segments) = index.segment_count {
                output.kv("Segments", segments);
            }
            if let Some(fingerprint) = &index.fingerprint {
                output.kv("Fingerprint", fingerprint);
            }
        }
        IndexMode::Disk => {
            output.kv("Path", index_path.display());
            output.kv("Status", "Not built");
            output.info("Run 'querylab index' to create the index");
        }
    }

    Ok(())
}

fn file_status(path: &Path) -> FileStatus {
    FileStatus {
        path: path.to_path_buf(),
        present: path.is_file(),
    }
}

fn show_file(output: &OutputWriter, label: &str, file: &FileStatus) {
    let mark = if file.present { "✓" } else { "✗ missing" };
    output.kv(label, format!("{} {}", file.path.display(), mark));
}
