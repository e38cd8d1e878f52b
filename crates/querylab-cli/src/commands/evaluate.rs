//! Evaluate command implementation

use super::open_scaffold;
use crate::cli::EvaluateArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::EvaluateOutput;
use anyhow::{Context, Result};
use querylab_core::config::CliConfigOverrides;
use querylab_core::loading::read_topics;
use querylab_retrieval::{MappedRewriter, QueryRewriter};
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

pub fn execute(
    args: EvaluateArgs,
    output: &OutputWriter,
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        index_mode: args.mode.map(Into::into),
        threads: args.threads,
        ..overrides
    };
    let config = load_config(config_file, overrides)?;

    let rewriter = args
        .rewrites
        .as_deref()
        .map(MappedRewriter::from_file)
        .transpose()
        .context("Failed to load query rewrites")?;

    let scaffold = open_scaffold(&config, false, output)?;

    let custom_topics = args
        .topics
        .as_deref()
        .map(read_topics)
        .transpose()
        .context("Failed to load topics")?;
    let topics = custom_topics.as_deref().unwrap_or_else(|| scaffold.dataset().topics());

    let evaluation = scaffold
        .evaluate_detailed(topics, rewriter.as_ref().map(|r| r as &dyn QueryRewriter))
        .context("Evaluation failed")?;

    if output.is_json() {
        output.result(EvaluateOutput {
            dataset: scaffold.dataset().name().to_string(),
            map: evaluation.map,
            evaluated_topics: evaluation.evaluated_topics(),
            unjudged_topics: evaluation.unjudged_topics,
            rewrites: args.rewrites,
            per_query: args.per_query.then(|| evaluation.per_topic.clone()),
        })?;
        return Ok(());
    }

    if args.per_query {
        output.section("Per-query Average Precision");

        #[derive(Tabled, Serialize)]
        struct TopicRow {
            #[tabled(rename = "Qid")]
            qid: String,
            #[tabled(rename = "AP")]
            average_precision: String,
            #[tabled(rename = "Retrieved")]
            retrieved: usize,
            #[tabled(rename = "Relevant")]
            relevant: usize,
            #[tabled(rename = "Rel. retrieved")]
            relevant_retrieved: usize,
        }

        let rows: Vec<TopicRow> = evaluation
            .per_topic
            .iter()
            .map(|score| TopicRow {
                qid: score.qid.clone(),
                average_precision: format!("{:.4}", score.average_precision),
                retrieved: score.retrieved,
                relevant: score.relevant,
                relevant_retrieved: score.relevant_retrieved,
            })
            .collect();
        output.table(rows)?;
    }

    output.section("Evaluation");
    output.kv("Dataset", scaffold.dataset().name());
    if let Some(path) = &args.rewrites {
        output.kv("Rewrites", path.display());
    }
    output.kv("Topics", evaluation.evaluated_topics());
    output.kv("MAP", format!("{:.4}", evaluation.map));

    if evaluation.unjudged_topics > 0 {
        output.warning(format!(
            "{} topics have no relevance judgments and were skipped",
            evaluation.unjudged_topics
        ));
    }

    Ok(())
}
