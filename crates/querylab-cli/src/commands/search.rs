//! Search command implementation

use super::open_scaffold;
use crate::cli::SearchArgs;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{SearchOutput, SearchResultItem};
use anyhow::{Context, Result};
use querylab_core::config::CliConfigOverrides;
use serde::Serialize;
use std::path::Path;
use tabled::Tabled;

/// Characters of document text shown per row
const EXCERPT_CHARS: usize = 80;

pub fn execute(
    args: SearchArgs,
    output: &OutputWriter,
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let overrides = CliConfigOverrides {
        index_mode: args.mode.map(Into::into),
        top_k: args.top_k,
        ..overrides
    };
    let config = load_config(config_file, overrides)?;

    let scaffold = open_scaffold(&config, false, output)?;
    let results = scaffold.search(&args.query).context("Search failed")?;

    if output.is_json() {
        let items = results
            .into_rows()
            .into_iter()
            .map(|row| SearchResultItem {
                rank: row.rank,
                docno: row.docno,
                score: row.score,
                text: row.text,
            })
            .collect();
        output.result(SearchOutput {
            query: args.query,
            results: items,
        })?;
        return Ok(());
    }

    output.section(format!("Results for \"{}\"", args.query));

    #[derive(Tabled, Serialize)]
    struct ResultRow {
        #[tabled(rename = "Rank")]
        rank: usize,
        #[tabled(rename = "Docno")]
        docno: String,
        #[tabled(rename = "Score")]
        score: String,
        #[tabled(rename = "Text")]
        text: String,
    }

    let rows: Vec<ResultRow> = results
        .rows()
        .iter()
        .map(|row| ResultRow {
            rank: row.rank,
            docno: row.docno.clone(),
            score: format!("{:.4}", row.score),
            text: excerpt(&row.text),
        })
        .collect();
    output.table(rows)?;

    Ok(())
}

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_keeps_short_text() {
        assert_eq!(excerpt("a short\n answer"), "a short answer");
    }

    #[test]
    fn test_excerpt_cuts_long_text_on_char_boundary() {
        let text = "é".repeat(EXCERPT_CHARS + 5);
        let cut = excerpt(&text);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), EXCERPT_CHARS + 3);
    }
}
