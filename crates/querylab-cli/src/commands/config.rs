//! Config command implementation

use super::describe_config_file;
use crate::config_loader::load_config;
use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use querylab_core::config::CliConfigOverrides;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tabled::Tabled;

pub fn execute(
    output: &OutputWriter,
    config_file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<()> {
    let config = load_config(config_file, overrides)?;

    let values: BTreeMap<String, ConfigEntry> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| {
            let entry = ConfigEntry {
                value,
                source: format!("{:?}", source),
            };
            (key, entry)
        })
        .collect();
    let datasets: Vec<String> = config.datasets.keys().cloned().collect();

    if output.is_json() {
        output.result(ConfigOutput { values, datasets })?;
        return Ok(());
    }

    output.section("Effective Configuration");
    output.kv("Config file", describe_config_file(config_file));

    #[derive(Tabled, Serialize)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    let rows: Vec<ConfigRow> = values
        .into_iter()
        .map(|(key, entry)| ConfigRow {
            key,
            value: entry.value,
            source: entry.source,
        })
        .collect();
    output.table(rows)?;

    if !datasets.is_empty() {
        output.section("Declared Datasets");
        for name in datasets {
            output.info(name);
        }
    }

    Ok(())
}
