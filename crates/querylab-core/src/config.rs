use crate::error::{QuerylabError, Result};
use crate::models::dataset::{DatasetEntry, DatasetSpec, DEFAULT_DATASET};
use crate::models::IndexMode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "querylab.toml";

/// Accepted range for `writer_heap_mb`; tantivy refuses writer budgets under 15 MB
pub const WRITER_HEAP_MB_RANGE: std::ops::RangeInclusive<usize> = 15..=4000;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for querylab
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub dataset: ConfigValue<String>,
    pub index_mode: ConfigValue<IndexMode>,
    pub index_path: ConfigValue<PathBuf>,
    pub num_results: ConfigValue<usize>,
    pub top_k: ConfigValue<usize>,
    pub relevance_threshold: ConfigValue<i32>,
    pub threads: ConfigValue<usize>,
    pub writer_heap_mb: ConfigValue<usize>,

    /// Datasets declared in the config file, by name
    pub datasets: BTreeMap<String, DatasetEntry>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            dataset: ConfigValue::new(DEFAULT_DATASET.to_string(), ConfigSource::Default),
            index_mode: ConfigValue::new(IndexMode::Disk, ConfigSource::Default),
            index_path: ConfigValue::new(PathBuf::from("index"), ConfigSource::Default),
            num_results: ConfigValue::new(1000, ConfigSource::Default),
            top_k: ConfigValue::new(10, ConfigSource::Default),
            relevance_threshold: ConfigValue::new(1, ConfigSource::Default),
            threads: ConfigValue::new(1, ConfigSource::Default),
            writer_heap_mb: ConfigValue::new(50, ConfigSource::Default),
            datasets: BTreeMap::new(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| QuerylabError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| QuerylabError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(dataset) = file_config.dataset {
            self.dataset.update(dataset, ConfigSource::File);
        }

        if let Some(index_mode) = file_config.index_mode {
            self.index_mode.update(index_mode, ConfigSource::File);
        }

        if let Some(index_path) = file_config.index_path {
            self.index_path.update(index_path, ConfigSource::File);
        }

        if let Some(num_results) = file_config.num_results {
            self.num_results.update(positive("num_results", num_results)?, ConfigSource::File);
        }

        if let Some(top_k) = file_config.top_k {
            self.top_k.update(positive("top_k", top_k)?, ConfigSource::File);
        }

        if let Some(threshold) = file_config.relevance_threshold {
            self.relevance_threshold.update(threshold, ConfigSource::File);
        }

        if let Some(threads) = file_config.threads {
            self.threads.update(positive("threads", threads)?, ConfigSource::File);
        }

        if let Some(heap) = file_config.writer_heap_mb {
            self.writer_heap_mb.update(writer_heap(heap)?, ConfigSource::File);
        }

        self.datasets.extend(file_config.datasets);

        Ok(self)
    }

    /// Load the file only if it exists
    pub fn load_from_file_if_exists<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        if path.as_ref().is_file() {
            self.load_from_file(path)
        } else {
            tracing::debug!("No config file at {}", path.as_ref().display());
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // QUERYLAB_DATASET
        if let Ok(dataset) = env::var("QUERYLAB_DATASET") {
            self.dataset.update(dataset, ConfigSource::Environment);
        }

        // QUERYLAB_INDEX_MODE
        if let Ok(mode_str) = env::var("QUERYLAB_INDEX_MODE") {
            match parse_index_mode(&mode_str) {
                Ok(mode) => self.index_mode.update(mode, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid QUERYLAB_INDEX_MODE value '{}': expected disk or memory",
                    mode_str
                ),
            }
        }

        // QUERYLAB_INDEX_PATH
        if let Ok(path) = env::var("QUERYLAB_INDEX_PATH") {
            self.index_path.update(PathBuf::from(path), ConfigSource::Environment);
        }

        if let Some(value) = env_positive("QUERYLAB_NUM_RESULTS") {
            self.num_results.update(value, ConfigSource::Environment);
        }

        if let Some(value) = env_positive("QUERYLAB_TOP_K") {
            self.top_k.update(value, ConfigSource::Environment);
        }

        // QUERYLAB_RELEVANCE_THRESHOLD
        if let Ok(raw) = env::var("QUERYLAB_RELEVANCE_THRESHOLD") {
            match raw.parse::<i32>() {
                Ok(threshold) => {
                    self.relevance_threshold.update(threshold, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid QUERYLAB_RELEVANCE_THRESHOLD value '{}': expected integer grade",
                    raw
                ),
            }
        }

        if let Some(value) = env_positive("QUERYLAB_THREADS") {
            self.threads.update(value, ConfigSource::Environment);
        }

        if let Some(value) = env_positive("QUERYLAB_WRITER_HEAP_MB") {
            match writer_heap(value) {
                Ok(heap) => self.writer_heap_mb.update(heap, ConfigSource::Environment),
                Err(err) => tracing::warn!("Ignoring QUERYLAB_WRITER_HEAP_MB: {}", err),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(dataset) = overrides.dataset {
            self.dataset.update(dataset, ConfigSource::Cli);
        }

        if let Some(index_mode) = overrides.index_mode {
            self.index_mode.update(index_mode, ConfigSource::Cli);
        }

        if let Some(index_path) = overrides.index_path {
            self.index_path.update(index_path, ConfigSource::Cli);
        }

        if let Some(top_k) = overrides.top_k {
            self.top_k.update(top_k, ConfigSource::Cli);
        }

        if let Some(threads) = overrides.threads {
            self.threads.update(threads, ConfigSource::Cli);
        }
    }

    /// Resolve the configured dataset name against built-in and declared datasets
    pub fn dataset_spec(&self) -> Result<DatasetSpec> {
        DatasetSpec::resolve(&self.dataset.value, &self.datasets)
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("dataset".to_string(), (self.dataset.value.clone(), self.dataset.source));
        map.insert(
            "index_mode".to_string(),
            (self.index_mode.value.to_string(), self.index_mode.source),
        );
        map.insert(
            "index_path".to_string(),
            (self.index_path.value.display().to_string(), self.index_path.source),
        );
        map.insert(
            "num_results".to_string(),
            (self.num_results.value.to_string(), self.num_results.source),
        );
        map.insert("top_k".to_string(), (self.top_k.value.to_string(), self.top_k.source));
        map.insert(
            "relevance_threshold".to_string(),
            (self.relevance_threshold.value.to_string(), self.relevance_threshold.source),
        );
        map.insert("threads".to_string(), (self.threads.value.to_string(), self.threads.source));
        map.insert(
            "writer_heap_mb".to_string(),
            (self.writer_heap_mb.value.to_string(), self.writer_heap_mb.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    dataset: Option<String>,
    index_mode: Option<IndexMode>,
    index_path: Option<PathBuf>,
    num_results: Option<usize>,
    top_k: Option<usize>,
    relevance_threshold: Option<i32>,
    threads: Option<usize>,
    writer_heap_mb: Option<usize>,
    #[serde(default)]
    datasets: BTreeMap<String, DatasetEntry>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub dataset: Option<String>,
    pub index_mode: Option<IndexMode>,
    pub index_path: Option<PathBuf>,
    pub top_k: Option<usize>,
    pub threads: Option<usize>,
}

/// Parse index mode from string
pub fn parse_index_mode(s: &str) -> Result<IndexMode> {
    match s.to_lowercase().as_str() {
        "disk" | "persistent" => Ok(IndexMode::Disk),
        "memory" | "ram" | "inmemory" => Ok(IndexMode::Memory),
        _ => Err(QuerylabError::ConfigInvalid {
            key: "index_mode".to_string(),
            reason: format!("Invalid index mode: {}. Use disk or memory", s),
        }),
    }
}

fn positive(key: &str, value: usize) -> Result<usize> {
    if value == 0 {
        return Err(QuerylabError::ConfigInvalid {
            key: key.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn writer_heap(value: usize) -> Result<usize> {
    if !WRITER_HEAP_MB_RANGE.contains(&value) {
        return Err(QuerylabError::ConfigInvalid {
            key: "writer_heap_mb".to_string(),
            reason: format!(
                "must be between {} and {} MB",
                WRITER_HEAP_MB_RANGE.start(),
                WRITER_HEAP_MB_RANGE.end()
            ),
        });
    }
    Ok(value)
}

fn env_positive(var: &str) -> Option<usize> {
    let raw = env::var(var).ok()?;
    match raw.parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            tracing::warn!("Invalid {} value '{}': expected positive integer", var, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.dataset.value, DEFAULT_DATASET);
        assert_eq!(config.dataset.source, ConfigSource::Default);
        assert_eq!(config.index_mode.value, IndexMode::Disk);
        assert_eq!(config.num_results.value, 1000);
        assert_eq!(config.top_k.value, 10);
        assert_eq!(config.relevance_threshold.value, 1);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        // File should override default
        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        // Environment should override file
        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        // CLI should override environment
        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
dataset = "mini"
index_mode = "memory"
num_results = 100
relevance_threshold = 3

[datasets.mini]
root = "/data/mini"
corpus = "docs.tsv"
topics = "topics.tsv"
qrels = "qrels.txt"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.dataset.value, "mini");
        assert_eq!(config.dataset.source, ConfigSource::File);
        assert_eq!(config.index_mode.value, IndexMode::Memory);
        assert_eq!(config.num_results.value, 100);
        assert_eq!(config.relevance_threshold.value, 3);
        assert_eq!(config.top_k.source, ConfigSource::Default);

        let spec = config.dataset_spec().unwrap();
        assert_eq!(spec.corpus, PathBuf::from("/data/mini/docs.tsv"));
    }

    #[test]
    fn test_zero_in_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "top_k = 0").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, QuerylabError::ConfigInvalid { ref key, .. } if key == "top_k"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        let overrides = CliConfigOverrides {
            index_mode: Some(IndexMode::Memory),
            top_k: Some(25),
            ..Default::default()
        };

        config.update_from_cli(overrides);

        assert_eq!(config.index_mode.value, IndexMode::Memory);
        assert_eq!(config.index_mode.source, ConfigSource::Cli);
        assert_eq!(config.top_k.value, 25);
        // These should still be defaults
        assert_eq!(config.dataset.source, ConfigSource::Default);
        assert_eq!(config.threads.source, ConfigSource::Default);
    }

    #[test]
    fn test_parse_index_mode() {
        assert_eq!(parse_index_mode("disk").unwrap(), IndexMode::Disk);
        assert_eq!(parse_index_mode("MEMORY").unwrap(), IndexMode::Memory);
        assert_eq!(parse_index_mode("ram").unwrap(), IndexMode::Memory);
        assert!(parse_index_mode("cloud").is_err());
    }

    #[test]
    fn test_writer_heap_bounds() {
        assert_eq!(writer_heap(15).unwrap(), 15);
        assert_eq!(writer_heap(4000).unwrap(), 4000);

        for heap in [0, 14, 4001, usize::MAX] {
            match writer_heap(heap) {
                Err(QuerylabError::ConfigInvalid { key, .. }) => assert_eq!(key, "writer_heap_mb"),
                other => panic!("expected ConfigInvalid for {}, got {:?}", heap, other),
            }
        }
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert!(map.contains_key("dataset"));
        assert!(map.contains_key("index_mode"));
        assert!(map.contains_key("writer_heap_mb"));

        let (mode, source) = &map["index_mode"];
        assert_eq!(mode, "disk");
        assert_eq!(*source, ConfigSource::Default);
    }
}
