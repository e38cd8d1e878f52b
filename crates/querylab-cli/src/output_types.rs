use chrono::{DateTime, Utc};
use querylab_core::models::IndexMode;
use querylab_retrieval::TopicScore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Output for index command
#[derive(Debug, Serialize)]
pub struct IndexOutput {
    pub dataset: String,
    pub mode: IndexMode,
    pub path: Option<PathBuf>,
    pub document_count: u64,
    pub segment_count: usize,
    pub freshly_built: bool,
    pub fingerprint: Option<String>,
    pub truncated_count: Option<usize>,
}

/// Output for search command
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub results: Vec<SearchResultItem>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultItem {
    pub rank: usize,
    pub docno: String,
    pub score: f32,
    pub text: String,
}

/// Output for evaluate command
#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    pub dataset: String,
    pub map: f64,
    pub evaluated_topics: usize,
    pub unjudged_topics: usize,
    pub rewrites: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_query: Option<Vec<TopicScore>>,
}

/// Output for status command
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub dataset: String,
    pub files: DatasetFiles,
    pub index_mode: IndexMode,
    pub index_path: PathBuf,
    pub index: IndexStatus,
}

#[derive(Debug, Serialize)]
pub struct DatasetFiles {
    pub corpus: FileStatus,
    pub topics: FileStatus,
    pub qrels: FileStatus,
    pub exclude_topics: Option<FileStatus>,
}

#[derive(Debug, Serialize)]
pub struct FileStatus {
    pub path: PathBuf,
    pub present: bool,
}

#[derive(Debug, Serialize)]
pub struct IndexStatus {
    pub built: bool,
    pub built_for: Option<String>,
    pub document_count: Option<u64>,
    pub built_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: BTreeMap<String, ConfigEntry>,
    pub datasets: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}
