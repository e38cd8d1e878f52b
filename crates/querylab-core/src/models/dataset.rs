use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use super::query::{Qrels, Topic};
use crate::error::{QuerylabError, Result};
use crate::loading::{self, CorpusReader};

/// Name of the built-in dataset
pub const DEFAULT_DATASET: &str = "antique/test/non-offensive";

/// Default location of the built-in dataset files
const DEFAULT_DATASET_ROOT: &str = "data/antique";

/// Resolved locations of a dataset's files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name
    pub name: String,

    /// Collection file (TSV or JSONL)
    pub corpus: PathBuf,

    /// Topics file (TSV)
    pub topics: PathBuf,

    /// Relevance judgments (TREC qrels format)
    pub qrels: PathBuf,

    /// Optional list of topic ids to leave out
    pub exclude_topics: Option<PathBuf>,
}

/// Dataset declaration as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Directory the other paths are relative to
    #[serde(default)]
    pub root: Option<PathBuf>,

    pub corpus: PathBuf,

    pub topics: PathBuf,

    pub qrels: PathBuf,

    #[serde(default)]
    pub exclude_topics: Option<PathBuf>,
}

impl DatasetEntry {
    /// Turn the declaration into a spec, joining relative paths onto `root`
    pub fn to_spec(&self, name: &str) -> DatasetSpec {
        let join = |path: &Path| match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        };

        DatasetSpec {
            name: name.to_string(),
            corpus: join(&self.corpus),
            topics: join(&self.topics),
            qrels: join(&self.qrels),
            exclude_topics: self.exclude_topics.as_deref().map(join),
        }
    }
}

impl DatasetSpec {
    /// The ANTIQUE test collection with offensive questions removed
    pub fn antique_non_offensive(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            name: DEFAULT_DATASET.to_string(),
            corpus: root.join("antique-collection.txt"),
            topics: root.join("antique-test-queries.txt"),
            qrels: root.join("antique-test.qrel"),
            exclude_topics: Some(root.join("antique-test-queries-offensive.txt")),
        }
    }

    /// Look up a dataset by name.
    ///
    /// Datasets declared in configuration shadow the built-in one.
    pub fn resolve(name: &str, declared: &BTreeMap<String, DatasetEntry>) -> Result<Self> {
        if let Some(entry) = declared.get(name) {
            return Ok(entry.to_spec(name));
        }

        if name == DEFAULT_DATASET {
            return Ok(Self::antique_non_offensive(DEFAULT_DATASET_ROOT));
        }

        Err(QuerylabError::DatasetNotFound { name: name.to_string() })
    }
}

/// A loaded dataset: topics and judgments in memory, corpus streamed on demand
#[derive(Debug, Clone)]
pub struct Dataset {
    spec: DatasetSpec,
    topics: Vec<Topic>,
    qrels: Qrels,
    excluded: HashSet<String>,
}

impl Dataset {
    /// Load topics and judgments, applying the exclusion list
    pub fn load(spec: DatasetSpec) -> Result<Self> {
        // Fail early on a missing collection rather than at index time
        loading::require_file(&spec.corpus)?;

        let excluded = match &spec.exclude_topics {
            Some(path) => loading::read_qid_list(path)?,
            None => HashSet::new(),
        };

        let mut topics = loading::read_topics(&spec.topics)?;
        topics.retain(|topic| !excluded.contains(&topic.qid));

        let mut qrels = loading::read_qrels(&spec.qrels)?;
        qrels.retain_topics(|qid| !excluded.contains(qid));

        tracing::info!(
            dataset = %spec.name,
            topics = topics.len(),
            judged_topics = qrels.topic_count(),
            excluded = excluded.len(),
            "Loaded dataset"
        );

        Ok(Self { spec, topics, qrels, excluded })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &DatasetSpec {
        &self.spec
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn qrels(&self) -> &Qrels {
        &self.qrels
    }

    /// Topic ids removed by the exclusion list
    pub fn excluded(&self) -> &HashSet<String> {
        &self.excluded
    }

    /// Stream the collection in file order
    pub fn corpus_iter(&self) -> Result<CorpusReader> {
        CorpusReader::open(&self.spec.corpus)
    }
}
