use querylab_core::models::IndexMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of an opened index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Where the index lives
    pub mode: IndexMode,

    /// Index directory (disk mode only)
    pub path: Option<PathBuf>,

    /// Number of searchable documents
    pub document_count: u64,

    /// Number of segments backing the index
    pub segment_count: usize,

    /// Whether this process built the index (as opposed to reusing one on disk)
    pub freshly_built: bool,
}

/// Average precision for one topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicScore {
    /// Topic identifier
    pub qid: String,

    /// Average precision
    pub average_precision: f64,

    /// Number of documents retrieved for the topic
    pub retrieved: usize,

    /// Number of judged-relevant documents for the topic
    pub relevant: usize,

    /// Number of judged-relevant documents that were retrieved
    pub relevant_retrieved: usize,
}

/// Outcome of evaluating a run against relevance judgments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Mean average precision over evaluated topics
    pub map: f64,

    /// Per-topic scores, in topic order
    pub per_topic: Vec<TopicScore>,

    /// Topics skipped because they have no judgments
    pub unjudged_topics: usize,
}

impl Evaluation {
    /// Number of topics that contributed to the mean
    pub fn evaluated_topics(&self) -> usize {
        self.per_topic.len()
    }

    /// Score for a single topic
    pub fn topic(&self, qid: &str) -> Option<&TopicScore> {
        self.per_topic.iter().find(|score| score.qid == qid)
    }
}
