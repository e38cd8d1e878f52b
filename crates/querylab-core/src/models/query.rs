use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A query with its identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub qid: String,
    pub query: String,
}

impl Topic {
    pub fn new(qid: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            qid: qid.into(),
            query: query.into(),
        }
    }
}

/// A single relevance judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qrel {
    pub qid: String,
    pub docno: String,
    pub relevance: i32,
}

/// Relevance judgments grouped by topic
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qrels {
    by_topic: HashMap<String, HashMap<String, i32>>,
}

impl Qrels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a judgment. A repeated (qid, docno) pair keeps the last grade.
    pub fn insert(&mut self, qrel: Qrel) {
        self.by_topic.entry(qrel.qid).or_default().insert(qrel.docno, qrel.relevance);
    }

    /// Judgments for one topic, keyed by docno
    pub fn judgments(&self, qid: &str) -> Option<&HashMap<String, i32>> {
        self.by_topic.get(qid)
    }

    pub fn contains_topic(&self, qid: &str) -> bool {
        self.by_topic.contains_key(qid)
    }

    /// Drop every topic the predicate rejects
    pub fn retain_topics<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.by_topic.retain(|qid, _| keep(qid));
    }

    /// Number of judged topics
    pub fn topic_count(&self) -> usize {
        self.by_topic.len()
    }

    /// Total number of judgments
    pub fn judgment_count(&self) -> usize {
        self.by_topic.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_topic.is_empty()
    }
}

impl FromIterator<Qrel> for Qrels {
    fn from_iter<I: IntoIterator<Item = Qrel>>(iter: I) -> Self {
        let mut qrels = Qrels::new();
        for qrel in iter {
            qrels.insert(qrel);
        }
        qrels
    }
}

/// One ranked document for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDoc {
    /// Topic identifier
    pub qid: String,

    /// Internal document ordinal assigned by the index
    pub docid: u64,

    /// External document identifier
    pub docno: String,

    /// 0-based position in the ranking
    pub rank: usize,

    /// BM25 score
    pub score: f32,

    /// Query text that was actually run
    pub query: String,

    /// Query text before rewriting, when a rewrite stage ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,

    /// Stored document text
    pub text: String,
}

/// Ranked results for one or more queries, in ranking order per query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    rows: Vec<ScoredDoc>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ScoredDoc>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ScoredDoc] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<ScoredDoc> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<ScoredDoc> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ScoredDoc>>(iter: I) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qrels_keep_last_grade() {
        let qrels: Qrels = vec![
            Qrel { qid: "1".into(), docno: "a".into(), relevance: 1 },
            Qrel { qid: "1".into(), docno: "a".into(), relevance: 3 },
            Qrel { qid: "2".into(), docno: "b".into(), relevance: 2 },
        ]
        .into_iter()
        .collect();

        assert_eq!(qrels.topic_count(), 2);
        assert_eq!(qrels.judgment_count(), 2);
        assert_eq!(qrels.judgments("1").unwrap()["a"], 3);
    }
}
