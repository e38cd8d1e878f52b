use querylab_core::error::{QuerylabError, Result};
use querylab_core::models::{ResultTable, ScoredDoc, Topic};
use rayon::prelude::*;

use crate::retriever::Bm25Retriever;
use crate::rewrite::QueryRewriter;

/// Qid given to ad-hoc queries passed to [`RetrievalPipeline::search`]
pub const ADHOC_QID: &str = "1";

/// Retrieval pipeline: an optional query rewrite stage followed by BM25
pub struct RetrievalPipeline<'r> {
    rewriter: Option<&'r dyn QueryRewriter>,
    retriever: Bm25Retriever,
    threads: usize,
}

impl<'r> RetrievalPipeline<'r> {
    /// Create a pipeline that ranks queries as given
    pub fn new(retriever: Bm25Retriever) -> Self {
        Self {
            rewriter: None,
            retriever,
            threads: 1,
        }
    }

    /// Run `rewriter` on every query before ranking
    pub fn with_rewriter(mut self, rewriter: &'r dyn QueryRewriter) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Same as [`with_rewriter`](Self::with_rewriter), accepting `None`
    pub fn with_optional_rewriter(mut self, rewriter: Option<&'r dyn QueryRewriter>) -> Self {
        self.rewriter = rewriter;
        self
    }

    /// Number of worker threads used by [`transform`](Self::transform)
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn has_rewrite_stage(&self) -> bool {
        self.rewriter.is_some()
    }

    pub fn retriever(&self) -> &Bm25Retriever {
        &self.retriever
    }

    /// Rank a single ad-hoc query
    pub fn search(&self, query: &str) -> Result<ResultTable> {
        let rows = self.run_topic(&Topic::new(ADHOC_QID, query))?;
        Ok(ResultTable::from_rows(rows))
    }

    /// Rank every topic; rows are grouped in topic order
    pub fn transform(&self, topics: &[Topic]) -> Result<ResultTable> {
        tracing::info!(
            topics = topics.len(),
            threads = self.threads,
            rewrite = self.has_rewrite_stage(),
            "Running retrieval pipeline"
        );

        let per_topic: Vec<Vec<ScoredDoc>> = if self.threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()
                .map_err(|e| QuerylabError::ConfigInvalid {
                    key: "threads".to_string(),
                    reason: e.to_string(),
                })?;
            pool.install(|| {
                topics
                    .par_iter()
                    .map(|topic| self.run_topic(topic))
                    .collect::<Result<Vec<_>>>()
            })?
        } else {
            topics.iter().map(|topic| self.run_topic(topic)).collect::<Result<_>>()?
        };

        Ok(per_topic.into_iter().flatten().collect())
    }

    fn run_topic(&self, topic: &Topic) -> Result<Vec<ScoredDoc>> {
        let Some(rewriter) = self.rewriter else {
            return self.retriever.retrieve(topic);
        };

        let rewritten = Topic::new(topic.qid.clone(), rewriter.rewrite(&topic.query));
        tracing::debug!(qid = %topic.qid, original = %topic.query, rewritten = %rewritten.query, "Rewrote query");

        let mut rows = self.retriever.retrieve(&rewritten)?;
        for row in &mut rows {
            row.original_query = Some(topic.query.clone());
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexHandle, IndexSettings};
    use crate::retriever::DEFAULT_NUM_RESULTS;
    use crate::testing::tiny_dataset;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn retriever(dir: &TempDir) -> (Bm25Retriever, Vec<Topic>) {
        let dataset = tiny_dataset(dir.path());
        let index = IndexHandle::build_or_load(&dataset, &IndexSettings::in_memory()).unwrap();
        (Bm25Retriever::new(Arc::new(index), DEFAULT_NUM_RESULTS), dataset.topics().to_vec())
    }

    #[test]
    fn test_search_uses_adhoc_qid() {
        let dir = TempDir::new().unwrap();
        let (bm25, _) = retriever(&dir);

        let table = RetrievalPipeline::new(bm25).search("fox").unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.rows().iter().all(|row| row.qid == ADHOC_QID));
        assert!(table.rows().iter().all(|row| row.original_query.is_none()));
    }

    #[test]
    fn test_rewrite_stage_keeps_original_query() {
        let dir = TempDir::new().unwrap();
        let (bm25, _) = retriever(&dir);
        let rewriter = |q: &str| q.replace("zebra", "quantum");

        let table = RetrievalPipeline::new(bm25).with_rewriter(&rewriter).search("zebra").unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.docno, "d5");
        assert_eq!(row.query, "quantum");
        assert_eq!(row.original_query.as_deref(), Some("zebra"));
    }

    #[test]
    fn test_parallel_transform_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let (bm25, topics) = retriever(&dir);

        let sequential = RetrievalPipeline::new(bm25.clone()).transform(&topics).unwrap();
        let parallel = RetrievalPipeline::new(bm25).with_threads(4).transform(&topics).unwrap();

        assert_eq!(sequential, parallel);
        let qids: Vec<&str> = sequential.rows().iter().map(|r| r.qid.as_str()).collect();
        let mut deduped = qids.clone();
        deduped.dedup();
        assert_eq!(deduped, vec!["q1", "q2", "q3"]);
    }
}
