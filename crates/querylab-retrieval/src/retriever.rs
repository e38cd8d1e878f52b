use querylab_core::error::Result;
use querylab_core::models::{ScoredDoc, Topic};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::TantivyDocument;

use crate::index::{engine_error, IndexHandle};

/// Default retrieval depth
pub const DEFAULT_NUM_RESULTS: usize = 1000;

/// BM25 ranking over an [`IndexHandle`]
///
/// Query text is run through the index's own analyzer and every token becomes
/// an optional clause, so documents matching any term are ranked. Scoring is
/// tantivy's BM25 (k1 = 1.2, b = 0.75).
#[derive(Clone)]
pub struct Bm25Retriever {
    index: Arc<IndexHandle>,
    num_results: usize,
}

impl Bm25Retriever {
    pub fn new(index: Arc<IndexHandle>, num_results: usize) -> Self {
        Self { index, num_results }
    }

    /// A copy of this retriever cut off after `k` results
    pub fn with_limit(&self, k: usize) -> Self {
        Self {
            index: Arc::clone(&self.index),
            num_results: k,
        }
    }

    pub fn num_results(&self) -> usize {
        self.num_results
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Rank documents for one topic.
    ///
    /// Rows come back ordered by descending score; equal scores are ordered by
    /// ascending docid.
    pub fn retrieve(&self, topic: &Topic) -> Result<Vec<ScoredDoc>> {
        let terms = self.index.query_terms(&topic.query)?;
        if terms.is_empty() || self.num_results == 0 {
            tracing::debug!(qid = %topic.qid, "Query has no searchable terms");
            return Ok(Vec::new());
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .into_iter()
            .map(|term| {
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();
        let query = BooleanQuery::new(clauses);

        let searcher = self.index.searcher();
        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(self.num_results))
            .map_err(engine_error)?;

        let fields = self.index.fields();
        let mut rows = Vec::with_capacity(top_docs.len());
        for (score, address) in top_docs {
            let stored: TantivyDocument = searcher.doc(address).map_err(engine_error)?;
            let docid = stored.get_first(fields.docid).and_then(|v| v.as_u64()).unwrap_or_default();
            let docno = stored
                .get_first(fields.docno)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let text = stored
                .get_first(fields.text)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            rows.push(ScoredDoc {
                qid: topic.qid.clone(),
                docid,
                docno,
                rank: 0,
                score,
                query: topic.query.clone(),
                original_query: None,
                text,
            });
        }

        rows.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.docid.cmp(&b.docid)));
        for (rank, row) in rows.iter_mut().enumerate() {
            row.rank = rank;
        }

        tracing::debug!(qid = %topic.qid, retrieved = rows.len(), "Retrieved");
        Ok(rows)
    }
}
