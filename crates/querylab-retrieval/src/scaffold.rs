//! Entry point for query rewriting experiments
//!
//! A [`Scaffold`] owns a loaded dataset and its BM25 index. `search` runs a
//! single query and keeps the top results; `evaluate` scores a set of topics,
//! optionally rewritten first, by mean average precision.

use querylab_core::config::LayeredConfig;
use querylab_core::error::Result;
use querylab_core::models::{Dataset, ResultTable, Topic};
use std::sync::Arc;

use crate::eval::{self, DEFAULT_RELEVANCE_THRESHOLD};
use crate::index::{IndexHandle, IndexProgress, IndexSettings};
use crate::models::Evaluation;
use crate::pipeline::RetrievalPipeline;
use crate::retriever::{Bm25Retriever, DEFAULT_NUM_RESULTS};
use crate::rewrite::QueryRewriter;

/// Knobs for search and evaluation
#[derive(Debug, Clone, Copy)]
pub struct ScaffoldOptions {
    /// Retrieval depth for evaluation runs
    pub num_results: usize,

    /// Rows kept by [`Scaffold::search`]
    pub top_k: usize,

    /// Lowest grade counted as relevant
    pub relevance_threshold: i32,

    /// Worker threads used while evaluating topics
    pub threads: usize,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        Self {
            num_results: DEFAULT_NUM_RESULTS,
            top_k: 10,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
            threads: 1,
        }
    }
}

impl ScaffoldOptions {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            num_results: config.num_results.value,
            top_k: config.top_k.value,
            relevance_threshold: config.relevance_threshold.value,
            threads: config.threads.value,
        }
    }
}

/// A dataset paired with its BM25 index
pub struct Scaffold {
    dataset: Dataset,
    index: Arc<IndexHandle>,
    bm25: Bm25Retriever,
    options: ScaffoldOptions,
}

impl Scaffold {
    /// Load the configured dataset and build or reuse its index
    pub fn open(config: &LayeredConfig) -> Result<Self> {
        Self::open_with_progress(config, false, |_| {})
    }

    /// Same as [`open`](Self::open) with index progress reporting; `force`
    /// rebuilds a disk index even if one exists
    pub fn open_with_progress<F>(config: &LayeredConfig, force: bool, progress: F) -> Result<Self>
    where
        F: FnMut(IndexProgress),
    {
        let dataset = Dataset::load(config.dataset_spec()?)?;
        let settings = IndexSettings::from_config(config).with_force(force);
        let index = IndexHandle::build_or_load_with_progress(&dataset, &settings, progress)?;

        Ok(Self::new(dataset, index, ScaffoldOptions::from_config(config)))
    }

    pub fn new(dataset: Dataset, index: IndexHandle, options: ScaffoldOptions) -> Self {
        let index = Arc::new(index);
        let bm25 = Bm25Retriever::new(Arc::clone(&index), options.num_results);
        Self {
            dataset,
            index,
            bm25,
            options,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    pub fn options(&self) -> ScaffoldOptions {
        self.options
    }

    /// Run one query through BM25 and keep the top `top_k` rows
    pub fn search(&self, query: &str) -> Result<ResultTable> {
        self.search_top(query, self.options.top_k)
    }

    /// Run one query through BM25 and keep the top `k` rows
    pub fn search_top(&self, query: &str, k: usize) -> Result<ResultTable> {
        RetrievalPipeline::new(self.bm25.with_limit(k)).search(query)
    }

    /// MAP of `topics`, rewritten by `rewriter` when given
    pub fn evaluate(&self, topics: &[Topic], rewriter: Option<&dyn QueryRewriter>) -> Result<f64> {
        Ok(self.evaluate_detailed(topics, rewriter)?.map)
    }

    /// MAP with per-topic average precision
    pub fn evaluate_detailed(
        &self,
        topics: &[Topic],
        rewriter: Option<&dyn QueryRewriter>,
    ) -> Result<Evaluation> {
        let run = self.run(topics, rewriter)?;
        Ok(eval::evaluate(
            &run,
            topics,
            self.dataset.qrels(),
            self.options.relevance_threshold,
        ))
    }

    /// MAP over every topic of the dataset
    pub fn evaluate_all(&self, rewriter: Option<&dyn QueryRewriter>) -> Result<f64> {
        self.evaluate(self.dataset.topics(), rewriter)
    }

    /// Ranked results for `topics` at the full retrieval depth
    pub fn run(&self, topics: &[Topic], rewriter: Option<&dyn QueryRewriter>) -> Result<ResultTable> {
        RetrievalPipeline::new(self.bm25.clone())
            .with_optional_rewriter(rewriter)
            .with_threads(self.options.threads)
            .transform(topics)
    }
}
