//! Querylab Retrieval - BM25 indexing, ranking and evaluation
//!
//! This crate builds the tantivy index for a dataset, ranks queries with BM25,
//! optionally rewrites them first, and scores runs by mean average precision.

pub mod eval;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod retriever;
pub mod rewrite;
pub mod scaffold;

#[cfg(test)]
mod testing;

pub use eval::{average_precision, evaluate, DEFAULT_RELEVANCE_THRESHOLD};
pub use index::{IndexHandle, IndexPhase, IndexProgress, IndexSettings};
pub use models::{Evaluation, IndexStats, TopicScore};
pub use pipeline::RetrievalPipeline;
pub use retriever::{Bm25Retriever, DEFAULT_NUM_RESULTS};
pub use rewrite::{Identity, MappedRewriter, QueryRewriter};
pub use scaffold::{Scaffold, ScaffoldOptions};
