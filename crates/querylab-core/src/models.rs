pub mod dataset;
pub mod document;
pub mod index;
pub mod query;

pub use dataset::{Dataset, DatasetEntry, DatasetSpec, DEFAULT_DATASET};
pub use document::{Document, MetaLimits};
pub use index::{IndexMode, IndexState};
pub use query::{Qrel, Qrels, ResultTable, ScoredDoc, Topic};
