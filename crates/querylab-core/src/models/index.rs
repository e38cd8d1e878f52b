use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the retrieval index lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Persistent index directory, reused across runs
    Disk,
    /// Index held in RAM, rebuilt every process
    Memory,
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexMode::Disk => write!(f, "disk"),
            IndexMode::Memory => write!(f, "memory"),
        }
    }
}

/// Index build state, persisted next to a disk index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexState {
    /// Dataset the index was built from
    pub dataset: String,

    /// Number of indexed documents
    pub document_count: usize,

    /// Fingerprint of the indexed corpus
    pub fingerprint: String,

    /// Documents whose metadata was truncated during indexing
    #[serde(default)]
    pub truncated_count: usize,

    /// When the index was built
    pub built_at: DateTime<Utc>,
}

impl IndexState {
    /// File name of the state sidecar inside the index directory
    pub const FILE_NAME: &'static str = "querylab-state.json";
}
