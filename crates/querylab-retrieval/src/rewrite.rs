//! Query rewriting stages that run in front of the ranker

use querylab_core::error::{QuerylabError, Result};
use querylab_core::loading::require_file;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Turns a query string into the string that is actually searched
pub trait QueryRewriter: Send + Sync {
    fn rewrite(&self, query: &str) -> String;
}

impl<F> QueryRewriter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn rewrite(&self, query: &str) -> String {
        self(query)
    }
}

/// Leaves queries untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl QueryRewriter for Identity {
    fn rewrite(&self, query: &str) -> String {
        query.to_string()
    }
}

/// Looks queries up in a precomputed table of rewrites.
///
/// Queries without an entry pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct MappedRewriter {
    rewrites: HashMap<String, String>,
}

impl MappedRewriter {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rewrites: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Read `original<TAB>rewritten` lines
    pub fn from_file(path: &Path) -> Result<Self> {
        require_file(path)?;
        let content = fs::read_to_string(path)?;

        let mut rewrites = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (original, rewritten) =
                line.split_once('\t').ok_or_else(|| QuerylabError::DatasetFormat {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    reason: "expected original<TAB>rewritten".to_string(),
                })?;
            rewrites.insert(original.trim().to_string(), rewritten.trim().to_string());
        }

        tracing::info!(path = %path.display(), entries = rewrites.len(), "Loaded query rewrites");
        Ok(Self { rewrites })
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }
}

impl QueryRewriter for MappedRewriter {
    fn rewrite(&self, query: &str) -> String {
        self.rewrites.get(query.trim()).cloned().unwrap_or_else(|| query.to_string())
    }
}
