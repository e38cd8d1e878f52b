use serde::{Deserialize, Serialize};

/// A corpus document as read from the collection file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// External document identifier
    pub docno: String,

    /// Document body
    pub text: String,
}

impl Document {
    pub fn new(docno: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            docno: docno.into(),
            text: text.into(),
        }
    }
}

/// Maximum stored lengths (in bytes) for document metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaLimits {
    pub docno: usize,
    pub text: usize,
}

impl Default for MetaLimits {
    fn default() -> Self {
        Self {
            docno: 32,
            text: 131_072,
        }
    }
}

impl MetaLimits {
    /// Truncate the document's fields to these limits.
    ///
    /// Returns true if any field was shortened.
    pub fn apply(&self, doc: &mut Document) -> bool {
        let docno_cut = truncate_at_char_boundary(&mut doc.docno, self.docno);
        let text_cut = truncate_at_char_boundary(&mut doc.text, self.text);
        docno_cut || text_cut
    }
}

fn truncate_at_char_boundary(value: &mut String, max_bytes: usize) -> bool {
    if value.len() <= max_bytes {
        return false;
    }

    let mut cut = max_bytes;
    while !value.is_char_boundary(cut) {
        cut -= 1;
    }
    value.truncate(cut);
    true
}
