//! Shared fixtures for unit tests

use querylab_core::models::{Dataset, DatasetSpec};
use std::fs;
use std::path::Path;

/// Five documents, four topics, judgments for all four.
///
/// With BM25 over this corpus q1-q3 rank their relevant documents first and
/// q4 ("zebra") retrieves nothing, so MAP at threshold 1 is 0.75.
pub fn tiny_dataset(root: &Path) -> Dataset {
    fs::write(
        root.join("collection.tsv"),
        "d1\tthe quick brown fox jumps over the lazy dog\n\
         d2\ta fox in the henhouse\n\
         d3\tlazy afternoon by the river\n\
         d4\tbrown bears and brown rivers\n\
         d5\tquantum retrieval models\n",
    )
    .unwrap();
    fs::write(root.join("queries.tsv"), "q1\tfox\nq2\tbrown\nq3\triver\nq4\tzebra\n").unwrap();
    fs::write(
        root.join("test.qrel"),
        "q1 U0 d2 3\nq1 U0 d1 2\nq2 U0 d4 4\nq3 U0 d3 1\nq4 U0 d5 1\n",
    )
    .unwrap();

    Dataset::load(DatasetSpec {
        name: "tiny".to_string(),
        corpus: root.join("collection.tsv"),
        topics: root.join("queries.tsv"),
        qrels: root.join("test.qrel"),
        exclude_topics: None,
    })
    .unwrap()
}
