//! End-to-end tests driving the scaffold from a config file

mod common;

use common::sample_config;
use querylab_core::models::Topic;
use querylab_retrieval::{Identity, MappedRewriter, QueryRewriter, Scaffold};
use tempfile::TempDir;

#[test]
fn test_search_returns_top_k_in_score_order() {
    let dir = TempDir::new().unwrap();
    let scaffold = Scaffold::open(&sample_config(dir.path(), "memory")).unwrap();

    let table = scaffold.search("rice sky plants the").unwrap();
    assert!(table.len() <= 3);
    assert!(!table.is_empty());

    for (expected_rank, row) in table.rows().iter().enumerate() {
        assert_eq!(row.rank, expected_rank);
        assert_eq!(row.qid, "1");
    }
    for pair in table.rows().windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_excluded_topics_are_not_evaluated() {
    let dir = TempDir::new().unwrap();
    let scaffold = Scaffold::open(&sample_config(dir.path(), "memory")).unwrap();

    let qids: Vec<&str> = scaffold.dataset().topics().iter().map(|t| t.qid.as_str()).collect();
    assert_eq!(qids, vec!["101", "102", "103"]);

    let evaluation = scaffold.evaluate_detailed(scaffold.dataset().topics(), None).unwrap();
    assert!(evaluation.topic("104").is_none());
    assert_eq!(evaluation.evaluated_topics(), 3);
}

#[test]
fn test_disk_and_memory_indexes_agree() {
    let disk_dir = TempDir::new().unwrap();
    let memory_dir = TempDir::new().unwrap();

    let disk = Scaffold::open(&sample_config(disk_dir.path(), "disk")).unwrap();
    let memory = Scaffold::open(&sample_config(memory_dir.path(), "memory")).unwrap();

    assert!(disk_dir.path().join("index").join("meta.json").is_file());
    assert_eq!(disk.index().document_count(), 6);
    assert_eq!(memory.index().document_count(), 6);

    let disk_docnos: Vec<String> =
        disk.search("rice").unwrap().into_rows().into_iter().map(|r| r.docno).collect();
    let memory_docnos: Vec<String> =
        memory.search("rice").unwrap().into_rows().into_iter().map(|r| r.docno).collect();
    assert_eq!(disk_docnos, memory_docnos);

    assert_eq!(disk.evaluate_all(None).unwrap(), memory.evaluate_all(None).unwrap());
}

#[test]
fn test_disk_index_is_reused_between_opens() {
    let dir = TempDir::new().unwrap();
    let config = sample_config(dir.path(), "disk");

    let first = Scaffold::open(&config).unwrap();
    assert!(first.index().stats().freshly_built);
    drop(first);

    let second = Scaffold::open(&config).unwrap();
    assert!(!second.index().stats().freshly_built);

    let rebuilt = Scaffold::open_with_progress(&config, true, |_| {}).unwrap();
    assert!(rebuilt.index().stats().freshly_built);
}

#[test]
fn test_identity_rewrite_keeps_map() {
    let dir = TempDir::new().unwrap();
    let scaffold = Scaffold::open(&sample_config(dir.path(), "memory")).unwrap();

    let baseline = scaffold.evaluate_all(None).unwrap();
    let identity = scaffold.evaluate_all(Some(&Identity)).unwrap();
    assert_eq!(baseline, identity);
    assert!((0.0..=1.0).contains(&baseline));
}

#[test]
fn test_rewrites_improve_map() {
    let dir = TempDir::new().unwrap();
    let scaffold = Scaffold::open(&sample_config(dir.path(), "memory")).unwrap();

    // "colour" and "houseplant" never occur in the corpus
    let baseline = scaffold.evaluate_all(None).unwrap();

    let rewrites = MappedRewriter::from_pairs([
        ("sky colour", "sky blue red"),
        ("houseplant care", "houseplants plants"),
    ]);
    let rewritten = scaffold.evaluate_all(Some(&rewrites as &dyn QueryRewriter)).unwrap();
    assert!(rewritten > baseline);

    let closure = |q: &str| format!("{} rice", q);
    let topics = vec![Topic::new("101", "cooking")];
    assert_eq!(scaffold.evaluate(&topics, Some(&closure)).unwrap(), 1.0);
}
