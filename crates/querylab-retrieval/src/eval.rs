//! Mean average precision over a run, computed the way trec_eval does
//!
//! Rows of each topic are re-sorted by descending score with ties broken by
//! descending docno, so the measure depends only on scores and not on the
//! order rows were produced in. A document counts as relevant when its grade
//! is at least the relevance threshold.

use querylab_core::models::{Qrels, ResultTable, ScoredDoc, Topic};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::models::{Evaluation, TopicScore};

/// Lowest grade counted as relevant by default
pub const DEFAULT_RELEVANCE_THRESHOLD: i32 = 1;

/// Average precision of one ranking.
///
/// `ranking` is in rank order. Repeated docnos only count once. Returns 0.0
/// when no judged document reaches `threshold`.
pub fn average_precision(ranking: &[&str], judged: &HashMap<String, i32>, threshold: i32) -> f64 {
    score_ranking(ranking, judged, threshold).0
}

/// Evaluate `run` against `qrels` for every topic in `topics`.
///
/// Topics without judgments are skipped and counted in
/// [`Evaluation::unjudged_topics`]. Judged topics with nothing retrieved
/// contribute 0.0.
pub fn evaluate(run: &ResultTable, topics: &[Topic], qrels: &Qrels, threshold: i32) -> Evaluation {
    let mut by_topic: HashMap<&str, Vec<&ScoredDoc>> = HashMap::new();
    for row in run.rows() {
        by_topic.entry(row.qid.as_str()).or_default().push(row);
    }

    let mut seen = HashSet::new();
    let mut per_topic = Vec::new();
    let mut unjudged_topics = 0;

    for topic in topics {
        if !seen.insert(topic.qid.as_str()) {
            continue;
        }
        let Some(judged) = qrels.judgments(&topic.qid) else {
            unjudged_topics += 1;
            continue;
        };

        let mut rows = by_topic.remove(topic.qid.as_str()).unwrap_or_default();
        rows.sort_by(|a, b| trec_order(a, b));
        let ranking: Vec<&str> = rows.iter().map(|row| row.docno.as_str()).collect();

        let (average_precision, relevant, relevant_retrieved, retrieved) =
            score_ranking(&ranking, judged, threshold);
        per_topic.push(TopicScore {
            qid: topic.qid.clone(),
            average_precision,
            retrieved,
            relevant,
            relevant_retrieved,
        });
    }

    if unjudged_topics > 0 {
        tracing::warn!(unjudged_topics, "Skipped topics without relevance judgments");
    }

    let map = if per_topic.is_empty() {
        0.0
    } else {
        per_topic.iter().map(|score| score.average_precision).sum::<f64>() / per_topic.len() as f64
    };

    tracing::info!(map, topics = per_topic.len(), "Evaluated run");
    Evaluation {
        map,
        per_topic,
        unjudged_topics,
    }
}

/// Descending score, then descending docno
fn trec_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| b.docno.cmp(&a.docno))
}

/// (average precision, relevant, relevant retrieved, retrieved)
fn score_ranking(
    ranking: &[&str],
    judged: &HashMap<String, i32>,
    threshold: i32,
) -> (f64, usize, usize, usize) {
    let relevant = judged.values().filter(|grade| **grade >= threshold).count();

    let mut seen = HashSet::new();
    let mut retrieved = 0usize;
    let mut relevant_retrieved = 0usize;
    let mut precision_sum = 0.0;

    for docno in ranking {
        if !seen.insert(*docno) {
            continue;
        }
        retrieved += 1;
        if judged.get(*docno).is_some_and(|grade| *grade >= threshold) {
            relevant_retrieved += 1;
            precision_sum += relevant_retrieved as f64 / retrieved as f64;
        }
    }

    let average_precision = if relevant == 0 { 0.0 } else { precision_sum / relevant as f64 };
    (average_precision, relevant, relevant_retrieved, retrieved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use querylab_core::models::Qrel;

    fn judged(pairs: &[(&str, i32)]) -> HashMap<String, i32> {
        pairs.iter().map(|(docno, grade)| (docno.to_string(), *grade)).collect()
    }

    fn row(qid: &str, docno: &str, score: f32) -> ScoredDoc {
        ScoredDoc {
            qid: qid.to_string(),
            docid: 0,
            docno: docno.to_string(),
            rank: 0,
            score,
            query: String::new(),
            original_query: None,
            text: String::new(),
        }
    }

    fn qrel(qid: &str, docno: &str, relevance: i32) -> Qrel {
        Qrel {
            qid: qid.to_string(),
            docno: docno.to_string(),
            relevance,
        }
    }

    #[test]
    fn test_perfect_ranking() {
        let judged = judged(&[("a", 2), ("b", 1)]);
        assert_eq!(average_precision(&["a", "b", "c"], &judged, 1), 1.0);
    }

    #[test]
    fn test_interleaved_ranking() {
        // Relevant at ranks 1 and 3: (1/1 + 2/3) / 2
        let judged = judged(&[("a", 1), ("c", 1)]);
        let ap = average_precision(&["a", "b", "c"], &judged, 1);
        assert!((ap - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_unretrieved_relevant_documents_count() {
        let judged = judged(&[("a", 1), ("z", 1)]);
        assert_eq!(average_precision(&["a"], &judged, 1), 0.5);
    }

    #[test]
    fn test_threshold_filters_grades() {
        let judged = judged(&[("a", 1), ("b", 3)]);
        assert_eq!(average_precision(&["a", "b"], &judged, 3), 0.5);
        assert_eq!(average_precision(&["a", "b"], &judged, 5), 0.0);
    }

    #[test]
    fn test_duplicates_count_once() {
        let judged = judged(&[("a", 1)]);
        assert_eq!(average_precision(&["b", "b", "a"], &judged, 1), 0.5);
    }

    #[test]
    fn test_evaluate_resorts_by_score() {
        let run = ResultTable::from_rows(vec![row("q1", "b", 1.0), row("q1", "a", 2.0)]);
        let topics = vec![Topic::new("q1", "x")];
        let qrels: Qrels = vec![qrel("q1", "a", 1)].into_iter().collect();

        let evaluation = evaluate(&run, &topics, &qrels, 1);
        assert_eq!(evaluation.map, 1.0);
    }

    #[test]
    fn test_ties_break_on_descending_docno() {
        let run = ResultTable::from_rows(vec![row("q1", "a", 1.0), row("q1", "b", 1.0)]);
        let topics = vec![Topic::new("q1", "x")];
        let qrels: Qrels = vec![qrel("q1", "a", 1)].into_iter().collect();

        let evaluation = evaluate(&run, &topics, &qrels, 1);
        assert_eq!(evaluation.map, 0.5);
    }

    #[test]
    fn test_topic_accounting() {
        let run = ResultTable::from_rows(vec![row("q1", "a", 1.0)]);
        let topics = vec![Topic::new("q1", "x"), Topic::new("q2", "y"), Topic::new("q3", "z")];
        let qrels: Qrels = vec![qrel("q1", "a", 1), qrel("q2", "b", 1)].into_iter().collect();

        let evaluation = evaluate(&run, &topics, &qrels, 1);
        assert_eq!(evaluation.evaluated_topics(), 2);
        assert_eq!(evaluation.unjudged_topics, 1);
        assert_eq!(evaluation.topic("q2").unwrap().average_precision, 0.0);
        assert_eq!(evaluation.map, 0.5);
    }

    #[test]
    fn test_empty_evaluation() {
        let evaluation = evaluate(&ResultTable::new(), &[], &Qrels::new(), 1);
        assert_eq!(evaluation.map, 0.0);
        assert_eq!(evaluation.evaluated_topics(), 0);
    }

    fn ranking_strategy() -> impl Strategy<Value = (Vec<String>, Vec<(String, i32)>)> {
        let docno = "[a-h]";
        (
            prop::collection::vec(docno, 0..12),
            prop::collection::vec((docno, 0i32..4), 0..8),
        )
    }

    proptest! {
        /// Property: average precision is always within [0, 1]
        #[test]
        fn prop_average_precision_bounded((ranking, judgments) in ranking_strategy()) {
            let judged: HashMap<String, i32> = judgments.into_iter().collect();
            let ranking: Vec<&str> = ranking.iter().map(String::as_str).collect();

            let ap = average_precision(&ranking, &judged, 1);
            prop_assert!((0.0..=1.0).contains(&ap), "ap {} out of range", ap);
        }

        /// Property: ranking every relevant document first scores 1.0
        #[test]
        fn prop_relevant_first_is_perfect((_, judgments) in ranking_strategy()) {
            let judged: HashMap<String, i32> = judgments.into_iter().collect();
            prop_assume!(judged.values().any(|grade| *grade >= 1));

            let mut ranking: Vec<&str> = judged
                .iter()
                .filter(|(_, grade)| **grade >= 1)
                .map(|(docno, _)| docno.as_str())
                .collect();
            ranking.push("zz");

            prop_assert_eq!(average_precision(&ranking, &judged, 1), 1.0);
        }
    }
}
