//! Readers for collection, topic, and judgment files

use serde::Deserialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::error::{QuerylabError, Result};
use crate::models::{Document, Qrel, Qrels, Topic};

/// On-disk layout of a collection file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    /// `docno<TAB>text` per line
    Tsv,
    /// One JSON object per line with `_id`/`docno`, optional `title`, and `text`
    Jsonl,
}

impl CorpusFormat {
    /// Pick the format from the file extension
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl") => CorpusFormat::Jsonl,
            _ => CorpusFormat::Tsv,
        }
    }
}

#[derive(Deserialize)]
struct JsonlDocument {
    #[serde(alias = "_id")]
    docno: String,
    #[serde(default)]
    title: String,
    text: String,
}

/// Streaming reader over a collection file
pub struct CorpusReader {
    path: PathBuf,
    format: CorpusFormat,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl CorpusReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = open_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format: CorpusFormat::detect(path),
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    pub fn format(&self) -> CorpusFormat {
        self.format
    }

    fn parse(&self, line: &str) -> Result<Document> {
        match self.format {
            CorpusFormat::Tsv => {
                let (docno, text) = split_tab(line)
                    .ok_or_else(|| self.malformed("expected docno<TAB>text"))?;
                Ok(Document::new(docno, text))
            }
            CorpusFormat::Jsonl => {
                let raw: JsonlDocument =
                    serde_json::from_str(line).map_err(|e| self.malformed(e.to_string()))?;
                if raw.docno.trim().is_empty() {
                    return Err(self.malformed("empty document id"));
                }
                let text = if raw.title.is_empty() {
                    raw.text
                } else {
                    format!("{} {}", raw.title, raw.text)
                };
                Ok(Document::new(raw.docno, text))
            }
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> QuerylabError {
        QuerylabError::DatasetFormat {
            path: self.path.clone(),
            line: self.line_no,
            reason: reason.into(),
        }
    }
}

impl Iterator for CorpusReader {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse(&line));
        }
    }
}

/// Read a `qid<TAB>query` topics file
pub fn read_topics(path: &Path) -> Result<Vec<Topic>> {
    let mut topics = Vec::new();
    for (line_no, line) in non_blank_lines(path)? {
        let (qid, query) = split_tab(&line).ok_or_else(|| QuerylabError::DatasetFormat {
            path: path.to_path_buf(),
            line: line_no,
            reason: "expected qid<TAB>query".to_string(),
        })?;
        topics.push(Topic::new(qid, query));
    }
    Ok(topics)
}

/// Read a TREC-format qrels file: `qid iteration docno relevance`
pub fn read_qrels(path: &Path) -> Result<Qrels> {
    let mut qrels = Qrels::new();
    for (line_no, line) in non_blank_lines(path)? {
        let malformed = |reason: String| QuerylabError::DatasetFormat {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [qid, _iteration, docno, relevance] = fields.as_slice() else {
            return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
        };

        let relevance = relevance
            .parse::<i32>()
            .map_err(|_| malformed(format!("invalid relevance grade '{}'", relevance)))?;

        qrels.insert(Qrel {
            qid: qid.to_string(),
            docno: docno.to_string(),
            relevance,
        });
    }
    Ok(qrels)
}

/// Read a list of topic ids, one per line; extra columns are ignored
pub fn read_qid_list(path: &Path) -> Result<HashSet<String>> {
    Ok(non_blank_lines(path)?
        .filter_map(|(_, line)| line.split_whitespace().next().map(str::to_string))
        .collect())
}

/// Error unless `path` is an existing regular file
pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(QuerylabError::DatasetFileMissing { path: path.to_path_buf() })
    }
}

/// Stable digest over the documents of a collection
#[derive(Default)]
pub struct Fingerprint {
    hasher: DefaultHasher,
    documents: usize,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, doc: &Document) {
        doc.docno.hash(&mut self.hasher);
        doc.text.hash(&mut self.hasher);
        self.documents += 1;
    }

    pub fn finish(&self) -> String {
        let mut hasher = self.hasher.clone();
        self.documents.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

fn open_file(path: &Path) -> Result<File> {
    require_file(path)?;
    Ok(File::open(path)?)
}

fn non_blank_lines(path: &Path) -> Result<impl Iterator<Item = (usize, String)>> {
    let file = open_file(path)?;
    let lines = BufReader::new(file).lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty()))
}

fn split_tab(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let (head, rest) = line.split_once('\t')?;
    let head = head.trim();
    if head.is_empty() {
        return None;
    }
    Some((head, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_read_tsv_corpus() {
        let file = write_temp("d1\tfirst doc\n\nd2\tsecond\tdoc\r\n");
        let docs: Vec<Document> =
            CorpusReader::open(file.path()).unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], Document::new("d1", "first doc"));
        assert_eq!(docs[1], Document::new("d2", "second\tdoc"));
    }

    #[test]
    fn test_malformed_tsv_reports_line() {
        let file = write_temp("d1\tok\nmissing-tab\n");
        let results: Vec<Result<Document>> = CorpusReader::open(file.path()).unwrap().collect();

        assert!(results[0].is_ok());
        match &results[1] {
            Err(QuerylabError::DatasetFormat { line, .. }) => assert_eq!(*line, 2),
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_jsonl_corpus() {
        let mut file = Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, r#"{{"_id": "a", "title": "Title", "text": "body"}}"#).unwrap();
        writeln!(file, r#"{{"docno": "b", "text": "plain"}}"#).unwrap();

        let reader = CorpusReader::open(file.path()).unwrap();
        assert_eq!(reader.format(), CorpusFormat::Jsonl);

        let docs: Vec<Document> = reader.collect::<Result<_>>().unwrap();
        assert_eq!(docs[0], Document::new("a", "Title body"));
        assert_eq!(docs[1], Document::new("b", "plain"));
    }

    #[test]
    fn test_read_topics() {
        let file = write_temp("1\twhat is bm25\n2\twhy is the sky blue\n");
        let topics = read_topics(file.path()).unwrap();
        assert_eq!(topics, vec![
            Topic::new("1", "what is bm25"),
            Topic::new("2", "why is the sky blue"),
        ]);
    }

    #[test]
    fn test_read_qrels() {
        let file = write_temp("1 Q0 d1 3\n1 U0 d2 1\n2 0 d3 4\n");
        let qrels = read_qrels(file.path()).unwrap();
        assert_eq!(qrels.topic_count(), 2);
        assert_eq!(qrels.judgments("1").unwrap()["d1"], 3);
        assert_eq!(qrels.judgments("2").unwrap()["d3"], 4);
    }

    #[test]
    fn test_read_qrels_rejects_bad_grade() {
        let file = write_temp("1 Q0 d1 high\n");
        assert!(matches!(
            read_qrels(file.path()),
            Err(QuerylabError::DatasetFormat { line: 1, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = read_topics(Path::new("/definitely/not/here.tsv")).unwrap_err();
        assert!(matches!(err, QuerylabError::DatasetFileMissing { .. }));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let a = Document::new("a", "x");
        let b = Document::new("b", "y");

        let mut first = Fingerprint::new();
        first.update(&a);
        first.update(&b);

        let mut second = Fingerprint::new();
        second.update(&b);
        second.update(&a);

        assert_ne!(first.finish(), second.finish());
        assert_eq!(first.finish().len(), 16);
    }
}
