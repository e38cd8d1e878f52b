use chrono::Utc;
use querylab_core::config::LayeredConfig;
use querylab_core::error::{QuerylabError, Result};
use querylab_core::loading::Fingerprint;
use querylab_core::models::{Dataset, IndexMode, IndexState, MetaLimits};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tantivy::schema::{Field, Schema, FAST, INDEXED, STORED, STRING, TEXT};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Searcher, Term};

use crate::models::IndexStats;

/// File tantivy writes as soon as an index directory is created
const META_FILE: &str = "meta.json";

/// Emit a progress update every this many documents
const PROGRESS_INTERVAL: usize = 10_000;

/// Progress information for index building
#[derive(Debug, Clone)]
pub struct IndexProgress {
    pub phase: IndexPhase,
    pub current: usize,
    /// Zero while the total is unknown (the corpus is streamed)
    pub total: usize,
    pub message: String,
}

/// Current phase of index building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexPhase {
    Initializing,
    Loading,
    Indexing,
    Committing,
    Finalizing,
}

/// How to obtain an index
#[derive(Debug, Clone)]
pub struct IndexSettings {
    pub mode: IndexMode,

    /// Index directory, used in disk mode
    pub path: PathBuf,

    /// Rebuild even if a disk index already exists
    pub force: bool,

    /// Heap budget for the index writer, in bytes
    pub writer_heap_bytes: usize,

    pub meta_limits: MetaLimits,
}

impl IndexSettings {
    pub fn in_memory() -> Self {
        Self {
            mode: IndexMode::Memory,
            path: PathBuf::new(),
            force: false,
            writer_heap_bytes: 50_000_000,
            meta_limits: MetaLimits::default(),
        }
    }

    pub fn on_disk(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: IndexMode::Disk,
            path: path.into(),
            ..Self::in_memory()
        }
    }

    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            mode: config.index_mode.value,
            path: config.index_path.value.clone(),
            force: false,
            writer_heap_bytes: config.writer_heap_mb.value.saturating_mul(1_000_000),
            meta_limits: MetaLimits::default(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Field handles of the index schema
#[derive(Debug, Clone, Copy)]
pub struct IndexFields {
    pub docid: Field,
    pub docno: Field,
    pub text: Field,
}

impl IndexFields {
    fn schema() -> (Schema, IndexFields) {
        let mut builder = Schema::builder();
        let docid = builder.add_u64_field("docid", INDEXED | STORED | FAST);
        let docno = builder.add_text_field("docno", STRING | STORED);
        let text = builder.add_text_field("text", TEXT | STORED);
        (builder.build(), IndexFields { docid, docno, text })
    }

    fn from_schema(schema: &Schema) -> Result<IndexFields> {
        Ok(IndexFields {
            docid: schema.get_field("docid").map_err(engine_error)?,
            docno: schema.get_field("docno").map_err(engine_error)?,
            text: schema.get_field("text").map_err(engine_error)?,
        })
    }
}

/// An opened BM25 index, built or loaded once and then shared read-only
pub struct IndexHandle {
    index: Index,
    reader: IndexReader,
    fields: IndexFields,
    mode: IndexMode,
    path: Option<PathBuf>,
    state: Option<IndexState>,
    freshly_built: bool,
}

impl IndexHandle {
    /// Build the index for `dataset`, or reuse the one on disk
    pub fn build_or_load(dataset: &Dataset, settings: &IndexSettings) -> Result<Self> {
        Self::build_or_load_with_progress(dataset, settings, |_| {})
    }

    /// Build or load with progress reporting
    ///
    /// In disk mode an existing completed index is reused unless `force` is
    /// set; its state sidecar must name the same dataset. In memory mode the
    /// index is always built.
    pub fn build_or_load_with_progress<F>(
        dataset: &Dataset,
        settings: &IndexSettings,
        mut progress: F,
    ) -> Result<Self>
    where
        F: FnMut(IndexProgress),
    {
        match settings.mode {
            IndexMode::Memory => {
                let (schema, fields) = IndexFields::schema();
                let index = Index::create_in_ram(schema);
                Self::build(index, fields, None, dataset, settings, &mut progress)
            }
            IndexMode::Disk => {
                let path = settings.path.as_path();
                if Self::exists(path) && !settings.force {
                    progress(IndexProgress {
                        phase: IndexPhase::Loading,
                        current: 0,
                        total: 1,
                        message: format!("Loading existing index from {}", path.display()),
                    });

                    let handle = Self::open(path)?;
                    handle.check_dataset(dataset.name())?;
                    tracing::info!(
                        path = %path.display(),
                        documents = handle.document_count(),
                        "Reusing existing index"
                    );
                    return Ok(handle);
                }

                progress(IndexProgress {
                    phase: IndexPhase::Initializing,
                    current: 0,
                    total: 1,
                    message: format!("Preparing index directory {}", path.display()),
                });

                if has_engine_files(path) {
                    if !Self::exists(path) {
                        tracing::warn!(path = %path.display(), "Discarding incomplete index");
                    }
                    fs::remove_dir_all(path)?;
                } else if path.is_dir() && fs::read_dir(path)?.next().is_some() {
                    // Never clear a directory that does not hold an index
                    return Err(QuerylabError::ConfigInvalid {
                        key: "index_path".to_string(),
                        reason: format!(
                            "{} is not empty and does not contain an index",
                            path.display()
                        ),
                    });
                }
                fs::create_dir_all(path)?;

                let (schema, fields) = IndexFields::schema();
                let index = Index::create_in_dir(path, schema).map_err(engine_error)?;
                Self::build(index, fields, Some(path.to_path_buf()), dataset, settings, &mut progress)
            }
        }
    }

    /// Open a completed disk index without a dataset
    pub fn open(path: &Path) -> Result<Self> {
        let Some(state) = read_state(path)? else {
            return Err(QuerylabError::IndexNotBuilt { path: path.to_path_buf() });
        };
        if !has_engine_files(path) {
            return Err(QuerylabError::IndexNotBuilt { path: path.to_path_buf() });
        }

        let index = Index::open_in_dir(path).map_err(engine_error)?;
        let fields = IndexFields::from_schema(&index.schema())?;
        let reader = open_reader(&index)?;

        Ok(Self {
            index,
            reader,
            fields,
            mode: IndexMode::Disk,
            path: Some(path.to_path_buf()),
            state: Some(state),
            freshly_built: false,
        })
    }

    /// Whether a completed index exists at `path`.
    ///
    /// The state sidecar is written only after the final commit, so an index
    /// directory left behind by a failed build does not count.
    pub fn exists(path: &Path) -> bool {
        has_engine_files(path) && path.join(IndexState::FILE_NAME).is_file()
    }

    fn build<F>(
        index: Index,
        fields: IndexFields,
        path: Option<PathBuf>,
        dataset: &Dataset,
        settings: &IndexSettings,
        progress: &mut F,
    ) -> Result<Self>
    where
        F: FnMut(IndexProgress),
    {
        tracing::info!(dataset = dataset.name(), mode = %settings.mode, "Building index");

        // A single indexing thread keeps segment contents in corpus order
        let mut writer: IndexWriter =
            index.writer_with_num_threads(1, settings.writer_heap_bytes).map_err(engine_error)?;

        let mut fingerprint = Fingerprint::new();
        let mut document_count = 0usize;
        let mut truncated_count = 0usize;

        progress(IndexProgress {
            phase: IndexPhase::Indexing,
            current: 0,
            total: 0,
            message: format!("Indexing corpus of '{}'", dataset.name()),
        });

        for document in dataset.corpus_iter()? {
            let mut document = document?;
            fingerprint.update(&document);

            if settings.meta_limits.apply(&mut document) {
                truncated_count += 1;
                tracing::warn!(docno = %document.docno, "Truncated document metadata");
            }

            writer
                .add_document(doc!(
                    fields.docid => document_count as u64,
                    fields.docno => document.docno,
                    fields.text => document.text,
                ))
                .map_err(engine_error)?;
            document_count += 1;

            if document_count % PROGRESS_INTERVAL == 0 {
                progress(IndexProgress {
                    phase: IndexPhase::Indexing,
                    current: document_count,
                    total: 0,
                    message: format!("Indexed {} documents", document_count),
                });
            }
        }

        progress(IndexProgress {
            phase: IndexPhase::Committing,
            current: document_count,
            total: document_count,
            message: format!("Committing {} documents", document_count),
        });

        writer.commit().map_err(engine_error)?;
        writer.wait_merging_threads().map_err(engine_error)?;

        let state = IndexState {
            dataset: dataset.name().to_string(),
            document_count,
            fingerprint: fingerprint.finish(),
            truncated_count,
            built_at: Utc::now(),
        };

        progress(IndexProgress {
            phase: IndexPhase::Finalizing,
            current: 0,
            total: 1,
            message: "Opening searcher".to_string(),
        });

        if let Some(path) = &path {
            write_state(path, &state)?;
        }

        let reader = open_reader(&index)?;

        tracing::info!(
            documents = document_count,
            truncated = truncated_count,
            fingerprint = %state.fingerprint,
            "Index built"
        );

        Ok(Self {
            index,
            reader,
            fields,
            mode: settings.mode,
            path,
            state: Some(state),
            freshly_built: true,
        })
    }

    fn check_dataset(&self, requested: &str) -> Result<()> {
        match &self.state {
            Some(state) if state.dataset != requested => Err(QuerylabError::IndexStale {
                path: self.path.clone().unwrap_or_default(),
                built_for: state.dataset.clone(),
                requested: requested.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn searcher(&self) -> Searcher {
        self.reader.searcher()
    }

    pub fn fields(&self) -> IndexFields {
        self.fields
    }

    pub fn state(&self) -> Option<&IndexState> {
        self.state.as_ref()
    }

    pub fn document_count(&self) -> u64 {
        self.searcher().num_docs()
    }

    /// Tokenize query text with the analyzer of the `text` field
    pub fn query_tokens(&self, query: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(self.fields.text).map_err(engine_error)?;
        let mut stream = analyzer.token_stream(query);

        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    /// Query tokens as terms of the `text` field
    pub fn query_terms(&self, query: &str) -> Result<Vec<Term>> {
        Ok(self
            .query_tokens(query)?
            .iter()
            .map(|token| Term::from_field_text(self.fields.text, token))
            .collect())
    }

    pub fn stats(&self) -> IndexStats {
        let searcher = self.searcher();
        IndexStats {
            mode: self.mode,
            path: self.path.clone(),
            document_count: searcher.num_docs(),
            segment_count: searcher.segment_readers().len(),
            freshly_built: self.freshly_built,
        }
    }
}

/// Whether tantivy has created an index at `path`, complete or not
fn has_engine_files(path: &Path) -> bool {
    path.join(META_FILE).is_file()
}

fn open_reader(index: &Index) -> Result<IndexReader> {
    index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into().map_err(engine_error)
}

fn read_state(path: &Path) -> Result<Option<IndexState>> {
    let state_path = path.join(IndexState::FILE_NAME);
    if !state_path.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&state_path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_state(path: &Path, state: &IndexState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path.join(IndexState::FILE_NAME), json)?;
    Ok(())
}

pub(crate) fn engine_error(err: impl Display) -> QuerylabError {
    QuerylabError::Engine(err.to_string())
}
