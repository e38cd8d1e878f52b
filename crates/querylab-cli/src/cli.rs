use clap::{Parser, Subcommand, ValueEnum};
use querylab_core::models::IndexMode;
use std::path::PathBuf;

/// querylab - BM25 baselines and query rewriting experiments
#[derive(Parser, Debug)]
#[command(name = "querylab")]
#[command(about = "BM25 baselines and query rewriting experiments", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./querylab.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dataset to use, built-in or declared in the config file
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Index directory for disk mode
    #[arg(long, global = true, value_name = "DIR")]
    pub index_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index, or load the one on disk
    Index(IndexArgs),

    /// Rank documents for a single query
    Search(SearchArgs),

    /// Score the dataset topics by mean average precision
    Evaluate(EvaluateArgs),

    /// Show dataset and index status
    Status(StatusArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

/// Index storage selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Persistent index directory
    Disk,
    /// Rebuilt in RAM on every run
    Memory,
}

impl From<ModeArg> for IndexMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Disk => IndexMode::Disk,
            ModeArg::Memory => IndexMode::Memory,
        }
    }
}

#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Rebuild even if an index already exists
    #[arg(long)]
    pub force: bool,

    /// Where to keep the index
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// The query text
    pub query: String,

    /// Number of results to show
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Where to keep the index
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Topics file (qid<TAB>query) to evaluate instead of the dataset topics
    #[arg(long, value_name = "FILE")]
    pub topics: Option<PathBuf>,

    /// Precomputed rewrites (original<TAB>rewritten) applied before ranking
    #[arg(long, value_name = "FILE")]
    pub rewrites: Option<PathBuf>,

    /// Show average precision for every topic
    #[arg(long)]
    pub per_query: bool,

    /// Worker threads for ranking topics
    #[arg(long)]
    pub threads: Option<usize>,

    /// Where to keep the index
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,
}

#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Show index details such as segments and corpus fingerprint
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
