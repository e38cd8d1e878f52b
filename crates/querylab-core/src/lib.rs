//! querylab core - Domain models, dataset loading, and configuration
//!
//! This crate holds everything the retrieval pipeline needs that does not
//! touch the search engine: documents, topics, judgments, result tables,
//! the layered configuration, and the readers for collection files.

pub mod config;
pub mod error;
pub mod loading;
pub mod models;

pub use error::{QuerylabError, Result};
