//! Values persisted in, and reported about, a knowledge base.

use crate::embeddings::EmbeddingConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `config.yaml` of a knowledge base directory.
///
/// Written on every successful ingest; read back by [`crate::KnowledgeBase::open`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeBaseConfig {
    pub name: String,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chunk size in bytes (UTF-8 boundaries respected)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: u32,

    /// Bytes shared by consecutive chunks; must be below `chunk_size`
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: u32,

    /// Chunks scoring at or below this cosine similarity are not returned
    #[serde(default)]
    pub min_score: f32,
}

fn default_chunk_size() -> u32 {
    1000
}

fn default_chunk_overlap() -> u32 {
    200
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            embedding: EmbeddingConfig::default(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            min_score: 0.0,
        }
    }
}

/// One ingested file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSource {
    pub id: String,

    /// Canonical path at ingest time
    pub path: PathBuf,

    /// `pdf`, `csv`, `markdown`, `html` or `text`
    pub content_type: String,

    /// SHA-256 of the raw file bytes, hex encoded
    pub content_hash: String,

    pub learned_at: DateTime<Utc>,

    pub size_bytes: u64,
}

/// A retrievable piece of a source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub id: String,

    pub source_id: String,

    /// Order within the source, starting at 0
    pub position: u32,

    pub text: String,

    /// Present once stored in the index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// `document` (row or page index) plus `start`/`end` byte offsets
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A chunk returned by retrieval with its cosine similarity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk: KnowledgeChunk,
    pub score: f32,
}

/// What [`crate::learn`] should ingest and how.
#[derive(Debug, Clone, Default)]
pub struct LearnOptions {
    /// Files or directories; directories are walked recursively
    pub paths: Vec<PathBuf>,

    /// Drop the existing index and config first
    pub reset: bool,

    pub chunk_size: Option<u32>,

    pub chunk_overlap: Option<u32>,

    /// Ignored for an existing base unless it matches the stored settings
    pub embedding: Option<EmbeddingConfig>,
}

/// Outcome of one [`crate::learn`] call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnStats {
    pub sources_count: u32,

    /// Unchanged since the previous ingest
    pub skipped_count: u32,

    pub failed_count: u32,

    pub chunks_count: u32,

    pub bytes_processed: u64,

    pub duration_secs: f64,
}

/// Summary printed by `meridian stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    pub base_name: String,

    pub sources_count: u32,

    pub chunks_count: u32,

    /// Size of `index.sqlite`
    pub db_size_bytes: u64,

    pub last_learn_at: Option<DateTime<Utc>>,
}

/// Chunker output, not yet embedded.
#[derive(Debug, Clone)]
pub struct ChunkCandidate {
    pub source_id: String,
    pub position: u32,
    pub text: String,
    pub metadata: serde_json::Value,
}
