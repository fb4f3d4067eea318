//! Knowledge base management.
//!
//! A knowledge base is a directory with a `config.yaml` and an SQLite index of
//! embedded text chunks. [`learn`] fills it from PDF, CSV, Markdown, HTML and
//! text sources; [`KnowledgeBase`] answers top-K similarity queries over it.

pub mod chunker;
pub mod config;
pub mod embeddings;
pub mod index;
pub mod parser;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use types::{
    BaseStats, KnowledgeBaseConfig, KnowledgeChunk, KnowledgeSource, LearnOptions, LearnStats,
    RetrievedChunk,
};
pub use vector_index::{SqliteIndex, VectorIndex};

use chrono::Utc;
use meridian_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Anything that can return the chunks most relevant to a query.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Top-K chunks for `query`, best first.
    async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>>;
}

/// An opened, non-empty knowledge base.
pub struct KnowledgeBase {
    dir: PathBuf,
    config: KnowledgeBaseConfig,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("dir", &self.dir)
            .field("config", &self.config)
            .field("embedder", &self.embedder)
            .finish()
    }
}

impl KnowledgeBase {
    /// Open the knowledge base stored in `dir`.
    ///
    /// # Errors
    /// Fails when the directory or its index is missing, when the index holds
    /// no chunks, or when the embedding provider cannot be created.
    pub fn open(dir: &Path, api_key: Option<&str>) -> AppResult<Self> {
        let name = config::base_name(dir);

        if !dir.is_dir() {
            return Err(AppError::Knowledge(format!(
                "Knowledge base directory not found: {:?}",
                dir
            )));
        }

        let index_path = config::get_index_path(dir);
        if !index_path.exists() {
            return Err(AppError::Knowledge(format!(
                "Knowledge base '{}' has no index at {:?}. Run 'meridian ingest' first.",
                name, index_path
            )));
        }

        let config = config::load_config(dir)?;
        let index = SqliteIndex::open_existing(&index_path)?;

        let (sources, chunks) = index.stats()?;
        if chunks == 0 {
            return Err(AppError::Knowledge(format!(
                "Knowledge base '{}' is empty. Run 'meridian ingest' first.",
                name
            )));
        }

        let embedder = create_provider(&config.embedding, api_key)?;

        tracing::info!(
            base = %name,
            sources,
            chunks,
            provider = embedder.provider_name(),
            "Opened knowledge base"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            index: Arc::new(index),
            embedder,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &KnowledgeBaseConfig {
        &self.config
    }

    /// Embed `question` and return the `k` most similar chunks, scores descending.
    pub async fn retrieve(&self, question: &str, k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(question).await?;

        // Full scan under the connection mutex; keep it off the async workers.
        let index = Arc::clone(&self.index);
        let results = tokio::task::spawn_blocking(move || index.search(&query_embedding, k))
            .await
            .map_err(|e| AppError::Knowledge(format!("Index search task failed: {}", e)))??;

        let retrieved: Vec<RetrievedChunk> = results
            .into_iter()
            .filter(|(_, score)| *score > self.config.min_score)
            .map(|(chunk, score)| RetrievedChunk { chunk, score })
            .collect();

        tracing::debug!(
            base = %self.config.name,
            count = retrieved.len(),
            top_score = retrieved.first().map(|r| r.score),
            "Retrieved chunks"
        );

        Ok(retrieved)
    }
}

#[async_trait::async_trait]
impl Retriever for KnowledgeBase {
    fn name(&self) -> &str {
        KnowledgeBase::name(self)
    }

    async fn retrieve(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        KnowledgeBase::retrieve(self, query, top_k).await
    }
}

enum FileOutcome {
    Indexed { chunks: u32, bytes: u64 },
    Unchanged,
}

/// Learn from sources and populate the knowledge base in `dir`.
///
/// Files whose content hash matches the stored source are skipped; changed
/// files replace their previous chunks. A file that fails to parse or embed
/// is counted in `failed_count` and does not abort the run.
pub async fn learn(dir: &Path, options: LearnOptions, api_key: Option<&str>) -> AppResult<LearnStats> {
    let start = Instant::now();
    let had_config = config::get_config_path(dir).exists();
    let mut config = config::load_config(dir)?;

    tracing::info!("Starting learn operation for base '{}'", config.name);

    if let Some(embedding) = options.embedding.clone() {
        if had_config && !options.reset {
            config.embedding.validate_consistency(&embedding)?;
        }
        config.embedding = embedding;
    }
    if let Some(size) = options.chunk_size {
        config.chunk_size = size;
    }
    if let Some(overlap) = options.chunk_overlap {
        config.chunk_overlap = overlap;
    }
    if config.chunk_size == 0 || config.chunk_overlap >= config.chunk_size {
        return Err(AppError::Knowledge(format!(
            "Invalid chunking: size {} with overlap {}",
            config.chunk_size, config.chunk_overlap
        )));
    }

    let files = collect_files(&options.paths)?;
    let index = SqliteIndex::create(&config::get_index_path(dir))?;

    if options.reset {
        tracing::info!("Resetting knowledge base '{}'", config.name);
        index.reset()?;
    }

    let embedder = create_provider(&config.embedding, api_key)?;
    let mut stats = LearnStats::default();

    for path in &files {
        match process_file(&index, embedder.as_ref(), &config, path).await {
            Ok(FileOutcome::Indexed { chunks, bytes }) => {
                stats.sources_count += 1;
                stats.chunks_count += chunks;
                stats.bytes_processed += bytes;
            }
            Ok(FileOutcome::Unchanged) => {
                tracing::debug!("Unchanged, skipping: {:?}", path);
                stats.skipped_count += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to learn {:?}: {}", path, e);
                stats.failed_count += 1;
            }
        }
    }

    config::save_config(dir, &config)?;
    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Learn operation completed: {} sources ({} unchanged, {} failed), {} chunks, {} bytes in {:.2}s",
        stats.sources_count,
        stats.skipped_count,
        stats.failed_count,
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Expand the requested paths into the files to learn, in a stable order.
fn collect_files(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| parser::ContentType::from_path(p).is_supported())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            return Err(AppError::Knowledge(format!("Path not found: {:?}", path)));
        }
    }

    Ok(files)
}

async fn process_file(
    index: &SqliteIndex,
    embedder: &dyn EmbeddingProvider,
    config: &KnowledgeBaseConfig,
    path: &Path,
) -> AppResult<FileOutcome> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let raw = std::fs::read(&path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;
    let content_hash = format!("{:x}", Sha256::digest(&raw));

    if let Some((previous_id, previous_hash)) = index.find_source(&path)? {
        if previous_hash == content_hash {
            return Ok(FileOutcome::Unchanged);
        }
        tracing::debug!("Content changed, replacing: {:?}", path);
        index.remove_source(&previous_id)?;
    }

    let documents = parser::parse_file(&path)?;
    let source_id = uuid::Uuid::new_v4().to_string();

    let mut candidates = Vec::new();
    for (doc_idx, document) in documents.iter().enumerate() {
        for mut candidate in chunker::chunk_text(
            &source_id,
            document,
            config.chunk_size as usize,
            config.chunk_overlap as usize,
        ) {
            candidate.position = candidates.len() as u32;
            candidate.metadata["document"] = serde_json::json!(doc_idx);
            candidates.push(candidate);
        }
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let embeddings = if texts.is_empty() {
        Vec::new()
    } else {
        embedder.embed_batch(&texts).await?
    };

    if embeddings.len() != candidates.len() {
        return Err(AppError::Knowledge(format!(
            "Embedding provider returned {} vectors for {} chunks",
            embeddings.len(),
            candidates.len()
        )));
    }

    let chunks: Vec<KnowledgeChunk> = candidates
        .into_iter()
        .zip(embeddings)
        .map(|(candidate, embedding)| KnowledgeChunk {
            id: uuid::Uuid::new_v4().to_string(),
            source_id: candidate.source_id,
            position: candidate.position,
            text: candidate.text,
            embedding: Some(embedding),
            metadata: candidate.metadata,
        })
        .collect();

    let source = KnowledgeSource {
        id: source_id,
        content_type: parser::ContentType::from_path(&path).as_str().to_string(),
        path,
        content_hash,
        learned_at: Utc::now(),
        size_bytes: raw.len() as u64,
    };

    index.insert_source_with_chunks(&source, &chunks)?;

    tracing::debug!(
        "Processed {:?}: {} documents, {} chunks",
        source.path,
        documents.len(),
        chunks.len()
    );

    Ok(FileOutcome::Indexed {
        chunks: chunks.len() as u32,
        bytes: source.size_bytes,
    })
}

/// Get statistics for the knowledge base in `dir`.
pub fn stats(dir: &Path) -> AppResult<BaseStats> {
    let base_name = config::base_name(dir);
    let index_path = config::get_index_path(dir);

    if !index_path.exists() {
        return Err(AppError::Knowledge(format!(
            "Knowledge base '{}' does not exist at {:?}",
            base_name, dir
        )));
    }

    let index = SqliteIndex::open_existing(&index_path)?;
    let (sources_count, chunks_count) = index.stats()?;
    let db_size_bytes = std::fs::metadata(&index_path).map(|m| m.len()).unwrap_or(0);

    Ok(BaseStats {
        base_name,
        sources_count,
        chunks_count,
        db_size_bytes,
        last_learn_at: index.last_learned_at()?,
    })
}
