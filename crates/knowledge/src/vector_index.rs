//! Vector index abstraction for knowledge chunks.

use crate::index;
use crate::types::{KnowledgeChunk, KnowledgeSource};
use meridian_core::{AppError, AppResult};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Trait for vector index backends.
///
/// Implementations are shared between concurrent requests, so every method
/// takes `&self`.
pub trait VectorIndex: Send + Sync {
    /// Insert or update a chunk with its embedding in the index.
    fn upsert_chunk(&self, chunk: &KnowledgeChunk) -> AppResult<()>;

    /// Search for the top-k most similar chunks to the query embedding.
    ///
    /// Returns chunks ordered by descending similarity score.
    fn search(&self, query_embedding: &[f32], top_k: usize)
        -> AppResult<Vec<(KnowledgeChunk, f32)>>;

    /// Returns (sources_count, chunks_count).
    fn stats(&self) -> AppResult<(u32, u32)>;

    /// Remove all chunks and sources.
    fn reset(&self) -> AppResult<()>;
}

/// SQLite implementation of [`VectorIndex`].
///
/// The connection sits behind a mutex; each call holds it for one statement
/// or one transaction.
pub struct SqliteIndex {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open or create the index file.
    pub fn create(path: &Path) -> AppResult<Self> {
        let conn = index::init_index(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Open an index that must already exist.
    pub fn open_existing(path: &Path) -> AppResult<Self> {
        if !path.is_file() {
            return Err(AppError::Knowledge(format!(
                "Index file not found: {:?}",
                path
            )));
        }
        Self::create(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index connection lock poisoned".to_string()))
    }

    /// Look up a previously learned source by path, returning `(id, content_hash)`.
    pub fn find_source(&self, path: &Path) -> AppResult<Option<(String, String)>> {
        let conn = self.lock()?;
        index::find_source_by_path(&conn, path)
    }

    /// Delete a source and all of its chunks.
    pub fn remove_source(&self, source_id: &str) -> AppResult<()> {
        let conn = self.lock()?;
        index::delete_source(&conn, source_id)
    }

    /// Store a source with its chunks atomically.
    pub fn insert_source_with_chunks(
        &self,
        source: &KnowledgeSource,
        chunks: &[KnowledgeChunk],
    ) -> AppResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        index::insert_source(&tx, source)?;
        for chunk in chunks {
            index::insert_chunk(&tx, chunk)?;
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit source: {}", e)))
    }

    /// Most recent learn timestamp.
    pub fn last_learned_at(&self) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
        let conn = self.lock()?;
        index::last_learned_at(&conn)
    }
}

impl VectorIndex for SqliteIndex {
    fn upsert_chunk(&self, chunk: &KnowledgeChunk) -> AppResult<()> {
        let conn = self.lock()?;
        index::insert_chunk(&conn, chunk)
    }

    fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<(KnowledgeChunk, f32)>> {
        let conn = self.lock()?;
        index::query_chunks(&conn, query_embedding, top_k)
    }

    fn stats(&self) -> AppResult<(u32, u32)> {
        let conn = self.lock()?;
        index::get_stats(&conn)
    }

    fn reset(&self) -> AppResult<()> {
        let conn = self.lock()?;
        index::reset_index(&conn)
    }
}
