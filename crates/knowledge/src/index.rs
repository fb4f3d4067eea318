//! SQLite storage for knowledge sources and chunks.
//!
//! Embeddings are stored as little-endian f32 blobs. Search is a full scan
//! with cosine similarity, which is enough for a few thousand chunks.

use crate::types::{KnowledgeChunk, KnowledgeSource};
use chrono::{DateTime, Utc};
use meridian_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Open (creating if needed) the SQLite index database.
pub fn init_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL,
            content_type TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            learned_at TEXT NOT NULL,
            size_bytes INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT,
            FOREIGN KEY (source_id) REFERENCES sources(id)
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source_id);
        CREATE INDEX IF NOT EXISTS idx_sources_path ON sources(path);
        "#,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Initialized SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Insert a source into the index.
pub fn insert_source(conn: &Connection, source: &KnowledgeSource) -> AppResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sources (id, path, content_type, content_hash, learned_at, size_bytes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            source.id,
            source.path.to_string_lossy().to_string(),
            source.content_type,
            source.content_hash,
            source.learned_at.to_rfc3339(),
            source.size_bytes as i64,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert source: {}", e)))?;

    Ok(())
}

/// Insert a chunk with embedding into the index.
pub fn insert_chunk(conn: &Connection, chunk: &KnowledgeChunk) -> AppResult<()> {
    let embedding = chunk
        .embedding
        .as_ref()
        .ok_or_else(|| AppError::Knowledge("Chunk missing embedding".to_string()))?;

    let metadata_json = serde_json::to_string(&chunk.metadata)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize metadata: {}", e)))?;

    conn.execute(
        "INSERT OR REPLACE INTO chunks (id, source_id, position, text, embedding, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            chunk.id,
            chunk.source_id,
            chunk.position as i64,
            chunk.text,
            embedding_to_bytes(embedding),
            metadata_json,
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// Find the source previously learned from `path`, returning `(id, content_hash)`.
pub fn find_source_by_path(conn: &Connection, path: &Path) -> AppResult<Option<(String, String)>> {
    conn.query_row(
        "SELECT id, content_hash FROM sources WHERE path = ?1",
        params![path.to_string_lossy().to_string()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(|e| AppError::Knowledge(format!("Failed to look up source: {}", e)))
}

/// Delete a source and its chunks.
pub fn delete_source(conn: &Connection, source_id: &str) -> AppResult<()> {
    conn.execute("DELETE FROM chunks WHERE source_id = ?1", params![source_id])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;
    conn.execute("DELETE FROM sources WHERE id = ?1", params![source_id])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete source: {}", e)))?;
    Ok(())
}

/// Query the index for top-k most similar chunks, scores descending.
pub fn query_chunks(
    conn: &Connection,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<(KnowledgeChunk, f32)>> {
    let mut stmt = conn
        .prepare("SELECT id, source_id, position, text, embedding, metadata FROM chunks")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map([], |row| {
            let embedding_bytes: Vec<u8> = row.get(4)?;
            let metadata_json: Option<String> = row.get(5)?;

            Ok((
                KnowledgeChunk {
                    id: row.get(0)?,
                    source_id: row.get(1)?,
                    position: row.get::<_, i64>(2)? as u32,
                    text: row.get(3)?,
                    embedding: None,
                    metadata: metadata_json
                        .and_then(|m| serde_json::from_str(&m).ok())
                        .unwrap_or(serde_json::Value::Null),
                },
                embedding_bytes,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (chunk, bytes) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;
        let embedding = bytes_to_embedding(&bytes)?;
        let score = cosine_similarity(query_embedding, &embedding);
        results.push((chunk, score));
    }

    results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks (requested top-{})",
        results.len(),
        top_k
    );

    Ok(results)
}

/// Get `(sources_count, chunks_count)` for the index.
pub fn get_stats(conn: &Connection) -> AppResult<(u32, u32)> {
    let count = |table: &str| -> AppResult<u32> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get::<_, i64>(0).map(|v| v as u32)
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to count {}: {}", table, e)))
    };

    Ok((count("sources")?, count("chunks")?))
}

/// Timestamp of the most recently learned source.
pub fn last_learned_at(conn: &Connection) -> AppResult<Option<DateTime<Utc>>> {
    let latest: Option<String> = conn
        .query_row("SELECT MAX(learned_at) FROM sources", [], |row| row.get(0))
        .map_err(|e| AppError::Knowledge(format!("Failed to read timestamps: {}", e)))?;

    Ok(latest
        .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
        .map(|ts| ts.with_timezone(&Utc)))
}

/// Reset the index (delete all data).
pub fn reset_index(conn: &Connection) -> AppResult<()> {
    conn.execute("DELETE FROM chunks", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;

    conn.execute("DELETE FROM sources", [])
        .map_err(|e| AppError::Knowledge(format!("Failed to delete sources: {}", e)))?;

    tracing::info!("Reset knowledge base index");
    Ok(())
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
