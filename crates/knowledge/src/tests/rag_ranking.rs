//! Ranking behaviour of the SQLite similarity search.

use crate::index::{init_index, insert_chunk, insert_source, query_chunks};
use crate::types::{KnowledgeChunk, KnowledgeSource};
use chrono::Utc;
use rusqlite::Connection;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn chunk(id: &str, text: &str, embedding: Vec<f32>) -> KnowledgeChunk {
    KnowledgeChunk {
        id: id.to_string(),
        source_id: "sofi".to_string(),
        position: 0,
        text: text.to_string(),
        embedding: Some(embedding),
        metadata: serde_json::json!({}),
    }
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

fn index_with_source(file: &NamedTempFile) -> Connection {
    let conn = init_index(file.path()).unwrap();
    insert_source(
        &conn,
        &KnowledgeSource {
            id: "sofi".to_string(),
            path: PathBuf::from("/data/un_reports/sofi_2024.pdf"),
            content_type: "pdf".to_string(),
            content_hash: "abc".to_string(),
            learned_at: Utc::now(),
            size_bytes: 100,
        },
    )
    .unwrap();
    conn
}

#[test]
fn test_relevant_chunk_ranks_first() {
    let file = NamedTempFile::new().unwrap();
    let conn = index_with_source(&file);

    insert_chunk(
        &conn,
        &chunk(
            "hunger",
            "Around 733 million people faced hunger in 2023",
            normalize(&[1.0, 0.5, 0.2, 0.1]),
        ),
    )
    .unwrap();
    insert_chunk(
        &conn,
        &chunk(
            "methods",
            "Annex 2 describes the survey methodology",
            normalize(&[-0.3, -0.8, 0.4, -0.2]),
        ),
    )
    .unwrap();

    let results = query_chunks(&conn, &normalize(&[0.9, 0.4, 0.3, 0.1]), 5).unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.id, "hunger");
    assert!(results[0].1 > 0.8, "score too low: {}", results[0].1);
    assert!(results[0].1 > results[1].1);
}

#[test]
fn test_orthogonal_query_scores_near_zero() {
    let file = NamedTempFile::new().unwrap();
    let conn = index_with_source(&file);
    insert_chunk(&conn, &chunk("c1", "Stunting in children", normalize(&[1.0, 0.0, 0.0, 0.0]))).unwrap();

    let results = query_chunks(&conn, &normalize(&[0.0, 1.0, 0.0, 0.0]), 5).unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].1.abs() < 1e-6);
}

#[test]
fn test_scores_are_ordered_descending() {
    let file = NamedTempFile::new().unwrap();
    let conn = index_with_source(&file);

    for (id, v) in [
        ("a", [1.0, 0.0, 0.0]),
        ("b", [0.7, 0.7, 0.0]),
        ("c", [0.0, 1.0, 0.0]),
        ("d", [-1.0, 0.0, 0.0]),
    ] {
        insert_chunk(&conn, &chunk(id, id, normalize(&v))).unwrap();
    }

    let results = query_chunks(&conn, &[1.0, 0.0, 0.0], 10).unwrap();

    for pair in results.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    assert_eq!(results[0].0.id, "a");
    assert!(results[0].1 > 0.99);
    assert_eq!(results[3].0.id, "d");
    assert!(results[3].1 < -0.9);
}

#[test]
fn test_empty_index_returns_nothing() {
    let file = NamedTempFile::new().unwrap();
    let conn = init_index(file.path()).unwrap();

    assert!(query_chunks(&conn, &[1.0, 0.0, 0.0], 5).unwrap().is_empty());
}

#[test]
fn test_top_k_limit_respected() {
    let file = NamedTempFile::new().unwrap();
    let conn = index_with_source(&file);

    for i in 1..=10 {
        insert_chunk(
            &conn,
            &chunk(&format!("c{}", i), "row", normalize(&[i as f32, 1.0, 0.0])),
        )
        .unwrap();
    }

    let results = query_chunks(&conn, &[1.0, 0.0, 0.0], 3).unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0.id, "c10");
}
