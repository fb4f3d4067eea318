//! Learning sources into a base and retrieving from it.

use crate::{learn, stats, KnowledgeBase, LearnOptions, Retriever};
use std::path::Path;
use tempfile::TempDir;

const TRIALS_CSV: &str = "NCT Number,Study Title,Conditions,Phases\n\
NCT01,Aspirin for secondary stroke prevention,Stroke,PHASE3\n\
NCT02,Metformin in gestational diabetes,Diabetes,PHASE2\n\
NCT03,Vitamin D supplementation in elderly,Osteoporosis,PHASE4\n";

const FOOD_MD: &str = "# Food insecurity\n\n\
Moderate or severe food insecurity affected 2.33 billion people worldwide.\n\n\
Child stunting declined but wasting remains high in southern Asia.\n";

fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn options(paths: Vec<std::path::PathBuf>) -> LearnOptions {
    LearnOptions {
        paths,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_learn_csv_indexes_one_chunk_per_row() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let csv = write(data.path(), "ctg-studies.csv", TRIALS_CSV);

    let result = learn(base.path(), options(vec![csv]), None).await.unwrap();

    assert_eq!(result.sources_count, 1);
    assert_eq!(result.chunks_count, 3);
    assert_eq!(result.failed_count, 0);

    let base_stats = stats(base.path()).unwrap();
    assert_eq!(base_stats.sources_count, 1);
    assert_eq!(base_stats.chunks_count, 3);
    assert!(base_stats.last_learn_at.is_some());
}

#[tokio::test]
async fn test_retrieve_ranks_matching_row_first() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    write(data.path(), "ctg-studies.csv", TRIALS_CSV);
    write(data.path(), "sofi.md", FOOD_MD);
    write(data.path(), "ignored.bin", "\u{0}\u{1}");

    let result = learn(base.path(), options(vec![data.path().to_path_buf()]), None)
        .await
        .unwrap();
    assert_eq!(result.sources_count, 2);

    let kb = KnowledgeBase::open(base.path(), None).unwrap();
    let hits = Retriever::retrieve(&kb, "metformin gestational diabetes trial", 2)
        .await
        .unwrap();

    assert!(!hits.is_empty());
    assert!(hits.len() <= 2);
    assert!(hits[0].chunk.text.contains("Metformin"));
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_retrieves_share_one_base() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let csv = write(data.path(), "ctg-studies.csv", TRIALS_CSV);
    learn(base.path(), options(vec![csv]), None).await.unwrap();

    let kb = std::sync::Arc::new(KnowledgeBase::open(base.path(), None).unwrap());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let kb = kb.clone();
            tokio::spawn(async move { kb.retrieve("aspirin stroke prevention", 1).await })
        })
        .collect();

    for handle in handles {
        let hits = handle.await.unwrap().unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].chunk.text.contains("Aspirin"));
    }
}

#[tokio::test]
async fn test_query_without_content_words_retrieves_nothing() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let md = write(data.path(), "sofi.md", FOOD_MD);
    learn(base.path(), options(vec![md]), None).await.unwrap();

    let kb = KnowledgeBase::open(base.path(), None).unwrap();
    let hits = kb.retrieve("what is the", 3).await.unwrap();

    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_relearn_skips_unchanged_and_replaces_changed() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let csv = write(data.path(), "ctg-studies.csv", TRIALS_CSV);

    learn(base.path(), options(vec![csv.clone()]), None).await.unwrap();
    let again = learn(base.path(), options(vec![csv.clone()]), None).await.unwrap();
    assert_eq!(again.skipped_count, 1);
    assert_eq!(again.sources_count, 0);
    assert_eq!(stats(base.path()).unwrap().chunks_count, 3);

    std::fs::write(&csv, "NCT Number,Study Title\nNCT09,Only one trial\n").unwrap();
    let changed = learn(base.path(), options(vec![csv]), None).await.unwrap();
    assert_eq!(changed.sources_count, 1);

    let base_stats = stats(base.path()).unwrap();
    assert_eq!(base_stats.sources_count, 1);
    assert_eq!(base_stats.chunks_count, 1);
}

#[tokio::test]
async fn test_reset_clears_previous_sources() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let csv = write(data.path(), "ctg-studies.csv", TRIALS_CSV);
    let md = write(data.path(), "sofi.md", FOOD_MD);

    learn(base.path(), options(vec![csv]), None).await.unwrap();
    let opts = LearnOptions {
        paths: vec![md],
        reset: true,
        ..Default::default()
    };
    learn(base.path(), opts, None).await.unwrap();

    assert_eq!(stats(base.path()).unwrap().sources_count, 1);
}

#[tokio::test]
async fn test_chunk_overrides_are_persisted() {
    let data = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();
    let md = write(data.path(), "sofi.md", FOOD_MD);

    let opts = LearnOptions {
        paths: vec![md],
        chunk_size: Some(60),
        chunk_overlap: Some(10),
        ..Default::default()
    };
    let result = learn(base.path(), opts, None).await.unwrap();
    assert!(result.chunks_count > 1);

    let cfg = crate::config::load_config(base.path()).unwrap();
    assert_eq!(cfg.chunk_size, 60);
    assert_eq!(cfg.chunk_overlap, 10);
}

#[tokio::test]
async fn test_invalid_overlap_is_rejected() {
    let base = TempDir::new().unwrap();
    let opts = LearnOptions {
        chunk_size: Some(100),
        chunk_overlap: Some(100),
        ..Default::default()
    };

    assert!(learn(base.path(), opts, None).await.is_err());
}

#[tokio::test]
async fn test_missing_path_is_error() {
    let base = TempDir::new().unwrap();
    let opts = options(vec![base.path().join("nope.pdf")]);

    assert!(learn(base.path(), opts, None).await.is_err());
}

#[test]
fn test_open_missing_or_empty_base_fails() {
    let temp = TempDir::new().unwrap();

    let missing = KnowledgeBase::open(&temp.path().join("un_food_index"), None).unwrap_err();
    assert!(missing.to_string().contains("not found"));

    let no_index = KnowledgeBase::open(temp.path(), None).unwrap_err();
    assert!(no_index.to_string().contains("meridian ingest"));

    crate::SqliteIndex::create(&crate::config::get_index_path(temp.path())).unwrap();
    let empty = KnowledgeBase::open(temp.path(), None).unwrap_err();
    assert!(empty.to_string().contains("empty"));
}
