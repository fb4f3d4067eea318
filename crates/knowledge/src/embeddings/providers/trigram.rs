//! Offline embeddings from hashed character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use meridian_core::AppResult;
use std::collections::HashMap;

const STOP_WORDS: [&str; 33] = [
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what",
];

/// Trigram-based embedding provider for local, offline operation.
///
/// Deterministic and content dependent: words sharing character trigrams
/// land in shared dimensions, so "hunger" and "hungry" score close together
/// while unrelated words do not. Not a semantic model.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Unit-length vector, or all zeros when no word survives filtering.
    fn vectorize(&self, text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *counts.entry(word).or_default() += 1;
        }

        let mut vector = vec![0.0f32; self.dimensions];
        for (word, count) in counts {
            let count = count as f32;
            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3).map(|w| w.iter().collect::<String>()) {
                vector[self.bucket(trigram.as_bytes(), 37)] += count.sqrt();
            }
            vector[self.bucket(word.as_bytes(), 31)] += count;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }

    fn bucket(&self, bytes: &[u8], multiplier: u64) -> usize {
        let hash = bytes
            .iter()
            .fold(0u64, |acc, b| acc.wrapping_mul(multiplier).wrapping_add(*b as u64));
        (hash % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}
