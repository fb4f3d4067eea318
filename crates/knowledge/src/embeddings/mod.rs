//! Embedding providers for knowledge bases.
//!
//! The provider is chosen per base from its `config.yaml`, so ingestion and
//! retrieval always embed with the same model.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
