//! Knowledge base configuration management.
//!
//! A knowledge base is a directory holding `config.yaml` and `index.sqlite`.

use crate::types::KnowledgeBaseConfig;
use meridian_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of a base, taken from its directory name.
pub fn base_name(base_dir: &Path) -> String {
    base_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "knowledge".to_string())
}

/// Load knowledge base configuration.
///
/// Loads `<base_dir>/config.yaml` if it exists, otherwise returns defaults
/// named after the directory.
pub fn load_config(base_dir: &Path) -> AppResult<KnowledgeBaseConfig> {
    let config_path = get_config_path(base_dir);
    let name = base_name(base_dir);

    if config_path.exists() {
        let content = fs::read_to_string(&config_path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read config at {:?}: {}", config_path, e))
        })?;

        let mut config: KnowledgeBaseConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Knowledge(format!("Failed to parse config at {:?}: {}", config_path, e))
        })?;

        config.name = name;

        tracing::debug!("Loaded knowledge base config for '{}'", config.name);
        Ok(config)
    } else {
        tracing::debug!(
            "Using default knowledge base config for '{}' (no config file found)",
            name
        );
        Ok(KnowledgeBaseConfig {
            name,
            ..Default::default()
        })
    }
}

/// Save knowledge base configuration.
pub fn save_config(base_dir: &Path, config: &KnowledgeBaseConfig) -> AppResult<()> {
    fs::create_dir_all(base_dir).map_err(|e| {
        AppError::Knowledge(format!("Failed to create base directory: {}", e))
    })?;

    let config_path = get_config_path(base_dir);
    let yaml = serde_yaml::to_string(config)
        .map_err(|e| AppError::Knowledge(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, yaml).map_err(|e| {
        AppError::Knowledge(format!("Failed to write config to {:?}: {}", config_path, e))
    })?;

    tracing::debug!("Saved knowledge base config for '{}'", config.name);
    Ok(())
}

/// Get the path to a base's config file.
pub fn get_config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config.yaml")
}

/// Get the SQLite index path for a base.
pub fn get_index_path(base_dir: &Path) -> PathBuf {
    base_dir.join("index.sqlite")
}
