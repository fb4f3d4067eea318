//! Configuration management for Meridian.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`.meridian/config.yaml` in the workspace, or `MERIDIAN_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Relative index paths are resolved against the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Providers the LLM factory knows how to build.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openai", "ollama"];

/// Environment variable read for the OpenAI key when no provider config names one.
pub const DEFAULT_OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .meridian/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active LLM provider ("openai", "ollama")
    pub provider: String,

    /// Model used for generation and classification
    pub model: String,

    /// Explicit API key, overrides the provider's key variable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format ("pretty" or "json")
    pub log_format: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations from the config file
    pub llm: Option<LlmConfig>,

    /// Routing and agent settings
    pub routing: RoutingConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        /// Request timeout in seconds
        timeout: Option<u64>,
    },
}

impl ProviderConfig {
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAI { model, .. } | Self::Ollama { model, .. } => model,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::OpenAI { endpoint, .. } => endpoint.as_deref(),
            Self::Ollama { endpoint, .. } => Some(endpoint),
        }
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        match self {
            Self::OpenAI { .. } => None,
            Self::Ollama { timeout, .. } => *timeout,
        }
    }
}

/// Where the document indexes live and how the agents behave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Directory of the food-security knowledge base
    #[serde(default = "default_food_index")]
    pub food_index: PathBuf,

    /// Directory of the clinical-trials knowledge base
    #[serde(default = "default_clinical_index")]
    pub clinical_index: PathBuf,

    /// Number of chunks retrieved per question
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Upper bound on think/act/observe rounds for the web agent
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Model for the classifier; falls back to the generation model
    #[serde(default)]
    pub classifier_model: Option<String>,
}

fn default_food_index() -> PathBuf {
    PathBuf::from("un_food_index")
}

fn default_clinical_index() -> PathBuf {
    PathBuf::from("clinical_index")
}

fn default_top_k() -> u32 {
    3
}

fn default_max_iterations() -> u32 {
    6
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            food_index: default_food_index(),
            clinical_index: default_clinical_index(),
            top_k: default_top_k(),
            max_iterations: default_max_iterations(),
            classifier_model: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
    routing: Option<RoutingConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            log_level: None,
            log_format: None,
            verbose: false,
            no_color: false,
            llm: None,
            routing: RoutingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `MERIDIAN_WORKSPACE`: Override workspace path
    /// - `MERIDIAN_CONFIG`: Path to config file
    /// - `MERIDIAN_PROVIDER`: LLM provider
    /// - `MERIDIAN_MODEL`: Model identifier
    /// - `MERIDIAN_API_KEY`: API key
    /// - `MERIDIAN_LOG_FORMAT`: "pretty" or "json"
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Same as [`AppConfig::load`], with a workspace and config file chosen by
    /// the caller taking precedence over the environment.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var("MERIDIAN_WORKSPACE").ok().map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("MERIDIAN_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.meridian_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        if let Ok(provider) = std::env::var("MERIDIAN_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("MERIDIAN_MODEL") {
            config.model = model;
        }

        if let Ok(key) = std::env::var("MERIDIAN_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if let Ok(format) = std::env::var("MERIDIAN_LOG_FORMAT") {
            config.log_format = Some(format);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = Some(format);
            }
        }

        if let Some(routing) = config_file.routing {
            result.routing = routing;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = provider_config.model().to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .meridian directory.
    pub fn meridian_dir(&self) -> PathBuf {
        self.workspace.join(".meridian")
    }

    /// Directory holding prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.meridian_dir().join("prompts")
    }

    /// Resolved directory of the food-security knowledge base.
    pub fn food_index_dir(&self) -> PathBuf {
        self.resolve_path(&self.routing.food_index)
    }

    /// Resolved directory of the clinical knowledge base.
    pub fn clinical_index_dir(&self) -> PathBuf {
        self.resolve_path(&self.routing.clinical_index)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Model used by the classifier.
    pub fn classifier_model(&self) -> &str {
        self.routing.classifier_model.as_deref().unwrap_or(&self.model)
    }

    /// Get the configuration block for a provider, if the config file has one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Custom endpoint for a provider, if configured.
    pub fn endpoint(&self, provider: &str) -> Option<String> {
        self.get_provider_config(provider)
            .and_then(|pc| pc.endpoint())
            .map(str::to_string)
    }

    /// Request timeout configured for a provider, if any.
    pub fn request_timeout(&self, provider: &str) -> Option<Duration> {
        self.get_provider_config(provider)
            .and_then(ProviderConfig::timeout_secs)
            .map(Duration::from_secs)
    }

    /// Resolve the API key for a provider.
    ///
    /// Order: explicit key (`MERIDIAN_API_KEY`), the provider's `apiKeyEnv`,
    /// then `OPENAI_API_KEY` for the openai provider.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        let env_var = match self.get_provider_config(provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => Some(api_key_env.as_str()),
            Some(ProviderConfig::Ollama { .. }) => None,
            None if provider == "openai" => Some(DEFAULT_OPENAI_KEY_ENV),
            None => None,
        };

        env_var.and_then(|var| std::env::var(var).ok())
    }

    /// Validate configuration for the active provider.
    ///
    /// A missing credential is a start-up error: no agent can be built.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.as_str();

        if !KNOWN_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if provider == "openai" && self.resolve_api_key(provider).is_none() {
            let env_var = match self.get_provider_config(provider) {
                Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env.clone(),
                _ => DEFAULT_OPENAI_KEY_ENV.to_string(),
            };
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                env_var
            )));
        }

        if self.routing.top_k == 0 {
            return Err(AppError::Config("routing.topK must be at least 1".to_string()));
        }

        if self.routing.max_iterations == 0 {
            return Err(AppError::Config(
                "routing.maxIterations must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
