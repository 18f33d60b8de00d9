//! Configuration management
//!
//! Values come from `config.yml` when present. Every default can be overridden
//! through the environment, which is read once when the config is built.

use crate::error::{Result, StudyMateError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Chat and embedding service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Upload limits
    #[serde(default)]
    pub upload: UploadConfig,

    /// Chunking and fallback retrieval tuning
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Input/output safety checks
    #[serde(default)]
    pub guardrails: GuardrailConfig,
}

/// LLM service configuration for an OpenAI-compatible API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the chat completions service
    pub url: String,

    /// Model name for answer generation
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature for answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("STUDYMATE_LLM_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("STUDYMATE_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("STUDYMATE_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string())
}

fn default_timeout() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    512
}

/// Upload validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum upload size in megabytes
    pub max_file_size_mb: u64,

    /// Allowed file extensions, without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: env_or("MAX_FILE_SIZE_MB", 10),
            allowed_extensions: std::env::var("ALLOWED_EXTENSIONS")
                .map(|s| parse_extensions(&s))
                .unwrap_or_else(|_| vec!["pdf".to_string()]),
        }
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Which embedder backs the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// OpenAI-compatible embeddings endpoint
    Http,
    /// Local token-hashing embedder (offline, deterministic)
    Hash,
}

impl FromStr for EmbedderKind {
    type Err = StudyMateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "http" | "openai" => Ok(Self::Http),
            "hash" | "local" => Ok(Self::Hash),
            other => Err(StudyMateError::Config(format!("Unknown embedder: {}", other))),
        }
    }
}

/// Acceptance thresholds for the four searching fallback levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub direct: f64,
    pub keyword: f64,
    pub semantic: f64,
    pub cross_domain: f64,
}

impl LevelThresholds {
    pub fn as_array(&self) -> [f64; 4] {
        [self.direct, self.keyword, self.semantic, self.cross_domain]
    }

    /// Thresholds must broaden acceptance as the levels escalate
    pub fn is_strictly_decreasing(&self) -> bool {
        self.as_array().windows(2).all(|w| w[0] > w[1])
    }

    /// Every threshold in (0, 1]
    pub fn in_range(&self) -> bool {
        self.as_array().iter().all(|t| *t > 0.0 && *t <= 1.0)
    }

    /// Reject thresholds that cannot drive the fallback ladder
    pub fn check(&self) -> Result<()> {
        if !self.in_range() {
            return Err(StudyMateError::Config(format!(
                "{}, got {}",
                THRESHOLD_RANGE_ISSUE,
                self.describe()
            )));
        }
        if !self.is_strictly_decreasing() {
            return Err(StudyMateError::Config(format!(
                "{}, got {} (SIMILARITY_THRESHOLD sets Level 1)",
                THRESHOLD_ORDER_ISSUE,
                self.describe()
            )));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!(
            "L1 {} L2 {} L3 {} L4 {}",
            self.direct, self.keyword, self.semantic, self.cross_domain
        )
    }
}

const THRESHOLD_RANGE_ISSUE: &str = "Level thresholds must be between 0 and 1";
const THRESHOLD_ORDER_ISSUE: &str =
    "Level thresholds must be strictly decreasing from Level 1 to Level 4";

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            direct: env_or("SIMILARITY_THRESHOLD", 0.80),
            keyword: 0.65,
            semantic: 0.50,
            cross_domain: 0.35,
        }
    }
}

/// Chunking and retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Passages requested at Level 1
    pub top_k: usize,

    /// Extra passages requested at each later level
    #[serde(default = "default_k_step")]
    pub k_step: usize,

    #[serde(default)]
    pub thresholds: LevelThresholds,

    /// Level 4 passages offered as closest guesses in the fallback answer
    #[serde(default = "default_closest_guesses")]
    pub closest_guesses: usize,

    #[serde(default = "default_embedder")]
    pub embedder: EmbedderKind,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: env_or("CHUNK_SIZE", 800),
            chunk_overlap: env_or("CHUNK_OVERLAP", 150),
            top_k: env_or("TOP_K", 10),
            k_step: default_k_step(),
            thresholds: LevelThresholds::default(),
            closest_guesses: default_closest_guesses(),
            embedder: default_embedder(),
        }
    }
}

fn default_k_step() -> usize {
    2
}

fn default_closest_guesses() -> usize {
    3
}

fn default_embedder() -> EmbedderKind {
    std::env::var("STUDYMATE_EMBEDDER")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(EmbedderKind::Http)
}

/// Safety filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailConfig {
    /// Run the content rules (length checks always run)
    pub enabled: bool,
    pub max_query_length: usize,
    pub max_response_length: usize,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            enabled: std::env::var("ENABLE_GUARDRAILS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(true),
            max_query_length: env_or("MAX_QUERY_LENGTH", 500),
            max_response_length: env_or("MAX_RESPONSE_LENGTH", 2000),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Result of `Config::validate`
#[derive(Debug, Clone, Serialize)]
pub struct ConfigReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub api_key_set: bool,
    pub model: String,
    pub embedding_model: String,
    pub embedder: EmbedderKind,
    pub max_file_size_mb: u64,
    pub allowed_extensions: Vec<String>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub thresholds: LevelThresholds,
    pub guardrails_enabled: bool,
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load config from a specific path, using defaults if it does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("STUDYMATE_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Check the configuration and summarise it
    pub fn validate(&self) -> ConfigReport {
        let mut issues = Vec::new();

        let needs_key = self.retrieval.embedder == EmbedderKind::Http
            || self.llm_service.url.contains("openai.com");
        if needs_key && self.llm_service.api_key.is_none() {
            issues.push("OPENAI_API_KEY is not set".to_string());
        }
        if self.upload.max_file_size_mb == 0 {
            issues.push("MAX_FILE_SIZE_MB must be positive".to_string());
        }
        if self.upload.allowed_extensions.is_empty() {
            issues.push("ALLOWED_EXTENSIONS must name at least one extension".to_string());
        }
        if self.retrieval.chunk_size == 0 {
            issues.push("CHUNK_SIZE must be positive".to_string());
        }
        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            issues.push("CHUNK_OVERLAP must be smaller than CHUNK_SIZE".to_string());
        }
        if self.retrieval.top_k == 0 {
            issues.push("TOP_K must be positive".to_string());
        }
        let thresholds = self.retrieval.thresholds;
        if !thresholds.in_range() {
            issues.push(THRESHOLD_RANGE_ISSUE.to_string());
        }
        if !thresholds.is_strictly_decreasing() {
            issues.push(THRESHOLD_ORDER_ISSUE.to_string());
        }

        ConfigReport {
            valid: issues.is_empty(),
            issues,
            api_key_set: self.llm_service.api_key.is_some(),
            model: self.llm_service.model.clone(),
            embedding_model: self.llm_service.embedding_model.clone(),
            embedder: self.retrieval.embedder,
            max_file_size_mb: self.upload.max_file_size_mb,
            allowed_extensions: self.upload.allowed_extensions.clone(),
            chunk_size: self.retrieval.chunk_size,
            chunk_overlap: self.retrieval.chunk_overlap,
            top_k: self.retrieval.top_k,
            thresholds,
            guardrails_enabled: self.guardrails.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_strictly_decreasing() {
        let thresholds = LevelThresholds {
            direct: 0.8,
            keyword: 0.65,
            semantic: 0.5,
            cross_domain: 0.35,
        };
        assert!(thresholds.is_strictly_decreasing());

        let flat = LevelThresholds {
            keyword: 0.8,
            ..thresholds
        };
        assert!(!flat.is_strictly_decreasing());
    }

    #[test]
    fn test_check_rejects_unusable_thresholds() {
        let good = LevelThresholds {
            direct: 0.8,
            keyword: 0.65,
            semantic: 0.5,
            cross_domain: 0.35,
        };
        assert!(good.check().is_ok());

        let inverted = LevelThresholds {
            direct: 0.5,
            ..good
        };
        match inverted.check() {
            Err(StudyMateError::Config(msg)) => assert!(msg.contains("strictly decreasing")),
            other => panic!("expected a config error, got {other:?}"),
        }

        let zero = LevelThresholds {
            cross_domain: 0.0,
            ..good
        };
        assert!(matches!(zero.check(), Err(StudyMateError::Config(_))));

        let above_one = LevelThresholds {
            direct: 1.2,
            ..good
        };
        assert!(matches!(above_one.check(), Err(StudyMateError::Config(_))));
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("pdf, .TXT,,md"), vec!["pdf", "txt", "md"]);
    }

    #[test]
    fn test_embedder_kind_from_str() {
        assert_eq!("hash".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hash);
        assert_eq!("OpenAI".parse::<EmbedderKind>().unwrap(), EmbedderKind::Http);
        assert!("candle".parse::<EmbedderKind>().is_err());
    }

    #[test]
    fn test_validate_reports_bad_thresholds() {
        let mut config = Config::default();
        config.llm_service.api_key = Some("sk-test".to_string());
        config.retrieval.chunk_size = 800;
        config.retrieval.chunk_overlap = 150;
        config.retrieval.thresholds = LevelThresholds {
            direct: 0.5,
            keyword: 0.6,
            semantic: 0.4,
            cross_domain: 0.3,
        };
        let report = config.validate();
        assert!(!report.valid);
        assert!(report.issues.iter().any(|i| i.contains("strictly decreasing")));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_sections() {
        let yaml = r#"
llm_service:
  url: http://localhost:8000
  model: local-model
upload:
  max_file_size_mb: 5
  allowed_extensions: [pdf]
retrieval:
  chunk_size: 400
  chunk_overlap: 40
  top_k: 4
  embedder: hash
guardrails:
  enabled: false
  max_query_length: 200
  max_response_length: 1000
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.llm_service.model, "local-model");
        assert_eq!(config.upload.max_file_size_mb, 5);
        assert_eq!(config.retrieval.top_k, 4);
        assert_eq!(config.retrieval.k_step, 2);
        assert_eq!(config.retrieval.embedder, EmbedderKind::Hash);
        assert!(!config.guardrails.enabled);
    }
}
