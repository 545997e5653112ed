// Configuration data models
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// API credential and endpoint settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Where generated images are written
    #[serde(default)]
    pub output: OutputConfig,
    /// History persistence settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// HTTP timeouts and retry policy
    #[serde(default)]
    pub transport: TransportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output: OutputConfig::default(),
            history: HistoryConfig::default(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Credential and endpoint settings for the image API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API key sent with every request
    #[serde(default)]
    pub api_key: String,
    /// Base URL of the provider endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model identifier, also drives protocol selection
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
        }
    }
}

impl ApiConfig {
    /// Bundle the API settings into a credential for client construction.
    pub fn credential(&self) -> Credential {
        Credential {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }
}

/// A complete identity for talking to one provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

/// Output directory settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory generated images are saved into, created on demand
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            save_dir: default_save_dir(),
        }
    }
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("./output/images")
}

/// History persistence settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    /// Path of the history JSON file
    #[serde(default = "default_history_path")]
    pub path: PathBuf,
    /// Maximum retained edit sessions, oldest evicted first
    #[serde(default = "default_max_edit_sessions")]
    pub max_edit_sessions: usize,
    /// Maximum retained generation records, oldest evicted first
    #[serde(default = "default_max_generation_records")]
    pub max_generation_records: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
            max_edit_sessions: default_max_edit_sessions(),
            max_generation_records: default_max_generation_records(),
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prompt2png")
        .join("history.json")
}

fn default_max_edit_sessions() -> usize {
    10
}

fn default_max_generation_records() -> usize {
    100
}

/// HTTP timeout and retry settings.
///
/// Defaults match the provider limits the client was tuned against:
/// generation responses can take minutes, so read timeouts are long,
/// while the connect timeout stays short to fail fast on dead hosts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Read timeout for generation and edit requests, in seconds
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Read timeout for reference-guided requests, in seconds
    #[serde(default = "default_reference_read_timeout_secs")]
    pub reference_read_timeout_secs: u64,
    /// Timeout for downloading an image from a returned URL, in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,
    /// Retries after the initial attempt, transient failures only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff multiplier for generation and edit retries, in seconds.
    /// The wait before retry N is N times this value.
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: f64,
    /// Backoff multiplier for reference-guided retries, in seconds
    #[serde(default = "default_reference_retry_backoff_secs")]
    pub reference_retry_backoff_secs: f64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            read_timeout_secs: default_read_timeout_secs(),
            reference_read_timeout_secs: default_reference_read_timeout_secs(),
            download_timeout_secs: default_download_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_secs: default_retry_backoff_secs(),
            reference_retry_backoff_secs: default_reference_retry_backoff_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_read_timeout_secs() -> u64 {
    180
}

fn default_reference_read_timeout_secs() -> u64 {
    200
}

fn default_download_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_secs() -> f64 {
    2.0
}

fn default_reference_retry_backoff_secs() -> f64 {
    3.0
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
