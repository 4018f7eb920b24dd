//! Configuration management for the LexPlain service
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/<env>, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Session store configuration
    pub session: SessionConfig,

    /// Answer provider (LLM) configuration
    pub llm: LlmConfig,

    /// Translation configuration
    pub translation: TranslationConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Maximum upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session time-to-live in seconds, fixed at creation (not sliding)
    #[serde(default = "default_session_ttl")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// API key; "mock" selects the deterministic local provider
    #[serde(default = "default_llm_api_key")]
    pub api_key: String,

    /// Chat completions endpoint
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Model name
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Fallback chat completions endpoint, tried when the primary fails
    pub fallback_api_url: Option<String>,

    /// Fallback API key (defaults to the primary key)
    pub fallback_api_key: Option<String>,

    /// Fallback model name
    pub fallback_model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationConfig {
    /// Enable the translation layer
    #[serde(default)]
    pub enabled: bool,

    /// Translation endpoint (LibreTranslate-compatible)
    #[serde(default = "default_translation_api_url")]
    pub api_url: String,

    /// Optional API key
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_translation_timeout")]
    pub timeout_secs: u64,

    /// Supported language codes, first entry is the pivot language
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log filter (tracing EnvFilter syntax)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    60
}
fn default_max_concurrent() -> usize {
    100
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_session_ttl() -> u64 {
    30 * 60
}
fn default_llm_api_key() -> String {
    "mock".to_string()
}
fn default_llm_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_llm_timeout() -> u64 {
    45
}
fn default_llm_temperature() -> f32 {
    0.2
}
fn default_translation_api_url() -> String {
    "http://localhost:5000/translate".to_string()
}
fn default_translation_timeout() -> u64 {
    15
}
fn default_languages() -> Vec<String> {
    ["en", "es", "fr", "de", "hi", "zh"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_service_name() -> String {
    "lexplain".to_string()
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__SESSION__TTL_SECS=600
            .add_source(Environment::with_prefix("APP").separator("__").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get session TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
                max_concurrent_requests: default_max_concurrent(),
                max_upload_bytes: default_max_upload_bytes(),
            },
            session: SessionConfig {
                ttl_secs: default_session_ttl(),
            },
            llm: LlmConfig {
                api_key: default_llm_api_key(),
                api_url: default_llm_api_url(),
                model: default_llm_model(),
                fallback_api_url: None,
                fallback_api_key: None,
                fallback_model: None,
                timeout_secs: default_llm_timeout(),
                temperature: default_llm_temperature(),
            },
            translation: TranslationConfig {
                enabled: false,
                api_url: default_translation_api_url(),
                api_key: None,
                timeout_secs: default_translation_timeout(),
                languages: default_languages(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: false,
                service_name: default_service_name(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.ttl_secs, 30 * 60);
        assert_eq!(config.llm.api_key, "mock");
    }

    #[test]
    fn test_session_ttl_duration() {
        let config = AppConfig::default();
        assert_eq!(config.session_ttl(), Duration::from_secs(1800));
    }

    #[test]
    fn test_pivot_language_is_english() {
        let config = AppConfig::default();
        assert_eq!(config.translation.languages[0], "en");
    }
}
