use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::language_utils;
use crate::settings::Settings;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// User-facing translation settings
    #[serde(default)]
    pub settings: Settings,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Translation provider config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Deterministic offline translator
    Mock,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Settings for the Ollama-backed translator
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Model name
    #[serde(default = "default_ollama_model")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// System prompt template for translation
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: default_ollama_model(),
            endpoint: default_ollama_endpoint(),
            timeout_secs: default_timeout_secs(),
            rate_limit: None,
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Ollama provider settings
    #[serde(default)]
    pub ollama: ProviderConfig,
}

/// Engine tuning knobs
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    /// Text units translated concurrently per batch (15-25)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Characters of page text handed to language detection
    #[serde(default = "default_detection_prefix_chars")]
    pub detection_prefix_chars: usize,

    /// Source language assumed when neither detection nor the page tells us
    #[serde(default = "default_fallback_language")]
    pub fallback_language: String,

    /// Delay before auto-translating a freshly loaded page
    #[serde(default = "default_auto_translate_delay_ms")]
    pub auto_translate_delay_ms: u64,

    /// Hosts never auto-translated (substring match on the host name)
    #[serde(default = "default_skip_domains")]
    pub skip_domains: Vec<String>,

    /// How long the completion message stays up
    #[serde(default = "default_complete_hide_delay_ms")]
    pub complete_hide_delay_ms: u64,

    /// How long a failure message stays up
    #[serde(default = "default_failure_hide_delay_ms")]
    pub failure_hide_delay_ms: u64,

    /// How long the restore message stays up
    #[serde(default = "default_restore_hide_delay_ms")]
    pub restore_hide_delay_ms: u64,
}

/// Smallest accepted batch size
pub const MIN_BATCH_SIZE: usize = 15;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 25;

impl EngineConfig {
    /// Batch size clamped into the supported range
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE)
    }

    /// Whether `host` is excluded from auto-translation
    pub fn is_skipped_host(&self, host: &str) -> bool {
        self.skip_domains.iter().any(|domain| host.contains(domain.as_str()))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            detection_prefix_chars: default_detection_prefix_chars(),
            fallback_language: default_fallback_language(),
            auto_translate_delay_ms: default_auto_translate_delay_ms(),
            skip_domains: default_skip_domains(),
            complete_hide_delay_ms: default_complete_hide_delay_ms(),
            failure_hide_delay_ms: default_failure_hide_delay_ms(),
            restore_hide_delay_ms: default_restore_hide_delay_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_batch_size() -> usize {
    20
}

fn default_detection_prefix_chars() -> usize {
    2000
}

fn default_fallback_language() -> String {
    "de".to_string()
}

fn default_auto_translate_delay_ms() -> u64 {
    1500
}

fn default_skip_domains() -> Vec<String> {
    ["google.com", "youtube.com", "github.com", "localhost"]
        .iter()
        .map(|domain| domain.to_string())
        .collect()
}

fn default_complete_hide_delay_ms() -> u64 {
    3000
}

fn default_failure_hide_delay_ms() -> u64 {
    5000
}

fn default_restore_hide_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3 // Default to 3 retries
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_temperature() -> f32 {
    0.3
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_system_prompt() -> String {
    "You are a professional translator. Translate the following text from {source_language} to {target_language}. Reply with the translation only.".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        if !self.settings.is_auto_source() {
            language_utils::get_language_name(&self.settings.source_language)
                .context("Invalid source language")?;
        }
        language_utils::get_language_name(&self.settings.target_language).context("Invalid target language")?;
        language_utils::get_language_name(&self.engine.fallback_language).context("Invalid fallback language")?;

        for language in &self.settings.ignored_languages {
            language_utils::validate_language_code(language)
                .with_context(|| format!("Invalid ignored language: {}", language))?;
        }

        if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&self.engine.batch_size) {
            return Err(anyhow!(
                "Batch size must be between {} and {}, got {}",
                MIN_BATCH_SIZE,
                MAX_BATCH_SIZE,
                self.engine.batch_size
            ));
        }

        if self.settings.shortcut.key.trim().is_empty() {
            return Err(anyhow!("Shortcut key must not be empty"));
        }

        if self.translation.provider == TranslationProvider::Ollama && self.translation.ollama.endpoint.is_empty() {
            return Err(anyhow!("Ollama endpoint is required for the Ollama provider"));
        }

        Ok(())
    }

    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load `path`, creating it with defaults when it does not exist
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Self::default();
        config.save(path)?;
        Ok(config)
    }
}
