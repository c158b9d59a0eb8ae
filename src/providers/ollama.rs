use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::language_utils::get_language_name;
use crate::providers::{Translator, TranslatorFactory, TranslatorOptions};
use crate::translation::progress::{emit, ProgressEvent};

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
    /// Optional rate limit in requests per minute
    rate_limit: Option<u32>,
    /// Start time of the most recent request, for rate limiting
    last_request: Mutex<Option<Instant>>,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
}

/// Version response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
struct VersionResponse {
    version: String,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new client from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            client,
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
            rate_limit: config.rate_limit,
            last_request: Mutex::new(None),
        })
    }

    /// Wait until the configured rate limit allows another request
    async fn throttle(&self) {
        let Some(rate_limit) = self.rate_limit.filter(|rpm| *rpm > 0) else {
            return;
        };
        let interval = Duration::from_millis(60_000 / rate_limit as u64);

        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }

    /// Run a generation request, retrying transient failures with exponential backoff
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        loop {
            self.throttle().await;

            let error = match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<GenerationResponse>()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()));
                    }

                    let message = response.text().await.unwrap_or_default();
                    if status.as_u16() == 429 {
                        ProviderError::RateLimitExceeded(message)
                    } else {
                        ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message,
                        }
                    }
                }
                Err(e) if e.is_connect() || e.is_timeout() => ProviderError::ConnectionError(e.to_string()),
                Err(e) => ProviderError::RequestFailed(e.to_string()),
            };

            let retryable = match &error {
                ProviderError::ApiError { status_code, .. } => *status_code >= 500,
                ProviderError::ConnectionError(_) | ProviderError::RateLimitExceeded(_) => true,
                _ => false,
            };

            if !retryable || attempt >= self.max_retries {
                return Err(error);
            }

            let backoff = self.backoff_base_ms * 2u64.pow(attempt);
            warn!(
                "Ollama request failed (attempt {}/{}): {}; retrying in {}ms",
                attempt + 1,
                self.max_retries + 1,
                error,
                backoff
            );
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            attempt += 1;
        }
    }

    /// Fetch the server version, used as a readiness probe
    pub async fn version(&self) -> Result<String, ProviderError> {
        let url = format!("{}/api/version", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError {
                status_code: response.status().as_u16(),
                message: "Failed to get Ollama version".to_string(),
            });
        }

        let version: VersionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
        Ok(version.version)
    }
}

/// Translation capability backed by an Ollama server
#[derive(Debug, Clone)]
pub struct OllamaTranslatorFactory {
    client: Arc<Ollama>,
    model: String,
    system_prompt: String,
    temperature: f32,
}

impl OllamaTranslatorFactory {
    /// Create a factory from provider settings
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: Arc::new(Ollama::new(config)?),
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            temperature: config.temperature,
        })
    }
}

/// Fill the `{source_language}` and `{target_language}` placeholders
fn render_system_prompt(template: &str, source_language: &str, target_language: &str) -> String {
    let source_name = get_language_name(source_language).unwrap_or_else(|_| source_language.to_string());
    let target_name = get_language_name(target_language).unwrap_or_else(|_| target_language.to_string());
    template
        .replace("{source_language}", &source_name)
        .replace("{target_language}", &target_name)
}

#[async_trait]
impl TranslatorFactory for OllamaTranslatorFactory {
    async fn create(&self, options: TranslatorOptions) -> Result<Box<dyn Translator>, ProviderError> {
        let system = render_system_prompt(&self.system_prompt, &options.source_language, &options.target_language);
        debug!(
            "Creating Ollama translator {} -> {} with model {}",
            options.source_language, options.target_language, self.model
        );

        Ok(Box::new(OllamaTranslator {
            client: Arc::clone(&self.client),
            model: self.model.clone(),
            system,
            temperature: self.temperature,
            progress: options.progress,
        }))
    }
}

/// Translator bound to one language pair
struct OllamaTranslator {
    client: Arc<Ollama>,
    model: String,
    system: String,
    temperature: f32,
    progress: Option<crate::translation::progress::ProgressSender>,
}

#[async_trait]
impl Translator for OllamaTranslator {
    async fn ready(&self) -> Result<(), ProviderError> {
        let version = self.client.version().await?;
        debug!("Ollama server version {} is ready", version);
        if let Some(progress) = &self.progress {
            emit(progress, ProgressEvent::Download { loaded: 1, total: 1 });
        }
        Ok(())
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(&self.system)
            .temperature(self.temperature);

        let response = self.client.generate(&request).await?;
        let translated = response.response.trim();
        if translated.is_empty() {
            return Err(ProviderError::ParseError("Ollama returned an empty translation".to_string()));
        }
        Ok(translated.to_string())
    }
}
