/*!
 * Mock capability implementations.
 *
 * Used by the test suite and by the CLI's `--provider mock` dry-run mode:
 * - `MockTranslatorFactory::working()` - Always succeeds, tagging text with the target language
 * - `MockTranslatorFactory::with_dictionary()` - Looks translations up in a fixed table
 * - `MockTranslatorFactory::failing()` - Every translate call fails
 * - `MockDetectorFactory` - Scripted language detection
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::errors::{DetectionError, ProviderError};
use crate::providers::{
    Availability, DetectedLanguage, LanguageDetector, LanguageDetectorFactory, Translator, TranslatorFactory,
    TranslatorOptions,
};
use crate::translation::progress::{emit, ProgressEvent};

/// Behavior mode for the mock translator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Fails every Nth translate call
    Intermittent { fail_every: usize },
    /// Every translate call fails
    Failing,
    /// Creating the translator fails
    CreationFails,
    /// The translator never becomes ready
    NeverReady,
}

/// Shared call bookkeeping for a mock translator factory
#[derive(Debug, Default)]
struct CallLog {
    /// Texts passed to `translate`, in call order
    requests: Mutex<Vec<String>>,
    /// Language pairs passed to `create`
    created: Mutex<Vec<(String, String)>>,
    /// Total translate calls
    count: AtomicUsize,
}

/// Mock translator factory for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockTranslatorFactory {
    /// Behavior mode
    behavior: MockBehavior,
    /// Call bookkeeping shared with every translator created
    calls: Arc<CallLog>,
    /// Fixed translations, looked up by exact source text
    dictionary: Arc<HashMap<String, String>>,
    /// Source texts whose translation always fails
    failing_texts: Arc<Mutex<HashSet<String>>>,
    /// Number of download progress steps to report on creation
    download_steps: u64,
    /// Simulated latency per translate call
    delay: Option<Duration>,
}

impl MockTranslatorFactory {
    /// Create a new mock factory with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: Arc::new(CallLog::default()),
            dictionary: Arc::new(HashMap::new()),
            failing_texts: Arc::new(Mutex::new(HashSet::new())),
            download_steps: 0,
            delay: None,
        }
    }

    /// Create a working mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock whose translate calls always fail
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails every Nth translate call
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a working mock answering from a fixed table
    pub fn with_dictionary<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut factory = Self::working();
        factory.dictionary = Arc::new(entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        factory
    }

    /// Make translation of this exact source text fail
    pub fn fail_on(self, text: impl Into<String>) -> Self {
        self.failing_texts.lock().insert(text.into());
        self
    }

    /// Report `steps` download progress events when a translator is created
    pub fn with_download_steps(mut self, steps: u64) -> Self {
        self.download_steps = steps;
        self
    }

    /// Delay every translate call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of translate calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.count.load(Ordering::SeqCst)
    }

    /// Texts passed to translate, in call order
    pub fn requests(&self) -> Vec<String> {
        self.calls.requests.lock().clone()
    }

    /// Language pairs translators were created for
    pub fn created_pairs(&self) -> Vec<(String, String)> {
        self.calls.created.lock().clone()
    }

    /// The translation this mock produces for `text` into `target_language`
    pub fn expected_translation(&self, text: &str, target_language: &str) -> String {
        match self.dictionary.get(text) {
            Some(translated) => translated.clone(),
            None => format!("[{}] {}", target_language, text),
        }
    }
}

#[async_trait]
impl TranslatorFactory for MockTranslatorFactory {
    async fn create(&self, options: TranslatorOptions) -> Result<Box<dyn Translator>, ProviderError> {
        self.calls
            .created
            .lock()
            .push((options.source_language.clone(), options.target_language.clone()));

        if self.behavior == MockBehavior::CreationFails {
            return Err(ProviderError::UnsupportedLanguagePair {
                source_language: options.source_language,
                target_language: options.target_language,
            });
        }

        if let Some(progress) = &options.progress {
            for step in 1..=self.download_steps {
                emit(progress, ProgressEvent::Download { loaded: step, total: self.download_steps });
            }
        }

        Ok(Box::new(MockTranslator {
            factory: self.clone(),
            target_language: options.target_language,
        }))
    }
}

/// Translator created by [`MockTranslatorFactory`]
struct MockTranslator {
    factory: MockTranslatorFactory,
    target_language: String,
}

#[async_trait]
impl Translator for MockTranslator {
    async fn ready(&self) -> Result<(), ProviderError> {
        match self.factory.behavior {
            MockBehavior::NeverReady => Err(ProviderError::ConnectionError("model failed to load".to_string())),
            _ => Ok(()),
        }
    }

    async fn translate(&self, text: &str) -> Result<String, ProviderError> {
        let count = self.factory.calls.count.fetch_add(1, Ordering::SeqCst);
        self.factory.calls.requests.lock().push(text.to_string());

        if let Some(delay) = self.factory.delay {
            tokio::time::sleep(delay).await;
        }

        if self.factory.failing_texts.lock().contains(text) {
            return Err(ProviderError::Rejected(format!("scripted failure for '{}'", text)));
        }

        match self.factory.behavior {
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 500,
                message: "Simulated server error".to_string(),
            }),
            MockBehavior::Intermittent { fail_every } if fail_every > 0 && count % fail_every == fail_every - 1 => {
                Err(ProviderError::RateLimitExceeded("Simulated rate limit".to_string()))
            }
            _ => Ok(self.factory.expected_translation(text, &self.target_language)),
        }
    }
}

/// Mock language detector factory
#[derive(Debug, Clone)]
pub struct MockDetectorFactory {
    availability: Availability,
    outcome: Result<Vec<DetectedLanguage>, DetectionError>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockDetectorFactory {
    /// Detector that reports the given languages, best first
    pub fn detecting(languages: &[&str]) -> Self {
        let step = 1.0 / (languages.len().max(1) as f32 + 1.0);
        let results = languages
            .iter()
            .enumerate()
            .map(|(i, language)| DetectedLanguage {
                language: language.to_string(),
                confidence: 1.0 - step * (i as f32 + 1.0),
            })
            .collect();
        Self {
            availability: Availability::Available,
            outcome: Ok(results),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Detector that reports itself unusable
    pub fn unavailable() -> Self {
        Self {
            availability: Availability::Unavailable,
            outcome: Err(DetectionError::Unavailable),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Detector whose detect call fails
    pub fn failing() -> Self {
        Self {
            availability: Availability::Available,
            outcome: Err(DetectionError::Failed("Simulated detector crash".to_string())),
            inputs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Texts passed to detect
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }
}

#[async_trait]
impl LanguageDetectorFactory for MockDetectorFactory {
    async fn availability(&self) -> Availability {
        self.availability
    }

    async fn create(&self) -> Result<Box<dyn LanguageDetector>, DetectionError> {
        if !self.availability.is_usable() {
            return Err(DetectionError::Unavailable);
        }
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl LanguageDetector for MockDetectorFactory {
    async fn detect(&self, text: &str) -> Result<Vec<DetectedLanguage>, DetectionError> {
        self.inputs.lock().push(text.to_string());
        self.outcome.clone()
    }
}
