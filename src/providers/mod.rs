/*!
 * Capabilities provided by the host.
 *
 * The engine never talks to a translation backend directly. It asks a
 * [`TranslatorFactory`] for a translator bound to one language pair and,
 * when the source language is "auto", optionally asks a
 * [`LanguageDetectorFactory`] what the page is written in.
 *
 * Implementations:
 * - `ollama`: translation through a local Ollama server
 * - `mock`: deterministic translator and detector for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{DetectionError, ProviderError};
use crate::translation::progress::ProgressSender;

/// Parameters for creating a translator
#[derive(Debug, Clone)]
pub struct TranslatorOptions {
    /// Resolved source language code
    pub source_language: String,
    /// Target language code
    pub target_language: String,
    /// Where to report preparation progress as `(loaded, total)`
    pub progress: Option<ProgressSender>,
}

/// A translator bound to one language pair
#[async_trait]
pub trait Translator: Send + Sync {
    /// Resolve once the translator can accept work.
    ///
    /// Translators that are usable right after creation keep the default.
    async fn ready(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    /// Translate a single piece of text
    async fn translate(&self, text: &str) -> Result<String, ProviderError>;
}

/// Creates translators for a language pair
#[async_trait]
pub trait TranslatorFactory: Send + Sync + Debug {
    /// Create a translator for `options.source_language -> options.target_language`
    async fn create(&self, options: TranslatorOptions) -> Result<Box<dyn Translator>, ProviderError>;
}

/// Whether a detector can be used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Detection cannot be used on this host
    Unavailable,
    /// Usable once its model has been fetched
    Downloadable,
    /// Usable right away
    Available,
}

impl Availability {
    /// Whether detection may be attempted
    pub fn is_usable(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// One candidate language reported by a detector
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLanguage {
    /// Language tag as reported by the detector
    pub language: String,
    /// Confidence between 0 and 1
    pub confidence: f32,
}

/// Creates language detectors
#[async_trait]
pub trait LanguageDetectorFactory: Send + Sync + Debug {
    /// Report whether detection is usable
    async fn availability(&self) -> Availability;

    /// Create a detector
    async fn create(&self) -> Result<Box<dyn LanguageDetector>, DetectionError>;
}

/// Detects the language of a text
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Ranked candidates, best guess first
    async fn detect(&self, text: &str) -> Result<Vec<DetectedLanguage>, DetectionError>;
}

/// The capabilities a host exposes to the engine
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Translation capability; `None` when the host has none
    pub translator: Option<Arc<dyn TranslatorFactory>>,
    /// Optional language detection capability
    pub detector: Option<Arc<dyn LanguageDetectorFactory>>,
}

impl Capabilities {
    /// Capabilities with a translator and no detector
    pub fn with_translator(translator: Arc<dyn TranslatorFactory>) -> Self {
        Self {
            translator: Some(translator),
            detector: None,
        }
    }

    /// Add a language detector
    pub fn and_detector(mut self, detector: Arc<dyn LanguageDetectorFactory>) -> Self {
        self.detector = Some(detector);
        self
    }
}

pub mod mock;
pub mod ollama;
