/*!
 * Source language resolution.
 *
 * Decides which language a page is written in for one pass, and whether the
 * pass should run at all.
 */

use log::{debug, info, warn};

use crate::document::Document;
use crate::errors::DetectionError;
use crate::language_utils::normalize_language_tag;
use crate::providers::LanguageDetectorFactory;
use crate::settings::Settings;

/// Why a pass was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pass is running on this document
    PassInFlight,
    /// The document is already translated and force was not requested
    AlreadyTranslated,
    /// Undo was requested but nothing is translated
    NotTranslated,
    /// The source language is on the ignore list
    IgnoredLanguage(String),
    /// The source language already is the target language
    SameLanguage(String),
    /// Auto-translation is switched off
    AutoTranslateDisabled,
    /// The page's host is excluded from auto-translation
    ExcludedHost(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PassInFlight => write!(f, "a translation pass is already running"),
            Self::AlreadyTranslated => write!(f, "the document is already translated"),
            Self::NotTranslated => write!(f, "the document is not translated"),
            Self::IgnoredLanguage(code) => write!(f, "source language '{}' is ignored", code),
            Self::SameLanguage(code) => write!(f, "source and target language are both '{}'", code),
            Self::AutoTranslateDisabled => write!(f, "auto-translation is disabled"),
            Self::ExcludedHost(host) => write!(f, "host '{}' is excluded from auto-translation", host),
        }
    }
}

/// Works out the effective source language of a pass
pub struct LanguageResolver<'a> {
    /// Optional detection capability
    detector: Option<&'a dyn LanguageDetectorFactory>,
    /// Characters of page text handed to the detector
    prefix_chars: usize,
    /// Last-resort language code
    fallback_language: &'a str,
}

impl<'a> LanguageResolver<'a> {
    /// Create a resolver
    pub fn new(
        detector: Option<&'a dyn LanguageDetectorFactory>,
        prefix_chars: usize,
        fallback_language: &'a str,
    ) -> Self {
        Self {
            detector,
            prefix_chars,
            fallback_language,
        }
    }

    /// Resolve the source language for `settings` on `document`.
    ///
    /// An explicit setting wins. With "auto", detection on the page text is
    /// tried first, then the document's declared language, then the fallback.
    /// The result is always reduced to its primary subtag.
    pub async fn resolve(&self, settings: &Settings, document: &Document) -> String {
        let resolved = if settings.is_auto_source() {
            match self.detect(document).await {
                Ok(language) => {
                    info!("Detected page language: {}", language);
                    language
                }
                Err(e) => {
                    let declared = document.declared_language();
                    warn!(
                        "{}; falling back to {}",
                        e,
                        declared.as_deref().map_or("the default language", |_| "the declared document language")
                    );
                    declared.unwrap_or_else(|| self.fallback_language.to_string())
                }
            }
        } else {
            settings.source_language.clone()
        };

        normalize_language_tag(&resolved)
            .or_else(|| normalize_language_tag(self.fallback_language))
            .unwrap_or_default()
    }

    /// Run the detector over the start of the page text
    async fn detect(&self, document: &Document) -> Result<String, DetectionError> {
        let factory = self.detector.ok_or(DetectionError::Unavailable)?;
        if !factory.availability().await.is_usable() {
            return Err(DetectionError::Unavailable);
        }

        let detector = factory.create().await?;
        let sample = document.rendered_text(self.prefix_chars);
        debug!("Running language detection on {} characters", sample.chars().count());

        let candidates = detector.detect(&sample).await?;
        candidates
            .into_iter()
            .next()
            .map(|candidate| candidate.language)
            .filter(|language| !language.trim().is_empty())
            .ok_or(DetectionError::NoResult)
    }
}

/// Decide whether a pass from `source_language` should be skipped
pub fn skip_reason(source_language: &str, settings: &Settings) -> Option<SkipReason> {
    if settings.is_ignored(source_language) {
        return Some(SkipReason::IgnoredLanguage(source_language.to_string()));
    }
    if settings.is_target(source_language) {
        return Some(SkipReason::SameLanguage(source_language.to_string()));
    }
    None
}
