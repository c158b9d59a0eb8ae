/*!
 * Tests for error types
 */

use std::error::Error;

use pagetrans::errors::{AppError, DetectionError, ProviderError, TranslationError};

#[test]
fn test_provider_error_display_withApiError_shouldIncludeStatus() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "model loading".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 503 - model loading");

    let pair = ProviderError::UnsupportedLanguagePair {
        source_language: "de".to_string(),
        target_language: "tlh".to_string(),
    };
    assert_eq!(pair.to_string(), "Unsupported language pair: de -> tlh");
}

#[test]
fn test_pass_failure_withProviderError_shouldExposeSourceAndDetail() {
    let error = TranslationError::pass_failure(
        "creating the translator",
        ProviderError::ConnectionError("refused".to_string()),
    );

    assert_eq!(
        error.to_string(),
        "Translation pass failed while creating the translator: Connection error: refused"
    );
    assert_eq!(error.detail(), "Connection error: refused");
    let source = error.source().expect("pass failure has a source");
    assert_eq!(source.to_string(), "Connection error: refused");
}

#[test]
fn test_capability_unavailable_detail_shouldExplainMissingTranslator() {
    let error = TranslationError::CapabilityUnavailable;

    assert_eq!(error.to_string(), "Translation capability is unavailable");
    assert!(error.source().is_none());
    assert!(!error.detail().is_empty());
}

#[test]
fn test_detection_error_display_shouldDescribeFailure() {
    assert_eq!(DetectionError::Unavailable.to_string(), "Language detection is unavailable");
    assert_eq!(
        DetectionError::Failed("boom".to_string()).to_string(),
        "Language detection failed: boom"
    );
}

#[test]
fn test_app_error_from_withLibraryErrors_shouldWrap() {
    let from_provider: AppError = ProviderError::Rejected("nope".to_string()).into();
    assert!(matches!(from_provider, AppError::Provider(_)));

    let from_translation: AppError = TranslationError::CapabilityUnavailable.into();
    assert!(matches!(from_translation, AppError::Translation(_)));

    let from_io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(from_io, AppError::File(_)));

    let from_anyhow: AppError = anyhow::anyhow!("odd").into();
    assert_eq!(from_anyhow.to_string(), "Unknown error: odd");
}
