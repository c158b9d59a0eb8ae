/*!
 * Tests for source language resolution and the skip gate
 */

use pagetrans::document::Document;
use pagetrans::providers::mock::MockDetectorFactory;
use pagetrans::translation::{skip_reason, LanguageResolver, SkipReason};

use crate::common;

#[tokio::test]
async fn test_resolve_withExplicitSource_shouldIgnoreDetector() {
    let detector = MockDetectorFactory::detecting(&["fr"]);
    let resolver = LanguageResolver::new(Some(&detector), 2000, "de");
    let document = Document::parse(&common::paragraphs_page(Some("it"), &["Ciao"]));

    let language = resolver.resolve(&common::settings_from("es"), &document).await;

    assert_eq!(language, "es");
    assert!(detector.inputs().is_empty());
}

#[tokio::test]
async fn test_resolve_withExplicitRegionalSource_shouldKeepPrimarySubtag() {
    let resolver = LanguageResolver::new(None, 2000, "de");
    let document = Document::parse(&common::paragraphs_page(None, &["Olá"]));

    let language = resolver.resolve(&common::settings_from("pt-BR"), &document).await;

    assert_eq!(language, "pt");
}

#[tokio::test]
async fn test_resolve_withAutoAndDetector_shouldUseTopCandidate() {
    let detector = MockDetectorFactory::detecting(&["fr-CA", "en"]);
    let resolver = LanguageResolver::new(Some(&detector), 2000, "de");
    let document = Document::parse(&common::paragraphs_page(Some("it"), &["Bonjour", "tout le monde"]));

    let language = resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(language, "fr");
    assert_eq!(detector.inputs(), vec!["Bonjour tout le monde".to_string()]);
}

#[tokio::test]
async fn test_resolve_withPrefixLimit_shouldOnlySendPrefix() {
    let detector = MockDetectorFactory::detecting(&["de"]);
    let resolver = LanguageResolver::new(Some(&detector), 5, "de");
    let document = Document::parse(&common::paragraphs_page(None, &["Guten Tag"]));

    resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(detector.inputs(), vec!["Guten".to_string()]);
}

#[tokio::test]
async fn test_resolve_withUnavailableDetector_shouldUseDeclaredLanguage() {
    let detector = MockDetectorFactory::unavailable();
    let resolver = LanguageResolver::new(Some(&detector), 2000, "de");
    let document = Document::parse(&common::paragraphs_page(Some("nl-BE"), &["Hallo"]));

    let language = resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(language, "nl");
    assert!(detector.inputs().is_empty());
}

#[tokio::test]
async fn test_resolve_withFailingDetector_shouldUseDeclaredLanguage() {
    let detector = MockDetectorFactory::failing();
    let resolver = LanguageResolver::new(Some(&detector), 2000, "de");
    let document = Document::parse(&common::paragraphs_page(Some("sv"), &["Hej"]));

    let language = resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(language, "sv");
}

#[tokio::test]
async fn test_resolve_withEmptyDetectionResult_shouldFallBack() {
    let detector = MockDetectorFactory::detecting(&[]);
    let resolver = LanguageResolver::new(Some(&detector), 2000, "de");
    let document = Document::parse(&common::paragraphs_page(Some("pl"), &["Cześć"]));

    let language = resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(language, "pl");
}

#[tokio::test]
async fn test_resolve_withNothingKnown_shouldUseFallbackLanguage() {
    let resolver = LanguageResolver::new(None, 2000, "de");
    let document = Document::parse(&common::paragraphs_page(None, &["Irgendwas"]));

    let language = resolver.resolve(&common::settings_from("auto"), &document).await;

    assert_eq!(language, "de");
}

#[test]
fn test_skip_reason_withIgnoredLanguage_shouldSkip() {
    let mut settings = common::settings_from("auto");
    settings.ignored_languages.insert("fr".to_string());

    assert_eq!(
        skip_reason("fr", &settings),
        Some(SkipReason::IgnoredLanguage("fr".to_string()))
    );
}

#[test]
fn test_skip_reason_withSameLanguage_shouldSkip() {
    let settings = common::settings_from("auto");

    assert_eq!(skip_reason("en", &settings), Some(SkipReason::SameLanguage("en".to_string())));
    assert_eq!(skip_reason("de", &settings), None);
}

#[test]
fn test_skip_reason_withDifferentlyWrittenCodes_shouldStillSkip() {
    let mut settings = common::settings_from("auto");
    settings.ignored_languages.insert("DE".to_string());
    settings.ignored_languages.insert("fre".to_string());
    settings.target_language = "EN-us".to_string();

    assert_eq!(skip_reason("de", &settings), Some(SkipReason::IgnoredLanguage("de".to_string())));
    assert_eq!(skip_reason("fr", &settings), Some(SkipReason::IgnoredLanguage("fr".to_string())));
    assert_eq!(skip_reason("en", &settings), Some(SkipReason::SameLanguage("en".to_string())));
    assert_eq!(skip_reason("it", &settings), None);
}

#[test]
fn test_skip_reason_display_shouldDescribeReason() {
    assert_eq!(
        SkipReason::SameLanguage("en".to_string()).to_string(),
        "source and target language are both 'en'"
    );
    assert_eq!(SkipReason::PassInFlight.to_string(), "a translation pass is already running");
}
