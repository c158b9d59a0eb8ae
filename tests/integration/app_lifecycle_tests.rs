/*!
 * Full app lifecycle tests: config, controller and page files
 */

use pagetrans::app_config::{Config, TranslationProvider};
use pagetrans::app_controller::{Controller, Workflow};
use pagetrans::document::Document;
use pagetrans::status::LogStatusReporter;
use pagetrans::translation::{PassOutcome, SkipReason, TriggerMessage};

use crate::common;

fn mock_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Mock;
    config.engine.auto_translate_delay_ms = 0;
    config
}

#[test]
fn test_controller_with_config_withInvalidConfig_shouldFail() {
    let mut config = mock_config();
    config.settings.target_language = "not a language".to_string();

    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_controller_capabilities_withEachProvider_shouldProvideTranslator() {
    let mock = Controller::with_config(mock_config()).unwrap();
    assert!(mock.capabilities().unwrap().translator.is_some());

    let ollama = Controller::with_config(Config::default()).unwrap();
    let capabilities = ollama.capabilities().unwrap();
    assert!(capabilities.translator.is_some());
    assert!(capabilities.detector.is_none());
}

#[tokio::test]
async fn test_run_withMockProvider_shouldWriteTranslatedPage() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "gruss.html", &common::greeting_page()).unwrap();
    let controller = Controller::with_config(mock_config()).unwrap();

    let (output, outcome) = controller
        .run(&input, None, Workflow::Actions(vec![TriggerMessage::Translate { force: false }]))
        .await
        .unwrap();

    assert_eq!(output, temp_dir.path().join("gruss.en.html"));
    assert!(matches!(outcome, Some(PassOutcome::Completed(_))));

    let written = std::fs::read_to_string(&output).unwrap();
    let document = Document::parse(&written);
    assert_eq!(
        common::visible_texts(&document),
        vec!["[en] Guten Tag", "[en] Wie geht es dir?", "[en] Tschüss"]
    );
    assert_eq!(document.state_marker().as_deref(), Some("translated"));

    // The input is never modified
    assert_eq!(std::fs::read_to_string(&input).unwrap(), common::greeting_page());
}

#[tokio::test]
async fn test_run_withTranslateThenUndo_shouldWriteOriginalText() {
    let temp_dir = common::create_temp_dir().unwrap();
    let input = common::create_test_file(temp_dir.path(), "gruss.html", &common::greeting_page()).unwrap();
    let output = temp_dir.path().join("out").join("result.html");
    let controller = Controller::with_config(mock_config()).unwrap();

    let (written_to, outcome) = controller
        .run(
            &input,
            Some(output.clone()),
            Workflow::Actions(vec![TriggerMessage::Translate { force: false }, TriggerMessage::Undo]),
        )
        .await
        .unwrap();

    assert_eq!(written_to, output);
    assert_eq!(outcome, Some(PassOutcome::Restored(3)));
    let document = Document::parse(&std::fs::read_to_string(&output).unwrap());
    assert_eq!(common::visible_texts(&document), common::GREETING_TEXTS.to_vec());
    assert_eq!(document.state_marker().as_deref(), Some("original"));
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let controller = Controller::with_config(mock_config()).unwrap();

    let result = controller
        .run(&temp_dir.path().join("missing.html"), None, Workflow::Actions(Vec::new()))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_process_withPageLoadOnSkippedHost_shouldLeaveDocumentAlone() {
    let controller = Controller::with_config(mock_config()).unwrap();
    let reporter = common::RecordingStatusReporter::new();

    let (document, outcome) = controller
        .process(
            Document::parse(&common::greeting_page()),
            Workflow::PageLoad("https://github.com/some/repo".to_string()),
            Box::new(reporter.clone()),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Some(PassOutcome::Skipped(SkipReason::ExcludedHost("github.com".to_string()))));
    assert_eq!(common::visible_texts(&document), common::GREETING_TEXTS.to_vec());
    assert!(reporter.calls().is_empty());
}

#[tokio::test]
async fn test_process_withPageLoadOnRegularHost_shouldTranslate() {
    let mut config = mock_config();
    config.settings.target_language = "fr".to_string();
    let controller = Controller::with_config(config).unwrap();

    let (document, outcome) = controller
        .process(
            Document::parse(&common::greeting_page()),
            Workflow::PageLoad("https://www.zeit.de/".to_string()),
            Box::new(common::RecordingStatusReporter::new()),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, Some(PassOutcome::Completed(_))));
    assert_eq!(
        common::visible_texts(&document),
        vec!["[fr] Guten Tag", "[fr] Wie geht es dir?", "[fr] Tschüss"]
    );
}

#[tokio::test]
async fn test_process_withLogStatusReporter_shouldTranslateAndUndo() {
    common::init_test_logging();
    let controller = Controller::with_config(mock_config()).unwrap();

    let (document, outcome) = controller
        .process(
            Document::parse(&common::greeting_page()),
            Workflow::Actions(vec![
                TriggerMessage::Translate { force: false },
                TriggerMessage::Toggle,
            ]),
            Box::new(LogStatusReporter),
        )
        .await
        .unwrap();

    assert_eq!(outcome, Some(PassOutcome::Restored(3)));
    assert_eq!(common::visible_texts(&document), common::GREETING_TEXTS.to_vec());
}
