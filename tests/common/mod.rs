/*!
 * Common test utilities for the pagetrans test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use pagetrans::app_config::EngineConfig;
use pagetrans::document::{element_attr, element_name, Document};
use pagetrans::providers::mock::MockTranslatorFactory;
use pagetrans::providers::{Capabilities, LanguageDetectorFactory};
use pagetrans::scanner::DocumentScanner;
use pagetrans::settings::{Settings, SettingsStore};
use pagetrans::status::StatusReporter;
use pagetrans::TranslationEngine;

use markup5ever_rcdom::Handle;

/// German greeting page used across the suite
pub const GREETING_TEXTS: [&str; 3] = ["Guten Tag", "Wie geht es dir?", "Tschüss"];

/// English renderings of [`GREETING_TEXTS`]
pub const GREETING_TRANSLATIONS: [(&str, &str); 3] = [
    ("Guten Tag", "Good day"),
    ("Wie geht es dir?", "How are you?"),
    ("Tschüss", "Bye"),
];

/// Route library logs through the test harness; `RUST_LOG=debug` shows them
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wrap `body` in a complete HTML page, optionally declaring a language
pub fn page(lang: Option<&str>, body: &str) -> String {
    let lang_attr = lang.map(|lang| format!(" lang=\"{}\"", lang)).unwrap_or_default();
    format!(
        "<!DOCTYPE html><html{}><head><title>Test page</title></head><body>{}</body></html>",
        lang_attr, body
    )
}

/// One paragraph per text, with the given language declared
pub fn paragraphs_page(lang: Option<&str>, texts: &[&str]) -> String {
    let body: String = texts.iter().map(|text| format!("<p>{}</p>", text)).collect();
    page(lang, &body)
}

/// The German greeting page
pub fn greeting_page() -> String {
    paragraphs_page(Some("de"), &GREETING_TEXTS)
}

/// Mock translator knowing the greeting page
pub fn greeting_translator() -> MockTranslatorFactory {
    MockTranslatorFactory::with_dictionary(GREETING_TRANSLATIONS)
}

/// Live values of every translatable unit in the document body
pub fn visible_texts(document: &Document) -> Vec<String> {
    match document.body() {
        Some(body) => DocumentScanner::new(body).units().map(|unit| unit.text()).collect(),
        None => Vec::new(),
    }
}

/// First element named `tag` with `id` in the subtree under `node`
pub fn find_element_by_id(node: &Handle, tag: &str, id: &str) -> Option<Handle> {
    if element_name(node).as_deref() == Some(tag) && element_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element_by_id(child, tag, id))
}

/// Detach `node` from its parent
pub fn detach(node: &Handle) {
    let parent = node.parent.take();
    if let Some(parent) = parent.as_ref().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// Replace the text of the first text child of `element`
pub fn rewrite_text(element: &Handle, value: &str) {
    let child = element.children.borrow().first().cloned();
    if let Some(unit) = child.and_then(pagetrans::TextUnit::from_handle) {
        unit.set_text(value);
    }
}

/// One call made on a status reporter
#[derive(Debug, Clone, PartialEq)]
pub enum StatusCall {
    Show(String, Option<String>),
    Hide(Duration),
}

/// Status reporter that records every call
#[derive(Debug, Clone, Default)]
pub struct RecordingStatusReporter {
    calls: Rc<RefCell<Vec<StatusCall>>>,
}

impl RecordingStatusReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<StatusCall> {
        self.calls.borrow().clone()
    }

    /// Messages passed to `show`, in order
    pub fn messages(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                StatusCall::Show(message, _) => Some(message.clone()),
                StatusCall::Hide(_) => None,
            })
            .collect()
    }

    /// The last `show` call
    pub fn last_shown(&self) -> Option<(String, Option<String>)> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            StatusCall::Show(message, detail) => Some((message.clone(), detail.clone())),
            StatusCall::Hide(_) => None,
        })
    }

    /// The last `hide` delay
    pub fn last_hide(&self) -> Option<Duration> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            StatusCall::Hide(after) => Some(*after),
            StatusCall::Show(..) => None,
        })
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl StatusReporter for RecordingStatusReporter {
    fn show(&self, message: &str, detail: Option<&str>) {
        self.calls
            .borrow_mut()
            .push(StatusCall::Show(message.to_string(), detail.map(str::to_string)));
    }

    fn hide(&self, after: Duration) {
        self.calls.borrow_mut().push(StatusCall::Hide(after));
    }
}

/// Engine tuning for tests: no page-load delay
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        auto_translate_delay_ms: 0,
        ..EngineConfig::default()
    }
}

/// Settings translating into English with the given source
pub fn settings_from(source_language: &str) -> Settings {
    Settings {
        source_language: source_language.to_string(),
        target_language: "en".to_string(),
        ..Settings::default()
    }
}

/// Builder for engines under test
pub struct EngineBuilder {
    html: String,
    settings: Settings,
    config: EngineConfig,
    translator: Option<MockTranslatorFactory>,
    detector: Option<Arc<dyn LanguageDetectorFactory>>,
}

impl EngineBuilder {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            settings: settings_from("auto"),
            config: test_engine_config(),
            translator: Some(MockTranslatorFactory::working()),
            detector: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn translator(mut self, translator: MockTranslatorFactory) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn without_translator(mut self) -> Self {
        self.translator = None;
        self
    }

    pub fn detector(mut self, detector: impl LanguageDetectorFactory + 'static) -> Self {
        self.detector = Some(Arc::new(detector));
        self
    }

    /// Build the engine, returning it with its settings store and status recorder
    pub fn build(self) -> TestEngine {
        init_test_logging();
        let store = SettingsStore::new(self.settings);
        let reporter = RecordingStatusReporter::new();
        let capabilities = Capabilities {
            translator: self
                .translator
                .map(|factory| Arc::new(factory) as Arc<dyn pagetrans::providers::TranslatorFactory>),
            detector: self.detector,
        };
        let engine = TranslationEngine::new(
            Document::parse(&self.html),
            capabilities,
            store.clone(),
            self.config,
            Box::new(reporter.clone()),
        );
        TestEngine {
            engine,
            settings: store,
            status: reporter,
        }
    }
}

/// An engine together with the handles tests inspect
pub struct TestEngine {
    pub engine: TranslationEngine,
    pub settings: SettingsStore,
    pub status: RecordingStatusReporter,
}

impl TestEngine {
    pub fn texts(&self) -> Vec<String> {
        visible_texts(self.engine.document())
    }

    pub fn html(&self) -> String {
        self.engine
            .document()
            .to_html()
            .expect("document should serialize")
    }
}
