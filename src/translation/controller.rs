/*!
 * Pass state controller.
 *
 * One [`TranslationEngine`] exists per document. It owns the document, the
 * translation cache, the set of translated units and the pass state, and it
 * is the only code that changes the pass state. Hosts drive it through
 * `translate`, `force_translate`, `undo`, `toggle` and the trigger helpers
 * built on top of them.
 *
 * The engine is single-threaded: all methods take `&self` and several calls
 * may be awaited concurrently on one task. Overlapping passes are rejected
 * by the reentrancy guard rather than queued.
 */

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::Duration;

use crate::app_config::EngineConfig;
use crate::document::{Document, TextUnit};
use crate::errors::TranslationError;
use crate::providers::{Capabilities, TranslatorOptions};
use crate::scanner::DocumentScanner;
use crate::settings::{KeyEvent, Settings, SettingsStore};
use crate::status::StatusReporter;

use super::active::ActiveTranslatedSet;
use super::batch::{BatchTranslator, PassSummary};
use super::cache::TranslationCache;
use super::language::{skip_reason, LanguageResolver, SkipReason};
use super::progress::{self, ProgressEvent, ProgressReceiver};

/// Translation state of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    /// Showing the page's own text
    #[default]
    Original,
    /// A pass is running
    Translating,
    /// Showing translated text
    Translated,
}

impl PassState {
    /// Marker value written onto the document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Translating => "translating",
            Self::Translated => "translated",
        }
    }
}

impl std::fmt::Display for PassState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// A pass ran to completion
    Completed(PassSummary),
    /// Undo restored this many units
    Restored(usize),
    /// Nothing happened
    Skipped(SkipReason),
}

/// Trigger message delivered by a UI collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TriggerMessage {
    /// Translate the document, optionally bypassing the cache
    Translate {
        #[serde(default)]
        force: bool,
    },
    /// Restore the original text
    Undo,
    /// Undo if translated, translate otherwise
    Toggle,
}

/// Reentrancy guard: at most one pass per engine
#[derive(Default)]
struct PassLock {
    held: Cell<bool>,
}

impl PassLock {
    fn try_acquire(&self) -> Option<PassGuard<'_>> {
        if self.held.replace(true) {
            return None;
        }
        Some(PassGuard { lock: self })
    }

    fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Releases the pass lock when dropped, whatever way the pass ended
struct PassGuard<'a> {
    lock: &'a PassLock,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.set(false);
    }
}

/// In-place translation engine for one document
pub struct TranslationEngine {
    document: Document,
    capabilities: Capabilities,
    settings: SettingsStore,
    config: EngineConfig,
    reporter: Box<dyn StatusReporter>,
    cache: TranslationCache,
    active: ActiveTranslatedSet,
    state: Cell<PassState>,
    lock: PassLock,
}

impl TranslationEngine {
    /// Create an engine for `document`
    pub fn new(
        document: Document,
        capabilities: Capabilities,
        settings: SettingsStore,
        config: EngineConfig,
        reporter: Box<dyn StatusReporter>,
    ) -> Self {
        let engine = Self {
            document,
            capabilities,
            settings,
            config,
            reporter,
            cache: TranslationCache::new(),
            active: ActiveTranslatedSet::new(),
            state: Cell::new(PassState::Original),
            lock: PassLock::default(),
        };
        engine.set_state(PassState::Original);
        engine
    }

    /// The document being translated
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Give the document back to the host
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Current pass state
    pub fn state(&self) -> PassState {
        self.state.get()
    }

    /// The per-node translation cache
    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Number of units currently showing translated text
    pub fn translated_unit_count(&self) -> usize {
        self.active.len()
    }

    fn set_state(&self, state: PassState) {
        self.state.set(state);
        self.document.set_state_marker(state.as_str());
    }

    /// Translate the document, reusing cached translations
    pub async fn translate(&self) -> Result<PassOutcome, TranslationError> {
        self.run_pass(false).await
    }

    /// Translate the document again, ignoring cached translations
    pub async fn force_translate(&self) -> Result<PassOutcome, TranslationError> {
        self.run_pass(true).await
    }

    /// Restore every translated unit to its original text
    pub fn undo(&self) -> PassOutcome {
        if self.lock.is_held() {
            return PassOutcome::Skipped(SkipReason::PassInFlight);
        }
        if self.state() == PassState::Original {
            return PassOutcome::Skipped(SkipReason::NotTranslated);
        }

        self.reporter.show("Restoring original text...", None);

        let mut restored = 0;
        for unit in self.active.drain() {
            if let Some(original) = self.cache.original_text(&unit) {
                unit.set_text(&original);
                restored += 1;
            }
        }

        self.set_state(PassState::Original);
        info!("Restored {} text nodes", restored);
        self.reporter.hide(Duration::from_millis(self.config.restore_hide_delay_ms));
        PassOutcome::Restored(restored)
    }

    /// Undo when translated, translate otherwise
    pub async fn toggle(&self) -> Result<PassOutcome, TranslationError> {
        if self.state() == PassState::Translated {
            Ok(self.undo())
        } else {
            self.translate().await
        }
    }

    /// Handle a trigger message
    pub async fn dispatch(&self, message: TriggerMessage) -> Result<PassOutcome, TranslationError> {
        debug!("Received trigger {:?}", message);
        match message {
            TriggerMessage::Translate { force } => self.run_pass(force).await,
            TriggerMessage::Undo => Ok(self.undo()),
            TriggerMessage::Toggle => self.toggle().await,
        }
    }

    /// Handle a key press; returns `None` when it is not the configured shortcut
    pub async fn handle_key_event(&self, event: &KeyEvent) -> Result<Option<PassOutcome>, TranslationError> {
        if !self.settings.snapshot().shortcut.matches(event) {
            return Ok(None);
        }
        self.toggle().await.map(Some)
    }

    /// Auto-translate a freshly loaded page at `url`
    pub async fn on_page_load(&self, url: &str) -> Result<PassOutcome, TranslationError> {
        tokio::time::sleep(Duration::from_millis(self.config.auto_translate_delay_ms)).await;

        let host = url::Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .unwrap_or_default();
        if self.config.is_skipped_host(&host) {
            debug!("Not auto-translating {}", host);
            return Ok(PassOutcome::Skipped(SkipReason::ExcludedHost(host)));
        }

        if !self.settings.snapshot().auto_translate {
            return Ok(PassOutcome::Skipped(SkipReason::AutoTranslateDisabled));
        }

        self.translate().await
    }

    async fn run_pass(&self, force: bool) -> Result<PassOutcome, TranslationError> {
        let Some(_guard) = self.lock.try_acquire() else {
            debug!("Ignoring translate request, a pass is already running");
            return Ok(PassOutcome::Skipped(SkipReason::PassInFlight));
        };
        let previous = self.state();
        if previous == PassState::Translated && !force {
            return Ok(PassOutcome::Skipped(SkipReason::AlreadyTranslated));
        }

        let settings = self.settings.snapshot();
        self.set_state(PassState::Translating);

        let result = self.execute(&settings, force).await;

        match &result {
            Ok(PassOutcome::Completed(summary)) => {
                self.set_state(PassState::Translated);
                let detail = if summary.cached > 0 {
                    format!("{} new, {} cached", summary.translated, summary.cached)
                } else {
                    format!("{} elements translated", summary.translated)
                };
                self.reporter.show("Translation Complete", Some(&detail));
                self.reporter.hide(Duration::from_millis(self.config.complete_hide_delay_ms));
            }
            Ok(_) => self.set_state(previous),
            Err(e) => {
                self.set_state(previous);
                error!("Translation failed: {}", e);
                let title = match e {
                    TranslationError::CapabilityUnavailable => "Error: API not found",
                    TranslationError::PassFailure { .. } => "Translation Failed",
                };
                self.reporter.show(title, Some(&e.detail()));
                self.reporter.hide(Duration::from_millis(self.config.failure_hide_delay_ms));
            }
        }

        result
    }

    /// Body of a pass, between taking the lock and recording the outcome
    async fn execute(&self, settings: &Settings, force: bool) -> Result<PassOutcome, TranslationError> {
        let factory = self
            .capabilities
            .translator
            .clone()
            .ok_or(TranslationError::CapabilityUnavailable)?;

        if settings.is_auto_source() {
            self.reporter.show("Detecting language...", None);
        }
        let resolver = LanguageResolver::new(
            self.capabilities.detector.as_deref(),
            self.config.detection_prefix_chars,
            &self.config.fallback_language,
        );
        let source_language = resolver.resolve(settings, &self.document).await;

        if let Some(reason) = skip_reason(&source_language, settings) {
            info!("Skipping translation: {}", reason);
            return Ok(PassOutcome::Skipped(reason));
        }

        let target_language = settings.normalized_target();
        info!(
            "Translating page from {} to {}{}",
            source_language,
            target_language,
            if force { " (forced)" } else { "" }
        );

        let (sender, receiver) = progress::channel();
        let pass = async move {
            let translator = factory
                .create(TranslatorOptions {
                    source_language: source_language.clone(),
                    target_language: target_language.clone(),
                    progress: Some(sender.clone()),
                })
                .await
                .map_err(|e| TranslationError::pass_failure("creating the translator", e))?;

            translator
                .ready()
                .await
                .map_err(|e| TranslationError::pass_failure("waiting for the translator", e))?;

            self.reporter.show("Scanning page...", None);
            self.cache.prune();
            let units: Vec<TextUnit> = match self.document.body() {
                Some(body) => DocumentScanner::new(body).units().collect(),
                None => {
                    warn!("Document has no body, nothing to translate");
                    Vec::new()
                }
            };
            debug!("Found {} text nodes to translate", units.len());

            let batches = BatchTranslator::new(&self.cache, &self.active, self.config.effective_batch_size());
            let summary = batches
                .translate_units(units, translator.as_ref(), &target_language, force, &sender)
                .await;

            Ok::<_, TranslationError>(PassOutcome::Completed(summary))
        };

        self.forward_progress(pass, receiver).await
    }

    /// Drive `pass` while relaying its progress events to the status reporter
    async fn forward_progress<F>(&self, pass: F, mut receiver: ProgressReceiver) -> F::Output
    where
        F: std::future::Future,
    {
        tokio::pin!(pass);
        let output = loop {
            tokio::select! {
                biased;
                Some(event) = receiver.recv() => self.report_progress(event),
                output = &mut pass => break output,
            }
        };

        while let Ok(event) = receiver.try_recv() {
            self.report_progress(event);
        }
        output
    }

    fn report_progress(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Download { .. } => {
                let detail = format!("{}% completed...", event.percent());
                self.reporter.show("Downloading AI Model", Some(&detail));
            }
            ProgressEvent::Batch { .. } => {
                let detail = format!("{}%", event.percent());
                self.reporter.show("Translating...", Some(&detail));
            }
        }
    }
}
