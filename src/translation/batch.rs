/*!
 * Batch translation processing.
 *
 * Text units are translated in fixed-size batches. Batches run one after the
 * other in document order; inside a batch every unit is in flight at once and
 * the batch is finished only when all of them have settled. A unit whose
 * translation fails is left untouched and does not affect its neighbours.
 */

use futures::future::join_all;
use log::{debug, info};

use crate::document::TextUnit;
use crate::providers::Translator;

use super::active::ActiveTranslatedSet;
use super::cache::{Baseline, TranslationCache};
use super::formatting::WhitespaceEnvelope;
use super::progress::{emit, ProgressEvent, ProgressSender};

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Units translated by the capability during this pass
    pub translated: usize,
    /// Units served from the cache
    pub cached: usize,
    /// Units whose translation failed
    pub failed: usize,
    /// Units removed or rewritten by the page while their translation was in flight
    pub vanished: usize,
}

impl PassSummary {
    /// Units processed in total
    pub fn total(&self) -> usize {
        self.translated + self.cached + self.failed + self.vanished
    }

    fn add(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Translated => self.translated += 1,
            UnitOutcome::Cached => self.cached += 1,
            UnitOutcome::Failed => self.failed += 1,
            UnitOutcome::Vanished => self.vanished += 1,
        }
    }
}

/// What happened to one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitOutcome {
    Translated,
    Cached,
    Failed,
    Vanished,
}

/// Batch translator for processing text units in batches
pub struct BatchTranslator<'a> {
    /// Per-node cache shared across passes
    cache: &'a TranslationCache,

    /// Units currently showing translated text
    active: &'a ActiveTranslatedSet,

    /// Units per batch
    batch_size: usize,
}

impl<'a> BatchTranslator<'a> {
    /// Create a new batch translator
    pub fn new(cache: &'a TranslationCache, active: &'a ActiveTranslatedSet, batch_size: usize) -> Self {
        Self {
            cache,
            active,
            batch_size: batch_size.max(1),
        }
    }

    /// Translate `units` into `target_language`.
    ///
    /// With `force`, cached translations are ignored and every unit goes to the
    /// translator again; existing baselines are kept.
    pub async fn translate_units(
        &self,
        units: Vec<TextUnit>,
        translator: &dyn Translator,
        target_language: &str,
        force: bool,
        progress: &ProgressSender,
    ) -> PassSummary {
        let total = units.len();
        let mut summary = PassSummary::default();
        let mut pending = units.into_iter();
        let mut batch_index = 0;

        loop {
            let batch: Vec<TextUnit> = pending.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                break;
            }
            batch_index += 1;
            debug!("Processing batch {} ({} units)", batch_index, batch.len());

            let outcomes = join_all(
                batch
                    .into_iter()
                    .map(|unit| self.translate_unit(unit, translator, target_language, force)),
            )
            .await;

            for outcome in outcomes {
                summary.add(outcome);
            }

            emit(
                progress,
                ProgressEvent::Batch {
                    processed: summary.total(),
                    total,
                },
            );
        }

        info!(
            "Pass finished: {} translated, {} cached, {} failed",
            summary.translated, summary.cached, summary.failed
        );
        summary
    }

    /// Translate a single unit, swallowing its failure
    async fn translate_unit(
        &self,
        unit: TextUnit,
        translator: &dyn Translator,
        target_language: &str,
        force: bool,
    ) -> UnitOutcome {
        if !force {
            if let Some(cached) = self.cache.lookup(&unit, target_language) {
                unit.set_text(&cached);
                self.active.insert(&unit);
                return UnitOutcome::Cached;
            }
        }

        // Translate from the untranslated text, even if a previous pass
        // left one of our translations in the node
        let baseline = self.cache.baseline(&unit);
        let original_text = match &baseline {
            Baseline::Translated(original) => original.clone(),
            Baseline::Untracked | Baseline::Original | Baseline::Diverged => unit.text(),
        };

        // Only a weak handle is held while the request is in flight
        let live_before = unit.text();
        let weak_unit = unit.downgrade();
        drop(unit);

        let envelope = WhitespaceEnvelope::split(&original_text);
        let result = translator.translate(envelope.core).await;

        let Some(unit) = weak_unit.upgrade() else {
            debug!("Text node was removed while its translation was in flight");
            return UnitOutcome::Vanished;
        };
        if unit.text() != live_before {
            debug!("Text node was rewritten while its translation was in flight, keeping the page's text");
            return UnitOutcome::Vanished;
        }

        match result {
            Ok(translated_core) => {
                let translated = envelope.wrap(&translated_core);
                if baseline == Baseline::Diverged {
                    self.cache.rebase(&unit, &original_text);
                }
                self.cache.record(&unit, &original_text, target_language, &translated);
                unit.set_text(&translated);
                self.active.insert(&unit);
                UnitOutcome::Translated
            }
            Err(e) => {
                debug!("Translation failed for one text node: {}", e);
                UnitOutcome::Failed
            }
        }
    }
}
