/*!
 * Per-node translation caching.
 *
 * Each text unit that was ever translated gets one record holding the text
 * it had before the first translation and every translation produced for it
 * since. Records are keyed by node identity and hold the node only weakly:
 * the cache is never the reason a node stays alive.
 */

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use log::debug;

use crate::document::{TextUnit, WeakUnit};

/// Cache entry for one text unit
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTranslationRecord {
    /// Text captured before the first translation; never a translated value
    original_text: String,

    /// Translated text per target language code
    translations: HashMap<String, String>,
}

impl NodeTranslationRecord {
    fn new(original_text: &str) -> Self {
        Self {
            original_text: original_text.to_string(),
            translations: HashMap::new(),
        }
    }

    /// Text the unit had before it was first translated
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    /// Translation for a target language
    pub fn translation(&self, target_language: &str) -> Option<&str> {
        self.translations.get(target_language).map(String::as_str)
    }

    /// Number of target languages with a stored translation
    pub fn translation_count(&self) -> usize {
        self.translations.len()
    }

    /// Whether `text` is one of the translations stored here
    fn is_translation(&self, text: &str) -> bool {
        self.translations.values().any(|translated| translated == text)
    }
}

struct CacheEntry {
    unit: WeakUnit,
    record: NodeTranslationRecord,
}

/// Translation cache keyed by text unit identity
///
/// The weak handle stored with each entry also pins the node allocation, so a
/// key cannot be reused by a different node while its entry exists.
#[derive(Default)]
pub struct TranslationCache {
    /// Records by unit key
    entries: RefCell<HashMap<usize, CacheEntry>>,

    /// Cache hit counter
    hits: Cell<usize>,

    /// Cache miss counter
    misses: Cell<usize>,
}

impl TranslationCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the translation of `unit` into `target_language`.
    ///
    /// Only a hit while the unit's live value still equals the recorded
    /// original text; a unit rewritten since is a miss.
    pub fn lookup(&self, unit: &TextUnit, target_language: &str) -> Option<String> {
        let live_text = unit.text();
        let entries = self.entries.borrow();

        let found = entries
            .get(&unit.key())
            .filter(|entry| entry.record.original_text == live_text)
            .and_then(|entry| entry.record.translation(target_language))
            .map(str::to_string);

        match &found {
            Some(_) => {
                self.hits.set(self.hits.get() + 1);
                debug!("Cache hit for '{}' -> {}", truncate_text(&live_text, 30), target_language);
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                debug!("Cache miss for '{}' -> {}", truncate_text(&live_text, 30), target_language);
            }
        }

        found
    }

    /// Store a translation for `unit`.
    ///
    /// Creates the record with `original_text` as its baseline if the unit has
    /// none yet; otherwise only the target-language entry changes.
    pub fn record(&self, unit: &TextUnit, original_text: &str, target_language: &str, translated_text: &str) {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(unit.key()).or_insert_with(|| CacheEntry {
            unit: unit.downgrade(),
            record: NodeTranslationRecord::new(original_text),
        });

        entry
            .record
            .translations
            .insert(target_language.to_string(), translated_text.to_string());

        debug!(
            "Cached translation for '{}' -> {}",
            truncate_text(entry.record.original_text(), 30),
            target_language
        );
    }

    /// Start a new record for a unit whose text was rewritten by the page.
    ///
    /// The previous record described text that no longer exists in the
    /// document, so its baseline and translations are discarded.
    pub(crate) fn rebase(&self, unit: &TextUnit, original_text: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.insert(
            unit.key(),
            CacheEntry {
                unit: unit.downgrade(),
                record: NodeTranslationRecord::new(original_text),
            },
        );
        debug!("Rebased cache record for '{}'", truncate_text(original_text, 30));
    }

    /// Snapshot of the record for `unit`
    pub fn record_for(&self, unit: &TextUnit) -> Option<NodeTranslationRecord> {
        self.entries
            .borrow()
            .get(&unit.key())
            .map(|entry| entry.record.clone())
    }

    /// Original text recorded for `unit`
    pub fn original_text(&self, unit: &TextUnit) -> Option<String> {
        self.entries
            .borrow()
            .get(&unit.key())
            .map(|entry| entry.record.original_text.clone())
    }

    /// Where the unit's text stands relative to its record
    pub(crate) fn baseline(&self, unit: &TextUnit) -> Baseline {
        let live_text = unit.text();
        let entries = self.entries.borrow();

        match entries.get(&unit.key()) {
            None => Baseline::Untracked,
            Some(entry) if entry.record.original_text == live_text => Baseline::Original,
            Some(entry) if entry.record.is_translation(&live_text) => {
                Baseline::Translated(entry.record.original_text.clone())
            }
            Some(_) => Baseline::Diverged,
        }
    }

    /// Drop entries whose node no longer exists.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, entry| !entry.unit.is_dead());
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Pruned {} cache records for removed nodes", removed);
        }
        removed
    }

    /// Get cache statistics
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.get();
        let misses = self.misses.get();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Relationship between a unit's live text and its cache record
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Baseline {
    /// No record exists
    Untracked,
    /// Live text equals the recorded original
    Original,
    /// Live text is one of our translations; carries the original text
    Translated(String),
    /// The page replaced the text with something we never produced
    Diverged,
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
