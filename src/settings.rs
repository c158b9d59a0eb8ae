/*!
 * User settings read by the engine.
 *
 * Settings are owned by the host (popup, options page, config file). The
 * engine only ever reads a snapshot, taken once at the start of each pass, so
 * edits made while a pass is running apply to the next one.
 */

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::language_utils::{language_codes_match, primary_subtag};

/// Source language value that asks the engine to work the language out
pub const AUTO_LANGUAGE: &str = "auto";

/// Translation preferences
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Source language code, or "auto"
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Source languages that are never translated
    #[serde(default)]
    pub ignored_languages: BTreeSet<String>,

    /// Translate automatically once a page has loaded
    #[serde(default = "default_true")]
    pub auto_translate: bool,

    /// Keyboard shortcut toggling translation
    #[serde(default)]
    pub shortcut: Shortcut,
}

impl Settings {
    /// Whether the source language should be resolved at pass time
    pub fn is_auto_source(&self) -> bool {
        self.source_language.trim().eq_ignore_ascii_case(AUTO_LANGUAGE)
    }

    /// Whether translation from `language` is suppressed
    pub fn is_ignored(&self, language: &str) -> bool {
        self.ignored_languages
            .iter()
            .any(|ignored| same_language(ignored, language))
    }

    /// Whether `language` is the configured target language
    pub fn is_target(&self, language: &str) -> bool {
        same_language(&self.target_language, language)
    }

    /// Target language as passed to translators and used as a cache key
    pub fn normalized_target(&self) -> String {
        let primary = primary_subtag(&self.target_language);
        if primary.is_empty() {
            self.target_language.clone()
        } else {
            primary
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            ignored_languages: BTreeSet::new(),
            auto_translate: true,
            shortcut: Shortcut::default(),
        }
    }
}

/// A key press as delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    /// Key value, e.g. "t" or "T"
    pub key: String,
    /// Alt/Option held
    pub alt: bool,
    /// Control held
    pub ctrl: bool,
    /// Shift held
    pub shift: bool,
    /// Meta/Command held
    pub meta: bool,
}

impl KeyEvent {
    /// Key press without modifiers
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Same key with Alt held
    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Same key with Control held
    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }
}

/// Shortcut descriptor: a key plus the exact set of modifiers
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Key, compared case-insensitively
    pub key: String,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Shortcut {
    /// Whether the key press triggers this shortcut.
    ///
    /// Modifiers must match exactly: Alt+Shift+T does not trigger Alt+T.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.key.to_lowercase() == self.key.to_lowercase()
            && event.alt == self.alt
            && event.ctrl == self.ctrl
            && event.shift == self.shift
            && event.meta == self.meta
    }
}

impl Default for Shortcut {
    fn default() -> Self {
        Self {
            key: "t".to_string(),
            alt: true,
            ctrl: false,
            shift: false,
            meta: false,
        }
    }
}

impl std::fmt::Display for Shortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modifiers = [
            (self.ctrl, "Ctrl"),
            (self.alt, "Alt"),
            (self.shift, "Shift"),
            (self.meta, "Meta"),
        ];
        for (_, name) in modifiers.iter().filter(|(held, _)| *held) {
            write!(f, "{}+", name)?;
        }
        write!(f, "{}", self.key.to_uppercase())
    }
}

/// Shared, host-owned settings with snapshot reads
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<Settings>>,
}

impl SettingsStore {
    /// Create a store holding `settings`
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    /// Immutable copy of the current settings
    pub fn snapshot(&self) -> Settings {
        self.inner.read().clone()
    }

    /// Modify the settings in place
    pub fn update(&self, edit: impl FnOnce(&mut Settings)) {
        let mut settings = self.inner.write();
        edit(&mut settings);
    }

    /// Replace the settings wholesale
    pub fn replace(&self, settings: Settings) {
        *self.inner.write() = settings;
    }
}

fn default_source_language() -> String {
    AUTO_LANGUAGE.to_string()
}

fn default_target_language() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

/// Case, region and ISO 639 variant insensitive code comparison
fn same_language(a: &str, b: &str) -> bool {
    let (primary_a, primary_b) = (primary_subtag(a), primary_subtag(b));
    (!primary_a.is_empty() && primary_a == primary_b) || language_codes_match(a, b)
}
