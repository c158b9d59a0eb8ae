/*!
 * # pagetrans - In-place document translation
 *
 * A Rust library that translates the visible text of an HTML document in
 * place and can restore the original text exactly.
 *
 * ## Features
 *
 * - Translate every visible text node of a page, leaving markup untouched
 * - Source language from settings, automatic detection, or the page's `lang`
 * - Per-node cache: translate, undo and translate again without new requests
 * - Exact undo, including the whitespace around each piece of text
 * - Batched, concurrent translation with progress reporting
 * - Hotkey, message and page-load triggers
 * - Pluggable translation backends:
 *   - Ollama (local LLM)
 *   - Deterministic mock for tests and dry runs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `document`: HTML parsing, serialization and text node handles
 * - `scanner`: Enumeration of translatable text nodes
 * - `translation`: The translation engine:
 *   - `translation::controller`: Pass state and triggers
 *   - `translation::language`: Source language resolution
 *   - `translation::batch`: Batched translation of text nodes
 *   - `translation::cache`: Per-node translation memory
 * - `providers`: Translation and language detection capabilities
 * - `settings`: User settings and the shortcut
 * - `status`: Status surfaces
 * - `app_config`: Configuration management
 * - `app_controller`: Command-line workflow
 * - `file_utils`: Page file helpers
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod scanner;
pub mod settings;
pub mod status;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{Document, TextUnit};
pub use errors::{AppError, DetectionError, ProviderError, TranslationError};
pub use settings::{KeyEvent, Settings, SettingsStore, Shortcut};
pub use translation::{PassOutcome, PassState, TranslationEngine, TriggerMessage};
