/*!
 * In-place translation of document text.
 *
 * The work is split into several submodules:
 *
 * - `controller`: The per-document engine and its pass state
 * - `language`: Source language resolution and the skip gate
 * - `batch`: Batched, concurrent translation of text units
 * - `cache`: Per-node memory of original and translated text
 * - `active`: Units currently showing translated text
 * - `formatting`: Whitespace preservation around translated text
 * - `progress`: Progress events emitted during a pass
 */

// Re-export main types for easier usage
pub use self::active::ActiveTranslatedSet;
pub use self::batch::{BatchTranslator, PassSummary};
pub use self::cache::{NodeTranslationRecord, TranslationCache};
pub use self::controller::{PassOutcome, PassState, TranslationEngine, TriggerMessage};
pub use self::language::{skip_reason, LanguageResolver, SkipReason};
pub use self::progress::ProgressEvent;

// Submodules
pub mod active;
pub mod batch;
pub mod cache;
pub mod controller;
pub mod formatting;
pub mod language;
pub mod progress;
