/*!
 * Bookkeeping of the units currently showing translated text.
 */

use std::cell::RefCell;
use std::collections::HashMap;

use crate::document::{TextUnit, WeakUnit};

/// Units whose live value is a translation produced by the engine.
///
/// Filled by the batch executor, drained by undo. Like the cache, it holds
/// units weakly; units removed from the document simply disappear.
#[derive(Default)]
pub struct ActiveTranslatedSet {
    units: RefCell<HashMap<usize, WeakUnit>>,
}

impl ActiveTranslatedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit; adding it twice is a no-op
    pub fn insert(&self, unit: &TextUnit) {
        self.units
            .borrow_mut()
            .entry(unit.key())
            .or_insert_with(|| unit.downgrade());
    }

    /// Whether the unit is currently tracked
    pub fn contains(&self, unit: &TextUnit) -> bool {
        self.units.borrow().contains_key(&unit.key())
    }

    /// Empty the set, returning the units that are still alive
    pub fn drain(&self) -> Vec<TextUnit> {
        self.units
            .borrow_mut()
            .drain()
            .filter_map(|(_, unit)| unit.upgrade())
            .collect()
    }

    /// Number of tracked units that are still alive
    pub fn len(&self) -> usize {
        self.units.borrow().values().filter(|unit| !unit.is_dead()).count()
    }

    /// Whether no live unit is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
