/*!
 * Document scanner.
 *
 * Enumerates the text units of a subtree in document order. The walk is lazy
 * and starts from scratch every time [`DocumentScanner::units`] is called, so
 * a pass always sees the tree as it is now.
 */

use markup5ever_rcdom::{Handle, NodeData};

use crate::document::TextUnit;

/// Parent elements whose text is never translated
pub const EXCLUDED_PARENTS: [&str; 5] = ["script", "style", "noscript", "iframe", "canvas"];

/// Minimum trimmed length for a unit to be worth translating
pub const MIN_TEXT_CHARS: usize = 2;

/// Predicate deciding whether a text unit is eligible
pub type UnitFilter = dyn Fn(&TextUnit) -> bool;

/// Default eligibility rule for translation.
///
/// The unit needs a parent element outside [`EXCLUDED_PARENTS`] and at least
/// [`MIN_TEXT_CHARS`] characters once surrounding whitespace is trimmed.
pub fn is_translatable(unit: &TextUnit) -> bool {
    let Some(parent_tag) = unit.parent_tag() else {
        return false;
    };
    if EXCLUDED_PARENTS.contains(&parent_tag.as_str()) {
        return false;
    }
    unit.text().trim().chars().count() >= MIN_TEXT_CHARS
}

/// Scanner over one subtree
pub struct DocumentScanner {
    root: Handle,
    filter: Box<UnitFilter>,
}

impl DocumentScanner {
    /// Scan `root` with the default eligibility rule
    pub fn new(root: Handle) -> Self {
        Self::with_filter(root, is_translatable)
    }

    /// Scan `root` with a custom predicate
    pub fn with_filter(root: Handle, filter: impl Fn(&TextUnit) -> bool + 'static) -> Self {
        Self {
            root,
            filter: Box::new(filter),
        }
    }

    /// Start a fresh walk over the subtree
    pub fn units(&self) -> TextUnits<'_> {
        TextUnits {
            stack: vec![self.root.clone()],
            filter: self.filter.as_ref(),
        }
    }
}

/// Lazy depth-first iterator produced by [`DocumentScanner::units`]
pub struct TextUnits<'s> {
    stack: Vec<Handle>,
    filter: &'s UnitFilter,
}

impl Iterator for TextUnits<'_> {
    type Item = TextUnit;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if let NodeData::Text { .. } = node.data {
                if let Some(unit) = TextUnit::from_handle(node) {
                    if (self.filter)(&unit) {
                        return Some(unit);
                    }
                }
                continue;
            }

            // Reverse so the leftmost child is visited first
            self.stack
                .extend(node.children.borrow().iter().rev().cloned());
        }
        None
    }
}
