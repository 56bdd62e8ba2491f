//! Label registry
//!
//! The registry owns every live label. Callers only ever hold a
//! [`LabelHandle`], a plain integer that may outlive its label; looking up
//! a handle that is gone simply finds nothing.
//!
//! Handles come from a counter that only goes up, so ascending handle order
//! is insertion order. Draw passes walk the registry forwards (later labels
//! paint on top) and undraw passes walk it backwards.

use std::collections::BTreeMap;
use std::fmt;

use crate::context::ContextId;
use crate::label::FloatingLabel;

/// Opaque reference to a label in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LabelHandle(u64);

impl LabelHandle {
    /// Never refers to a label; returned when a label could not be added
    pub const INVALID: LabelHandle = LabelHandle(0);

    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LabelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A label plus the context it was added under
struct Entry<S> {
    label: FloatingLabel<S>,
    context: ContextId,
}

/// Arena of labels keyed by handle
pub struct LabelRegistry<S> {
    labels: BTreeMap<LabelHandle, Entry<S>>,
    last_handle: u64,
}

impl<S> LabelRegistry<S> {
    pub fn new() -> Self {
        LabelRegistry {
            labels: BTreeMap::new(),
            // Pre-incremented on insert, so the first handle is 2
            last_handle: 1,
        }
    }

    /// Stores a label and hands out the next handle
    pub fn insert(&mut self, label: FloatingLabel<S>, context: ContextId) -> LabelHandle {
        self.last_handle += 1;
        let handle = LabelHandle(self.last_handle);
        self.labels.insert(handle, Entry { label, context });
        handle
    }

    pub fn get(&self, handle: LabelHandle) -> Option<&FloatingLabel<S>> {
        self.labels.get(&handle).map(|entry| &entry.label)
    }

    pub fn get_mut(&mut self, handle: LabelHandle) -> Option<&mut FloatingLabel<S>> {
        self.labels.get_mut(&handle).map(|entry| &mut entry.label)
    }

    /// Takes a label out, along with the context that owned it
    pub fn remove(&mut self, handle: LabelHandle) -> Option<(FloatingLabel<S>, ContextId)> {
        self.labels.remove(&handle).map(|entry| (entry.label, entry.context))
    }

    pub fn contains(&self, handle: LabelHandle) -> bool {
        self.labels.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (LabelHandle, &FloatingLabel<S>)> {
        self.labels.iter().map(|(handle, entry)| (*handle, &entry.label))
    }

    /// Labels in insertion order; `.rev()` for undraw order
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (LabelHandle, &mut FloatingLabel<S>)> {
        self.labels.iter_mut().map(|(handle, entry)| (*handle, &mut entry.label))
    }
}

impl<S> Default for LabelRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelBuffer;

    fn label(text: &str) -> FloatingLabel<PixelBuffer> {
        FloatingLabel::new(text)
    }

    #[test]
    fn test_first_handle_is_two() {
        let mut registry = LabelRegistry::new();
        let handle = registry.insert(label("a"), ContextId::for_tests(1));
        assert_eq!(handle.id(), 2);
        assert!(handle.is_valid());
        assert!(!LabelHandle::INVALID.is_valid());
    }

    #[test]
    fn test_handles_increase_and_are_never_reused() {
        let mut registry = LabelRegistry::new();
        let context = ContextId::for_tests(1);

        let a = registry.insert(label("a"), context);
        let b = registry.insert(label("b"), context);
        registry.remove(b);
        let c = registry.insert(label("c"), context);

        assert!(a < b && b < c);
        assert!(!registry.contains(b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let mut registry = LabelRegistry::new();
        let context = ContextId::for_tests(1);
        for text in ["first", "second", "third"] {
            registry.insert(label(text), context);
        }

        let forward: Vec<&str> = registry.iter().map(|(_, l)| l.text()).collect();
        assert_eq!(forward, ["first", "second", "third"]);

        let backward: Vec<String> = registry.iter_mut().rev().map(|(_, l)| l.text().to_string()).collect();
        assert_eq!(backward, ["third", "second", "first"]);
    }

    #[test]
    fn test_remove_reports_owner() {
        let mut registry = LabelRegistry::new();
        let handle = registry.insert(label("a"), ContextId::for_tests(7));

        let (removed, owner) = registry.remove(handle).unwrap();
        assert_eq!(removed.text(), "a");
        assert_eq!(owner, ContextId::for_tests(7));

        assert!(registry.remove(handle).is_none());
        assert!(registry.get(handle).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_handles_continue_past_u32_range() {
        let mut registry = LabelRegistry::new();
        registry.last_handle = u64::from(u32::MAX) - 1;

        let a = registry.insert(label("a"), ContextId::for_tests(1));
        let b = registry.insert(label("b"), ContextId::for_tests(1));

        assert_eq!(a.id(), u64::from(u32::MAX));
        assert_eq!(b.id(), u64::from(u32::MAX) + 1);
        assert!(registry.contains(a) && registry.contains(b));
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(LabelHandle::INVALID.to_string(), "#0");
    }
}
