//! Label contexts
//!
//! A context groups the labels of one UI scope (a screen, a dialog). The
//! contexts form a stack and only the top one is active: new labels join
//! it, and only its labels are drawn and undrawn. Lower contexts keep their
//! labels untouched until they are on top again.
//!
//! The stack tracks membership only. Labels themselves live in the
//! [`LabelRegistry`](crate::LabelRegistry).

use std::collections::BTreeSet;

use crate::registry::LabelHandle;

/// Identifies one pushed context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    #[cfg(test)]
    pub(crate) fn for_tests(id: u64) -> Self {
        ContextId(id)
    }
}

struct Context {
    id: ContextId,
    labels: BTreeSet<LabelHandle>,
}

/// Stack of label sets
#[derive(Default)]
pub struct ContextStack {
    stack: Vec<Context>,
    last_id: u64,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an empty context, which becomes the active one
    pub fn push(&mut self) -> ContextId {
        self.last_id += 1;
        let id = ContextId(self.last_id);
        self.stack.push(Context {
            id,
            labels: BTreeSet::new(),
        });
        id
    }

    /// Pops the active context along with whatever handles it still holds
    pub fn pop(&mut self) -> Option<(ContextId, BTreeSet<LabelHandle>)> {
        self.stack.pop().map(|context| (context.id, context.labels))
    }

    pub fn active(&self) -> Option<ContextId> {
        self.stack.last().map(|context| context.id)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Whether the context is still somewhere on the stack
    pub fn is_open(&self, id: ContextId) -> bool {
        self.stack.iter().any(|context| context.id == id)
    }

    /// Adds a handle to the active context, returning that context
    pub fn insert_active(&mut self, handle: LabelHandle) -> Option<ContextId> {
        let context = self.stack.last_mut()?;
        context.labels.insert(handle);
        Some(context.id)
    }

    pub fn is_active(&self, handle: LabelHandle) -> bool {
        self.stack
            .last()
            .is_some_and(|context| context.labels.contains(&handle))
    }

    /// Lowest handle in the active context
    pub fn first_active(&self) -> Option<LabelHandle> {
        self.stack.last()?.labels.first().copied()
    }

    /// Removes a handle from the given context, wherever it sits in the stack
    pub fn forget(&mut self, id: ContextId, handle: LabelHandle) -> bool {
        self.stack
            .iter_mut()
            .find(|context| context.id == id)
            .is_some_and(|context| context.labels.remove(&handle))
    }

    /// Removes a handle from the active context
    pub fn forget_active(&mut self, handle: LabelHandle) -> bool {
        self.stack
            .last_mut()
            .is_some_and(|context| context.labels.remove(&handle))
    }

    #[cfg(test)]
    fn contains(&self, id: ContextId, handle: LabelHandle) -> bool {
        self.stack
            .iter()
            .any(|context| context.id == id && context.labels.contains(&handle))
    }
}
