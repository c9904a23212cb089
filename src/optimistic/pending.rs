use super::action::{CollectionAction, Patchable, apply};
use crate::core::EditKey;
use im::Vector;
use std::fmt;

/// Identifier of one speculative edit inside a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditId(pub(crate) u64);

impl EditId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edit-{}", self.0)
    }
}

/// One change rendered before the server has acknowledged it.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeculativeEdit<T: Patchable> {
    pub id: EditId,
    pub key: Option<EditKey<T::Key>>,
    pub action: CollectionAction<T>,
    /// Logical clock value at staging time; fold order.
    pub applied_at: u64,
    /// Logical clock value when the server confirmed the edit.
    pub confirmed_at: Option<u64>,
}

impl<T: Patchable> SpeculativeEdit<T> {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at.is_some()
    }
}

/// Pending edits in staging order.
#[derive(Debug, Clone)]
pub struct PendingEdits<T: Patchable> {
    edits: Vec<SpeculativeEdit<T>>,
}

impl<T: Patchable> Default for PendingEdits<T> {
    fn default() -> Self {
        Self { edits: Vec::new() }
    }
}

impl<T: Patchable> PendingEdits<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, edit: SpeculativeEdit<T>) {
        debug_assert!(
            self.edits
                .last()
                .is_none_or(|last| last.applied_at < edit.applied_at)
        );
        self.edits.push(edit);
    }

    pub(crate) fn confirm(&mut self, id: EditId, at: u64) -> bool {
        match self.edits.iter_mut().find(|edit| edit.id == id) {
            Some(edit) => {
                edit.confirmed_at.get_or_insert(at);
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: EditId) -> Option<SpeculativeEdit<T>> {
        let index = self.edits.iter().position(|edit| edit.id == id)?;
        Some(self.edits.remove(index))
    }

    /// Keeps edits matching the predicate, returns how many were discarded.
    pub(crate) fn retain<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&SpeculativeEdit<T>) -> bool,
    {
        let before = self.edits.len();
        self.edits.retain(keep);
        before - self.edits.len()
    }

    pub fn get(&self, id: EditId) -> Option<&SpeculativeEdit<T>> {
        self.edits.iter().find(|edit| edit.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeculativeEdit<T>> {
        self.edits.iter()
    }

    pub fn for_key<'a>(
        &'a self,
        key: &'a EditKey<T::Key>,
    ) -> impl Iterator<Item = &'a SpeculativeEdit<T>> + 'a {
        self.edits
            .iter()
            .filter(move |edit| edit.key.as_ref() == Some(key))
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Visible collection: every pending edit folded over `authoritative` in
    /// staging order, so the latest edit to a key wins.
    pub fn project(&self, authoritative: &Vector<T>) -> Vector<T> {
        self.edits
            .iter()
            .fold(authoritative.clone(), |acc, edit| apply(&acc, &edit.action))
    }
}
