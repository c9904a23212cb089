use crate::core::{EditKey, Period};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// A record that can be located inside a collection by identity.
pub trait Keyed {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;
}

/// A record the optimistic layer knows how to patch in a copy of the collection.
pub trait Patchable: Keyed + Clone + Send + Sync + 'static {
    type Patch: Clone + Debug + PartialEq + Send + Sync + 'static;

    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Sub-entity scope of a patch. Payment patches return their month so that
    /// edits to different months of one apartment get distinct edit keys.
    fn patch_period(_patch: &Self::Patch) -> Option<Period> {
        None
    }
}

/// Tagged mutation folded into a collection by [`apply`].
///
/// On the wire this is `{"type": "add" | "update" | "delete", ...}`. Any other
/// tag deserializes to `Unknown`, which `apply` treats as a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
#[serde(bound(
    serialize = "T: Serialize, T::Key: Serialize, T::Patch: Serialize",
    deserialize = "T: Deserialize<'de>, T::Key: Deserialize<'de>, T::Patch: Deserialize<'de>"
))]
pub enum CollectionAction<T: Patchable> {
    Add { item: T },
    Update { key: T::Key, patch: T::Patch },
    Delete { key: T::Key },
    #[serde(other)]
    Unknown,
}

impl<T: Patchable> CollectionAction<T> {
    pub fn add(item: T) -> Self {
        Self::Add { item }
    }

    pub fn update(key: T::Key, patch: T::Patch) -> Self {
        Self::Update { key, patch }
    }

    pub fn delete(key: T::Key) -> Self {
        Self::Delete { key }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Unknown => "unknown",
        }
    }

    /// Identity this action targets; `None` for `Unknown`.
    pub fn edit_key(&self) -> Option<EditKey<T::Key>> {
        match self {
            Self::Add { item } => Some(EditKey::entity(item.key())),
            Self::Update { key, patch } => Some(EditKey {
                entity: key.clone(),
                period: T::patch_period(patch),
            }),
            Self::Delete { key } => Some(EditKey::entity(key.clone())),
            Self::Unknown => None,
        }
    }
}

/// Folds one action into a collection, returning a new collection.
///
/// The input is never modified: `im::Vector` shares structure with the copy
/// and only the touched path is cloned.
pub fn apply<T: Patchable>(collection: &Vector<T>, action: &CollectionAction<T>) -> Vector<T> {
    match action {
        CollectionAction::Add { item } => {
            let key = item.key();
            let mut next = collection.clone();
            match position_of(collection, &key) {
                Some(index) => {
                    next.set(index, item.clone());
                }
                None => next.push_back(item.clone()),
            }
            next
        }
        CollectionAction::Update { key, patch } => {
            let Some(index) = position_of(collection, key) else {
                return collection.clone();
            };
            let mut next = collection.clone();
            if let Some(item) = next.get_mut(index) {
                item.apply_patch(patch);
            }
            next
        }
        CollectionAction::Delete { key } => {
            let Some(index) = position_of(collection, key) else {
                return collection.clone();
            };
            let mut next = collection.clone();
            next.remove(index);
            next
        }
        CollectionAction::Unknown => collection.clone(),
    }
}

fn position_of<T: Patchable>(collection: &Vector<T>, key: &T::Key) -> Option<usize> {
    collection.iter().position(|item| item.key() == *key)
}
