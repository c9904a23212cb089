//! Re-entrancy guards for user-triggered mutations.
//!
//! These stop a second click from re-submitting while the first round-trip is
//! still pending. They are not locks: programmatic callers can still dispatch
//! directly on the view.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Result of a guarded user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<R> {
    /// The trigger was disabled because a previous submission is in flight.
    Busy,
    Completed(R),
}

impl<R> Submission<R> {
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn completed(self) -> Option<R> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Busy => None,
        }
    }
}

/// Single `isPending` flag, e.g. for a form's submit button.
#[derive(Debug, Clone, Default)]
pub struct PendingFlag {
    pending: Arc<AtomicBool>,
}

impl PendingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Returns `None` when already pending. The flag clears when the token drops.
    pub fn try_begin(&self) -> Option<PendingToken> {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingToken {
                pending: Arc::clone(&self.pending),
            })
    }
}

#[derive(Debug)]
pub struct PendingToken {
    pending: Arc<AtomicBool>,
}

impl Drop for PendingToken {
    fn drop(&mut self) {
        self.pending.store(false, Ordering::Release);
    }
}

/// One pending flag per key, e.g. per row of a list.
#[derive(Debug)]
pub struct PendingSet<K> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K> Default for PendingSet<K> {
    fn default() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K> Clone for PendingSet<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
        }
    }
}

impl<K: Eq + Hash + Clone> PendingSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    pub fn try_begin(&self, key: K) -> Option<PendingKeyToken<K>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(PendingKeyToken {
            keys: Arc::clone(&self.keys),
            key,
        })
    }
}

#[derive(Debug)]
pub struct PendingKeyToken<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash> Drop for PendingKeyToken<K> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
