//! Event sets and the differ that compares two polls.

use std::collections::BTreeSet;
use std::collections::btree_set;

use serde::{Deserialize, Serialize};

use crate::canonical::{CanonicalKey, canonicalize};
use crate::event::RawEvent;

/// All agenda entries visible at one poll instant.
///
/// Keys are unique by value. Iteration is sorted, which keeps summaries and
/// logs stable, but nothing depends on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventSet {
    keys: BTreeSet<CanonicalKey>,
}

impl EventSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalizes raw events into a set.
    ///
    /// Entries that canonicalize to the same key collapse into one.
    pub fn from_raw<'a>(events: impl IntoIterator<Item = &'a RawEvent>) -> Self {
        events.into_iter().map(canonicalize).collect()
    }

    /// Inserts a key, returning `false` if it was already present.
    pub fn insert(&mut self, key: CanonicalKey) -> bool {
        self.keys.insert(key)
    }

    /// Returns true if the key is present.
    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if no entry is visible.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates over the keys.
    pub fn iter(&self) -> btree_set::Iter<'_, CanonicalKey> {
        self.keys.iter()
    }

    /// Keys in `self` that are not in `other`.
    pub fn difference(&self, other: &EventSet) -> EventSet {
        self.keys.difference(&other.keys).cloned().collect()
    }
}

impl FromIterator<CanonicalKey> for EventSet {
    fn from_iter<I: IntoIterator<Item = CanonicalKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EventSet {
    type Item = &'a CanonicalKey;
    type IntoIter = btree_set::Iter<'a, CanonicalKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl IntoIterator for EventSet {
    type Item = CanonicalKey;
    type IntoIter = btree_set::IntoIter<CanonicalKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

/// Result of comparing two polls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDiff {
    /// Entries visible now but not before.
    pub added: EventSet,
    /// Entries visible before but not now.
    pub removed: EventSet,
}

impl EventDiff {
    /// Returns true if nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compares the previous poll against the current one.
///
/// `added = current − previous`, `removed = previous − current`. Pure: calling
/// it twice on the same pair gives the same answer.
pub fn diff(previous: &EventSet, current: &EventSet) -> EventDiff {
    EventDiff {
        added: current.difference(previous),
        removed: previous.difference(current),
    }
}
