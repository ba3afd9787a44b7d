//! Handle and patch-spec types shared by the list and the reconciler.
//!
//! Item identity is handle identity: an [`ItemId`] names one stored item for the
//! lifetime of the list that issued it. Handles are never reused, so a stale
//! handle can never alias a newer item.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque handle to an item held by an [`ObjectList`](crate::ObjectList).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric value, stable for the lifetime of the issuing list.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Patch input
// ---------------------------------------------------------------------------

/// One position of a target description.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<D> {
    /// Reuse this exact item here.
    Item(ItemId),
    /// Merge these fields into whatever resolves at this position.
    Fields(D),
}

impl<D> Entry<D> {
    /// The handle, when this entry reuses an item by identity.
    pub fn as_item(&self) -> Option<ItemId> {
        match self {
            Entry::Item(id) => Some(*id),
            Entry::Fields(_) => None,
        }
    }
}

impl<D> From<ItemId> for Entry<D> {
    fn from(id: ItemId) -> Self {
        Entry::Item(id)
    }
}

/// Target description accepted by [`ObjectList::patch`](crate::ObjectList::patch).
#[derive(Debug, Clone, PartialEq)]
pub enum PatchSpec<D> {
    /// ref -> entry, applied in the map's own key order.
    Keyed(IndexMap<String, Entry<D>>),
    /// Complete replacement order.
    Sequence(Vec<Entry<D>>),
}

impl<D> From<Vec<Entry<D>>> for PatchSpec<D> {
    fn from(entries: Vec<Entry<D>>) -> Self {
        PatchSpec::Sequence(entries)
    }
}

impl<D> From<IndexMap<String, Entry<D>>> for PatchSpec<D> {
    fn from(entries: IndexMap<String, Entry<D>>) -> Self {
        PatchSpec::Keyed(entries)
    }
}

impl<D> FromIterator<(String, Entry<D>)> for PatchSpec<D> {
    fn from_iter<T: IntoIterator<Item = (String, Entry<D>)>>(iter: T) -> Self {
        PatchSpec::Keyed(iter.into_iter().collect())
    }
}

impl<D> FromIterator<Entry<D>> for PatchSpec<D> {
    fn from_iter<T: IntoIterator<Item = Entry<D>>>(iter: T) -> Self {
        PatchSpec::Sequence(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
