//! Ordered item collection and its single-item primitives.
//!
//! # Storage
//!
//! ```text
//! ObjectList
//!   items: ItemId -> Item      (every item the list knows about)
//!   order: [ItemId]            (the placed subset, no handle twice)
//! ```
//!
//! Removing an item from the order detaches it; it stays in the store so it
//! can be placed again by handle. Dropping detached items is the caller's
//! call ([`ObjectList::release`], [`ObjectList::prune_detached`]).

use std::collections::{HashMap, HashSet};

use crate::error::{out_of_bounds, ListError};
use crate::hooks::ChangeHooks;
use crate::item::{non_empty, Item, ItemFactory};
use crate::types::ItemId;

/// An ordered list of items that can be reconciled against a target description.
pub struct ObjectList<F: ItemFactory, H = ()> {
    pub(crate) factory: F,
    pub(crate) hooks: H,
    pub(crate) items: HashMap<ItemId, F::Item>,
    pub(crate) order: Vec<ItemId>,
    next_id: u64,
}

impl<F: ItemFactory> ObjectList<F, ()> {
    /// A list without change notifications.
    pub fn new(factory: F) -> Self {
        Self::with_hooks(factory, ())
    }
}

impl<F: ItemFactory, H: ChangeHooks> ObjectList<F, H> {
    pub fn with_hooks(factory: F, hooks: H) -> Self {
        Self {
            factory,
            hooks,
            items: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
        }
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    // -----------------------------------------------------------------------
    // Store
    // -----------------------------------------------------------------------

    /// Stores `item` without placing it and returns its handle.
    pub fn insert(&mut self, item: F::Item) -> ItemId {
        let id = self.allocate();
        self.items.insert(id, item);
        id
    }

    pub(crate) fn allocate(&mut self) -> ItemId {
        let id = ItemId::new(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn item(&self, id: ItemId) -> Option<&F::Item> {
        self.items.get(&id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut F::Item> {
        self.items.get_mut(&id)
    }

    /// Takes a detached item out of the store. Placed items are never released.
    pub fn release(&mut self, id: ItemId) -> Option<F::Item> {
        if self.order.contains(&id) {
            tracing::debug!("refusing to release placed item {id}");
            return None;
        }
        self.items.remove(&id)
    }

    /// Takes every detached item out of the store, oldest handle first.
    pub fn prune_detached(&mut self) -> Vec<(ItemId, F::Item)> {
        let placed: HashSet<ItemId> = self.order.iter().copied().collect();
        let mut detached: Vec<ItemId> = self
            .items
            .keys()
            .filter(|id| !placed.contains(id))
            .copied()
            .collect();
        detached.sort();
        detached
            .into_iter()
            .filter_map(|id| self.items.remove(&id).map(|item| (id, item)))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Live ordered view.
    pub fn get(&self) -> &[ItemId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Placed items in order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &F::Item)> + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.items.get(id).map(|item| (*id, item)))
    }

    pub fn get_at(&self, index: usize) -> Option<ItemId> {
        self.order.get(index).copied()
    }

    pub fn get_index(&self, id: ItemId) -> Option<usize> {
        self.order.iter().position(|placed| *placed == id)
    }

    /// Placed item carrying `item_ref`. With duplicate refs the last one wins.
    pub fn find_ref(&self, item_ref: &str) -> Option<ItemId> {
        if item_ref.is_empty() {
            return None;
        }
        self.order.iter().rev().copied().find(|id| {
            self.items
                .get(id)
                .and_then(|item| item.item_ref())
                .is_some_and(|r| r == item_ref)
        })
    }

    /// ref -> handle over the current order, last occurrence wins.
    pub(crate) fn ref_index(&self) -> HashMap<String, ItemId> {
        let mut refs = HashMap::new();
        for id in &self.order {
            if let Some(r) = self.items.get(id).and_then(|item| non_empty(item.item_ref())) {
                refs.insert(r.to_owned(), *id);
            }
        }
        refs
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    pub fn add(&mut self, id: ItemId) -> Result<ItemId, ListError> {
        self.add_at(id, self.order.len())
    }

    /// Inserts `id` at `index`. An item already placed elsewhere is moved
    /// with [`set_at`](Self::set_at) semantics instead.
    pub fn add_at(&mut self, id: ItemId, index: usize) -> Result<ItemId, ListError> {
        self.check("add_at", id, index)?;
        match self.get_index(id) {
            Some(current) if current == index => {
                tracing::trace!("add_at: {id} already at {index}");
            }
            Some(_) => self.set_at(id, index)?,
            None => {
                self.order.insert(index, id);
                self.hooks.on_add(id, index);
            }
        }
        Ok(id)
    }

    /// Places `id` at `index`.
    ///
    /// A placed item is moved: it is taken out of `from` and reinserted at
    /// `index`, minus one when `from <= index` to make up for the removal.
    /// An unplaced item overwrites slot `index` (appends at `len`).
    pub fn set_at(&mut self, id: ItemId, index: usize) -> Result<(), ListError> {
        self.check("set_at", id, index)?;
        match self.get_index(id) {
            Some(from) if from == index => {
                tracing::trace!("set_at: {id} already at {index}");
            }
            Some(from) => {
                let to = if from <= index { index - 1 } else { index };
                if to == from {
                    tracing::trace!("set_at: move of {id} resolves to its own slot {from}");
                    return Ok(());
                }
                self.order.remove(from);
                self.order.insert(to, id);
                self.hooks.on_move(id, from, to);
            }
            None => {
                if index == self.order.len() {
                    self.order.push(id);
                } else {
                    let displaced = std::mem::replace(&mut self.order[index], id);
                    tracing::debug!("set_at: {id} displaces {displaced} at {index}");
                }
                self.hooks.on_set(id, index);
            }
        }
        Ok(())
    }

    /// Removes `id` from the order; returns where it was. No-op when absent.
    pub fn remove(&mut self, id: ItemId) -> Option<usize> {
        let index = self.get_index(id)?;
        self.remove_at(index);
        Some(index)
    }

    /// Removes whatever sits at `index`. No-op when out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<ItemId> {
        if index >= self.order.len() {
            tracing::debug!("remove_at: {index} is past the end ({})", self.order.len());
            return None;
        }
        let id = self.order.remove(index);
        self.hooks.on_remove(id, index);
        Some(id)
    }

    /// Empties the order. Fires `on_sync(previous, [], [])` unless already empty.
    pub fn clear(&mut self) {
        if self.order.is_empty() {
            return;
        }
        let previous = std::mem::take(&mut self.order);
        self.hooks.on_sync(&previous, &[], &[]);
    }

    fn check(&self, op: &'static str, id: ItemId, index: usize) -> Result<(), ListError> {
        if index > self.order.len() {
            return Err(out_of_bounds(op, index, self.order.len()));
        }
        if !self.items.contains_key(&id) {
            return Err(ListError::UnknownItem(id));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
