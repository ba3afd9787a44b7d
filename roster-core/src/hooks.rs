//! Change notification hooks.
//!
//! Hooks fire synchronously, inline, at the point of mutation. They are owned
//! by the list and only ever see `&mut self`, so a hook cannot call back into
//! the list that is notifying it.

use serde::Serialize;

use crate::types::ItemId;

/// Five overridable hook points; every default is a no-op.
pub trait ChangeHooks {
    fn on_add(&mut self, item: ItemId, index: usize) {
        let _ = (item, index);
    }

    fn on_remove(&mut self, item: ItemId, index: usize) {
        let _ = (item, index);
    }

    /// `item` was written over slot `index`. The displaced item is not reported.
    fn on_set(&mut self, item: ItemId, index: usize) {
        let _ = (item, index);
    }

    fn on_move(&mut self, item: ItemId, from: usize, to: usize) {
        let _ = (item, from, to);
    }

    /// Bulk replacement. `order` is the complete new order.
    fn on_sync(&mut self, removed: &[ItemId], added: &[ItemId], order: &[ItemId]) {
        let _ = (removed, added, order);
    }
}

impl ChangeHooks for () {}

/// One recorded notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Change {
    Add {
        item: ItemId,
        index: usize,
    },
    Remove {
        item: ItemId,
        index: usize,
    },
    Set {
        item: ItemId,
        index: usize,
    },
    Move {
        item: ItemId,
        from: usize,
        to: usize,
    },
    Sync {
        removed: Vec<ItemId>,
        added: Vec<ItemId>,
        order: Vec<ItemId>,
    },
}

/// Hooks that record every notification in firing order.
#[derive(Debug, Clone, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Hands out everything recorded so far and starts a fresh log.
    pub fn take(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl ChangeHooks for ChangeLog {
    fn on_add(&mut self, item: ItemId, index: usize) {
        self.changes.push(Change::Add { item, index });
    }

    fn on_remove(&mut self, item: ItemId, index: usize) {
        self.changes.push(Change::Remove { item, index });
    }

    fn on_set(&mut self, item: ItemId, index: usize) {
        self.changes.push(Change::Set { item, index });
    }

    fn on_move(&mut self, item: ItemId, from: usize, to: usize) {
        self.changes.push(Change::Move { item, from, to });
    }

    fn on_sync(&mut self, removed: &[ItemId], added: &[ItemId], order: &[ItemId]) {
        self.changes.push(Change::Sync {
            removed: removed.to_vec(),
            added: added.to_vec(),
            order: order.to_vec(),
        });
    }
}
