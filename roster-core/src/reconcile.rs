//! Reconciliation: drive a list to match a target description.
//!
//! ## Keyed merge
//!
//! `ref -> entry`, applied in key order against a ref index built once up
//! front. Unmatched keys create an item only when the descriptor asks for it.
//!
//! ## Full pass (mark and sweep)
//!
//! 1. Bail out when the target is exactly the current order (no hooks).
//! 2. Mark every current item "assume removed".
//! 3. Walk the target: handles are reused as-is, descriptors resolve by ref
//!    (lazy index) or get a fresh item. Every resolved item is unmarked.
//! 4. Swap in the new order, then report `removed` (still marked, old order)
//!    and `added` (not in the old order) through a single `on_sync`.
//!
//! Items reused by handle or by ref are retained: they are neither removed
//! nor added. A handle listed twice keeps only its first position.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ListError;
use crate::hooks::ChangeHooks;
use crate::item::{non_empty, Descriptor, DescriptorOf, Item, ItemFactory};
use crate::list::ObjectList;
use crate::types::{Entry, ItemId, PatchSpec};

impl<F: ItemFactory, H: ChangeHooks> ObjectList<F, H> {
    /// Reconciles the list against `spec`.
    ///
    /// A keyed merge is applied key by key through the single-item primitives,
    /// so an error from the factory leaves earlier keys applied. A full pass
    /// only installs its new order once every entry resolved; on error the
    /// order is untouched, though items matched by ref before the failure
    /// keep the fields merged into them.
    pub fn patch(&mut self, spec: impl Into<PatchSpec<DescriptorOf<F>>>) -> Result<(), ListError> {
        match spec.into() {
            PatchSpec::Keyed(entries) => self.merge_keyed(entries),
            PatchSpec::Sequence(entries) => self.sync_sequence(entries),
        }
    }

    /// Dynamic entry point: objects merge by key, arrays reconcile fully,
    /// anything else is ignored.
    ///
    /// Entries that are not objects, or do not deserialize into a descriptor,
    /// are dropped.
    pub fn patch_value(&mut self, value: &Value) -> Result<(), ListError>
    where
        DescriptorOf<F>: DeserializeOwned,
    {
        match value {
            Value::Object(map) => {
                let entries = map
                    .iter()
                    .filter_map(|(key, v)| {
                        descriptor_from(v).map(|d| (key.clone(), Entry::Fields(d)))
                    })
                    .collect();
                self.merge_keyed(entries)
            }
            Value::Array(values) => {
                let entries = values
                    .iter()
                    .filter_map(descriptor_from)
                    .map(Entry::Fields)
                    .collect();
                self.sync_sequence(entries)
            }
            other => {
                tracing::debug!("patch: ignoring non-collection value {other}");
                Ok(())
            }
        }
    }

    fn merge_keyed(
        &mut self,
        entries: IndexMap<String, Entry<DescriptorOf<F>>>,
    ) -> Result<(), ListError> {
        let refs = self.ref_index();
        for (key, entry) in entries {
            self.merge_key(&refs, key, entry)?;
        }
        Ok(())
    }

    /// Applies one keyed entry. `refs` is the index built before the pass
    /// began, so it may name items that an earlier key has displaced.
    fn merge_key(
        &mut self,
        refs: &HashMap<String, ItemId>,
        key: String,
        entry: Entry<DescriptorOf<F>>,
    ) -> Result<(), ListError> {
        let Some(current) = refs.get(&key).copied() else {
            match entry {
                Entry::Fields(descriptor) if descriptor.creates() => {
                    tracing::trace!("keyed merge: creating item for ref {key:?}");
                    let mut item = self.factory.create_item(&descriptor)?;
                    item.set_item_ref(key);
                    let id = self.insert(item);
                    self.add(id)?;
                }
                _ => tracing::debug!("keyed merge: no item with ref {key:?}, dropped"),
            }
            return Ok(());
        };

        match entry {
            Entry::Item(replacement) => {
                let Some(index) = self.get_index(current) else {
                    tracing::debug!("keyed merge: {current} ({key:?}) was displaced earlier");
                    return Ok(());
                };
                if !self.items.contains_key(&replacement) {
                    tracing::debug!("keyed merge: unknown replacement {replacement} dropped");
                    return Ok(());
                }
                self.set_at(replacement, index)?;
            }
            Entry::Fields(descriptor) => {
                if let Some(item) = self.items.get_mut(&current) {
                    item.patch(&descriptor);
                }
            }
        }
        Ok(())
    }

    fn sync_sequence(&mut self, target: Vec<Entry<DescriptorOf<F>>>) -> Result<(), ListError> {
        if self.matches_order(&target) {
            tracing::trace!("sync: target equals current order");
            return Ok(());
        }

        let previous: HashSet<ItemId> = self.order.iter().copied().collect();
        let mut assume_removed = previous.clone();
        let mut refs: Option<HashMap<String, ItemId>> = None;
        let mut staged: Vec<(ItemId, F::Item)> = Vec::new();
        let mut placed: HashSet<ItemId> = HashSet::with_capacity(target.len());
        let mut order: Vec<ItemId> = Vec::with_capacity(target.len());

        for entry in target {
            let id = match entry {
                Entry::Item(id) => {
                    if !self.items.contains_key(&id) {
                        tracing::debug!("sync: unknown item {id} dropped");
                        continue;
                    }
                    id
                }
                Entry::Fields(descriptor) => {
                    let matched = non_empty(descriptor.item_ref()).and_then(|r| {
                        refs.get_or_insert_with(|| self.ref_index())
                            .get(r)
                            .copied()
                    });
                    match matched {
                        Some(id) => {
                            if let Some(item) = self.items.get_mut(&id) {
                                item.patch(&descriptor);
                            }
                            id
                        }
                        None => {
                            let mut item = self.factory.create_item(&descriptor)?;
                            item.patch(&descriptor);
                            let id = self.allocate();
                            staged.push((id, item));
                            id
                        }
                    }
                }
            };

            assume_removed.remove(&id);
            if placed.insert(id) {
                order.push(id);
            } else {
                tracing::debug!("sync: {id} listed twice, keeping its first position");
            }
        }

        let removed: Vec<ItemId> = self
            .order
            .iter()
            .copied()
            .filter(|id| assume_removed.contains(id))
            .collect();
        let added: Vec<ItemId> = order
            .iter()
            .copied()
            .filter(|id| !previous.contains(id))
            .collect();

        self.items.extend(staged);
        self.order = order;
        tracing::debug!(
            "sync: {} removed, {} added, {} placed",
            removed.len(),
            added.len(),
            self.order.len()
        );
        self.hooks.on_sync(&removed, &added, &self.order);
        Ok(())
    }

    fn matches_order(&self, target: &[Entry<DescriptorOf<F>>]) -> bool {
        target.len() == self.order.len()
            && target
                .iter()
                .zip(&self.order)
                .all(|(entry, id)| entry.as_item() == Some(*id))
    }
}

fn descriptor_from<D: DeserializeOwned>(value: &Value) -> Option<D> {
    if !value.is_object() {
        tracing::debug!("patch: non-object entry {value} dropped");
        return None;
    }
    match serde_json::from_value(value.clone()) {
        Ok(descriptor) => Some(descriptor),
        Err(err) => {
            tracing::debug!("patch: undecodable entry dropped: {err}");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::hooks::{Change, ChangeLog};
    use crate::record::{Fields, Record, RecordFactory};

    type Roster = ObjectList<RecordFactory, ChangeLog>;

    fn roster() -> Roster {
        ObjectList::with_hooks(RecordFactory, ChangeLog::new())
    }

    fn placed(list: &mut Roster, record: Record) -> ItemId {
        let id = list.insert(record);
        list.add(id).expect("add");
        list.hooks_mut().take();
        id
    }

    fn val(list: &Roster, id: ItemId) -> Option<Value> {
        list.item(id).and_then(|r| r.get("val").cloned())
    }

    #[test]
    fn sync_fast_path_fires_nothing() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        let b = placed(&mut list, Record::default());

        list.patch(vec![Entry::Item(a), Entry::Item(b)]).expect("patch");
        assert_eq!(list.get(), &[a, b]);
        assert!(list.hooks().is_empty());
    }

    #[test]
    fn sync_of_empty_onto_empty_is_the_fast_path() {
        let mut list = roster();
        list.patch(Vec::<Entry<Fields>>::new()).expect("patch");
        assert!(list.hooks().is_empty());
    }

    #[test]
    fn sync_reorder_by_handle_retains_everything() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        let b = placed(&mut list, Record::default());

        list.patch(vec![Entry::Item(b), Entry::Item(a)]).expect("patch");
        assert_eq!(list.get(), &[b, a]);
        assert_eq!(
            list.hooks().changes(),
            &[Change::Sync { removed: vec![], added: vec![], order: vec![b, a] }]
        );
    }

    #[test]
    fn sync_resolves_refs_and_creates_the_rest() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));

        list.patch(vec![
            Entry::Fields(Fields::keyed("b").with("val", 2)),
            Entry::Fields(Fields::keyed("c").with("val", 3)),
        ])
        .expect("patch");

        let order = list.get().to_vec();
        assert_eq!(order.len(), 2);
        assert_eq!(order[0], b);
        let c = order[1];
        assert_ne!(c, a);
        assert_eq!(val(&list, b), Some(json!(2)));
        assert_eq!(list.item(c).and_then(|r| r.item_ref.clone()).as_deref(), Some("c"));
        assert_eq!(
            list.hooks().changes(),
            &[Change::Sync { removed: vec![a], added: vec![c], order: vec![b, c] }]
        );
    }

    #[test]
    fn sync_collapses_duplicate_handles() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        let b = placed(&mut list, Record::default());

        list.patch(vec![Entry::Item(b), Entry::Item(a), Entry::Item(b)])
            .expect("patch");
        assert_eq!(list.get(), &[b, a]);
    }

    #[test]
    fn sync_ref_listed_twice_merges_both_into_one_item() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));

        list.patch(vec![
            Entry::Fields(Fields::keyed("a").with("val", 1)),
            Entry::Fields(Fields::keyed("a").with("other", true)),
        ])
        .expect("patch");
        assert_eq!(list.get(), &[a]);
        assert_eq!(val(&list, a), Some(json!(1)));
        assert_eq!(list.item(a).and_then(|r| r.get("other").cloned()), Some(json!(true)));
    }

    #[test]
    fn sync_drops_unknown_handles() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        list.patch(vec![Entry::Item(ItemId::new(500)), Entry::Item(a)])
            .expect("patch");
        assert_eq!(list.get(), &[a]);
        assert_eq!(
            list.hooks().changes(),
            &[Change::Sync { removed: vec![], added: vec![], order: vec![a] }],
            "only the exact-match fast path is silent"
        );
    }

    #[test]
    fn sync_replaces_detached_item_by_handle_and_counts_it_added() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        let spare = list.insert(Record::default());

        list.patch(vec![Entry::Item(spare)]).expect("patch");
        assert_eq!(
            list.hooks().changes(),
            &[Change::Sync { removed: vec![a], added: vec![spare], order: vec![spare] }]
        );
    }

    #[test]
    fn keyed_merge_creates_then_patches_same_item() {
        let mut list = roster();
        let spec: PatchSpec<Fields> =
            [("x".to_string(), Entry::Fields(Fields::new().with("val", 1).creating()))]
                .into_iter()
                .collect();
        list.patch(spec).expect("create");
        assert_eq!(list.len(), 1);
        let x = list.get()[0];
        assert_eq!(list.item(x).and_then(|r| r.item_ref()), Some("x"));

        list.patch_value(&json!({ "x": { "val": 2 } })).expect("merge");
        assert_eq!(list.get(), &[x]);
        assert_eq!(val(&list, x), Some(json!(2)));
        assert_eq!(list.hooks().changes(), &[Change::Add { item: x, index: 0 }]);
    }

    #[test]
    fn keyed_merge_without_flag_drops_unknown_keys() {
        let mut list = roster();
        list.patch_value(&json!({ "ghost": { "val": 1 } })).expect("patch");
        assert!(list.is_empty());
        assert!(list.hooks().is_empty());
    }

    #[test]
    fn keyed_merge_with_handle_replaces_in_place() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));
        let fresh = list.insert(Record::with_ref("fresh"));

        let spec: PatchSpec<Fields> = [("a".to_string(), Entry::Item(fresh))].into_iter().collect();
        list.patch(spec).expect("patch");
        assert_eq!(list.get(), &[fresh, b]);
        assert_eq!(list.hooks().changes(), &[Change::Set { item: fresh, index: 0 }]);
        assert!(list.item(a).is_some(), "displaced item is detached, not dropped");
    }

    #[test]
    fn keyed_merge_with_placed_handle_moves_it() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));
        let c = placed(&mut list, Record::with_ref("c"));

        let spec: PatchSpec<Fields> = [("a".to_string(), Entry::Item(c))].into_iter().collect();
        list.patch(spec).expect("patch");
        assert_eq!(list.get(), &[c, a, b]);
        assert_eq!(list.hooks().changes(), &[Change::Move { item: c, from: 2, to: 0 }]);
    }

    #[test]
    fn keyed_merge_skips_an_item_displaced_earlier_in_the_pass() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));
        let first = list.insert(Record::default());
        let second = list.insert(Record::default());

        let refs = list.ref_index();
        list.merge_key(&refs, "a".to_string(), Entry::Item(first))
            .expect("overwrite");
        assert_eq!(list.get(), &[first, b]);
        list.hooks_mut().take();

        list.merge_key(&refs, "a".to_string(), Entry::Item(second))
            .expect("skip");
        assert_eq!(list.get(), &[first, b]);
        assert!(list.hooks().is_empty());
        assert!(list.get_index(a).is_none());
        assert!(list.get_index(second).is_none());
    }

    #[test]
    fn keyed_merge_drops_unknown_replacement_handles() {
        let mut list = roster();
        let a = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));

        let spec: PatchSpec<Fields> = [("a".to_string(), Entry::Item(ItemId::new(404)))]
            .into_iter()
            .collect();
        list.patch(spec).expect("patch");
        assert_eq!(list.get(), &[a, b]);
        assert!(list.hooks().is_empty());
    }

    #[test]
    fn displaced_item_is_unreachable_by_ref_in_later_merges() {
        let mut list = roster();
        let x = placed(&mut list, Record::with_ref("a"));
        let b = placed(&mut list, Record::with_ref("b"));
        let spare = list.insert(Record::default());

        list.set_at(spare, 0).expect("overwrite");
        assert_eq!(list.get(), &[spare, b]);
        list.hooks_mut().take();

        let spec: PatchSpec<Fields> = [("a".to_string(), Entry::Item(b))].into_iter().collect();
        list.patch(spec).expect("patch");
        assert_eq!(list.get(), &[spare, b]);
        assert!(list.hooks().is_empty());
        assert!(list.item(x).is_some());
    }

    #[test]
    fn keyed_merge_follows_key_order() {
        let mut list = roster();
        list.patch_value(&json!({
            "b": { "__create": true },
            "a": { "__create": true },
        }))
        .expect("patch");
        let refs: Vec<_> = list
            .iter()
            .filter_map(|(_, r)| r.item_ref().map(str::to_owned))
            .collect();
        assert_eq!(refs, vec!["b", "a"]);
    }

    #[test]
    fn patch_value_ignores_scalars() {
        let mut list = roster();
        let a = placed(&mut list, Record::default());
        for value in [json!(null), json!(3), json!("text"), json!(true)] {
            list.patch_value(&value).expect("patch");
        }
        assert_eq!(list.get(), &[a]);
        assert!(list.hooks().is_empty());
    }

    #[test]
    fn patch_value_drops_non_object_sequence_entries() {
        let mut list = roster();
        list.patch_value(&json!([{ "val": 1 }, 7, "x", null])).expect("patch");
        assert_eq!(list.len(), 1);
        let id = list.get()[0];
        assert_eq!(val(&list, id), Some(json!(1)));
    }

    #[test]
    fn factory_error_leaves_order_untouched() {
        struct Refusing;
        impl ItemFactory for Refusing {
            type Item = Record;
        }

        let mut list = ObjectList::with_hooks(Refusing, ChangeLog::new());
        let a = list.insert(Record::with_ref("a"));
        list.add(a).expect("add");
        list.hooks_mut().take();

        let err = list
            .patch(vec![
                Entry::Fields(Fields::keyed("a").with("val", 1)),
                Entry::Fields(Fields::new().with("val", 2)),
            ])
            .expect_err("factory refuses");
        assert_eq!(err, ListError::NotImplemented("create_item"));
        assert_eq!(list.get(), &[a]);
        assert!(list.hooks().is_empty());
        assert_eq!(list.item(a).and_then(|r| r.get("val").cloned()), Some(json!(1)));
    }
}
