//! Convenience ingestion: append descriptors, raw items, or batches of both.

use crate::error::ListError;
use crate::hooks::ChangeHooks;
use crate::item::{DescriptorOf, Item, ItemFactory};
use crate::list::ObjectList;
use crate::types::ItemId;

/// Something to append to a list.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest<I, D> {
    /// Build an item from these fields.
    Fields(D),
    /// A ready-made item; accepted only when the factory's `is_item` agrees.
    Item(I),
    /// An item the list already stores (moved to the end if placed).
    Existing(ItemId),
    Many(Vec<Ingest<I, D>>),
}

impl<F: ItemFactory, H: ChangeHooks> ObjectList<F, H> {
    /// Appends `input`.
    ///
    /// Returns the handle of the single item appended, `None` for batches and
    /// for input that was dropped.
    pub fn ingest(
        &mut self,
        input: Ingest<F::Item, DescriptorOf<F>>,
    ) -> Result<Option<ItemId>, ListError> {
        match input {
            Ingest::Fields(descriptor) => {
                let mut item = self.factory.create_item(&descriptor)?;
                item.patch(&descriptor);
                let id = self.insert(item);
                self.add(id).map(Some)
            }
            Ingest::Item(item) => {
                if !self.factory.is_item(&item) {
                    tracing::debug!("ingest: factory does not recognize the item, dropped");
                    return Ok(None);
                }
                let id = self.insert(item);
                self.add(id).map(Some)
            }
            Ingest::Existing(id) => {
                if self.item(id).is_none() {
                    tracing::debug!("ingest: unknown item {id} dropped");
                    return Ok(None);
                }
                self.add(id).map(Some)
            }
            Ingest::Many(inputs) => {
                for input in inputs {
                    self.ingest(input)?;
                }
                Ok(None)
            }
        }
    }
}
