//! Collaborator contract: items, descriptors, and the factory that builds items.
//!
//! The list never looks inside an item beyond its `ref`. Everything else an item
//! carries is merged by the item itself through [`Item::patch`].

use crate::error::ListError;

/// A plain structured value describing desired field values for an item.
pub trait Descriptor {
    /// Identity key used to resolve this descriptor against existing items.
    fn item_ref(&self) -> Option<&str> {
        None
    }

    /// Whether a keyed merge may create an item when the key has no match.
    fn creates(&self) -> bool {
        false
    }
}

/// An item held by an [`ObjectList`](crate::ObjectList).
pub trait Item {
    type Descriptor: Descriptor;

    /// Optional stable key. Empty strings are treated as "no ref".
    fn item_ref(&self) -> Option<&str>;

    /// Assigns the key; called when a keyed merge creates the item.
    fn set_item_ref(&mut self, item_ref: String);

    /// Merges `descriptor` into this item. Must be idempotent.
    fn patch(&mut self, descriptor: &Self::Descriptor);
}

/// Builds items for descriptors that resolve to nothing existing.
pub trait ItemFactory {
    type Item: Item;

    /// Returns a freshly constructed item for `descriptor`.
    ///
    /// The default fails with [`ListError::NotImplemented`] on first use.
    fn create_item(
        &mut self,
        descriptor: &<Self::Item as Item>::Descriptor,
    ) -> Result<Self::Item, ListError> {
        let _ = descriptor;
        Err(ListError::NotImplemented("create_item"))
    }

    /// Whether ingestion may accept `item` as a ready-made item.
    fn is_item(&self, item: &Self::Item) -> bool {
        let _ = item;
        false
    }
}

/// Descriptor type accepted by the items a factory builds.
pub type DescriptorOf<F> = <<F as ItemFactory>::Item as Item>::Descriptor;

/// `Some(r)` only for non-empty refs.
pub(crate) fn non_empty(item_ref: Option<&str>) -> Option<&str> {
    item_ref.filter(|r| !r.is_empty())
}
