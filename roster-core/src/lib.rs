//! Roster core library: an ordered item list that reconciles against target
//! descriptions while keeping item identity stable.
//!
//! Public API surface:
//! - [`list`] - [`ObjectList`] and its single-item primitives
//! - [`reconcile`] - keyed merge and full-sequence patches
//! - [`hooks`] - [`ChangeHooks`] notifications, [`ChangeLog`] recorder
//! - [`item`] - collaborator traits ([`Item`], [`Descriptor`], [`ItemFactory`])
//! - [`record`] - JSON-backed [`Record`] items and [`Fields`] descriptors
//! - [`error`] - [`ListError`]
//!
//! Everything is single-threaded and synchronous; hooks run inline before the
//! mutating call returns.

pub mod error;
pub mod hooks;
pub mod ingest;
pub mod item;
pub mod list;
pub mod reconcile;
pub mod record;
pub mod types;

pub use error::ListError;
pub use hooks::{Change, ChangeHooks, ChangeLog};
pub use ingest::Ingest;
pub use item::{Descriptor, DescriptorOf, Item, ItemFactory};
pub use list::ObjectList;
pub use record::{Fields, Record, RecordFactory};
pub use types::{Entry, ItemId, PatchSpec};
