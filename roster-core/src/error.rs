//! Error types for roster-core.

use thiserror::Error;

use crate::types::ItemId;

/// All errors that can arise from list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// Position outside `[0, len]`. Raised before any mutation happens.
    #[error("{op}: the index {index} is out of bounds {len}")]
    IndexOutOfBounds {
        op: &'static str,
        index: usize,
        len: usize,
    },

    /// The item factory did not provide the named capability.
    #[error("{0} must be implemented by the item factory")]
    NotImplemented(&'static str),

    /// A handle that was never issued by this list, or has been released.
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
}

/// Convenience constructor for [`ListError::IndexOutOfBounds`].
pub(crate) fn out_of_bounds(op: &'static str, index: usize, len: usize) -> ListError {
    ListError::IndexOutOfBounds { op, index, len }
}
