use alloc::string::String;

use thiserror::Error;

/// Failures of the position calculator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PositionError {
    /// Virtual offsets were requested while the fixed-height fast path does not apply.
    #[error(
        "virtual offsets need one uniform height over more than {threshold} items \
         (len={len}, distinct heights={distinct})"
    )]
    VirtualOffsetUnavailable {
        len: usize,
        distinct: usize,
        threshold: usize,
    },

    #[error("item at index {index} has non-numeric id {id:?}")]
    NonNumericId { index: usize, id: String },
}

/// Rejections from the pagination store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A page fetch is already in flight. New requests are rejected, not queued.
    #[error("a page load is already in flight")]
    AlreadyLoading,

    #[error("no further pages to load")]
    Exhausted,

    #[error("static lists are not paginated")]
    StaticList,

    /// The list was reset after the request was issued; its result must be dropped.
    #[error("load from epoch {request_epoch} superseded by a reset (current epoch {current_epoch})")]
    Stale {
        request_epoch: u64,
        current_epoch: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown placeholder mode {0:?} (expected realistic, masked, skeleton, blank or dots)")]
pub struct ParseModeError(pub String);
