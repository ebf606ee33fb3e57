//! A headless windowing engine for long, possibly paginated lists.
//!
//! For frame coalescing and load orchestration, see the `listwindow-adapter` crate.
//!
//! This crate maps a scroll position to the slice of rows worth rendering:
//! - a per-id height cache with an optional prefix-sum offset table;
//! - a strategy table (whole list, fixed-height arithmetic, search, linear scan) for the
//!   visible range, padded with buffer and overscan rows;
//! - cumulative or id-derived (virtual) offsets for each visible slot;
//! - synthetic placeholder rows for slots whose data has not loaded yet;
//! - an immutable pagination state evolved by pure functions, with cursor and page-number
//!   loads, deduplication, and epoch-based rejection of stale results.
//!
//! It is UI-agnostic. The UI layer provides the viewport (scroll offset and container height),
//! measured row heights, and a [`RowRenderer`] that turns a slot into whatever handle it draws.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fenwick;
mod heights;
mod key;
mod options;
mod placeholder;
mod position;
mod render;
mod store;
mod types;
mod visibility;


pub use error::{LoadError, ParseModeError, PositionError};
pub use heights::ItemHeights;
pub use options::{ListOptions, PlaceholderOptions, StrategyThresholds, WindowOptions};
pub use placeholder::{
    ContentPattern, PlaceholderContent, PlaceholderGenerator, PlaceholderItem, PlaceholderMode,
};
pub use position::{
    SlotPosition, calculate_item_positions, is_load_threshold_reached, layout_extent,
    offset_at, offset_for_index, slot_height,
};
pub use render::{RenderPass, RenderedRow, RenderingManager, RowRenderer};
pub use store::{
    ListManagerState, ListSource, LoadTicket, accept_load, begin_load, begin_page_load,
    create_initial_state, create_load_params, mark_loading, recompute_total_height,
    record_item_height, record_item_heights, reset_state, scroll_height, update_state_after_load,
    update_state_after_page_load, update_visible_range,
};
pub use types::{
    Align, ItemPosition, ListItem, LoadParams, OffsetMode, Page, PageMeta, Slot, Viewport,
    VisibleRange,
};
pub use visibility::{
    RangeStrategy, calculate_visible_range, calculate_visible_range_with, extend_into_reserved,
    select_strategy,
};
