//! Scroll offset -> visible slot window.

use crate::position::offset_at;
use crate::{ItemHeights, ListItem, StrategyThresholds, Viewport, VisibleRange, WindowOptions};

/// The algorithm used for one range computation. See [`StrategyThresholds`] for the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeStrategy {
    Empty,
    WholeList,
    /// O(1) arithmetic over a uniform row height.
    FixedHeight(u32),
    /// Offset-table lower bound, or average-height estimate refined by stepping (O(n) while
    /// the table is stale).
    Search,
    /// O(n) accumulation from slot 0.
    Linear,
}

pub fn select_strategy(
    len: usize,
    heights: &ItemHeights,
    thresholds: &StrategyThresholds,
) -> RangeStrategy {
    if len == 0 {
        return RangeStrategy::Empty;
    }
    if len < thresholds.whole_list_below {
        return RangeStrategy::WholeList;
    }
    if heights.uses_fixed_height(len, thresholds.fixed_height_above) {
        if let Some(h) = heights.fixed_height() {
            return RangeStrategy::FixedHeight(h);
        }
    }
    if len > thresholds.search_above {
        return RangeStrategy::Search;
    }
    RangeStrategy::Linear
}

/// Computes the `[start, end)` window covering the viewport plus buffer and overscan rows.
///
/// The result always satisfies `0 <= start <= end <= items.len()`. Holes (`None`) count as
/// zero height.
pub fn calculate_visible_range<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    viewport: Viewport,
    options: &WindowOptions,
) -> VisibleRange {
    let strategy = select_strategy(items.len(), heights, &options.thresholds);
    let range = calculate_visible_range_with(items, heights, viewport, options, strategy);
    vtrace!(
        ?strategy,
        scroll_offset = viewport.scroll_offset,
        container_height = viewport.container_height,
        start = range.start,
        end = range.end,
        "calculate_visible_range"
    );
    range
}

/// Same as [`calculate_visible_range`], with an explicit strategy.
///
/// `FixedHeight(h)` is honored as given, so callers can compare strategies on the same input.
pub fn calculate_visible_range_with<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    viewport: Viewport,
    options: &WindowOptions,
    strategy: RangeStrategy,
) -> VisibleRange {
    let len = items.len();
    let margin = options.margin_rows();
    let (first, last) = match strategy {
        RangeStrategy::Empty => return VisibleRange::EMPTY,
        RangeStrategy::WholeList => return VisibleRange::new(0, len),
        RangeStrategy::FixedHeight(h) => fixed_window(h, viewport),
        RangeStrategy::Search => {
            let (start, offset) = search_start(items, heights, viewport.scroll_offset);
            (start, extend_to(items, heights, start, offset, viewport.end()))
        }
        RangeStrategy::Linear => {
            let (start, offset) = step_forward(items, heights, 0, 0, viewport.scroll_offset);
            (start, extend_to(items, heights, start, offset, viewport.end()))
        }
    };

    VisibleRange::new(first.saturating_sub(margin), last.saturating_add(margin)).clamped(len)
}

fn fixed_window(height: u32, viewport: Viewport) -> (usize, usize) {
    let h = height.max(1) as u64;
    let first = (viewport.scroll_offset / h) as usize;
    let rows = (viewport.container_height as u64).div_ceil(h) as usize;
    (first, first.saturating_add(rows))
}

/// First slot at or under `scroll_offset`, with its offset.
///
/// O(log n) through the offset table when it covers `items`. Without the table the start is
/// guessed from the average height and refined by stepping, but the exact offset at the guess is
/// still a prefix sum from slot 0, so that path is O(n). Callers that search repeatedly should
/// keep the table built (see [`ItemHeights::rebuild_offsets`]).
fn search_start<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    scroll_offset: u64,
) -> (usize, u64) {
    let len = items.len();
    if heights.cached_offsets_len() == Some(len) {
        let index = heights.index_at_offset(scroll_offset).unwrap_or(0).min(len);
        let offset = heights.offset_at_index(index).unwrap_or(0);
        return (index, offset);
    }

    vtrace!(len, "search without offset table");
    let avg = heights.average_height().max(1) as u64;
    let mut index = ((scroll_offset / avg) as usize).min(len.saturating_sub(1));
    let mut offset = offset_at(items, heights, index);
    while index > 0 && offset > scroll_offset {
        index -= 1;
        offset = offset.saturating_sub(heights.scan_height(items[index].as_ref()) as u64);
    }
    step_forward(items, heights, index, offset, scroll_offset)
}

/// Advances from `(index, offset)` to the first slot whose bottom is past `scroll_offset`.
fn step_forward<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    mut index: usize,
    mut offset: u64,
    scroll_offset: u64,
) -> (usize, u64) {
    while let Some(slot) = items.get(index) {
        let bottom = offset.saturating_add(heights.scan_height(slot.as_ref()) as u64);
        if bottom > scroll_offset {
            break;
        }
        offset = bottom;
        index += 1;
    }
    (index, offset)
}

/// Returns the first slot at or after `start` that begins at or past `view_end`.
fn extend_to<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    start: usize,
    mut offset: u64,
    view_end: u64,
) -> usize {
    let mut end = start;
    while offset < view_end {
        let Some(slot) = items.get(end) else {
            break;
        };
        offset = offset.saturating_add(heights.scan_height(slot.as_ref()) as u64);
        end += 1;
    }
    end
}

/// Widens a window that reaches the end of the loaded slots into reserved slots.
///
/// Reserved slots are the ones counted by `item_count` but not yet loaded (the next-page
/// sentinel, or the remainder of a known `total`). They are laid out at the default height
/// after `loaded_height`, and the result covers the viewport plus margin rows, with at least one
/// reserved slot whenever any exist.
pub fn extend_into_reserved(
    range: VisibleRange,
    loaded_len: usize,
    reserved_len: usize,
    loaded_height: u64,
    viewport: Viewport,
    options: &WindowOptions,
    default_height: u32,
) -> VisibleRange {
    if reserved_len <= loaded_len || range.end < loaded_len {
        return range;
    }

    let h = default_height.max(1) as u64;
    let margin = options.margin_rows();
    let first_tail = (viewport.scroll_offset.saturating_sub(loaded_height) / h) as usize;
    let rows = (viewport.end().saturating_sub(loaded_height).div_ceil(h) as usize)
        .saturating_add(margin)
        .max(1);
    let end = loaded_len.saturating_add(rows).min(reserved_len);
    let start = if first_tail > margin {
        loaded_len.saturating_add(first_tail - margin).min(end)
    } else {
        range.start.min(end)
    };
    VisibleRange::new(start, end)
}
