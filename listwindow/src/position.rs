//! Visible range -> pixel offsets.

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::{Align, ItemHeights, ListItem, OffsetMode, PositionError, Viewport, VisibleRange};

/// Offset and height of one visible slot, before the slot is paired with its item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotPosition {
    pub index: usize,
    pub offset: u64,
    pub height: u32,
}

impl SlotPosition {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.height as u64)
    }
}

/// Computes offsets for every slot in `range`.
///
/// `slot_count` may exceed `items.len()`: slots past the loaded items are reserved rows laid out
/// at the default height.
///
/// In [`OffsetMode::Virtual`] the offset is derived from the item id (`(id - 1) * h`), with
/// unloaded slots using `index + 1`. That mode requires the fixed-height fast path to apply to
/// the loaded items (more than `fixed_height_above` of them, one distinct height).
pub fn calculate_item_positions<T: ListItem>(
    items: &[Option<T>],
    slot_count: usize,
    range: VisibleRange,
    heights: &ItemHeights,
    mode: OffsetMode,
    fixed_height_above: usize,
) -> Result<Vec<SlotPosition>, PositionError> {
    let range = range.clamped(slot_count.max(items.len()));
    let mut out = Vec::with_capacity(range.len());
    match mode {
        OffsetMode::Cumulative => {
            let mut offset = offset_at(items, heights, range.start);
            for index in range.start..range.end {
                let height = slot_height(items, heights, index);
                out.push(SlotPosition {
                    index,
                    offset,
                    height,
                });
                offset = offset.saturating_add(height as u64);
            }
        }
        OffsetMode::Virtual => {
            let height = virtual_height(items.len(), heights, fixed_height_above)?;
            for index in range.start..range.end {
                let id = match items.get(index) {
                    Some(Some(item)) => parse_id(item.id()).ok_or_else(|| {
                        vwarn!(index, id = item.id(), "non-numeric id in virtual offset mode");
                        PositionError::NonNumericId {
                            index,
                            id: item.id().to_string(),
                        }
                    })?,
                    _ => index as u64 + 1,
                };
                out.push(SlotPosition {
                    index,
                    offset: id.saturating_sub(1).saturating_mul(height as u64),
                    height,
                });
            }
        }
    }
    Ok(out)
}

fn virtual_height(
    len: usize,
    heights: &ItemHeights,
    fixed_height_above: usize,
) -> Result<u32, PositionError> {
    match heights.fixed_height() {
        Some(h) if heights.uses_fixed_height(len, fixed_height_above) => Ok(h),
        _ => Err(PositionError::VirtualOffsetUnavailable {
            len,
            distinct: heights.distinct_heights(),
            threshold: fixed_height_above,
        }),
    }
}

fn parse_id(id: &str) -> Option<u64> {
    id.trim().parse::<u64>().ok()
}

/// Layout height of slot `index`: loaded slots use the cache (holes are zero), reserved slots
/// past the loaded items use the default height.
pub fn slot_height<T: ListItem>(items: &[Option<T>], heights: &ItemHeights, index: usize) -> u32 {
    match items.get(index) {
        Some(slot) => heights.scan_height(slot.as_ref()),
        None => heights.default_height(),
    }
}

/// Cumulative offset of slot `index`.
///
/// Uses the cached offset table when it covers exactly `items`; otherwise sums from slot 0.
/// Indices past the loaded items continue at the default height.
pub fn offset_at<T: ListItem>(items: &[Option<T>], heights: &ItemHeights, index: usize) -> u64 {
    let len = items.len();
    let loaded = index.min(len);
    let base = if heights.cached_offsets_len() == Some(len) {
        heights.offset_at_index(loaded).unwrap_or(0)
    } else {
        items[..loaded]
            .iter()
            .map(|s| heights.scan_height(s.as_ref()) as u64)
            .sum()
    };
    let reserved = (index - loaded) as u64;
    base.saturating_add(reserved.saturating_mul(heights.default_height() as u64))
}

/// Height of the first `slot_count` slots as laid out in `mode`.
pub fn layout_extent<T: ListItem>(
    items: &[Option<T>],
    slot_count: usize,
    heights: &ItemHeights,
    mode: OffsetMode,
) -> u64 {
    match (mode, heights.fixed_height()) {
        (OffsetMode::Virtual, Some(h)) => (slot_count as u64).saturating_mul(h as u64),
        _ => offset_at(items, heights, slot_count),
    }
}

/// Whether the viewport bottom has passed `threshold` of the total height.
///
/// Returns `false` when either height is zero.
pub fn is_load_threshold_reached(
    scroll_offset: u64,
    container_height: u32,
    total_height: u64,
    threshold: f64,
) -> bool {
    if container_height == 0 || total_height == 0 {
        return false;
    }
    let bottom = scroll_offset.saturating_add(container_height as u64);
    bottom as f64 / total_height as f64 > threshold
}

/// Scroll offset that brings slot `index` into view with the given alignment, clamped to the
/// scrollable extent of the loaded items.
pub fn offset_for_index<T: ListItem>(
    items: &[Option<T>],
    heights: &ItemHeights,
    index: usize,
    align: Align,
    viewport: Viewport,
) -> u64 {
    let len = items.len();
    if len == 0 {
        return 0;
    }
    let index = index.min(len - 1);
    let start = offset_at(items, heights, index);
    let size = slot_height(items, heights, index) as u64;
    let end = start.saturating_add(size);
    let view = viewport.container_height as u64;

    let target = match align {
        Align::Start => start,
        Align::End => end.saturating_sub(view),
        Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
        Align::Auto => {
            let cur = viewport.scroll_offset;
            if start >= cur && end <= viewport.end() {
                cur
            } else if start < cur {
                start
            } else {
                end.saturating_sub(view)
            }
        }
    };

    let max = offset_at(items, heights, len).saturating_sub(view);
    target.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Row, rows, uniform_heights};
    use alloc::vec;

    #[test]
    fn cumulative_offsets_accumulate_heights() {
        let items = rows(5);
        let mut h = ItemHeights::new(10);
        h.set_height("2", 30);
        let pos = calculate_item_positions(
            &items,
            items.len(),
            VisibleRange::new(1, 4),
            &h,
            OffsetMode::Cumulative,
            20,
        )
        .unwrap();
        let got: Vec<(usize, u64, u32)> = pos.iter().map(|p| (p.index, p.offset, p.height)).collect();
        assert_eq!(got, vec![(1, 10, 30), (2, 40, 10), (3, 50, 10)]);
    }

    #[test]
    fn cumulative_offsets_use_cached_table() {
        let items = rows(50);
        let mut h = ItemHeights::new(10);
        h.set_height("1", 25);
        let before = calculate_item_positions(
            &items,
            50,
            VisibleRange::new(30, 35),
            &h,
            OffsetMode::Cumulative,
            20,
        )
        .unwrap();
        h.rebuild_offsets(&items);
        let after = calculate_item_positions(
            &items,
            50,
            VisibleRange::new(30, 35),
            &h,
            OffsetMode::Cumulative,
            20,
        )
        .unwrap();
        assert_eq!(before, after);
        assert_eq!(after[0].offset, 25 + 29 * 10);
    }

    #[test]
    fn reserved_slots_continue_at_default_height() {
        let items = rows(3);
        let h = ItemHeights::new(10);
        let pos = calculate_item_positions(
            &items,
            5,
            VisibleRange::new(2, 5),
            &h,
            OffsetMode::Cumulative,
            20,
        )
        .unwrap();
        let offsets: Vec<u64> = pos.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![20, 30, 40]);
    }

    #[test]
    fn virtual_offsets_follow_ids_and_fill_holes() {
        let mut items = rows(100);
        items[60] = None;
        let h = uniform_heights(48);
        let pos = calculate_item_positions(
            &items,
            100,
            VisibleRange::new(58, 62),
            &h,
            OffsetMode::Virtual,
            20,
        )
        .unwrap();
        let offsets: Vec<u64> = pos.iter().map(|p| p.offset).collect();
        assert_eq!(offsets, vec![58 * 48, 59 * 48, 60 * 48, 61 * 48]);
    }

    #[test]
    fn virtual_offsets_require_the_fixed_height_path() {
        let items = rows(100);
        let mut h = ItemHeights::new(48);
        h.set_height("1", 50);
        h.set_height("2", 60);
        let err = calculate_item_positions(
            &items,
            100,
            VisibleRange::new(0, 5),
            &h,
            OffsetMode::Virtual,
            20,
        )
        .unwrap_err();
        assert!(matches!(err, PositionError::VirtualOffsetUnavailable { distinct: 2, .. }));

        let small = rows(10);
        let err = calculate_item_positions(
            &small,
            10,
            VisibleRange::new(0, 5),
            &uniform_heights(48),
            OffsetMode::Virtual,
            20,
        )
        .unwrap_err();
        assert!(matches!(err, PositionError::VirtualOffsetUnavailable { len: 10, .. }));
    }

    #[test]
    fn virtual_offsets_reject_non_numeric_ids() {
        let mut items = rows(30);
        items[3] = Some(Row::new("abc"));
        let err = calculate_item_positions(
            &items,
            30,
            VisibleRange::new(0, 5),
            &uniform_heights(10),
            OffsetMode::Virtual,
            20,
        )
        .unwrap_err();
        assert_eq!(
            err,
            PositionError::NonNumericId {
                index: 3,
                id: "abc".into()
            }
        );
    }

    #[test]
    fn load_threshold_guards_zero_heights() {
        assert!(!is_load_threshold_reached(0, 0, 1000, 0.8));
        assert!(!is_load_threshold_reached(500, 200, 0, 0.8));
        assert!(is_load_threshold_reached(850, 200, 1000, 0.8));
        assert!(!is_load_threshold_reached(500, 200, 1000, 0.8));
        // Strictly greater than the fraction.
        assert!(!is_load_threshold_reached(600, 200, 1000, 0.8));
    }

    #[test]
    fn offset_for_index_aligns_and_clamps() {
        let items = rows(100);
        let h = uniform_heights(10);
        let vp = Viewport::new(200, 50);
        assert_eq!(offset_for_index(&items, &h, 40, Align::Start, vp), 400);
        assert_eq!(offset_for_index(&items, &h, 40, Align::End, vp), 360);
        assert_eq!(offset_for_index(&items, &h, 40, Align::Center, vp), 380);
        // Fully visible: keep the current offset.
        assert_eq!(offset_for_index(&items, &h, 22, Align::Auto, vp), 200);
        assert_eq!(offset_for_index(&items, &h, 10, Align::Auto, vp), 100);
        assert_eq!(offset_for_index(&items, &h, 99, Align::Start, vp), 950);
    }
}
