use alloc::string::{String, ToString};

use crate::ListItem;
use crate::fenwick::Fenwick;
use crate::key::Map;

/// Per-item height cache.
///
/// Heights are keyed by item id so they follow items across reloads. Unmeasured items use the
/// default height. A histogram of measured values makes the "all heights equal" check O(1),
/// which is what lets the fixed-height fast path switch on by itself once measurements converge.
///
/// An optional cumulative-offset table (a Fenwick tree over per-slot heights) accelerates
/// offset -> index lookups. It is built by [`ItemHeights::rebuild_offsets`] and reflects the
/// slots it was built from; callers decide when it is stale.
#[derive(Clone, Debug)]
pub struct ItemHeights {
    default_height: u32,
    by_id: Map<String, u32>,
    histogram: Map<u32, usize>,
    measured_sum: u64,
    offsets: Option<Fenwick>,
}

impl ItemHeights {
    pub fn new(default_height: u32) -> Self {
        Self {
            default_height,
            by_id: Map::new(),
            histogram: Map::new(),
            measured_sum: 0,
            offsets: None,
        }
    }

    pub fn default_height(&self) -> u32 {
        self.default_height
    }

    /// Height of a real item: measured if known, else the default.
    pub fn height_of<T: ListItem>(&self, item: &T) -> u32 {
        self.height_of_id(item.id())
    }

    pub fn height_of_id(&self, id: &str) -> u32 {
        self.by_id.get(id).copied().unwrap_or(self.default_height)
    }

    /// Layout height of a slot. Holes count as zero so sparse pages never raise.
    pub fn scan_height<T: ListItem>(&self, slot: Option<&T>) -> u32 {
        slot.map_or(0, |item| self.height_of(item))
    }

    pub fn is_measured(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterates over every measured `(id, height)` pair.
    pub fn all_heights(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.by_id.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Records a measurement. Returns `true` when the stored height changed.
    pub fn set_height(&mut self, id: &str, height: u32) -> bool {
        let prev = self.by_id.insert(id.to_string(), height);
        if prev == Some(height) {
            return false;
        }
        if let Some(prev) = prev {
            self.forget_value(prev);
        }
        *self.histogram.entry(height).or_insert(0) += 1;
        self.measured_sum = self.measured_sum.saturating_add(height as u64);
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<u32> {
        let prev = self.by_id.remove(id)?;
        self.forget_value(prev);
        Some(prev)
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.histogram.clear();
        self.measured_sum = 0;
        self.offsets = None;
    }

    fn forget_value(&mut self, height: u32) {
        if let Some(n) = self.histogram.get_mut(&height) {
            *n -= 1;
            if *n == 0 {
                self.histogram.remove(&height);
            }
        }
        self.measured_sum = self.measured_sum.saturating_sub(height as u64);
    }

    /// Number of distinct measured heights.
    pub fn distinct_heights(&self) -> usize {
        self.histogram.len()
    }

    /// The uniform row height, if there is one.
    ///
    /// With no measurements every item uses the default height. With exactly one distinct
    /// measured value, that value is the uniform height.
    pub fn fixed_height(&self) -> Option<u32> {
        match self.histogram.len() {
            0 => Some(self.default_height),
            1 => self.histogram.keys().next().copied(),
            _ => None,
        }
    }

    /// Whether a list of `len` items qualifies for the fixed-height fast path.
    pub fn uses_fixed_height(&self, len: usize, above: usize) -> bool {
        len > above && matches!(self.fixed_height(), Some(h) if h > 0)
    }

    /// Average of the measured heights, or the default when nothing is measured.
    pub fn average_height(&self) -> u32 {
        let n = self.by_id.len() as u64;
        if n == 0 {
            return self.default_height;
        }
        (self.measured_sum / n) as u32
    }

    /// Rebuilds the cumulative-offset table from the given slots (holes count as zero).
    pub fn rebuild_offsets<T: ListItem>(&mut self, slots: &[Option<T>]) -> u64 {
        let table = Fenwick::from_heights(slots.iter().map(|s| self.scan_height(s.as_ref())));
        let total = table.total();
        vtrace!(slots = slots.len(), total, "rebuild_offsets");
        self.offsets = Some(table);
        total
    }

    pub fn invalidate_offsets(&mut self) {
        self.offsets = None;
    }

    pub fn has_cached_offsets(&self) -> bool {
        self.offsets.is_some()
    }

    /// Number of slots covered by the offset table, if built.
    pub fn cached_offsets_len(&self) -> Option<usize> {
        self.offsets.as_ref().map(Fenwick::len)
    }

    /// Cumulative offset of slot `index` from the cached table.
    pub fn offset_at_index(&self, index: usize) -> Option<u64> {
        self.offsets.as_ref().map(|t| t.prefix_sum(index))
    }

    /// Slot containing `offset`, from the cached table.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        self.offsets.as_ref().map(|t| t.lower_bound(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    struct Row(&'static str);

    impl ListItem for Row {
        fn id(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn unmeasured_items_use_default_height() {
        let mut h = ItemHeights::new(48);
        assert_eq!(h.height_of(&Row("1")), 48);
        assert!(h.set_height("1", 60));
        assert_eq!(h.height_of(&Row("1")), 60);
        assert_eq!(h.height_of(&Row("2")), 48);
        assert!(!h.set_height("1", 60));
    }

    #[test]
    fn fixed_height_tracks_distinct_values() {
        let mut h = ItemHeights::new(48);
        assert_eq!(h.fixed_height(), Some(48));

        h.set_height("1", 50);
        h.set_height("2", 50);
        assert_eq!(h.fixed_height(), Some(50));
        assert_eq!(h.distinct_heights(), 1);

        h.set_height("3", 70);
        assert_eq!(h.fixed_height(), None);
        assert_eq!(h.distinct_heights(), 2);

        // Converging back to a single value re-enables the fast path.
        h.set_height("3", 50);
        assert_eq!(h.fixed_height(), Some(50));
        assert!(h.uses_fixed_height(21, 20));
        assert!(!h.uses_fixed_height(20, 20));
    }

    #[test]
    fn average_follows_measurements() {
        let mut h = ItemHeights::new(40);
        assert_eq!(h.average_height(), 40);
        h.set_height("a", 10);
        h.set_height("b", 30);
        assert_eq!(h.average_height(), 20);
        h.remove("a");
        assert_eq!(h.average_height(), 30);
    }

    #[test]
    fn offset_table_skips_holes() {
        let mut h = ItemHeights::new(10);
        let slots: Vec<Option<Row>> = vec![Some(Row("1")), None, Some(Row("3"))];
        h.set_height("3", 25);
        assert!(!h.has_cached_offsets());
        assert_eq!(h.rebuild_offsets(&slots), 35);
        assert_eq!(h.offset_at_index(1), Some(10));
        assert_eq!(h.offset_at_index(2), Some(10));
        assert_eq!(h.index_at_offset(12), Some(2));
        assert_eq!(h.cached_offsets_len(), Some(3));
    }
}
