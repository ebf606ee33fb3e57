//! Pagination state and the pure functions that evolve it.
//!
//! Every transforming function takes the state by value and returns the next state. Item storage
//! sits behind an [`Arc`] and is copied on write, so cloning a state for a reader is cheap.

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use crate::key::Set;
use crate::position::offset_at;
use crate::{ItemHeights, ListItem, ListOptions, LoadError, LoadParams, PageMeta, VisibleRange};

/// Where the list's items come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListSource<T> {
    /// A fixed, fully known collection. Never paginated.
    Static(Vec<T>),
    /// Pages fetched on demand, starting from `initial_cursor`.
    Api { initial_cursor: Option<String> },
}

/// Proof that a load was started at a given epoch.
///
/// A reset bumps the epoch; results carrying an older ticket are rejected by [`accept_load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    epoch: u64,
}

impl LoadTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// The whole state of one windowed list.
pub struct ListManagerState<T> {
    items: Arc<Vec<Option<T>>>,
    heights: ItemHeights,
    visible_range: VisibleRange,
    total_height: u64,
    total_height_dirty: bool,
    cursor: Option<String>,
    initial_cursor: Option<String>,
    has_next: bool,
    loading: bool,
    use_static: bool,
    item_count: usize,
    epoch: u64,
}

// Manual impl: cloning shares the item storage and needs no `T: Clone`.
impl<T> Clone for ListManagerState<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            heights: self.heights.clone(),
            visible_range: self.visible_range,
            total_height: self.total_height,
            total_height_dirty: self.total_height_dirty,
            cursor: self.cursor.clone(),
            initial_cursor: self.initial_cursor.clone(),
            has_next: self.has_next,
            loading: self.loading,
            use_static: self.use_static,
            item_count: self.item_count,
            epoch: self.epoch,
        }
    }
}

/// An empty static list with a zero default height. Mostly useful with [`core::mem::take`].
impl<T> Default for ListManagerState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            heights: ItemHeights::new(0),
            visible_range: VisibleRange::EMPTY,
            total_height: 0,
            total_height_dirty: false,
            cursor: None,
            initial_cursor: None,
            has_next: false,
            loading: false,
            use_static: true,
            item_count: 0,
            epoch: 0,
        }
    }
}

impl<T> core::fmt::Debug for ListManagerState<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListManagerState")
            .field("len", &self.items.len())
            .field("item_count", &self.item_count)
            .field("visible_range", &self.visible_range)
            .field("total_height", &self.total_height)
            .field("total_height_dirty", &self.total_height_dirty)
            .field("cursor", &self.cursor)
            .field("has_next", &self.has_next)
            .field("loading", &self.loading)
            .field("use_static", &self.use_static)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl<T> ListManagerState<T> {
    /// Loaded slots. `None` marks a hole left by a jump-to-page load.
    pub fn items(&self) -> &[Option<T>] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total slot count, including reserved slots that have not loaded yet.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// `item_count`, never less than the number of loaded slots.
    pub fn slot_count(&self) -> usize {
        self.item_count.max(self.items.len())
    }

    pub fn heights(&self) -> &ItemHeights {
        &self.heights
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.visible_range
    }

    /// Total height from the last [`recompute_total_height`]. Check [`Self::is_total_height_dirty`].
    pub fn total_height(&self) -> u64 {
        self.total_height
    }

    pub fn is_total_height_dirty(&self) -> bool {
        self.total_height_dirty
    }

    /// Whether the cumulative-offset table matches the current items and heights.
    pub fn has_cached_offsets(&self) -> bool {
        !self.total_height_dirty && self.heights.has_cached_offsets()
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_static(&self) -> bool {
        self.use_static
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn mark_dirty(&mut self) {
        self.total_height_dirty = true;
        self.heights.invalidate_offsets();
        self.visible_range = self.visible_range.clamped(self.items.len());
    }

    fn reserved_count(&self, has_next: bool, total: Option<usize>) -> usize {
        let len = self.items.len();
        match total {
            Some(total) => total.max(len),
            None => len + has_next as usize,
        }
    }
}

pub fn create_initial_state<T>(options: &ListOptions, source: ListSource<T>) -> ListManagerState<T> {
    let (items, use_static, has_next, cursor) = match source {
        ListSource::Static(items) => (items.into_iter().map(Some).collect::<Vec<_>>(), true, false, None),
        ListSource::Api { initial_cursor } => (Vec::new(), false, true, initial_cursor),
    };
    let item_count = items.len() + has_next as usize;
    vdebug!(len = items.len(), use_static, "create_initial_state");
    ListManagerState {
        items: Arc::new(items),
        heights: ItemHeights::new(options.default_item_height),
        visible_range: VisibleRange::EMPTY,
        total_height: 0,
        total_height_dirty: true,
        initial_cursor: cursor.clone(),
        cursor,
        has_next,
        loading: false,
        use_static,
        item_count,
        epoch: 0,
    }
}

/// Ids present in `items`, skipping the slots in `skip`.
fn known_ids<'a, T: ListItem>(items: &'a [Option<T>], skip: Range<usize>) -> Set<&'a str> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .filter_map(|(_, slot)| slot.as_ref().map(ListItem::id))
        .collect()
}

/// Drops items whose id is already known or repeats within `incoming`.
fn dedupe_against<T: ListItem>(known: Set<&str>, incoming: Vec<T>) -> Vec<T> {
    let mut seen: Set<String> = Set::new();
    incoming
        .into_iter()
        .filter(|item| !known.contains(item.id()) && seen.insert(item.id().to_string()))
        .collect()
}

/// Appends one cursor page.
///
/// With `dedupe`, items whose id already exists (or repeats within the page) are dropped.
pub fn update_state_after_load<T: ListItem + Clone>(
    mut state: ListManagerState<T>,
    new_items: Vec<T>,
    meta: PageMeta,
    dedupe: bool,
) -> ListManagerState<T> {
    vtrace!(received = new_items.len(), dedupe, "update_state_after_load");
    let kept = if dedupe {
        dedupe_against(known_ids(&state.items, 0..0), new_items)
    } else {
        new_items
    };
    vdebug!(kept = kept.len(), "update_state_after_load");

    Arc::make_mut(&mut state.items).extend(kept.into_iter().map(Some));
    state.has_next = meta.has_next.unwrap_or(meta.cursor.is_some());
    state.cursor = meta.cursor;
    state.item_count = state.reserved_count(state.has_next, meta.total);
    state.loading = false;
    state.mark_dirty();
    state
}

/// Merges a numbered page at slot `(page - 1) * page_size`, padding any gap with holes.
///
/// Item `i` of the page always lands in slot `start + i`. With `dedupe`, an item whose id
/// already exists outside the page (or earlier in the page) is dropped and its slot is left as
/// it was.
///
/// Pages are 1-based; page 0 is treated as page 1. Only a page that reaches the end of the
/// loaded slots moves the tail: it sets `has_next` and the cursor (the next page number while
/// more pages are expected, unless `meta` carries one). A page that fills earlier holes leaves
/// them alone.
pub fn update_state_after_page_load<T: ListItem + Clone>(
    mut state: ListManagerState<T>,
    page: u64,
    page_size: usize,
    new_items: Vec<T>,
    meta: PageMeta,
    dedupe: bool,
) -> ListManagerState<T> {
    let page = page.max(1);
    let start = ((page - 1) as usize).saturating_mul(page_size);
    let end = start.saturating_add(new_items.len());
    let full_page = new_items.len() >= page_size;
    let extends_tail = end >= state.items.len();
    let keep: Vec<bool> = if dedupe {
        let known = known_ids(&state.items, start..end);
        let mut seen: Set<&str> = Set::new();
        new_items
            .iter()
            .map(|item| !known.contains(item.id()) && seen.insert(item.id()))
            .collect()
    } else {
        vec![true; new_items.len()]
    };
    vdebug!(
        page,
        start,
        kept = keep.iter().filter(|k| **k).count(),
        extends_tail,
        "update_state_after_page_load"
    );

    let items = Arc::make_mut(&mut state.items);
    if items.len() < end {
        items.resize_with(end, || None);
    }
    for ((slot, item), keep) in items[start..end].iter_mut().zip(new_items).zip(keep) {
        if keep {
            *slot = Some(item);
        }
    }

    if extends_tail {
        state.has_next = meta.has_next.unwrap_or(full_page);
        state.cursor = meta
            .cursor
            .or_else(|| state.has_next.then(|| (page + 1).to_string()));
    }
    state.item_count = state.reserved_count(state.has_next, meta.total);
    state.loading = false;
    state.mark_dirty();
    state
}

/// Starts over with `initial_items`.
///
/// Keeps the static flag and the default height; measured heights survive only for static
/// lists. Bumps the epoch so in-flight loads become stale.
pub fn reset_state<T>(mut state: ListManagerState<T>, initial_items: Vec<T>) -> ListManagerState<T> {
    state.items = Arc::new(initial_items.into_iter().map(Some).collect());
    if !state.use_static {
        state.heights.clear();
    }
    state.visible_range = VisibleRange::EMPTY;
    state.total_height = 0;
    state.cursor = state.initial_cursor.clone();
    state.has_next = !state.use_static;
    state.loading = false;
    state.item_count = state.items.len() + state.has_next as usize;
    state.epoch = state.epoch.wrapping_add(1);
    vdebug!(epoch = state.epoch, len = state.items.len(), "reset_state");
    state.mark_dirty();
    state
}

/// Parameters for fetching the next page. Integer cursors are also exposed as `page`.
pub fn create_load_params<T>(state: &ListManagerState<T>, limit: usize) -> LoadParams {
    LoadParams {
        cursor: state.cursor.clone(),
        page: state.cursor.as_deref().and_then(|c| c.trim().parse().ok()),
        limit,
    }
}

/// Checks that a load may start now and issues a ticket for it.
///
/// Requests are rejected, never queued. Pair with [`mark_loading`].
pub fn begin_load<T>(state: &ListManagerState<T>) -> Result<LoadTicket, LoadError> {
    if state.use_static {
        return Err(LoadError::StaticList);
    }
    if state.loading {
        return Err(LoadError::AlreadyLoading);
    }
    if !state.has_next {
        return Err(LoadError::Exhausted);
    }
    Ok(LoadTicket { epoch: state.epoch })
}

/// Like [`begin_load`], for a jump to a numbered page.
///
/// Earlier holes stay reachable after the last page has arrived, so `has_next` is not checked.
pub fn begin_page_load<T>(state: &ListManagerState<T>) -> Result<LoadTicket, LoadError> {
    if state.use_static {
        return Err(LoadError::StaticList);
    }
    if state.loading {
        return Err(LoadError::AlreadyLoading);
    }
    Ok(LoadTicket { epoch: state.epoch })
}

pub fn mark_loading<T>(mut state: ListManagerState<T>, loading: bool) -> ListManagerState<T> {
    state.loading = loading;
    state
}

/// Rejects a result whose ticket predates the last reset.
pub fn accept_load<T>(state: &ListManagerState<T>, ticket: &LoadTicket) -> Result<(), LoadError> {
    if ticket.epoch != state.epoch {
        vdebug!(
            request_epoch = ticket.epoch,
            current_epoch = state.epoch,
            "dropping stale load"
        );
        return Err(LoadError::Stale {
            request_epoch: ticket.epoch,
            current_epoch: state.epoch,
        });
    }
    Ok(())
}

pub fn record_item_height<T>(mut state: ListManagerState<T>, id: &str, height: u32) -> ListManagerState<T> {
    if state.heights.set_height(id, height) {
        vtrace!(id, height, "record_item_height");
        state.mark_dirty();
    }
    state
}

pub fn record_item_heights<T, I, S>(mut state: ListManagerState<T>, measurements: I) -> ListManagerState<T>
where
    I: IntoIterator<Item = (S, u32)>,
    S: AsRef<str>,
{
    let mut changed = false;
    for (id, height) in measurements {
        changed |= state.heights.set_height(id.as_ref(), height);
    }
    if changed {
        state.mark_dirty();
    }
    state
}

/// Recomputes the loaded height, rebuilds the offset table, and clears the dirty flag.
pub fn recompute_total_height<T: ListItem>(mut state: ListManagerState<T>) -> ListManagerState<T> {
    if !state.total_height_dirty {
        return state;
    }
    state.total_height = state.heights.rebuild_offsets(&state.items);
    state.total_height_dirty = false;
    state
}

pub fn update_visible_range<T>(mut state: ListManagerState<T>, range: VisibleRange) -> ListManagerState<T> {
    state.visible_range = range.clamped(state.items.len());
    state
}

/// Scrollable height: loaded slots plus a default-height row for every reserved slot.
pub fn scroll_height<T: ListItem>(state: &ListManagerState<T>) -> u64 {
    offset_at(&state.items, &state.heights, state.slot_count())
}
