use alloc::vec::Vec;

use crate::position::{calculate_item_positions, is_load_threshold_reached, layout_extent};
use crate::store::{ListManagerState, scroll_height};
use crate::visibility::{calculate_visible_range_with, extend_into_reserved, select_strategy};
use crate::{
    ItemPosition, ListItem, ListOptions, OffsetMode, PlaceholderGenerator, PlaceholderMode,
    PositionError, RangeStrategy, Slot, Viewport, VisibleRange, WindowOptions,
};

/// The external row renderer.
///
/// The engine never inspects a handle beyond returning it alongside the row's position.
pub trait RowRenderer<T> {
    type Handle;

    /// Called exactly once per visible slot, real or placeholder.
    fn render_item(&mut self, item: &Slot<'_, T>, index: usize) -> Self::Handle;

    /// Called right after [`RowRenderer::render_item`] for every row. Visual treatment only.
    fn apply_placeholder_styling(&mut self, item: &Slot<'_, T>, handle: &mut Self::Handle) {
        let _ = (item, handle);
    }
}

/// Output of one layout pass.
#[derive(Clone, Debug)]
pub struct RenderPass<'a, T> {
    pub strategy: RangeStrategy,
    /// Rendered slots, including any reserved tail.
    pub range: VisibleRange,
    pub rows: Vec<ItemPosition<'a, T>>,
    /// Full scrollable height in the pass's offset mode.
    pub scroll_height: u64,
}

impl<T: ListItem> RenderPass<'_, T> {
    pub fn placeholder_count(&self) -> usize {
        self.rows.iter().filter(|r| r.item.is_placeholder()).count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRow<H> {
    pub index: usize,
    pub offset: u64,
    pub height: u32,
    pub is_placeholder: bool,
    pub handle: H,
}

/// Turns list state and scroll metrics into positioned rows.
///
/// Holes and reserved slots are filled from the owned [`PlaceholderGenerator`]; the renderer is
/// never handed a missing slot.
#[derive(Clone, Debug)]
pub struct RenderingManager {
    window: WindowOptions,
    load_threshold: f64,
    placeholders: PlaceholderGenerator,
}

impl RenderingManager {
    pub fn new(options: &ListOptions) -> Self {
        Self {
            window: options.window,
            load_threshold: options.load_threshold,
            placeholders: PlaceholderGenerator::new(options.placeholders),
        }
    }

    pub fn window(&self) -> &WindowOptions {
        &self.window
    }

    pub fn placeholders(&self) -> &PlaceholderGenerator {
        &self.placeholders
    }

    pub fn set_placeholder_mode(&mut self, mode: PlaceholderMode) -> bool {
        self.placeholders.set_mode(mode)
    }

    pub fn set_placeholder_opacity(&mut self, opacity: f32) -> bool {
        self.placeholders.set_opacity(opacity)
    }

    /// Drops learned placeholder content, e.g. after the list was reset.
    pub fn reset_placeholders(&mut self) {
        self.placeholders.reset();
    }

    pub fn layout<'a, T: ListItem>(
        &mut self,
        state: &'a ListManagerState<T>,
        viewport: Viewport,
        mode: OffsetMode,
    ) -> Result<RenderPass<'a, T>, PositionError> {
        let items = state.items();
        let heights = state.heights();
        let slot_count = state.slot_count();

        let strategy = select_strategy(items.len(), heights, &self.window.thresholds);
        let range = calculate_visible_range_with(items, heights, viewport, &self.window, strategy);
        let loaded_height = layout_extent(items, items.len(), heights, mode);
        let range = extend_into_reserved(
            range,
            items.len(),
            slot_count,
            loaded_height,
            viewport,
            &self.window,
            heights.default_height(),
        );

        let positions = calculate_item_positions(
            items,
            slot_count,
            range,
            heights,
            mode,
            self.window.thresholds.fixed_height_above,
        )?;

        self.placeholders.release_loaded(items);
        let rows: Vec<ItemPosition<'a, T>> = positions
            .into_iter()
            .map(|p| {
                let item = match items.get(p.index) {
                    Some(Some(item)) => Slot::Real(item),
                    _ => Slot::Placeholder(self.placeholders.generate(p.index, items)),
                };
                ItemPosition {
                    index: p.index,
                    item,
                    offset: p.offset,
                    height: p.height,
                }
            })
            .collect();

        vtrace!(
            ?strategy,
            start = range.start,
            end = range.end,
            rows = rows.len(),
            "layout"
        );

        Ok(RenderPass {
            strategy,
            range,
            rows,
            scroll_height: layout_extent(items, slot_count, heights, mode),
        })
    }

    /// Lays out the viewport and hands every row to `renderer`, in index order.
    pub fn render<T: ListItem, R: RowRenderer<T>>(
        &mut self,
        state: &ListManagerState<T>,
        viewport: Viewport,
        mode: OffsetMode,
        renderer: &mut R,
    ) -> Result<Vec<RenderedRow<R::Handle>>, PositionError> {
        let pass = self.layout(state, viewport, mode)?;
        Ok(pass
            .rows
            .into_iter()
            .map(|row| {
                let mut handle = renderer.render_item(&row.item, row.index);
                renderer.apply_placeholder_styling(&row.item, &mut handle);
                RenderedRow {
                    index: row.index,
                    offset: row.offset,
                    height: row.height,
                    is_placeholder: row.item.is_placeholder(),
                    handle,
                }
            })
            .collect())
    }

    /// Whether the viewport bottom has crossed the load threshold of the scrollable height.
    pub fn should_load_more<T: ListItem>(&self, state: &ListManagerState<T>, viewport: Viewport) -> bool {
        is_load_threshold_reached(
            viewport.scroll_offset,
            viewport.container_height,
            scroll_height(state),
            self.load_threshold,
        )
    }
}
