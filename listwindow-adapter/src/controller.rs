use alloc::string::ToString;
use alloc::vec::Vec;

use listwindow::{
    Align, ListItem, ListManagerState, ListOptions, ListSource, LoadError, LoadParams, OffsetMode,
    Page, PlaceholderMode, PositionError, RenderPass, RenderedRow, RenderingManager, RowRenderer,
    Viewport, VisibleRange, accept_load, begin_load, begin_page_load, create_initial_state,
    create_load_params, layout_extent, mark_loading, offset_for_index, recompute_total_height,
    record_item_height, record_item_heights, reset_state, update_state_after_load,
    update_state_after_page_load, update_visible_range,
};

use crate::{FrameScheduler, LoadRequest, LoadTarget};

/// What one frame produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame<H> {
    /// Rendered slots, including any reserved tail.
    pub range: VisibleRange,
    pub rows: Vec<RenderedRow<H>>,
    pub scroll_height: u64,
    pub offset_mode: OffsetMode,
}

/// A framework-neutral driver around one list's state.
///
/// This type does not hold any UI objects or perform I/O. Adapters drive it by calling:
/// - `on_scroll` / `on_resize` / `on_measure` when UI events occur (these only record input);
/// - `on_frame(renderer)` once per frame boundary;
/// - `request_next_page` / `request_page`, then `complete_load` or `fail_load` with the result.
///
/// At most one load is in flight. Results issued before a [`ListController::refresh`] are
/// rejected as stale.
#[derive(Clone, Debug)]
pub struct ListController<T> {
    options: ListOptions,
    state: ListManagerState<T>,
    rendering: RenderingManager,
    viewport: Viewport,
    offset_mode: Option<OffsetMode>,
    sparse: bool,
    frames: FrameScheduler,
}

impl<T: ListItem + Clone> ListController<T> {
    pub fn new(options: ListOptions, source: ListSource<T>) -> Self {
        let state = create_initial_state(&options, source);
        let mut frames = FrameScheduler::new();
        frames.request();
        Self {
            rendering: RenderingManager::new(&options),
            options,
            state,
            viewport: Viewport::default(),
            offset_mode: None,
            sparse: false,
            frames,
        }
    }

    pub fn options(&self) -> &ListOptions {
        &self.options
    }

    pub fn state(&self) -> &ListManagerState<T> {
        &self.state
    }

    /// A copy of the current state for readers on other threads. Item storage is shared.
    pub fn snapshot(&self) -> ListManagerState<T> {
        self.state.clone()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn rendering(&self) -> &RenderingManager {
        &self.rendering
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    fn apply(&mut self, f: impl FnOnce(ListManagerState<T>) -> ListManagerState<T>) {
        let state = core::mem::take(&mut self.state);
        self.state = f(state);
    }

    pub fn request_frame(&mut self) -> bool {
        self.frames.request()
    }

    pub fn on_scroll(&mut self, scroll_offset: u64) {
        if self.viewport.scroll_offset != scroll_offset {
            self.viewport.scroll_offset = scroll_offset;
            self.frames.request();
        }
    }

    pub fn on_resize(&mut self, container_height: u32) {
        if self.viewport.container_height != container_height {
            self.viewport.container_height = container_height;
            self.frames.request();
        }
    }

    /// Records a measured row height.
    pub fn on_measure(&mut self, id: &str, height: u32) {
        let before = self.state.heights().height_of_id(id);
        let known = self.state.heights().is_measured(id);
        self.apply(|s| record_item_height(s, id, height));
        if !known || before != height {
            self.frames.request();
        }
    }

    pub fn on_measurements<I, S>(&mut self, measurements: I)
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        self.apply(|s| record_item_heights(s, measurements));
        if self.state.is_total_height_dirty() {
            self.frames.request();
        }
    }

    /// Forces an offset mode, or `None` to pick one per frame.
    ///
    /// The automatic choice is [`OffsetMode::Virtual`] once a page has been loaded out of order
    /// and every row shares one height, so holes keep their slots; otherwise
    /// [`OffsetMode::Cumulative`].
    pub fn set_offset_mode(&mut self, mode: Option<OffsetMode>) {
        if self.offset_mode != mode {
            self.offset_mode = mode;
            self.frames.request();
        }
    }

    pub fn offset_mode(&self) -> OffsetMode {
        if let Some(mode) = self.offset_mode {
            return mode;
        }
        let fixed_above = self.options.window.thresholds.fixed_height_above;
        if self.sparse && self.state.heights().uses_fixed_height(self.state.len(), fixed_above) {
            OffsetMode::Virtual
        } else {
            OffsetMode::Cumulative
        }
    }

    pub fn set_placeholder_mode(&mut self, mode: PlaceholderMode) {
        if self.rendering.set_placeholder_mode(mode) {
            self.frames.request();
        }
    }

    pub fn set_placeholder_opacity(&mut self, opacity: f32) {
        if self.rendering.set_placeholder_opacity(opacity) {
            self.frames.request();
        }
    }

    /// Recomputes and renders if a frame is pending; `Ok(None)` when nothing changed since the
    /// last frame.
    pub fn on_frame<R: RowRenderer<T>>(
        &mut self,
        renderer: &mut R,
    ) -> Result<Option<Frame<R::Handle>>, PositionError> {
        if !self.frames.take() {
            return Ok(None);
        }
        self.apply(recompute_total_height);

        let mode = self.offset_mode();
        let rows = match self.rendering.render(&self.state, self.viewport, mode, renderer) {
            Ok(rows) => rows,
            Err(err) => {
                // Keep the frame pending so it is retried once the cause is fixed.
                self.frames.request();
                vwarn!(error = %err, "frame failed");
                return Err(err);
            }
        };
        let range = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => VisibleRange::new(first.index, last.index + 1),
            _ => VisibleRange::EMPTY,
        };
        let scroll_height = layout_extent(
            self.state.items(),
            self.state.slot_count(),
            self.state.heights(),
            mode,
        );
        self.apply(|s| update_visible_range(s, range));
        vtrace!(
            start = range.start,
            end = range.end,
            rows = rows.len(),
            scroll_height,
            "frame"
        );

        Ok(Some(Frame {
            range,
            rows,
            scroll_height,
            offset_mode: mode,
        }))
    }

    /// Lays out the current viewport immediately, bypassing frame coalescing.
    pub fn layout(&mut self) -> Result<RenderPass<'_, T>, PositionError> {
        self.apply(recompute_total_height);
        let mode = self.offset_mode();
        self.rendering.layout(&self.state, self.viewport, mode)
    }

    /// Scrolls so that slot `index` is in view. Returns the new scroll offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = offset_for_index(
            self.state.items(),
            self.state.heights(),
            index,
            align,
            self.viewport,
        );
        self.on_scroll(offset);
        offset
    }

    /// Whether the viewport is near the end and another page may be requested.
    pub fn wants_more(&self) -> bool {
        !self.state.is_static()
            && !self.state.is_loading()
            && self.state.has_next()
            && self.rendering.should_load_more(&self.state, self.viewport)
    }

    /// Starts a cursor load for the next page. Rejected (not queued) while another load runs.
    pub fn request_next_page(&mut self) -> Result<LoadRequest, LoadError> {
        let ticket = begin_load(&self.state)?;
        let params = create_load_params(&self.state, self.options.page_size);
        self.apply(|s| mark_loading(s, true));
        vdebug!(epoch = ticket.epoch(), cursor = ?params.cursor, "request_next_page");
        Ok(LoadRequest {
            ticket,
            params,
            target: LoadTarget::Next,
        })
    }

    /// Starts a jump-to-page load. Pages are 1-based.
    ///
    /// Allowed after the last page has arrived, so holes before it can still be filled.
    pub fn request_page(&mut self, page: u64) -> Result<LoadRequest, LoadError> {
        let ticket = begin_page_load(&self.state)?;
        let page = page.max(1);
        let params = LoadParams {
            cursor: Some(page.to_string()),
            page: Some(page),
            limit: self.options.page_size,
        };
        self.apply(|s| mark_loading(s, true));
        vdebug!(epoch = ticket.epoch(), page, "request_page");
        Ok(LoadRequest {
            ticket,
            params,
            target: LoadTarget::Page(page),
        })
    }

    /// Merges a fetched page. A response issued before the last refresh is dropped with
    /// [`LoadError::Stale`] and leaves the state untouched.
    pub fn complete_load(&mut self, request: LoadRequest, page: Page<T>) -> Result<(), LoadError> {
        if let Err(err) = accept_load(&self.state, &request.ticket) {
            vwarn!(request_epoch = request.epoch(), "discarding stale page");
            return Err(err);
        }
        let dedupe = self.options.dedupe;
        let page_size = self.options.page_size;
        // Once pages arrive out of order, numbered "next" pages are placed by number too.
        let numbered = match request.target {
            LoadTarget::Page(n) => Some(n),
            LoadTarget::Next if self.sparse => request.params.page,
            LoadTarget::Next => None,
        };
        match numbered {
            Some(n) => {
                self.sparse = true;
                self.apply(|s| {
                    update_state_after_page_load(s, n, page_size, page.items, page.meta, dedupe)
                });
            }
            None => {
                self.apply(|s| update_state_after_load(s, page.items, page.meta, dedupe));
            }
        }
        vdebug!(
            len = self.state.len(),
            item_count = self.state.item_count(),
            has_next = self.state.has_next(),
            "complete_load"
        );
        self.frames.request();
        Ok(())
    }

    /// Clears the loading flag after a failed fetch so the next request can go out.
    pub fn fail_load(&mut self, request: LoadRequest) -> Result<(), LoadError> {
        accept_load(&self.state, &request.ticket)?;
        self.apply(|s| mark_loading(s, false));
        Ok(())
    }

    /// Starts over with `initial_items`, scrolled to the top. Loads in flight become stale.
    pub fn refresh(&mut self, initial_items: Vec<T>) {
        self.apply(|s| reset_state(s, initial_items));
        self.rendering.reset_placeholders();
        self.sparse = false;
        self.viewport.scroll_offset = 0;
        self.frames.request();
        vdebug!(epoch = self.state.epoch(), "refresh");
    }
}
