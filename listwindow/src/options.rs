use crate::PlaceholderMode;

/// Size thresholds that pick the visible-range strategy.
///
/// Evaluated in order by [`crate::select_strategy`]:
///
/// | condition                                   | strategy      |
/// |---------------------------------------------|---------------|
/// | no slots                                    | `Empty`       |
/// | `len < whole_list_below`                    | `WholeList`   |
/// | uniform heights and `len > fixed_height_above` | `FixedHeight` |
/// | `len > search_above`                        | `Search`      |
/// | otherwise                                   | `Linear`      |
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyThresholds {
    pub whole_list_below: usize,
    pub fixed_height_above: usize,
    pub search_above: usize,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            whole_list_below: 10,
            fixed_height_above: 20,
            search_above: 100,
        }
    }
}

/// Windowing knobs shared by the range calculator and the rendering manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowOptions {
    /// Rows pre-rendered ahead of and behind the viewport to mask fast scrolling.
    pub buffer_size: usize,
    /// Rows kept mounted beyond the buffer to reduce churn on small back-and-forth scrolls.
    pub overscan_count: usize,
    pub thresholds: StrategyThresholds,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            buffer_size: 5,
            overscan_count: 3,
            thresholds: StrategyThresholds::default(),
        }
    }
}

impl WindowOptions {
    /// Rows added on each side of the visible window.
    pub fn margin_rows(&self) -> usize {
        self.buffer_size.saturating_add(self.overscan_count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderOptions {
    pub mode: PlaceholderMode,
    /// Clamped to `[0, 1]`.
    pub opacity: f32,
    /// Upper bound on cached placeholders. Insertion stops once full.
    pub max_cached: usize,
    /// How many loaded items are sampled when learning a content pattern.
    pub sample_size: usize,
}

impl Default for PlaceholderOptions {
    fn default() -> Self {
        Self {
            mode: PlaceholderMode::Masked,
            opacity: 0.6,
            max_cached: 500,
            sample_size: 20,
        }
    }
}

/// Configuration for a windowed list.
///
/// The default item height is required: it is the height every unmeasured item is assumed to
/// have, and the unit of the fixed-height fast path.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListOptions {
    pub default_item_height: u32,
    pub window: WindowOptions,
    pub placeholders: PlaceholderOptions,
    /// Requested page size, forwarded as `LoadParams::limit`.
    pub page_size: usize,
    /// Fraction of the scrollable height after which the next page is requested.
    pub load_threshold: f64,
    /// Drop incoming items whose id is already present.
    pub dedupe: bool,
}

impl ListOptions {
    pub fn new(default_item_height: u32) -> Self {
        Self {
            default_item_height,
            window: WindowOptions::default(),
            placeholders: PlaceholderOptions::default(),
            page_size: 20,
            load_threshold: 0.8,
            dedupe: true,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.window.buffer_size = buffer_size;
        self
    }

    pub fn with_overscan(mut self, overscan_count: usize) -> Self {
        self.window.overscan_count = overscan_count;
        self
    }

    pub fn with_thresholds(mut self, thresholds: StrategyThresholds) -> Self {
        self.window.thresholds = thresholds;
        self
    }

    pub fn with_placeholder_mode(mut self, mode: PlaceholderMode) -> Self {
        self.placeholders.mode = mode;
        self
    }

    pub fn with_placeholder_opacity(mut self, opacity: f32) -> Self {
        self.placeholders.opacity = opacity;
        self
    }

    pub fn with_max_cached_placeholders(mut self, max_cached: usize) -> Self {
        self.placeholders.max_cached = max_cached;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_load_threshold(mut self, load_threshold: f64) -> Self {
        self.load_threshold = load_threshold;
        self
    }

    pub fn with_dedupe(mut self, dedupe: bool) -> Self {
        self.dedupe = dedupe;
        self
    }
}
