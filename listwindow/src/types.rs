use alloc::string::String;

use crate::PlaceholderItem;

/// A record that can live in a windowed list.
///
/// Only [`ListItem::id`] is required. The content accessors feed placeholder pattern learning
/// and default to `None`.
pub trait ListItem {
    /// Identity key. Usually a numeric-looking string such as `"42"`.
    fn id(&self) -> &str;

    fn headline(&self) -> Option<&str> {
        None
    }

    fn subtext(&self) -> Option<&str> {
        None
    }

    fn meta(&self) -> Option<&str> {
        None
    }
}

/// A half-open `[start, end)` slot interval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize, // exclusive
}

impl VisibleRange {
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Clamps both bounds into `[0, len]` and keeps `start <= end`.
    pub fn clamped(self, len: usize) -> Self {
        let end = self.end.min(len);
        Self {
            start: self.start.min(end),
            end,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Scroll metrics reported by the UI layer, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub scroll_offset: u64,
    pub container_height: u32,
}

impl Viewport {
    pub fn new(scroll_offset: u64, container_height: u32) -> Self {
        Self {
            scroll_offset,
            container_height,
        }
    }

    pub fn end(&self) -> u64 {
        self.scroll_offset
            .saturating_add(self.container_height as u64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

/// How the position calculator derives pixel offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OffsetMode {
    /// Sum heights from slot 0 (or from the cached offset table).
    #[default]
    Cumulative,
    /// `offset = (id - 1) * fixed_height`. Only valid while every height is uniform.
    Virtual,
}

/// What the renderer receives for one visible slot.
#[derive(Clone, Debug)]
pub enum Slot<'a, T> {
    Real(&'a T),
    Placeholder(PlaceholderItem),
}

impl<T: ListItem> Slot<'_, T> {
    pub fn id(&self) -> &str {
        match self {
            Self::Real(item) => item.id(),
            Self::Placeholder(p) => &p.id,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    pub fn as_real(&self) -> Option<&T> {
        match self {
            Self::Real(item) => Some(*item),
            Self::Placeholder(_) => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&PlaceholderItem> {
        match self {
            Self::Real(_) => None,
            Self::Placeholder(p) => Some(p),
        }
    }
}

/// A positioned row for one render pass. Never stored across passes.
#[derive(Clone, Debug)]
pub struct ItemPosition<'a, T> {
    pub index: usize,
    pub item: Slot<'a, T>,
    /// Start offset in pixels from the top of the list.
    pub offset: u64,
    pub height: u32,
}

impl<T> ItemPosition<'_, T> {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.height as u64)
    }
}

/// Pagination metadata returned alongside a page of items.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageMeta {
    pub cursor: Option<String>,
    pub has_next: Option<bool>,
    pub total: Option<usize>,
}

/// One loaded page.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub items: alloc::vec::Vec<T>,
    pub meta: PageMeta,
}

/// Parameters for the next fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadParams {
    pub cursor: Option<String>,
    /// Set when the cursor parses as an integer, for page-number backends.
    pub page: Option<u64>,
    pub limit: usize,
}
