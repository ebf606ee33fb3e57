//! Synthetic rows for slots whose data has not loaded yet.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use crate::key::Map;
use crate::{ListItem, ParseModeError, PlaceholderOptions};

const MASK_GLYPH: char = '▪';
const BAR_GLYPH: &str = "█";
const DOT_GLYPH: &str = "·";

const DEFAULT_NAMES: [&str; 8] = [
    "Alex Morgan",
    "Jordan Lee",
    "Sam Rivera",
    "Taylor Chen",
    "Casey Brooks",
    "Riley Patel",
    "Jamie Novak",
    "Morgan Hayes",
];
const DEFAULT_DOMAIN: &str = "example.com";
const DEFAULT_ROLES: [&str; 4] = ["Member", "Editor", "Admin", "Viewer"];

/// How placeholder content looks. Switchable at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PlaceholderMode {
    /// Fabricated names, emails and roles cycling through the learned pattern.
    Realistic,
    /// Realistic content with every alphanumeric and `@._-` character masked.
    #[default]
    Masked,
    /// Bar glyphs sized by field length bucket.
    Skeleton,
    /// Whitespace runs sized by field length bucket.
    Blank,
    /// Dot runs sized by field length bucket.
    Dots,
}

impl PlaceholderMode {
    pub const ALL: [Self; 5] = [
        Self::Realistic,
        Self::Masked,
        Self::Skeleton,
        Self::Blank,
        Self::Dots,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Realistic => "realistic",
            Self::Masked => "masked",
            Self::Skeleton => "skeleton",
            Self::Blank => "blank",
            Self::Dots => "dots",
        }
    }
}

impl FromStr for PlaceholderMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderContent {
    pub headline: String,
    pub subtext: String,
    pub meta: String,
}

/// A synthetic record standing in for an unloaded slot.
///
/// `id` is `index + 1`, the identity the real item is expected to have, so virtual offsets line
/// up across real and synthetic rows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceholderItem {
    pub id: String,
    pub index: usize,
    pub content: PlaceholderContent,
    pub mode: PlaceholderMode,
    pub opacity: f32,
}

impl ListItem for PlaceholderItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn headline(&self) -> Option<&str> {
        Some(&self.content.headline)
    }

    fn subtext(&self) -> Option<&str> {
        Some(&self.content.subtext)
    }

    fn meta(&self) -> Option<&str> {
        Some(&self.content.meta)
    }
}

/// Content shape learned from a sample of loaded items.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentPattern {
    pub names: Vec<String>,
    pub email_domain: String,
    pub roles: Vec<String>,
    /// Difference between consecutive numeric ids; 1 when ids are not numeric.
    pub id_stride: u64,
}

impl Default for ContentPattern {
    fn default() -> Self {
        Self {
            names: DEFAULT_NAMES.iter().map(|s| s.to_string()).collect(),
            email_domain: DEFAULT_DOMAIN.to_string(),
            roles: DEFAULT_ROLES.iter().map(|s| s.to_string()).collect(),
            id_stride: 1,
        }
    }
}

impl ContentPattern {
    /// Learns from the first `sample_size` loaded items. Missing fields fall back to the
    /// built-in defaults.
    pub fn learn<T: ListItem>(items: &[Option<T>], sample_size: usize) -> Self {
        let sample: Vec<&T> = items.iter().flatten().take(sample_size).collect();
        let defaults = Self::default();

        let mut names: Vec<String> = Vec::new();
        let mut roles: Vec<String> = Vec::new();
        let mut email_domain = None;
        for item in &sample {
            if let Some(h) = item.headline().map(str::trim).filter(|h| !h.is_empty()) {
                if !names.iter().any(|n| n == h) {
                    names.push(h.to_string());
                }
            }
            if email_domain.is_none() {
                email_domain = item
                    .subtext()
                    .and_then(|s| s.rsplit_once('@'))
                    .map(|(_, domain)| domain.trim())
                    .filter(|d| !d.is_empty())
                    .map(str::to_string);
            }
            if let Some(m) = item.meta().map(str::trim).filter(|m| !m.is_empty()) {
                if !roles.iter().any(|r| r == m) {
                    roles.push(m.to_string());
                }
            }
        }

        Self {
            names: if names.is_empty() { defaults.names } else { names },
            email_domain: email_domain.unwrap_or(defaults.email_domain),
            roles: if roles.is_empty() { defaults.roles } else { roles },
            id_stride: infer_stride(&sample),
        }
    }

    fn name_for(&self, index: usize) -> &str {
        pick(&self.names, (index as u64).wrapping_mul(self.id_stride))
    }

    fn role_for(&self, index: usize) -> &str {
        pick(&self.roles, index as u64)
    }
}

fn pick(pool: &[String], n: u64) -> &str {
    if pool.is_empty() {
        return "";
    }
    &pool[(n % pool.len() as u64) as usize]
}

fn infer_stride<T: ListItem>(sample: &[&T]) -> u64 {
    let mut ids = sample.iter().map(|item| item.id().trim().parse::<u64>());
    match (ids.next(), ids.next()) {
        (Some(Ok(a)), Some(Ok(b))) if b > a => b - a,
        _ => 1,
    }
}

fn realistic(index: usize, pattern: &ContentPattern) -> PlaceholderContent {
    let name = pattern.name_for(index);
    let local: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('.'),
            c if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' => {
                Some(c.to_ascii_lowercase())
            }
            _ => None,
        })
        .collect();
    PlaceholderContent {
        headline: name.to_string(),
        subtext: format!("{local}@{}", pattern.email_domain),
        meta: pattern.role_for(index).to_string(),
    }
}

fn mask(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '@' | '.' | '_' | '-') {
                MASK_GLYPH
            } else {
                c
            }
        })
        .collect()
}

/// Short / medium / long width for a field of `len` characters.
fn bucket_width(len: usize) -> usize {
    match len {
        0..=8 => 6,
        9..=16 => 12,
        _ => 20,
    }
}

fn bucketed(s: &str, glyph: &str) -> String {
    glyph.repeat(bucket_width(s.chars().count()))
}

fn synthesize(index: usize, pattern: &ContentPattern, mode: PlaceholderMode) -> PlaceholderContent {
    let base = realistic(index, pattern);
    let map = |f: &dyn Fn(&str) -> String| PlaceholderContent {
        headline: f(&base.headline),
        subtext: f(&base.subtext),
        meta: f(&base.meta),
    };
    match mode {
        PlaceholderMode::Realistic => base.clone(),
        PlaceholderMode::Masked => map(&mask),
        PlaceholderMode::Skeleton => map(&|s| bucketed(s, BAR_GLYPH)),
        PlaceholderMode::Blank => map(&|s| bucketed(s, " ")),
        PlaceholderMode::Dots => map(&|s| bucketed(s, DOT_GLYPH)),
    }
}

fn clamp_opacity(opacity: f32) -> Option<f32> {
    opacity.is_finite().then(|| opacity.clamp(0.0, 1.0))
}

/// Produces and caches placeholder rows by slot index.
///
/// The cache is bounded: once `max_cached` entries exist, new placeholders are still returned
/// but no longer stored. Nothing is evicted.
#[derive(Clone, Debug)]
pub struct PlaceholderGenerator {
    mode: PlaceholderMode,
    opacity: f32,
    max_cached: usize,
    sample_size: usize,
    pattern: Option<ContentPattern>,
    cache: Map<usize, PlaceholderItem>,
}

impl PlaceholderGenerator {
    pub fn new(options: PlaceholderOptions) -> Self {
        let defaults = PlaceholderOptions::default();
        Self {
            mode: options.mode,
            opacity: clamp_opacity(options.opacity).unwrap_or(defaults.opacity),
            max_cached: options.max_cached,
            sample_size: options.sample_size,
            pattern: None,
            cache: Map::new(),
        }
    }

    pub fn mode(&self) -> PlaceholderMode {
        self.mode
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn pattern(&self) -> Option<&ContentPattern> {
        self.pattern.as_ref()
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, index: usize) -> bool {
        self.cache.contains_key(&index)
    }

    /// Switches the mode. Returns `true` (and drops every cached placeholder) when it changed.
    pub fn set_mode(&mut self, mode: PlaceholderMode) -> bool {
        if self.mode == mode {
            return false;
        }
        vdebug!(from = self.mode.as_str(), to = mode.as_str(), "placeholder mode changed");
        self.mode = mode;
        self.cache.clear();
        true
    }

    /// Sets the opacity, clamped to `[0, 1]`. Non-finite input is ignored.
    ///
    /// Returns `true` (and drops every cached placeholder) when the stored value changed.
    pub fn set_opacity(&mut self, opacity: f32) -> bool {
        let Some(opacity) = clamp_opacity(opacity) else {
            vwarn!(opacity, "ignoring non-finite placeholder opacity");
            return false;
        };
        if self.opacity == opacity {
            return false;
        }
        self.opacity = opacity;
        self.cache.clear();
        true
    }

    /// Re-samples the content pattern from `items`, replacing any learned one.
    pub fn learn_pattern<T: ListItem>(&mut self, items: &[Option<T>]) {
        let pattern = ContentPattern::learn(items, self.sample_size);
        vdebug!(
            names = pattern.names.len(),
            roles = pattern.roles.len(),
            id_stride = pattern.id_stride,
            "learned placeholder pattern"
        );
        if self.pattern.as_ref() != Some(&pattern) {
            self.cache.clear();
        }
        self.pattern = Some(pattern);
    }

    /// Returns the placeholder for slot `index`.
    ///
    /// Output is deterministic for a given index, mode, opacity and pattern.
    pub fn generate<T: ListItem>(&mut self, index: usize, items: &[Option<T>]) -> PlaceholderItem {
        if let Some(hit) = self.cache.get(&index) {
            return hit.clone();
        }

        if self.pattern.is_none() && items.iter().any(Option::is_some) {
            self.learn_pattern(items);
        }

        let content = match &self.pattern {
            Some(pattern) => synthesize(index, pattern, self.mode),
            None => synthesize(index, &ContentPattern::default(), self.mode),
        };
        let item = PlaceholderItem {
            id: (index as u64 + 1).to_string(),
            index,
            content,
            mode: self.mode,
            opacity: self.opacity,
        };

        if self.cache.len() < self.max_cached {
            self.cache.insert(index, item.clone());
        }
        item
    }

    /// Drops cached placeholders whose slot now holds a real item.
    pub fn release_loaded<T>(&mut self, items: &[Option<T>]) {
        self.cache
            .retain(|index, _| !matches!(items.get(*index), Some(Some(_))));
    }

    /// Forgets the learned pattern and every cached placeholder.
    pub fn reset(&mut self) {
        self.pattern = None;
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Row, rows};
    use alloc::vec;

    fn people() -> Vec<Option<Row>> {
        vec![
            Some(Row::person("10", "Ada Lovelace", "ada@analytical.io", "Engineer")),
            Some(Row::person("20", "Grace Hopper", "grace@analytical.io", "Admiral")),
            None,
            Some(Row::person("40", "Alan Turing", "alan@analytical.io", "Engineer")),
        ]
    }

    #[test]
    fn learns_pattern_from_loaded_items() {
        let p = ContentPattern::learn(&people(), 20);
        assert_eq!(p.names, vec!["Ada Lovelace", "Grace Hopper", "Alan Turing"]);
        assert_eq!(p.email_domain, "analytical.io");
        assert_eq!(p.roles, vec!["Engineer", "Admiral"]);
        assert_eq!(p.id_stride, 10);
    }

    #[test]
    fn pattern_falls_back_to_defaults() {
        let p = ContentPattern::learn(&rows(5), 20);
        assert_eq!(p.names.len(), DEFAULT_NAMES.len());
        assert_eq!(p.email_domain, DEFAULT_DOMAIN);
        assert_eq!(p.id_stride, 1);

        let odd = vec![Some(Row::new("a")), Some(Row::new("b"))];
        assert_eq!(ContentPattern::learn(&odd, 20).id_stride, 1);
    }

    #[test]
    fn generation_is_deterministic_and_cached() {
        let items = people();
        let mut g = PlaceholderGenerator::new(PlaceholderOptions::default());
        let a = g.generate(5, &items);
        assert!(g.is_cached(5));

        let mut fresh = PlaceholderGenerator::new(PlaceholderOptions::default());
        let b = fresh.generate(5, &items);
        assert_eq!(a, b);
        assert_eq!(g.generate(5, &items), a);
        assert_eq!(a.id, "6");
        assert_eq!(a.index, 5);
    }

    #[test]
    fn modes_shape_content() {
        let items = people();
        let opts = PlaceholderOptions {
            mode: PlaceholderMode::Realistic,
            ..PlaceholderOptions::default()
        };
        let mut g = PlaceholderGenerator::new(opts);
        // stride 10: index 1 -> names[10 % 3] = names[1]
        let real = g.generate(1, &items).content;
        assert_eq!(real.headline, "Grace Hopper");
        assert_eq!(real.subtext, "grace.hopper@analytical.io");
        assert_eq!(real.meta, "Admiral");

        g.set_mode(PlaceholderMode::Masked);
        let masked = g.generate(1, &items).content;
        assert_eq!(masked.headline, "▪▪▪▪▪ ▪▪▪▪▪▪");
        assert_eq!(masked.subtext.chars().count(), real.subtext.chars().count());
        assert!(masked.subtext.chars().all(|c| c == MASK_GLYPH));

        g.set_mode(PlaceholderMode::Skeleton);
        let bars = g.generate(1, &items).content;
        assert_eq!(bars.headline, BAR_GLYPH.repeat(12));
        assert_eq!(bars.subtext, BAR_GLYPH.repeat(20));
        assert_eq!(bars.meta, BAR_GLYPH.repeat(6));

        g.set_mode(PlaceholderMode::Blank);
        assert_eq!(g.generate(1, &items).content.meta, "      ");

        g.set_mode(PlaceholderMode::Dots);
        assert_eq!(g.generate(1, &items).content.meta, DOT_GLYPH.repeat(6));
    }

    #[test]
    fn mode_and_opacity_changes_clear_the_cache() {
        let items = people();
        let mut g = PlaceholderGenerator::new(PlaceholderOptions::default());
        g.generate(7, &items);
        g.generate(8, &items);
        assert_eq!(g.cached_len(), 2);

        assert!(!g.set_mode(PlaceholderMode::Masked));
        assert_eq!(g.cached_len(), 2);

        assert!(g.set_mode(PlaceholderMode::Dots));
        assert_eq!(g.cached_len(), 0);
        assert_eq!(g.generate(7, &items).mode, PlaceholderMode::Dots);

        assert!(g.set_opacity(3.0));
        assert_eq!(g.opacity(), 1.0);
        assert_eq!(g.cached_len(), 0);
        assert_eq!(g.generate(7, &items).opacity, 1.0);

        assert!(g.set_opacity(-1.0));
        assert_eq!(g.opacity(), 0.0);
        assert!(!g.set_opacity(f32::NAN));
        assert_eq!(g.opacity(), 0.0);
    }

    #[test]
    fn cache_stops_growing_when_full() {
        let opts = PlaceholderOptions {
            max_cached: 2,
            ..PlaceholderOptions::default()
        };
        let mut g = PlaceholderGenerator::new(opts);
        let items = people();
        for i in 0..5 {
            g.generate(i, &items);
        }
        assert_eq!(g.cached_len(), 2);
        assert!(g.is_cached(0) && g.is_cached(1));
        assert!(!g.is_cached(4));
    }

    #[test]
    fn release_loaded_drops_filled_slots() {
        let mut items = people();
        let mut g = PlaceholderGenerator::new(PlaceholderOptions::default());
        g.generate(2, &items);
        g.generate(9, &items);
        items[2] = Some(Row::new("30"));
        g.release_loaded(&items);
        assert!(!g.is_cached(2));
        assert!(g.is_cached(9));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Skeleton".parse::<PlaceholderMode>(), Ok(PlaceholderMode::Skeleton));
        assert_eq!(" dots ".parse::<PlaceholderMode>(), Ok(PlaceholderMode::Dots));
        assert!("shimmer".parse::<PlaceholderMode>().is_err());
    }
}
