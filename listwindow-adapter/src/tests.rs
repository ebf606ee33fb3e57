use crate::*;

use listwindow::{
    ListItem, ListOptions, ListSource, LoadError, OffsetMode, Page, PageMeta, PlaceholderMode,
    PositionError, RowRenderer, Slot, VisibleRange,
};
use proptest::prelude::*;
use std::string::{String, ToString};
use std::vec;
use std::vec::Vec;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Row(String);

impl ListItem for Row {
    fn id(&self) -> &str {
        &self.0
    }
}

fn rows(ids: impl IntoIterator<Item = u64>) -> Vec<Row> {
    ids.into_iter().map(|i| Row(i.to_string())).collect()
}

/// Renders each slot as `(id, is_placeholder)`.
#[derive(Default)]
struct Ids {
    calls: usize,
}

impl RowRenderer<Row> for Ids {
    type Handle = (String, bool);

    fn render_item(&mut self, item: &Slot<'_, Row>, _index: usize) -> Self::Handle {
        self.calls += 1;
        (item.id().to_string(), item.is_placeholder())
    }
}

fn static_list(n: u64) -> ListController<Row> {
    ListController::new(ListOptions::new(10), ListSource::Static(rows(1..=n)))
}

fn api_list() -> ListController<Row> {
    ListController::new(
        ListOptions::new(10).with_page_size(20),
        ListSource::Api {
            initial_cursor: None,
        },
    )
}

#[test]
fn frame_coalesces_scroll_events() {
    let mut c = static_list(200);
    let mut r = Ids::default();
    c.on_resize(100);
    assert!(c.on_frame(&mut r).unwrap().is_some());
    assert!(c.on_frame(&mut r).unwrap().is_none());

    c.on_scroll(10);
    c.on_scroll(20);
    c.on_scroll(30);
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    assert_eq!(frame.range.start, 0);
    assert!(c.on_frame(&mut r).unwrap().is_none());
    assert_eq!(c.frames().frames(), 2);
    assert_eq!(c.viewport().scroll_offset, 30);

    // Same offset again: nothing to do.
    c.on_scroll(30);
    assert!(!c.frames().is_pending());
}

#[test]
fn frame_rows_cover_the_viewport() {
    let mut c = static_list(200);
    let mut r = Ids::default();
    c.on_resize(100);
    c.on_scroll(500);
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    assert_eq!(frame.range, VisibleRange::new(42, 68));
    assert_eq!(frame.rows.len(), 26);
    assert_eq!(r.calls, 26);
    assert_eq!(frame.rows[0].offset, 420);
    assert_eq!(frame.rows[0].handle, ("43".to_string(), false));
    assert_eq!(frame.scroll_height, 2000);
    assert_eq!(frame.offset_mode, OffsetMode::Cumulative);
    assert_eq!(c.state().visible_range(), VisibleRange::new(42, 68));
}

#[test]
fn next_page_is_single_flight() {
    let mut c = api_list();
    let req = c.request_next_page().unwrap();
    assert_eq!(req.target(), LoadTarget::Next);
    assert_eq!(req.params().limit, 20);
    assert_eq!(req.params().cursor, None);
    assert!(c.state().is_loading());
    assert_eq!(c.request_next_page(), Err(LoadError::AlreadyLoading));

    let page = Page {
        items: rows(1..=20),
        meta: PageMeta {
            cursor: Some("2".into()),
            ..PageMeta::default()
        },
    };
    c.complete_load(req, page).unwrap();
    assert_eq!(c.state().len(), 20);
    assert!(!c.state().is_loading());

    c.on_resize(100);
    assert!(!c.wants_more());
    c.on_scroll(100);
    assert!(c.wants_more());

    let req = c.request_next_page().unwrap();
    assert_eq!(req.params().page, Some(2));
    assert!(!c.wants_more());
}

#[test]
fn refresh_discards_in_flight_loads() {
    let mut c = api_list();
    let req = c.request_next_page().unwrap();
    c.on_scroll(300);
    c.refresh(Vec::new());
    assert_eq!(c.viewport().scroll_offset, 0);
    assert!(!c.state().is_loading());

    let stale = Page {
        items: rows(1..=20),
        meta: PageMeta::default(),
    };
    assert_eq!(
        c.complete_load(req, stale),
        Err(LoadError::Stale {
            request_epoch: 0,
            current_epoch: 1
        })
    );
    assert!(c.state().is_empty());
    assert!(c.request_next_page().is_ok());
}

#[test]
fn failed_load_can_be_retried() {
    let mut c = api_list();
    let req = c.request_next_page().unwrap();
    c.fail_load(req).unwrap();
    assert!(!c.state().is_loading());
    assert!(c.request_next_page().is_ok());
}

#[test]
fn static_lists_do_not_page() {
    let mut c = static_list(5);
    assert_eq!(c.request_next_page(), Err(LoadError::StaticList));
    assert!(!c.wants_more());
}

#[test]
fn jump_to_page_renders_holes_as_placeholders() {
    let mut c = api_list();
    let req = c.request_page(3).unwrap();
    assert_eq!(req.target(), LoadTarget::Page(3));
    assert_eq!(req.params().page, Some(3));

    let page = Page {
        items: rows(41..=60),
        meta: PageMeta {
            has_next: Some(true),
            ..PageMeta::default()
        },
    };
    c.complete_load(req, page).unwrap();
    assert_eq!(c.state().len(), 60);
    assert_eq!(c.offset_mode(), OffsetMode::Virtual);

    let mut r = Ids::default();
    c.on_resize(100);
    c.on_scroll(350);
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    assert_eq!(frame.offset_mode, OffsetMode::Virtual);
    for row in &frame.rows {
        assert_eq!(row.offset, row.index as u64 * 10);
        assert_eq!(row.handle, ((row.index + 1).to_string(), row.index < 40));
    }

    c.set_offset_mode(Some(OffsetMode::Cumulative));
    assert_eq!(c.offset_mode(), OffsetMode::Cumulative);
    assert!(c.frames().is_pending());
}

fn paged_list(page_size: usize) -> ListController<Row> {
    ListController::new(
        ListOptions::new(10).with_page_size(page_size),
        ListSource::Api {
            initial_cursor: None,
        },
    )
}

fn load(c: &mut ListController<Row>, req: LoadRequest, ids: impl IntoIterator<Item = u64>) {
    let page = Page {
        items: rows(ids),
        meta: PageMeta::default(),
    };
    c.complete_load(req, page).unwrap();
}

fn slot_ids(c: &ListController<Row>) -> Vec<Option<String>> {
    c.state()
        .items()
        .iter()
        .map(|s| s.as_ref().map(|r| r.0.clone()))
        .collect()
}

#[test]
fn next_page_after_out_of_order_jumps_lands_in_its_own_slots() {
    let mut c = paged_list(2);
    let req = c.request_page(3).unwrap();
    load(&mut c, req, 5..=6);
    let req = c.request_page(1).unwrap();
    load(&mut c, req, 1..=2);

    let req = c.request_next_page().unwrap();
    assert_eq!(req.params().page, Some(4));
    load(&mut c, req, 7..=8);

    let ids = slot_ids(&c);
    assert_eq!(ids.len(), 8);
    assert_eq!(ids[2], None);
    assert_eq!(ids[3], None);
    for (i, id) in ids.iter().enumerate() {
        if let Some(id) = id {
            assert_eq!(*id, (i + 1).to_string());
        }
    }
}

#[test]
fn holes_stay_reachable_after_the_last_page() {
    let mut c = paged_list(2);
    let req = c.request_page(3).unwrap();
    load(&mut c, req, [5]);
    assert!(!c.state().has_next());
    assert_eq!(c.request_next_page(), Err(LoadError::Exhausted));

    let req = c.request_page(1).unwrap();
    assert_eq!(c.request_page(2), Err(LoadError::AlreadyLoading));
    load(&mut c, req, 1..=2);
    assert_eq!(
        slot_ids(&c),
        vec![
            Some("1".to_string()),
            Some("2".to_string()),
            None,
            None,
            Some("5".to_string())
        ]
    );
    assert!(!c.state().has_next());
}

#[test]
fn failed_frame_stays_pending() {
    let mut c = static_list(200);
    let mut r = Ids::default();
    c.on_resize(100);
    c.set_offset_mode(Some(OffsetMode::Virtual));
    assert!(c.on_frame(&mut r).unwrap().is_some());

    c.on_measurements([("3", 25), ("4", 30)]);
    assert!(matches!(
        c.on_frame(&mut r),
        Err(PositionError::VirtualOffsetUnavailable { .. })
    ));
    assert!(c.frames().is_pending());

    c.set_offset_mode(None);
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    assert_eq!(frame.offset_mode, OffsetMode::Cumulative);
}

#[test]
fn measurements_request_frames_only_on_change() {
    let mut c = static_list(50);
    let mut r = Ids::default();
    c.on_resize(100);
    c.on_frame(&mut r).unwrap();

    c.on_measure("3", 25);
    assert!(c.frames().is_pending());
    c.on_frame(&mut r).unwrap();
    c.on_measure("3", 25);
    assert!(!c.frames().is_pending());

    c.on_measurements([("4", 30), ("5", 30)]);
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    assert_eq!(frame.scroll_height, 47 * 10 + 25 + 30 + 30);
}

#[test]
fn placeholder_tuning_requests_a_frame() {
    let mut c = api_list();
    let mut r = Ids::default();
    c.on_resize(100);
    c.on_frame(&mut r).unwrap();

    c.set_placeholder_mode(PlaceholderMode::Skeleton);
    assert!(c.frames().is_pending());
    let frame = c.on_frame(&mut r).unwrap().unwrap();
    // Empty list with more to come: the next-page slot is a placeholder.
    assert_eq!(frame.rows.len(), 1);
    assert!(frame.rows[0].is_placeholder);

    c.set_placeholder_opacity(c.rendering().placeholders().opacity());
    assert!(!c.frames().is_pending());
}

#[test]
fn scroll_to_index_moves_the_viewport() {
    let mut c = static_list(100);
    c.on_resize(50);
    assert_eq!(c.scroll_to_index(40, listwindow::Align::Start), 400);
    assert_eq!(c.viewport().scroll_offset, 400);
    assert!(c.frames().is_pending());
}

#[test]
fn snapshots_are_independent_of_later_updates() {
    let mut c = api_list();
    let snap = c.snapshot();
    let req = c.request_next_page().unwrap();
    c.complete_load(
        req,
        Page {
            items: rows(1..=3),
            meta: PageMeta::default(),
        },
    )
    .unwrap();
    assert!(snap.is_empty());
    assert_eq!(c.state().len(), 3);
}

proptest! {
    #[test]
    fn any_burst_of_input_yields_one_frame(
        events in proptest::collection::vec((any::<bool>(), 0u64..5_000, 1u32..800), 1..40),
    ) {
        let mut c = static_list(300);
        let mut r = Ids::default();
        c.on_resize(100);
        c.on_frame(&mut r).unwrap();

        let mut changed = false;
        for (is_scroll, offset, height) in events {
            let before = c.viewport();
            if is_scroll {
                c.on_scroll(offset);
            } else {
                c.on_resize(height);
            }
            changed |= c.viewport() != before;
        }

        prop_assert_eq!(c.on_frame(&mut r).unwrap().is_some(), changed);
        prop_assert!(c.on_frame(&mut r).unwrap().is_none());
    }
}
