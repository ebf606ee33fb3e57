// Example: an event loop driving a ListController with a fake backend.
use listwindow::{ListItem, ListOptions, ListSource, Page, PageMeta, RowRenderer, Slot};
use listwindow_adapter::{ListController, LoadTarget};

#[derive(Clone, Debug)]
struct Message {
    id: String,
    body: String,
}

impl ListItem for Message {
    fn id(&self) -> &str {
        &self.id
    }

    fn headline(&self) -> Option<&str> {
        Some(&self.body)
    }
}

struct Terminal;

impl RowRenderer<Message> for Terminal {
    type Handle = String;

    fn render_item(&mut self, item: &Slot<'_, Message>, index: usize) -> String {
        match item {
            Slot::Real(m) => format!("{index:>4}: {}", m.body),
            Slot::Placeholder(p) => format!("{index:>4}: {}", p.content.headline),
        }
    }
}

/// Serves 95 messages, 20 per page, keyed by a numeric cursor.
fn backend(cursor: Option<&str>, limit: usize) -> Page<Message> {
    let start: u64 = cursor.and_then(|c| c.parse().ok()).unwrap_or(1);
    let end = (start + limit as u64).min(96);
    let items = (start..end)
        .map(|i| Message {
            id: i.to_string(),
            body: format!("message {i}"),
        })
        .collect();
    Page {
        items,
        meta: PageMeta {
            cursor: (end < 96).then(|| end.to_string()),
            has_next: Some(end < 96),
            total: Some(95),
        },
    }
}

fn main() {
    let options = ListOptions::new(24).with_page_size(20).with_load_threshold(0.75);
    let mut c = ListController::new(options, ListSource::Api { initial_cursor: None });
    c.on_resize(240);

    let mut renderer = Terminal;
    let mut offset = 0u64;
    for tick in 0..40 {
        // A few scroll events per frame; only one recompute happens.
        for _ in 0..3 {
            offset += 40;
            c.on_scroll(offset);
        }

        if c.wants_more() || c.state().is_empty() {
            if let Ok(req) = c.request_next_page() {
                debug_assert_eq!(req.target(), LoadTarget::Next);
                let page = backend(req.params().cursor.as_deref(), req.params().limit);
                if let Err(err) = c.complete_load(req, page) {
                    eprintln!("dropped page: {err}");
                }
            }
        }

        match c.on_frame(&mut renderer) {
            Ok(Some(frame)) => {
                let first = frame.rows.first().map(|r| r.handle.as_str()).unwrap_or("-");
                println!(
                    "tick={tick:>2} range={:?} loaded={} height={} first=[{first}]",
                    frame.range,
                    c.state().len(),
                    frame.scroll_height
                );
            }
            Ok(None) => {}
            Err(err) => eprintln!("layout failed: {err}"),
        }

        let max = c.state().item_count() as u64 * 24;
        if offset + 240 >= max && !c.state().has_next() {
            break;
        }
    }
    println!("frames={} requests={}", c.frames().frames(), c.frames().requests());
}
