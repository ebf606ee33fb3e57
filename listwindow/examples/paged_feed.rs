// Example: cursor paging, placeholders for the next page, and a jump-to-page load with holes.
use listwindow::{
    ListItem, ListOptions, ListSource, OffsetMode, PageMeta, PlaceholderMode, RenderingManager,
    RowRenderer, Slot, Viewport, accept_load, begin_load, create_initial_state,
    create_load_params, mark_loading, recompute_total_height, update_state_after_load,
    update_state_after_page_load,
};

#[derive(Clone, Debug)]
struct User {
    id: u64,
    id_str: String,
    name: String,
    email: String,
    role: &'static str,
}

impl ListItem for User {
    fn id(&self) -> &str {
        &self.id_str
    }

    fn headline(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn subtext(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn meta(&self) -> Option<&str> {
        Some(self.role)
    }
}

fn fetch(page: u64, limit: usize) -> Vec<User> {
    let first = (page - 1) * limit as u64 + 1;
    (first..first + limit as u64)
        .map(|id| User {
            id,
            id_str: id.to_string(),
            name: format!("User {id}"),
            email: format!("user{id}@corp.test"),
            role: if id % 3 == 0 { "Admin" } else { "Member" },
        })
        .collect()
}

struct Printer;

impl RowRenderer<User> for Printer {
    type Handle = String;

    fn render_item(&mut self, item: &Slot<'_, User>, index: usize) -> String {
        match item {
            Slot::Real(user) => format!("#{index:<3} {} <{}> (id {})", user.name, user.email, user.id),
            Slot::Placeholder(p) => format!(
                "#{index:<3} {} {} {}",
                p.content.headline, p.content.subtext, p.content.meta
            ),
        }
    }

    fn apply_placeholder_styling(&mut self, item: &Slot<'_, User>, handle: &mut String) {
        if let Some(p) = item.as_placeholder() {
            handle.push_str(&format!("  [opacity {:.1}]", p.opacity));
        }
    }
}

fn main() {
    let options = ListOptions::new(40).with_page_size(10);
    let mut state = create_initial_state(&options, ListSource::Api { initial_cursor: Some("1".into()) });
    let mut rm = RenderingManager::new(&options);

    // First cursor page.
    let ticket = begin_load(&state).expect("first page");
    let params = create_load_params(&state, options.page_size);
    state = mark_loading(state, true);
    let page = params.page.unwrap_or(1);
    if accept_load(&state, &ticket).is_ok() {
        let meta = PageMeta {
            cursor: Some((page + 1).to_string()),
            has_next: Some(true),
            total: None,
        };
        state = update_state_after_load(state, fetch(page, params.limit), meta, options.dedupe);
    }
    state = recompute_total_height(state);

    // Scroll near the end: the next-page slot renders as a placeholder.
    let viewport = Viewport::new(250, 200);
    println!("should_load_more={}", rm.should_load_more(&state, viewport));
    for row in rm
        .render(&state, viewport, OffsetMode::Cumulative, &mut Printer)
        .unwrap_or_default()
    {
        println!("{:>5}px {}", row.offset, row.handle);
    }

    // Jump to page 5: slots 10..40 become holes, rendered in realistic mode.
    rm.set_placeholder_mode(PlaceholderMode::Realistic);
    state = update_state_after_page_load(state, 5, 10, fetch(5, 10), PageMeta::default(), true);
    state = recompute_total_height(state);
    let viewport = Viewport::new(1400, 160);
    println!("-- after jump to page 5 --");
    match rm.render(&state, viewport, OffsetMode::Virtual, &mut Printer) {
        Ok(rows) => {
            for row in rows {
                println!("{:>5}px {}", row.offset, row.handle);
            }
        }
        Err(err) => eprintln!("virtual layout unavailable: {err}"),
    }
}
