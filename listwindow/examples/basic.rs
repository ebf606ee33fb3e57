// Example: static list, visible range, and positioned rows.
use listwindow::{
    Align, ListItem, ListOptions, ListSource, OffsetMode, RenderingManager, Viewport,
    calculate_visible_range, create_initial_state, offset_for_index, recompute_total_height,
};

#[derive(Clone, Debug)]
struct Contact {
    id: String,
    name: String,
}

impl ListItem for Contact {
    fn id(&self) -> &str {
        &self.id
    }

    fn headline(&self) -> Option<&str> {
        Some(&self.name)
    }
}

fn main() {
    let contacts: Vec<Contact> = (1..=500)
        .map(|i| Contact {
            id: i.to_string(),
            name: format!("Contact {i}"),
        })
        .collect();

    let options = ListOptions::new(48).with_buffer_size(5).with_overscan(3);
    let state = recompute_total_height(create_initial_state(&options, ListSource::Static(contacts)));
    let viewport = Viewport::new(2400, 600);

    let range = calculate_visible_range(state.items(), state.heights(), viewport, &options.window);
    println!("total_height={}", state.total_height());
    println!("visible_range={range:?}");

    let mut rm = RenderingManager::new(&options);
    match rm.layout(&state, viewport, OffsetMode::Cumulative) {
        Ok(pass) => {
            println!("strategy={:?} rows={}", pass.strategy, pass.rows.len());
            if let Some(first) = pass.rows.first() {
                println!("first: index={} offset={} id={}", first.index, first.offset, first.item.id());
            }
        }
        Err(err) => eprintln!("layout failed: {err}"),
    }

    let off = offset_for_index(state.items(), state.heights(), 499, Align::End, viewport);
    println!("scroll to last row: offset={off}");
}
