// Example: a chat-like timeline that prepends older messages while the reader's position
// stays put. Requests are coalesced and run from `tick`, as a frame loop would.
use fibgrid::{Grid, ItemProvider, Point, Rect, Size, View, ViewRegistry, ViewType};

#[derive(Debug, Default)]
struct Bubble {
    frame: Rect,
}

impl View for Bubble {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

fn timeline(messages: Vec<String>) -> ItemProvider<String, Bubble> {
    ItemProvider::new(
        messages,
        |_, text: &String, collection: Size| {
            // One line per 24 characters.
            let lines = (text.len() / 24 + 1) as f64;
            Size::new(collection.width, 12.0 + lines * 18.0)
        },
        |_, _, _| {},
    )
    .with_identifier_source(|text: &String, _| text.clone())
    .with_size_hash(|text: &String| format!("{}", text.len()))
}

fn main() {
    let mut messages: Vec<String> = (100..200).map(|i| format!("message {i}")).collect();
    let mut grid = Grid::new(ViewRegistry::new().with(ViewType::DEFAULT, Bubble::default));
    grid.set_bounds(Rect::new(0.0, 0.0, 360.0, 640.0));
    grid.set_provider(timeline(messages.clone()));
    grid.layout_if_needed();
    grid.set_content_offset(Point::new(0.0, 1_200.0));
    println!("before: first={:?}", grid.visible_identifiers().first());

    let mut now_ms = 0;
    for page in 0..3 {
        let older: Vec<String> = (page * 10..page * 10 + 10)
            .map(|i| format!("older message {i} with a longer body to wrap"))
            .collect();
        messages = older.into_iter().chain(messages).collect();
        grid.set_provider(timeline(messages.clone()));
        // Several requests inside one window collapse into a single pass.
        grid.set_needs_reload();
        grid.set_needs_reload();

        while grid.phase() != fibgrid::GridPhase::Idle {
            now_ms += 8;
            if let Some(pass) = grid.tick(now_ms) {
                println!(
                    "t={now_ms} ran {pass:?} offset={:?} first={:?}",
                    grid.content_offset(),
                    grid.visible_identifiers().first()
                );
            }
        }
    }
    println!("stats={:?}", grid.stats());
}
