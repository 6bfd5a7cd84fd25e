use fibgrid::{Align, Animation, Grid, ItemProvider, Rect, Size, View, ViewRegistry, ViewType};
use fibgrid_adapter::{Easing, GridController, TransitionAnimator};
use std::rc::Rc;

#[derive(Debug, Default)]
struct Row {
    frame: Rect,
    alpha: f64,
}

impl View for Row {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}

fn main() {
    // Example: a controller driving a tweened scroll-to-item without holding any UI objects.
    //
    // An adapter would:
    // - start a tween (e.g. in response to a "scroll to item" command)
    // - call tick(now_ms) in a frame loop / timer
    // - apply the returned offset to the real scroll container (if any)
    let rows: Vec<u32> = (0..10_000).collect();
    let provider = ItemProvider::new(
        rows,
        |_, _, collection: Size| Size::new(collection.width, 30.0),
        |_, _, _| {},
    )
    .with_identifier_source(|row: &u32, _| format!("row-{row}"));

    let mut grid = Grid::new(ViewRegistry::new().with(ViewType::DEFAULT, Row::default));
    grid.set_animator(Rc::new(TransitionAnimator::new(Animation::new(200))));
    grid.set_bounds(Rect::new(0.0, 0.0, 400.0, 600.0));
    grid.set_provider(provider);
    grid.layout_if_needed();

    let mut c = GridController::new(grid);
    let target = c.start_tween_to_identifier("row-2000", Align::Center, 0, 240, Easing::SmoothStep);
    println!("target_offset={target:?}");

    let mut now_ms = 0u64;
    loop {
        now_ms += 16;
        if let Some(off) = c.tick(now_ms) {
            if now_ms % 80 == 0 {
                println!(
                    "t={now_ms} off={off:?} visible={:?}",
                    c.grid().visible_indexes()
                );
            }
        } else {
            break;
        }
    }

    println!(
        "done: off={:?} first={:?}",
        c.grid().content_offset(),
        c.grid().visible_identifiers().first()
    );
}
