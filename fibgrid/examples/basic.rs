// Example: a column of 10k items, scrolled, with views recycled through the pool.
use fibgrid::{Grid, ItemProvider, Point, Rect, Size, View, ViewRegistry, ViewType};

#[derive(Debug, Default)]
struct Label {
    frame: Rect,
    text: String,
}

impl View for Label {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

fn main() {
    let rows: Vec<String> = (0..10_000).map(|i| format!("row {i}")).collect();
    let provider = ItemProvider::new(
        rows,
        |_, _, collection: Size| Size::new(collection.width, 44.0),
        |view: &mut Label, row: &String, _| view.text = row.clone(),
    )
    .with_identifier_source(|row: &String, _| row.clone());

    let mut grid = Grid::new(ViewRegistry::new().with(ViewType::DEFAULT, Label::default));
    grid.set_bounds(Rect::new(0.0, 0.0, 320.0, 480.0));
    grid.set_provider(provider);
    grid.layout_if_needed();

    println!("content_size={:?}", grid.content_size());
    println!("visible={:?}", grid.visible_identifiers());

    for y in [1_000.0, 1_022.0, 200_000.0] {
        grid.set_content_offset(Point::new(0.0, y));
        let first = grid.visible_set().views().first().map(|v| (&v.text, v.frame));
        println!("offset={y} indexes={:?} first={first:?}", grid.visible_indexes());
    }
    println!("stats={:?}", grid.stats());
    println!(
        "pooled={}",
        grid.reuse_manager().borrow().pooled_count()
    );
}
