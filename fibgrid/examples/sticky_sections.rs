// Example: sections with sticky headers, each section with its own layout.
use fibgrid::{
    ComposedHeaderProvider, EdgeInsets, FlowLayout, Grid, ItemProvider, LayoutExt, Point,
    Provider, Rect, Size, View, ViewRegistry, ViewType,
};

const HEADER: ViewType = ViewType("header");

#[derive(Debug)]
struct Tile {
    kind: &'static str,
    frame: Rect,
    text: String,
}

impl Tile {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            frame: Rect::ZERO,
            text: String::new(),
        }
    }
}

impl View for Tile {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }
}

fn section(name: &str, count: usize, tile: f64) -> Box<dyn Provider<Tile>> {
    let items: Vec<String> = (0..count).map(|i| format!("{name} #{i}")).collect();
    Box::new(
        ItemProvider::new(
            items,
            move |_, _, _| Size::new(tile, tile),
            |view: &mut Tile, text: &String, _| view.text = text.clone(),
        )
        .with_identifier(name)
        .with_layout(
            FlowLayout::new()
                .with_spacing(4.0)
                .inset_by(EdgeInsets::uniform(8.0)),
        ),
    )
}

fn main() {
    let names = ["fruit", "vegetables", "grains"];
    let sections = vec![
        section(names[0], 40, 60.0),
        section(names[1], 25, 90.0),
        section(names[2], 60, 40.0),
    ];
    let provider = ComposedHeaderProvider::new(
        sections,
        |_, collection: Size| Size::new(collection.width, 32.0),
        move |view: &mut Tile, at| view.text = names[at].to_uppercase(),
    )
    .with_header_view_type(HEADER)
    .with_sticky_headers(true);

    let registry = ViewRegistry::new()
        .with(ViewType::DEFAULT, || Tile::new("tile"))
        .with(HEADER, || Tile::new("header"));
    let mut grid = Grid::new(registry);
    grid.set_bounds(Rect::new(0.0, 0.0, 300.0, 400.0));
    grid.set_provider(provider);
    grid.layout_if_needed();
    println!("content_size={:?}", grid.content_size());

    for y in [0.0, 120.0, 700.0, 1_100.0] {
        grid.set_content_offset(Point::new(0.0, y));
        let headers: Vec<_> = grid
            .visible_set()
            .views()
            .iter()
            .filter(|v| v.kind == "header")
            .map(|v| (v.text.as_str(), v.frame.min_y()))
            .collect();
        println!(
            "offset={y} visible={} headers={headers:?}",
            grid.visible_set().len()
        );
    }
}
