use crate::*;

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicUsize, Ordering};

static NEXT_VIEW_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        let span = end_exclusive - start;
        start + (self.next_u64() % span)
    }

    fn gen_range_f64(&mut self, start: u64, end_exclusive: u64) -> f64 {
        self.gen_range_u64(start, end_exclusive) as f64
    }
}

#[derive(Debug)]
struct MockView {
    id: usize,
    kind: &'static str,
    frame: Rect,
    alpha: f64,
    hidden: bool,
    attached: bool,
    label: String,
}

impl MockView {
    fn new() -> Self {
        Self::of_kind("default")
    }

    fn of_kind(kind: &'static str) -> Self {
        Self {
            id: NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            frame: Rect::ZERO,
            alpha: 1.0,
            hidden: false,
            attached: false,
            label: String::new(),
        }
    }
}

impl View for MockView {
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

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn prepare_for_reuse(&mut self) {
        self.label.clear();
    }
}

#[derive(Default)]
struct RecordingAnimator {
    calls: RefCell<Vec<&'static str>>,
}

impl RecordingAnimator {
    fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }
}

impl Animator<MockView> for RecordingAnimator {
    fn insert(&self, view: &mut MockView, frame: Rect, _context: &AnimationContext) {
        self.calls.borrow_mut().push("insert");
        view.set_frame(frame);
    }

    fn update(&self, view: &mut MockView, frame: Rect, _context: &AnimationContext) {
        self.calls.borrow_mut().push("update");
        view.set_frame(frame);
    }

    fn shift(&self, view: &mut MockView, delta: Point, _context: &AnimationContext) {
        self.calls.borrow_mut().push("shift");
        view.set_frame(view.frame().translate(delta));
    }

    fn delete(&self, _view: &mut MockView, _context: &AnimationContext) {
        self.calls.borrow_mut().push("delete");
    }
}

type Log = Rc<RefCell<Vec<String>>>;

fn registry() -> ViewRegistry<MockView> {
    ViewRegistry::new().with(ViewType::DEFAULT, MockView::new)
}

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item{i}")).collect()
}

fn column(data: Vec<String>, height: f64) -> ItemProvider<String, MockView> {
    ItemProvider::new(
        data,
        move |_, _, collection: Size| Size::new(collection.width, height),
        |view: &mut MockView, d: &String, _| view.label = d.clone(),
    )
    .with_identifier_source(|d: &String, _| d.clone())
}

fn logged_column(data: Vec<String>, height: f64, log: &Log) -> ItemProvider<String, MockView> {
    let appear = Rc::clone(log);
    let disappear = Rc::clone(log);
    column(data, height)
        .with_on_appear(move |_, d: &String, _| appear.borrow_mut().push(format!("appear:{d}")))
        .with_on_disappear(move |_, id: &str| {
            disappear.borrow_mut().push(format!("disappear:{id}"))
        })
}

fn grid_over(provider: impl Provider<MockView> + 'static, width: f64, height: f64) -> Grid<MockView> {
    let mut grid = Grid::new(registry());
    grid.set_bounds(Rect::new(0.0, 0.0, width, height));
    grid.set_provider(provider);
    assert_eq!(grid.layout_if_needed(), Some(PassKind::Reload));
    grid
}

fn view_id(grid: &Grid<MockView>, identifier: &str) -> Option<usize> {
    grid.view(identifier).map(|v| v.id)
}

fn fixed_column_layout(count: usize, height: f64) -> StackLayout {
    let mut layout = StackLayout::column();
    let mut context = SizesContext::from_sizes(
        Size::new(100.0, 300.0),
        (0..count).map(|_| Size::new(100.0, height)),
    );
    layout.layout(&mut context);
    layout
}

fn brute_force_visible(frames: &[Rect], start: f64, end: f64) -> Vec<usize> {
    frames
        .iter()
        .enumerate()
        .filter(|(_, f)| f.min_y() < end && f.max_y() > start)
        .map(|(i, _)| i)
        .collect()
}

// Layouts.

#[test]
fn column_visible_indexes_for_scrolled_viewport() {
    let layout = fixed_column_layout(100, 50.0);
    let viewport = Rect::new(0.0, 500.0, 100.0, 300.0);
    assert_eq!(
        layout.visible_indexes(viewport, viewport),
        (10..=15).collect::<Vec<_>>()
    );
    assert_eq!(layout.content_size(), Size::new(100.0, 5000.0));
}

#[test]
fn item_ending_on_the_viewport_edge_is_not_visible() {
    let layout = fixed_column_layout(100, 50.0);
    let viewport = Rect::new(0.0, 500.0, 100.0, 300.0);
    assert_eq!(layout.frame(9).max_y(), 500.0);
    assert!(!layout.frame(9).intersects(&viewport));
    assert!(!layout.visible_indexes(viewport, viewport).contains(&9));
    // An item starting on the trailing edge is not visible either.
    assert_eq!(layout.frame(16).min_y(), 800.0);
    assert!(!layout.visible_indexes(viewport, viewport).contains(&16));
}

#[test]
fn layout_twice_yields_identical_frames() {
    let mut rng = Lcg::new(7);
    let sizes: Vec<Size> = (0..60)
        .map(|_| Size::new(rng.gen_range_f64(10, 90), rng.gen_range_f64(10, 60)))
        .collect();
    let mut context = SizesContext::from_sizes(Size::new(240.0, 400.0), sizes.clone());
    let mut layout = FlowLayout::new().with_spacing(4.0);

    layout.layout(&mut context);
    let first: Vec<Rect> = (0..sizes.len()).map(|i| layout.frame(i)).collect();
    let first_size = layout.content_size();

    layout.layout(&mut context);
    let second: Vec<Rect> = (0..sizes.len()).map(|i| layout.frame(i)).collect();
    assert_eq!(first, second);
    assert_eq!(first_size, layout.content_size());
}

#[test]
fn flow_wraps_when_next_item_overflows() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 300.0), (0..5).map(|_| Size::new(40.0, 20.0)));
    let mut layout = FlowLayout::new();
    layout.layout(&mut context);
    assert_eq!(layout.frame(0), Rect::new(0.0, 0.0, 40.0, 20.0));
    assert_eq!(layout.frame(1), Rect::new(40.0, 0.0, 40.0, 20.0));
    assert_eq!(layout.frame(2), Rect::new(0.0, 20.0, 40.0, 20.0));
    assert_eq!(layout.frame(4), Rect::new(0.0, 40.0, 40.0, 20.0));
    assert_eq!(layout.content_size().height, 60.0);
}

#[test]
fn flow_keeps_exact_fit_on_the_same_line() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 300.0), (0..2).map(|_| Size::new(50.0, 20.0)));
    let mut layout = FlowLayout::new();
    layout.layout(&mut context);
    assert_eq!(layout.frame(1).min_y(), 0.0);
    assert_eq!(layout.frame(1).min_x(), 50.0);
}

#[test]
fn waterfall_places_items_in_the_shortest_column() {
    let heights = [100.0, 50.0, 30.0, 40.0];
    let mut context = SizesContext::from_sizes(
        Size::new(100.0, 300.0),
        heights.iter().map(|&h| Size::new(50.0, h)),
    );
    let mut layout = WaterfallLayout::new(2);
    layout.layout(&mut context);
    assert_eq!(layout.frame(0).origin, Point::new(0.0, 0.0));
    assert_eq!(layout.frame(1).origin, Point::new(50.0, 0.0));
    assert_eq!(layout.frame(2).origin, Point::new(50.0, 50.0));
    assert_eq!(layout.frame(3).origin, Point::new(50.0, 80.0));
    assert_eq!(layout.content_size().height, 120.0);
}

#[test]
fn sorted_frames_visible_query_matches_brute_force() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..50 {
        let mut frames = SortedFrames::new(Axis::Vertical);
        let mut all = Vec::new();
        let mut y = 0.0;
        for _ in 0..rng.gen_range_u64(1, 200) {
            let height = rng.gen_range_f64(0, 100);
            let frame = Rect::new(0.0, y, 10.0, height);
            frames.push(frame);
            all.push(frame);
            y += height + rng.gen_range_f64(0, 3);
        }
        for _ in 0..20 {
            let start = rng.gen_range_f64(0, y as u64 + 10);
            let extent = rng.gen_range_f64(1, 400);
            let visible = Rect::new(0.0, start, 10.0, extent);
            assert_eq!(
                frames.visible_indexes(visible),
                brute_force_visible(&all, start, start + extent),
                "viewport {start}..{}",
                start + extent
            );
        }
    }
}

#[test]
fn waterfall_visible_query_handles_uneven_columns() {
    let mut rng = Lcg::new(42);
    let sizes: Vec<Size> = (0..300)
        .map(|_| Size::new(30.0, rng.gen_range_f64(10, 200)))
        .collect();
    let mut context = SizesContext::from_sizes(Size::new(120.0, 500.0), sizes.clone());
    let mut layout = WaterfallLayout::new(3).with_spacing(2.0);
    layout.layout(&mut context);
    let frames: Vec<Rect> = (0..sizes.len()).map(|i| layout.frame(i)).collect();
    let height = layout.content_size().height as u64;
    for _ in 0..100 {
        let start = rng.gen_range_f64(0, height);
        let visible = Rect::new(0.0, start, 120.0, 300.0);
        assert_eq!(
            layout.visible_indexes(visible, visible),
            brute_force_visible(&frames, start, start + 300.0)
        );
    }
}

#[test]
fn inset_layout_offsets_frames_and_shrinks_the_container() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 300.0), (0..3).map(|_| Size::new(40.0, 20.0)));
    let mut layout = FlowLayout::new().inset_by(EdgeInsets::new(10.0, 20.0, 5.0, 30.0));
    layout.layout(&mut context);
    // 50 points of width remain: one item per line.
    assert_eq!(layout.frame(0).origin, Point::new(20.0, 10.0));
    assert_eq!(layout.frame(1).origin, Point::new(20.0, 30.0));
    assert_eq!(layout.content_size(), Size::new(100.0, 75.0));
}

#[test]
fn transpose_then_inset_equals_transposed_inset_then_transpose() {
    let mut rng = Lcg::new(3);
    let sizes: Vec<Size> = (0..40)
        .map(|_| Size::new(rng.gen_range_f64(5, 50), rng.gen_range_f64(5, 50)))
        .collect();
    let insets = EdgeInsets::new(1.0, 2.0, 3.0, 4.0);

    let mut a = FlowLayout::new().transposed().inset_by(insets);
    let mut b = FlowLayout::new()
        .inset_by(insets.transposed())
        .transposed();
    a.layout(&mut SizesContext::from_sizes(Size::new(300.0, 200.0), sizes.clone()));
    b.layout(&mut SizesContext::from_sizes(Size::new(300.0, 200.0), sizes.clone()));

    for i in 0..sizes.len() {
        assert_eq!(a.frame(i), b.frame(i), "item {i}");
    }
    assert_eq!(a.content_size(), b.content_size());
}

#[test]
fn transposed_flow_scrolls_horizontally() {
    let mut context =
        SizesContext::from_sizes(Size::new(300.0, 100.0), (0..5).map(|_| Size::new(20.0, 40.0)));
    let mut layout = FlowLayout::new().transposed();
    layout.layout(&mut context);
    // Columns of two items, growing to the right.
    assert_eq!(layout.frame(1).origin, Point::new(0.0, 40.0));
    assert_eq!(layout.frame(2).origin, Point::new(20.0, 0.0));
    let viewport = Rect::new(25.0, 0.0, 10.0, 100.0);
    assert_eq!(layout.visible_indexes(viewport, viewport), vec![2, 3]);
}

#[test]
fn visible_frame_inset_extends_the_query_only() {
    let mut layout = fixed_column_layout(100, 50.0).inset_visible_frame_by(EdgeInsets::uniform(50.0));
    layout.layout(&mut SizesContext::from_sizes(
        Size::new(100.0, 300.0),
        (0..100).map(|_| Size::new(100.0, 50.0)),
    ));
    let viewport = Rect::new(0.0, 500.0, 100.0, 300.0);
    assert_eq!(
        layout.visible_indexes(viewport, viewport),
        (9..=16).collect::<Vec<_>>()
    );
    assert_eq!(layout.frame(10), Rect::new(0.0, 500.0, 100.0, 50.0));
}

#[test]
fn row_justify_center_uses_leftover_space() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 50.0), (0..2).map(|_| Size::new(20.0, 10.0)));
    let mut layout = StackLayout::row().with_justify_content(JustifyContent::Center);
    layout.layout(&mut context);
    assert_eq!(layout.frame(0).min_x(), 30.0);
    assert_eq!(layout.frame(1).min_x(), 50.0);
}

#[test]
fn overlay_stacks_every_item_on_the_container() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 300.0), (0..3).map(|_| Size::new(10.0, 10.0)));
    let mut layout = OverlayLayout::new();
    layout.layout(&mut context);
    for i in 0..3 {
        assert_eq!(layout.frame(i), Rect::new(0.0, 0.0, 100.0, 300.0));
    }
}

#[test]
fn closure_layout_uses_the_supplied_frames() {
    let mut context =
        SizesContext::from_sizes(Size::new(100.0, 300.0), (0..4).map(|_| Size::new(10.0, 10.0)));
    let mut layout = ClosureLayout::new(|i, size, _| {
        Rect::new(0.0, i as f64 * 100.0, size.width, size.height)
    });
    layout.layout(&mut context);
    assert_eq!(layout.frame(2), Rect::new(0.0, 200.0, 10.0, 10.0));
    let viewport = Rect::new(0.0, 150.0, 100.0, 100.0);
    assert_eq!(layout.visible_indexes(viewport, viewport), vec![2]);
}

// Identifiers and flattening.

#[test]
fn duplicate_identifiers_get_numbered_suffixes() {
    let ids = disambiguate(["a", "a", "b"].map(String::from));
    assert_eq!(ids, ["a", "a(1)", "b"]);

    let ids = disambiguate(["a", "a", "a(1)", "a"].map(String::from));
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(ids[0], "a");
    assert_eq!(ids[2], "a(1)");
}

#[test]
fn grid_disambiguates_duplicate_item_identifiers() {
    let data = ["a", "a", "b"].map(String::from).to_vec();
    let grid = grid_over(column(data, 50.0), 100.0, 300.0);
    assert_eq!(grid.visible_identifiers(), ["a", "a(1)", "b"]);
    assert_eq!(grid.view("a(1)").map(|v| v.label.as_str()), Some("a"));
}

#[test]
fn sections_prefix_item_identifiers() {
    let sections: Vec<Box<dyn Provider<MockView>>> = vec![
        Box::new(column(["x", "y"].map(String::from).to_vec(), 50.0).with_identifier("a")),
        Box::new(column(["x", "x"].map(String::from).to_vec(), 50.0).with_identifier("b")),
        Box::new(column(vec![String::from("z")], 50.0)),
    ];
    let grid = grid_over(ComposedProvider::new(sections), 100.0, 600.0);
    let ids: Vec<&str> = grid
        .flattened()
        .items()
        .iter()
        .map(|item| item.identifier.as_str())
        .collect();
    assert_eq!(ids, ["a/x", "a/y", "b/x", "b/x(1)", "2/z"]);
    assert_eq!(grid.frame_for("b/x(1)"), Some(Rect::new(0.0, 150.0, 100.0, 50.0)));
    assert_eq!(grid.content_size().height, 250.0);
    assert_eq!(grid.visible_identifiers().len(), 5);
}

#[test]
fn nested_sections_are_queried_recursively() {
    let half = |identifier: &str| -> Box<dyn Provider<MockView>> {
        Box::new(
            ItemProvider::new(
                labels(20),
                |_, _, _| Size::new(100.0, 50.0),
                |view: &mut MockView, d: &String, _| view.label = d.clone(),
            )
            .with_identifier_source(|d: &String, _| d.clone())
            .with_identifier(identifier),
        )
    };
    let inner = vec![half("left"), half("right")];
    let mut grid = grid_over(
        ComposedProvider::new(inner).with_layout(StackLayout::row()),
        200.0,
        300.0,
    );
    grid.set_content_offset(Point::new(0.0, 500.0));
    // Each half-width column shows items 10..=15.
    let ids = grid.visible_identifiers();
    assert_eq!(ids.len(), 12);
    assert_eq!(ids[0], "left/item10");
    assert_eq!(ids[6], "right/item10");
    assert_eq!(
        grid.view("right/item10").map(|v| v.frame),
        Some(Rect::new(100.0, 500.0, 100.0, 50.0))
    );
}

// Reuse.

#[test]
fn queued_view_is_dequeued_again() {
    let mut pool = ReuseManager::new(ReuseOptions::default());
    let view = MockView::new();
    let id = view.id;
    pool.queue(ViewType::DEFAULT, view, 0);
    assert_eq!(pool.pooled_count(), 1);
    assert_eq!(pool.pooled_count_of(ViewType("other")), 0);

    let back = pool.dequeue(ViewType::DEFAULT, MockView::new);
    assert_eq!(back.id, id);
    assert!(!back.hidden);
    assert_eq!(pool.pooled_count(), 0);
}

#[test]
fn idle_pool_is_released_after_the_lifespan() {
    let mut pool = ReuseManager::new(ReuseOptions::default());
    pool.queue(ViewType::DEFAULT, MockView::new(), 0);
    pool.queue(ViewType("other"), MockView::new(), 10_000);
    assert_eq!(pool.eviction_due_ms(), Some(30_000));
    assert_eq!(pool.tick(29_999), 0);
    assert_eq!(pool.tick(30_000), 2);
    assert_eq!(pool.pooled_count(), 0);
    assert_eq!(pool.eviction_due_ms(), None);
}

#[test]
fn prewarm_fills_the_pool_on_first_use() {
    let mut pool = ReuseManager::new(ReuseOptions::default().with_prewarm_count(3));
    let created = Cell::new(0);
    let factory = || {
        created.set(created.get() + 1);
        MockView::new()
    };
    let _first = pool.dequeue(ViewType::DEFAULT, factory);
    assert_eq!(created.get(), 3);
    assert_eq!(pool.pooled_count(), 2);
    let _second = pool.dequeue(ViewType::DEFAULT, factory);
    assert_eq!(created.get(), 3);
}

#[test]
fn disabled_pool_drops_queued_views() {
    let mut pool = ReuseManager::new(ReuseOptions::disabled());
    pool.queue(ViewType::DEFAULT, MockView::new(), 0);
    assert_eq!(pool.pooled_count(), 0);
    assert_eq!(pool.eviction_due_ms(), None);
}

#[cfg(feature = "std")]
#[test]
fn thread_default_pool_is_shared() {
    let a = ReuseManager::<MockView>::thread_default();
    let b = ReuseManager::<MockView>::thread_default();
    assert!(Rc::ptr_eq(&a, &b));
}

// Grid.

#[test]
fn initial_reload_fills_the_viewport() {
    let grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    assert_eq!(grid.visible_indexes(), [0, 1, 2, 3, 4, 5]);
    assert_eq!(grid.content_size(), Size::new(100.0, 5000.0));
    assert_eq!(grid.stats().reloads, 1);
    assert_eq!(grid.stats().views_created, 6);
    let view = grid.view("item3").unwrap();
    assert_eq!(view.frame, Rect::new(0.0, 150.0, 100.0, 50.0));
    assert_eq!(view.label, "item3");
    assert!(view.attached);
    assert!(grid.visible_set().is_consistent());
}

#[test]
fn scrolling_recycles_views_through_the_pool() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    grid.set_content_offset(Point::new(0.0, 500.0));
    assert_eq!(grid.visible_indexes(), [10, 11, 12, 13, 14, 15]);
    assert_eq!(grid.stats().views_created, 6);
    assert_eq!(grid.stats().views_reused, 6);
    assert_eq!(grid.view("item10").map(|v| v.label.as_str()), Some("item10"));
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 0);
}

#[test]
fn views_are_never_both_visible_and_pooled() {
    let mut rng = Lcg::new(11);
    let mut grid = grid_over(column(labels(500), 50.0), 100.0, 300.0);
    for _ in 0..200 {
        let y = rng.gen_range_f64(0, 24_700);
        grid.set_content_offset(Point::new(0.0, y));
        assert!(grid.visible_set().is_consistent());

        let mut ids: Vec<usize> = grid.visible_set().views().iter().map(|v| v.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), grid.visible_set().len());

        let pooled = grid.reuse_manager().borrow().pooled_count() as u64;
        let stats = grid.stats();
        assert_eq!(stats.views_created, grid.visible_set().len() as u64 + pooled);
        assert!(grid.visible_set().views().iter().all(|v| v.attached && !v.hidden));
    }
}

#[test]
fn exits_are_reported_before_enters() {
    let log: Log = Rc::default();
    let mut grid = grid_over(logged_column(labels(100), 50.0, &log), 100.0, 300.0);
    let expected: Vec<String> = (0..6).map(|i| format!("appear:item{i}")).collect();
    assert_eq!(*log.borrow(), expected);

    log.borrow_mut().clear();
    grid.set_content_offset(Point::new(0.0, 500.0));
    let events = log.borrow().clone();
    assert_eq!(events.len(), 12);
    assert!(events[..6].iter().all(|e| e.starts_with("disappear:")));
    assert!(events[6..].iter().all(|e| e.starts_with("appear:")));
    assert_eq!(events[0], "disappear:item0");
    assert_eq!(events[6], "appear:item10");
}

#[test]
fn appear_requires_the_inset_adjusted_region() {
    let log: Log = Rc::default();
    let mut grid = Grid::new(registry());
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    grid.set_content_inset(EdgeInsets::new(100.0, 0.0, 0.0, 0.0));
    grid.set_provider(logged_column(labels(100), 50.0, &log));
    grid.layout_if_needed();

    assert_eq!(grid.visible_indexes(), [0, 1, 2, 3, 4, 5]);
    let expected: Vec<String> = (2..6).map(|i| format!("appear:item{i}")).collect();
    assert_eq!(*log.borrow(), expected);
    assert!(!grid.visible_set().has_appeared(1));

    // Scrolling up under the inset brings item 1 into the region.
    log.borrow_mut().clear();
    grid.set_content_offset(Point::new(0.0, -100.0));
    assert!(log.borrow().contains(&String::from("appear:item0")));
    assert!(log.borrow().contains(&String::from("appear:item1")));
}

#[test]
fn same_visible_indexes_take_the_cheap_path() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 290.0);
    let before = grid.stats();
    grid.set_content_offset(Point::new(0.0, 5.0));
    assert_eq!(grid.visible_indexes(), [0, 1, 2, 3, 4, 5]);
    let after = grid.stats();
    assert_eq!(after.cheap_passes, before.cheap_passes + 1);
    assert_eq!(after.views_created, before.views_created);
    assert_eq!(after.views_reused, before.views_reused);
}

#[test]
fn requests_inside_the_window_collapse_into_one_reload() {
    let mut grid = Grid::new(registry());
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    grid.set_provider(column(labels(10), 50.0));
    for t in [2, 4, 6, 8, 10] {
        grid.set_now_ms(t);
        grid.set_needs_reload();
    }
    assert_eq!(grid.phase(), GridPhase::NeedsReload);
    assert_eq!(grid.next_due_ms(), Some(10 + DEFAULT_COALESCE_DELAY_MS));
    assert_eq!(grid.tick(20), None);
    assert_eq!(grid.tick(26), Some(PassKind::Reload));
    assert_eq!(grid.tick(100), None);
    assert_eq!(grid.stats().reloads, 1);
    assert_eq!(grid.phase(), GridPhase::Idle);
}

#[test]
fn reload_supersedes_invalidate() {
    let mut grid = grid_over(column(labels(10), 50.0), 100.0, 300.0);

    grid.set_needs_reload();
    grid.set_needs_invalidate_layout();
    assert_eq!(grid.phase(), GridPhase::NeedsReload);
    assert_eq!(grid.layout_if_needed(), Some(PassKind::Reload));
    assert_eq!(grid.layout_if_needed(), None);

    grid.set_bounds(Rect::new(0.0, 0.0, 120.0, 300.0));
    assert_eq!(grid.phase(), GridPhase::NeedsInvalidateLayout);
    grid.set_needs_reload();
    assert_eq!(grid.phase(), GridPhase::NeedsReload);
    assert_eq!(grid.tick(1_000), Some(PassKind::Reload));
    assert_eq!(grid.tick(2_000), None);

    assert_eq!(grid.stats().reloads, 3);
    assert_eq!(grid.stats().invalidations, 0);
}

#[test]
fn resize_invalidates_layout() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    grid.set_bounds(Rect::new(0.0, 0.0, 200.0, 300.0));
    assert_eq!(grid.phase(), GridPhase::NeedsInvalidateLayout);
    assert_eq!(grid.layout_if_needed(), Some(PassKind::InvalidateLayout));
    assert_eq!(grid.stats().invalidations, 1);
    assert_eq!(grid.frame_for("item0").map(|f| f.size.width), Some(200.0));
    assert_eq!(grid.view("item0").map(|v| v.frame.size.width), Some(200.0));
}

#[test]
fn reload_from_did_reload_is_ignored() {
    let mut grid = Grid::new(registry());
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    grid.on_did_reload(move |grid| {
        seen.set(seen.get() + 1);
        assert!(grid.is_reloading());
        grid.reload();
    });
    grid.set_provider(column(labels(10), 50.0));
    grid.layout_if_needed();

    assert_eq!(calls.get(), 1);
    assert_eq!(grid.stats().reloads, 1);
    assert!(!grid.is_reloading());

    // The callback stays registered.
    grid.reload();
    assert_eq!(calls.get(), 2);
}

#[test]
fn did_reload_can_schedule_another_reload() {
    let mut grid = Grid::new(registry());
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    let once = Cell::new(false);
    grid.on_did_reload(move |grid| {
        if !once.replace(true) {
            grid.set_needs_reload();
        }
    });
    grid.set_provider(column(labels(10), 50.0));
    grid.layout_if_needed();
    assert_eq!(grid.phase(), GridPhase::NeedsReload);
    grid.layout_if_needed();
    assert_eq!(grid.stats().reloads, 2);
    assert_eq!(grid.phase(), GridPhase::Idle);
}

#[test]
fn reload_keeps_the_first_visible_item_in_place() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    grid.set_content_offset(Point::new(0.0, 500.0));
    let anchored = view_id(&grid, "item10");
    let animator = Rc::new(RecordingAnimator::default());
    grid.set_animator(animator.clone());

    let mut data: Vec<String> = (0..4).map(|i| format!("new{i}")).collect();
    data.extend(labels(100));
    grid.set_provider(column(data, 50.0));
    grid.layout_if_needed();

    assert_eq!(grid.content_offset(), Point::new(0.0, 700.0));
    assert_eq!(grid.visible_indexes(), [14, 15, 16, 17, 18, 19]);
    assert_eq!(view_id(&grid, "item10"), anchored);
    assert_eq!(grid.stats().views_created, 6);
    assert_eq!(animator.count("shift"), 6);
    assert_eq!(animator.count("insert"), 0);
    assert_eq!(animator.count("delete"), 0);
    assert_eq!(
        grid.view("item10").map(|v| v.frame),
        Some(Rect::new(0.0, 700.0, 100.0, 50.0))
    );
}

#[test]
fn reload_without_anchoring_keeps_the_offset() {
    let mut grid = Grid::with_options(registry(), GridOptions::new().with_anchor_on_reload(false));
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    grid.set_provider(column(labels(100), 50.0));
    grid.layout_if_needed();
    grid.set_content_offset(Point::new(0.0, 500.0));
    let kept = view_id(&grid, "item10");

    let mut data: Vec<String> = (0..4).map(|i| format!("new{i}")).collect();
    data.extend(labels(100));
    grid.set_provider(column(data, 50.0));
    grid.layout_if_needed();

    assert_eq!(grid.content_offset(), Point::new(0.0, 500.0));
    assert_eq!(grid.visible_identifiers()[0], "item6");
    assert_eq!(view_id(&grid, "item10"), kept);
}

#[test]
fn captured_anchor_can_be_reapplied() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    grid.set_content_offset(Point::new(0.0, 520.0));
    let anchor = capture_first_visible_anchor(&grid).unwrap();
    assert_eq!(anchor.identifier, "item10");
    assert_eq!(anchor.offset_in_viewport, Point::new(0.0, 20.0));

    grid.set_content_offset(Point::new(0.0, 0.0));
    assert!(apply_anchor(&mut grid, &anchor));
    assert_eq!(grid.content_offset(), Point::new(0.0, 520.0));

    let missing = ScrollAnchor {
        identifier: String::from("nope"),
        offset_in_viewport: Point::ZERO,
    };
    assert!(!grid.apply_anchor(&missing));
}

#[test]
fn reordering_moves_views_with_their_items() {
    let mut grid = grid_over(column(labels(6), 50.0), 100.0, 300.0);
    let ids: Vec<Option<usize>> = (0..6).map(|i| view_id(&grid, &format!("item{i}"))).collect();

    let mut data = labels(6);
    data.reverse();
    grid.set_provider(column(data, 50.0));
    grid.layout_if_needed();

    assert_eq!(grid.visible_identifiers()[0], "item5");
    for i in 0..6 {
        assert_eq!(view_id(&grid, &format!("item{i}")), ids[i]);
    }
    assert_eq!(
        grid.view("item5").map(|v| v.frame.origin),
        Some(Point::new(0.0, 0.0))
    );
}

#[test]
fn removed_items_return_their_views_to_the_pool() {
    let old_log: Log = Rc::default();
    let new_log: Log = Rc::default();
    let mut grid = grid_over(logged_column(labels(6), 50.0, &old_log), 100.0, 300.0);
    old_log.borrow_mut().clear();

    grid.set_provider(logged_column(labels(3), 50.0, &new_log));
    grid.layout_if_needed();

    assert_eq!(grid.visible_identifiers(), ["item0", "item1", "item2"]);
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 3);
    assert_eq!(
        *old_log.borrow(),
        ["disappear:item3", "disappear:item4", "disappear:item5"]
    );
    assert!(new_log.borrow().is_empty());
}

#[test]
fn replaced_provider_hears_about_its_own_items_leaving() {
    let old_log: Log = Rc::default();
    let skipped_log: Log = Rc::default();
    let new_log: Log = Rc::default();
    let mut grid = grid_over(logged_column(labels(6), 50.0, &old_log), 100.0, 300.0);
    old_log.borrow_mut().clear();

    let others: Vec<String> = (0..6).map(|i| format!("other{i}")).collect();
    // Replaced again before any reload ran: it never bound a view.
    grid.set_provider(logged_column(labels(2), 50.0, &skipped_log));
    grid.set_provider(logged_column(others, 50.0, &new_log));
    grid.layout_if_needed();

    let disappears: Vec<String> = (0..6).map(|i| format!("disappear:item{i}")).collect();
    let appears: Vec<String> = (0..6).map(|i| format!("appear:other{i}")).collect();
    assert_eq!(*old_log.borrow(), disappears);
    assert!(skipped_log.borrow().is_empty());
    assert_eq!(*new_log.borrow(), appears);

    // The next reload only talks to the current tree.
    old_log.borrow_mut().clear();
    grid.set_provider(logged_column(labels(1), 50.0, &old_log));
    grid.layout_if_needed();
    assert_eq!(new_log.borrow().len(), 12);
    assert_eq!(new_log.borrow()[6], "disappear:other0");
    assert_eq!(*old_log.borrow(), ["appear:item0"]);
}

#[test]
fn repeated_load_cells_never_allocates_again() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    let before = grid.stats();
    assert_eq!(before.views_created, 6);

    for _ in 0..5 {
        grid.load_cells();
    }
    let after = grid.stats();
    assert_eq!(after.views_created, 6);
    assert_eq!(after.views_reused, before.views_reused);
    assert_eq!(after.cheap_passes, before.cheap_passes + 5);
    assert_eq!(after.load_passes, before.load_passes + 5);
    assert_eq!(grid.visible_set().len(), 6);
}

#[test]
fn take_provider_recycles_everything() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    assert!(grid.take_provider().is_some());
    assert!(grid.visible_set().is_empty());
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 6);
    assert_eq!(grid.content_size(), Size::ZERO);
}

#[test]
fn grids_can_share_a_pool() {
    let shared = ReuseManager::<MockView>::shared(ReuseOptions::default());
    let mut a = Grid::new(registry()).with_reuse_manager(Rc::clone(&shared));
    a.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    a.set_provider(column(labels(100), 50.0));
    a.layout_if_needed();
    a.take_provider();
    assert_eq!(shared.borrow().pooled_count(), 6);

    let mut b = Grid::new(registry()).with_reuse_manager(Rc::clone(&shared));
    b.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    b.set_provider(column(labels(100), 50.0));
    b.layout_if_needed();
    assert_eq!(b.stats().views_created, 0);
    assert_eq!(b.stats().views_reused, 6);
}

#[test]
fn grid_tick_releases_idle_views() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    grid.set_now_ms(1_000);
    grid.take_provider();
    assert_eq!(grid.next_due_ms(), Some(21_000));
    grid.tick(20_999);
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 6);
    grid.tick(21_000);
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 0);
}

#[test]
fn view_types_select_factories_and_pools() {
    let registry = ViewRegistry::new()
        .with(ViewType("text"), || MockView::of_kind("text"))
        .with(ViewType("image"), || MockView::of_kind("image"));
    let provider = column(labels(100), 50.0).with_view_type(|d: &String| {
        if d.ends_with('0') {
            ViewType("image")
        } else {
            ViewType("text")
        }
    });
    let mut grid = Grid::new(registry);
    grid.set_bounds(Rect::new(0.0, 0.0, 100.0, 300.0));
    grid.set_provider(provider);
    grid.layout_if_needed();

    assert_eq!(grid.view("item0").map(|v| v.kind), Some("image"));
    assert_eq!(grid.view("item1").map(|v| v.kind), Some("text"));

    grid.set_content_offset(Point::new(0.0, 2_000.0));
    for (id, view) in grid.visible_identifiers().iter().zip(grid.visible_set().views()) {
        let expected = if id.ends_with('0') { "image" } else { "text" };
        assert_eq!(view.kind, expected, "{id}");
    }
}

#[test]
fn sticky_header_pins_to_the_top_of_its_section() {
    let sections: Vec<Box<dyn Provider<MockView>>> = vec![
        Box::new(column(labels(10), 50.0).with_identifier("a")),
        Box::new(column(labels(10), 50.0).with_identifier("b")),
    ];
    let provider = ComposedHeaderProvider::new(
        sections,
        |_, collection: Size| Size::new(collection.width, 30.0),
        |view: &mut MockView, section| view.label = format!("header{section}"),
    )
    .with_sticky_headers(true);
    let mut grid = grid_over(provider, 100.0, 300.0);
    assert_eq!(grid.visible_identifiers()[0], "a-header");
    assert_eq!(grid.view("a-header").map(|v| v.label.as_str()), Some("header0"));

    grid.set_content_offset(Point::new(0.0, 100.0));
    assert_eq!(grid.visible_identifiers()[0], "a-header");
    assert_eq!(grid.view("a-header").map(|v| v.frame.min_y()), Some(100.0));
    assert_eq!(grid.frame_for("a-header").map(|f| f.min_y()), Some(0.0));

    // Pushed up by the end of its section.
    grid.set_content_offset(Point::new(0.0, 520.0));
    assert_eq!(grid.view("a-header").map(|v| v.frame.min_y()), Some(500.0));
    assert_eq!(grid.view("b-header").map(|v| v.frame.min_y()), Some(530.0));
    assert!(grid.visible_identifiers().iter().any(|id| id == "b/item0"));
}

#[test]
fn interacting_views_are_held_instead_of_recycled() {
    let mut grid = grid_over(column(labels(100), 50.0), 100.0, 300.0);
    let dragged = view_id(&grid, "item0");
    grid.begin_interaction("item0");
    assert!(grid.is_interacting("item0"));

    grid.set_content_offset(Point::new(0.0, 1_000.0));
    assert_eq!(grid.held_view_count(), 1);
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), 0);

    grid.set_content_offset(Point::new(0.0, 0.0));
    assert_eq!(grid.held_view_count(), 0);
    assert_eq!(view_id(&grid, "item0"), dragged);
    grid.end_interaction("item0");

    grid.begin_interaction("item1");
    grid.set_content_offset(Point::new(0.0, 1_000.0));
    assert_eq!(grid.held_view_count(), 1);
    let pooled = grid.reuse_manager().borrow().pooled_count();
    grid.end_interaction("item1");
    assert_eq!(grid.held_view_count(), 0);
    assert_eq!(grid.reuse_manager().borrow().pooled_count(), pooled + 1);
}

#[test]
fn size_hash_skips_remeasuring_unchanged_items() {
    let measured = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&measured);
    let provider = ItemProvider::new(
        labels(100),
        move |_, _, collection: Size| {
            counter.fetch_add(1, Ordering::Relaxed);
            Size::new(collection.width, 50.0)
        },
        |view: &mut MockView, d: &String, _| view.label = d.clone(),
    )
    .with_identifier_source(|d: &String, _| d.clone())
    .with_size_hash(|_| String::from("fixed"));
    let mut grid = grid_over(provider, 100.0, 300.0);
    assert_eq!(measured.load(Ordering::Relaxed), 100);

    grid.set_needs_reload();
    grid.layout_if_needed();
    assert_eq!(measured.load(Ordering::Relaxed), 100);

    // A new constraint misses the cache.
    grid.set_bounds(Rect::new(0.0, 0.0, 150.0, 300.0));
    grid.layout_if_needed();
    assert_eq!(measured.load(Ordering::Relaxed), 200);
}

#[test]
fn size_cache_survives_export_and_import() {
    let mut cache = SizeCache::new();
    cache.insert("a", "h", Size::new(100.0, 300.0), Size::new(100.0, 42.0));
    let exported = cache.export();

    let mut restored = SizeCache::new();
    restored.import(exported);
    restored.begin_pass();
    assert_eq!(
        restored.get("a", "h", Size::new(100.0, 300.0)),
        Some(Size::new(100.0, 42.0))
    );
    assert_eq!(restored.get("a", "other", Size::new(100.0, 300.0)), None);
    restored.begin_pass();
    restored.begin_pass();
    assert!(restored.is_empty());
}

// Scheduling.

#[test]
fn debouncer_pushes_the_deadline_back() {
    let mut debouncer = Debouncer::new();
    assert!(!debouncer.schedule("a", 0, 10));
    assert!(debouncer.schedule("a", 5, 10));
    assert_eq!(debouncer.due_ms("a"), Some(15));
    assert_eq!(debouncer.take_due(14), None);
    assert_eq!(debouncer.take_due(15), Some("a"));
    assert!(debouncer.is_empty());
}

#[test]
fn pass_scheduler_prefers_reload() {
    let mut scheduler = PassScheduler::new(16);
    assert!(scheduler.request_invalidate_layout(0));
    scheduler.request_reload(1);
    assert!(!scheduler.is_pending(PassKind::InvalidateLayout));
    assert!(!scheduler.request_invalidate_layout(2));
    assert_eq!(scheduler.poll(16), None);
    assert_eq!(scheduler.poll(17), Some(PassKind::Reload));
    assert_eq!(scheduler.poll(100), None);
    assert_eq!(scheduler.phase(), GridPhase::Idle);

    scheduler.begin(PassKind::Reload);
    assert_eq!(scheduler.phase(), GridPhase::Reloading);
    scheduler.finish();
    assert_eq!(scheduler.phase(), GridPhase::Idle);
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "no factory for view type")]
fn missing_factory_is_a_contract_violation() {
    let provider = column(labels(3), 50.0).with_view_type(|_| ViewType("unregistered"));
    let _ = grid_over(provider, 100.0, 300.0);
}
