use alloc::string::String;

use fibgrid::{Align, Axis, Grid, Point, Rect, ScrollAnchor, Size, View};

use crate::{ClampingShim, ContentOffsetShim, Easing, OffsetContext, Tween};

fn main_of(p: Point, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => p.x,
        Axis::Vertical => p.y,
    }
}

fn with_main(p: Point, axis: Axis, main: f64) -> Point {
    match axis {
        Axis::Horizontal => Point::new(main, p.y),
        Axis::Vertical => Point::new(p.x, main),
    }
}

/// A framework-neutral controller that owns a [`Grid`] and provides common adapter
/// workflows (tweened scroll-to-item, offset correction, anchoring).
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_resize` / `on_scroll` when UI events occur
/// - `begin_tracking` / `end_tracking` around user drags
/// - `tick(now_ms)` each frame/timer tick (for tweens and coalesced grid passes)
///
/// When `tick` returns an offset, the adapter applies it to the real scroll container.
#[derive(Debug)]
pub struct GridController<V: View, S = ClampingShim> {
    grid: Grid<V>,
    shim: S,
    axis: Axis,
    tween: Option<Tween>,
    target: Option<(String, Align)>,
    is_tracking: bool,
}

impl<V: View> GridController<V> {
    pub fn new(grid: Grid<V>) -> Self {
        Self::with_shim(grid, ClampingShim)
    }
}

impl<V: View, S: ContentOffsetShim> GridController<V, S> {
    pub fn with_shim(grid: Grid<V>, shim: S) -> Self {
        Self {
            grid,
            shim,
            axis: Axis::Vertical,
            tween: None,
            target: None,
            is_tracking: false,
        }
    }

    /// The scroll axis used by scroll-to-identifier alignment.
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn grid(&self) -> &Grid<V> {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid<V> {
        &mut self.grid
    }

    pub fn into_grid(self) -> Grid<V> {
        self.grid
    }

    pub fn shim(&self) -> &S {
        &self.shim
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn cancel_animation(&mut self) {
        self.tween = None;
        self.target = None;
    }

    fn offset_context(&self) -> OffsetContext {
        OffsetContext {
            min: self.grid.min_content_offset(),
            max: self.grid.max_content_offset(),
            content_size: self.grid.content_size(),
            viewport: self.grid.bounds().size,
            is_tracking: self.is_tracking,
        }
    }

    fn corrected(&self, proposed: Point) -> Point {
        self.shim
            .adjust(proposed, &self.offset_context())
            .unwrap_or(proposed)
    }

    /// Call this when the scroll container changes size.
    pub fn on_resize(&mut self, size: Size, now_ms: u64) {
        self.grid.set_now_ms(now_ms);
        let origin = self.grid.content_offset();
        self.grid.set_bounds(Rect::from_origin_size(origin, size));
    }

    /// Call this when the UI reports a scroll offset change (e.g. user wheel/drag).
    ///
    /// This cancels any active tween. Returns the offset after the shim's correction; when it
    /// differs from `offset`, the adapter writes it back to the scroll container.
    pub fn on_scroll(&mut self, offset: Point, now_ms: u64) -> Point {
        self.cancel_animation();
        self.grid.set_now_ms(now_ms);
        let offset = self.corrected(offset);
        self.grid.set_content_offset(offset);
        offset
    }

    pub fn begin_tracking(&mut self) {
        self.cancel_animation();
        self.is_tracking = true;
    }

    /// Ends a user drag and settles the offset through the shim.
    pub fn end_tracking(&mut self, now_ms: u64) -> Point {
        self.is_tracking = false;
        self.grid.set_now_ms(now_ms);
        let offset = self.corrected(self.grid.content_offset());
        self.grid.set_content_offset(offset);
        offset
    }

    /// Advances the controller.
    ///
    /// Runs due grid passes first. If a tween is active, moves the content offset and returns
    /// it; otherwise returns `None`. A tween aimed at an identifier follows the item when a
    /// reload moves it.
    pub fn tick(&mut self, now_ms: u64) -> Option<Point> {
        self.grid.tick(now_ms);
        let mut tween = self.tween?;

        if let Some((identifier, align)) = &self.target {
            match self.offset_for_identifier(identifier, *align) {
                Some(to) if to != tween.to => {
                    let remaining = tween.remaining_ms(now_ms);
                    tween.retarget(now_ms, to, remaining);
                }
                Some(_) => {}
                None => {
                    self.cancel_animation();
                    return None;
                }
            }
        }

        let offset = self.grid.clamp_content_offset(tween.sample(now_ms));
        self.grid.set_content_offset(offset);
        if tween.is_done(now_ms) {
            self.cancel_animation();
        } else {
            self.tween = Some(tween);
        }
        Some(self.grid.content_offset())
    }

    /// The clamped content offset that shows `identifier` with `align` on the scroll axis.
    ///
    /// Alignment is relative to the region left after content insets. Returns `None` when
    /// the identifier is not in the grid.
    pub fn offset_for_identifier(&self, identifier: &str, align: Align) -> Option<Point> {
        let frame = self.grid.frame_for(identifier)?;
        let axis = self.axis;
        let insets = self.grid.content_inset();
        let leading = match axis {
            Axis::Horizontal => insets.left,
            Axis::Vertical => insets.top,
        };
        let view = self.grid.collection_size().main(axis);
        let current = self.grid.content_offset();
        let cur = main_of(current, axis);

        let start = frame.min(axis) - leading;
        let end = frame.max(axis) - leading - view;
        let main = match align {
            Align::Start => start,
            Align::End => end,
            Align::Center => (frame.min(axis) + frame.max(axis)) / 2.0 - leading - view / 2.0,
            Align::Auto => {
                let region_start = cur + leading;
                let region_end = region_start + view;
                if frame.min(axis) >= region_start && frame.max(axis) <= region_end {
                    cur
                } else if frame.min(axis) < region_start {
                    start
                } else {
                    end
                }
            }
        };
        Some(self.grid.clamp_content_offset(with_main(current, axis, main)))
    }

    /// Scrolls to `identifier` immediately (no animation).
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_identifier(
        &mut self,
        identifier: &str,
        align: Align,
        now_ms: u64,
    ) -> Option<Point> {
        let to = self.offset_for_identifier(identifier, align)?;
        Some(self.scroll_to_offset(to, now_ms))
    }

    /// Applies a scroll-to-offset immediately (no animation).
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_offset(&mut self, offset: Point, now_ms: u64) -> Point {
        self.cancel_animation();
        self.grid.set_now_ms(now_ms);
        let offset = self.grid.clamp_content_offset(offset);
        self.grid.set_content_offset(offset);
        offset
    }

    /// Starts a tween that brings `identifier` into view (adapter-driven).
    ///
    /// Returns the clamped target offset.
    pub fn start_tween_to_identifier(
        &mut self,
        identifier: &str,
        align: Align,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Option<Point> {
        let to = self.offset_for_identifier(identifier, align)?;
        self.start_tween_to_offset(to, now_ms, duration_ms, easing);
        self.target = Some((identifier.into(), align));
        Some(to)
    }

    /// Starts a tween to an offset (adapter-driven).
    ///
    /// Returns the clamped target offset.
    pub fn start_tween_to_offset(
        &mut self,
        offset: Point,
        now_ms: u64,
        duration_ms: u64,
        easing: Easing,
    ) -> Point {
        let to = self.grid.clamp_content_offset(offset);
        let from = self.grid.content_offset();
        self.grid.set_now_ms(now_ms);
        self.target = None;
        self.tween = Some(Tween::new(from, to, now_ms, duration_ms, easing));
        #[cfg(feature = "tracing")]
        tracing::debug!(
            target: "fibgrid_adapter",
            from_y = from.y,
            to_y = to.y,
            duration_ms,
            "GridController: tween started"
        );
        to
    }

    pub fn capture_anchor(&self) -> Option<ScrollAnchor> {
        self.grid.capture_anchor()
    }

    /// Applies a previously captured anchor by moving the content offset.
    ///
    /// This cancels any active tween.
    pub fn apply_anchor(&mut self, anchor: &ScrollAnchor) -> bool {
        self.cancel_animation();
        self.grid.apply_anchor(anchor)
    }
}
