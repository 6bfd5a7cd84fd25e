use alloc::vec::Vec;

use crate::layout::{AlignItems, JustifyContent, Layout, SortedFrames, finite_or};
use crate::{Axis, LayoutContext, Point, Rect, Size};

/// Places items one after another along a single axis.
///
/// A column (`Axis::Vertical`) is the classic scrolling list. A row (`Axis::Horizontal`,
/// built with [`StackLayout::row`]) fits its container: every item is measured against the
/// space left on the main axis and clamped to it, so the tail never overflows.
#[derive(Clone, Debug)]
pub struct StackLayout {
    axis: Axis,
    spacing: f64,
    justify_content: JustifyContent,
    align_items: AlignItems,
    fits_container: bool,
    frames: SortedFrames,
    content_size: Size,
}

impl StackLayout {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            spacing: 0.0,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Start,
            fits_container: false,
            frames: SortedFrames::new(axis),
            content_size: Size::ZERO,
        }
    }

    /// A vertical, unbounded list.
    pub fn column() -> Self {
        Self::new(Axis::Vertical)
    }

    /// A horizontal stack that fits the container width.
    pub fn row() -> Self {
        Self::new(Axis::Horizontal).with_fits_container(true)
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_justify_content(mut self, justify_content: JustifyContent) -> Self {
        self.justify_content = justify_content;
        self
    }

    pub fn with_align_items(mut self, align_items: AlignItems) -> Self {
        self.align_items = align_items;
        self
    }

    pub fn with_fits_container(mut self, fits_container: bool) -> Self {
        self.fits_container = fits_container;
        self
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }
}

impl Default for StackLayout {
    fn default() -> Self {
        Self::column()
    }
}

impl Layout for StackLayout {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let axis = self.axis;
        let available = context.collection_size();
        let main_available = available.main(axis);
        let cross_available = finite_or(available.cross(axis), 0.0);
        let count = context.number_of_items();

        let mut sizes = Vec::with_capacity(count);
        let mut remaining = main_available;
        for i in 0..count {
            let constraint = if self.fits_container {
                Size::from_main_cross(axis, remaining.max(0.0), available.cross(axis))
            } else {
                available
            };
            let mut size = context.size(i, constraint);
            if self.fits_container {
                let main = size.main(axis).min(remaining.max(0.0));
                size = Size::from_main_cross(axis, main, size.cross(axis));
                remaining -= main + self.spacing;
            }
            sizes.push(size);
        }

        let used = sizes.iter().map(|s| s.main(axis)).sum::<f64>()
            + self.spacing * count.saturating_sub(1) as f64;
        let (mut cursor, extra) = if self.fits_container && main_available.is_finite() {
            self.justify_content
                .distribute(main_available - used, count)
        } else {
            (0.0, 0.0)
        };

        let max_cross = sizes.iter().map(|s| s.cross(axis)).fold(0.0, f64::max);
        let line_cross = match self.align_items {
            AlignItems::Start => max_cross,
            _ => cross_available.max(max_cross),
        };

        self.frames.clear();
        self.frames.reserve(count);
        for (i, size) in sizes.iter().enumerate() {
            let (cross_offset, cross_extent) = self.align_items.place(size.cross(axis), line_cross);
            let origin = match axis {
                Axis::Horizontal => Point::new(cursor, cross_offset),
                Axis::Vertical => Point::new(cross_offset, cursor),
            };
            let size = Size::from_main_cross(axis, size.main(axis), cross_extent);
            self.frames.push(Rect::from_origin_size(origin, size));
            cursor += size.main(axis);
            if i + 1 < count {
                cursor += self.spacing + extra;
            }
        }

        let main_extent = if self.fits_container && main_available.is_finite() {
            main_available.max(cursor)
        } else {
            cursor
        };
        self.content_size = Size::from_main_cross(axis, main_extent, line_cross);
        vtrace!(count, main = main_extent, "StackLayout::layout");
    }

    fn content_size(&self) -> Size {
        self.content_size
    }

    fn frame(&self, at: usize) -> Rect {
        self.frames.frame(at)
    }

    fn visible_indexes(&self, visible_frame: Rect, _visible_frame_less_inset: Rect) -> Vec<usize> {
        self.frames.visible_indexes(visible_frame)
    }
}
