use alloc::vec;
use alloc::vec::Vec;

use crate::layout::{Layout, SortedFrames};
use crate::{Axis, LayoutContext, Point, Rect, Size};

/// A masonry layout: `columns` equal-width columns, each item appended to the currently
/// shortest column (leftmost on ties).
///
/// The shortest column never gets shorter, so item tops are non-decreasing and the visible
/// query keeps its binary search.
#[derive(Clone, Debug)]
pub struct WaterfallLayout {
    columns: usize,
    column_spacing: f64,
    item_spacing: f64,
    frames: SortedFrames,
    content_size: Size,
}

impl WaterfallLayout {
    pub fn new(columns: usize) -> Self {
        if columns == 0 {
            contract_violation!("WaterfallLayout needs at least one column");
        }
        Self {
            columns: columns.max(1),
            column_spacing: 0.0,
            item_spacing: 0.0,
            frames: SortedFrames::new(Axis::Vertical),
            content_size: Size::ZERO,
        }
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.column_spacing = spacing;
        self.item_spacing = spacing;
        self
    }

    pub fn with_column_spacing(mut self, column_spacing: f64) -> Self {
        self.column_spacing = column_spacing;
        self
    }

    pub fn with_item_spacing(mut self, item_spacing: f64) -> Self {
        self.item_spacing = item_spacing;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl Layout for WaterfallLayout {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let available = context.collection_size();
        let count = context.number_of_items();
        let gaps = self.column_spacing * (self.columns - 1) as f64;
        let column_width = ((available.width - gaps) / self.columns as f64).max(0.0);

        let mut heights = vec![0.0f64; self.columns];
        let mut started = vec![false; self.columns];
        self.frames.clear();
        self.frames.reserve(count);

        for i in 0..count {
            let mut column = 0;
            for c in 1..self.columns {
                if heights[c] < heights[column] {
                    column = c;
                }
            }
            let measured = context.size(i, Size::new(column_width, available.height));
            let y = if started[column] {
                heights[column] + self.item_spacing
            } else {
                heights[column]
            };
            let x = column as f64 * (column_width + self.column_spacing);
            let frame = Rect::from_origin_size(
                Point::new(x, y),
                Size::new(column_width, measured.height),
            );
            self.frames.push_with_leading(frame, heights[column]);
            heights[column] = frame.max_y();
            started[column] = true;
        }

        let height = heights.iter().copied().fold(0.0, f64::max);
        let width = if available.width.is_finite() {
            available.width
        } else {
            column_width * self.columns as f64 + gaps
        };
        self.content_size = Size::new(width, height);
        vtrace!(count, columns = self.columns, "WaterfallLayout::layout");
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
