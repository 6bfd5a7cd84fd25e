use alloc::vec::Vec;

use crate::layout::{AlignContent, AlignItems, JustifyContent, Layout, SortedFrames, finite_or};
use crate::{Axis, LayoutContext, Point, Rect, Size};

/// Greedy line packing: items run left to right and wrap when the next one would overflow
/// the container width.
///
/// An item that fits exactly stays on the current line. A line is as tall as its tallest
/// item. `justify_content` distributes free space within a line, `align_items` places items
/// inside their line, and `align_content` distributes lines when the content is shorter than
/// the container.
///
/// Wrap in a [`crate::TransposeLayout`] for horizontally scrolling flows.
#[derive(Clone, Debug)]
pub struct FlowLayout {
    line_spacing: f64,
    interitem_spacing: f64,
    justify_content: JustifyContent,
    align_items: AlignItems,
    align_content: AlignContent,
    frames: SortedFrames,
    content_size: Size,
}

struct Line {
    start: usize,
    end: usize,
    used: f64,
    height: f64,
}

impl FlowLayout {
    pub fn new() -> Self {
        Self {
            line_spacing: 0.0,
            interitem_spacing: 0.0,
            justify_content: JustifyContent::Start,
            align_items: AlignItems::Start,
            align_content: AlignContent::Start,
            frames: SortedFrames::new(Axis::Vertical),
            content_size: Size::ZERO,
        }
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.line_spacing = spacing;
        self.interitem_spacing = spacing;
        self
    }

    pub fn with_line_spacing(mut self, line_spacing: f64) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn with_interitem_spacing(mut self, interitem_spacing: f64) -> Self {
        self.interitem_spacing = interitem_spacing;
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

    pub fn with_align_content(mut self, align_content: AlignContent) -> Self {
        self.align_content = align_content;
        self
    }

    fn pack_lines(&self, sizes: &[Size], width: f64) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current = Line {
            start: 0,
            end: 0,
            used: 0.0,
            height: 0.0,
        };
        for (i, size) in sizes.iter().enumerate() {
            let is_empty = current.end == current.start;
            let needed = if is_empty {
                size.width
            } else {
                current.used + self.interitem_spacing + size.width
            };
            if !is_empty && needed > width {
                let next_start = current.end;
                lines.push(current);
                current = Line {
                    start: next_start,
                    end: next_start,
                    used: 0.0,
                    height: 0.0,
                };
                current.used = size.width;
            } else {
                current.used = needed;
            }
            current.end = i + 1;
            current.height = current.height.max(size.height);
        }
        if current.end > current.start {
            lines.push(current);
        }
        lines
    }
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Layout for FlowLayout {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let available = context.collection_size();
        let count = context.number_of_items();
        let mut sizes = Vec::with_capacity(count);
        for i in 0..count {
            sizes.push(context.size(i, available));
        }

        let width = available.width;
        let lines = self.pack_lines(&sizes, width);

        let total_height = lines.iter().map(|l| l.height).sum::<f64>()
            + self.line_spacing * lines.len().saturating_sub(1) as f64;
        let (mut y, extra_line_gap) = if available.height.is_finite() {
            self.align_content
                .distribute(available.height - total_height, lines.len())
        } else {
            (0.0, 0.0)
        };

        self.frames.clear();
        self.frames.reserve(count);
        let mut max_used = 0.0f64;
        for (line_index, line) in lines.iter().enumerate() {
            let n = line.end - line.start;
            let (mut x, extra_gap) = if width.is_finite() {
                self.justify_content.distribute(width - line.used, n)
            } else {
                (0.0, 0.0)
            };
            max_used = max_used.max(line.used);
            for (k, size) in sizes[line.start..line.end].iter().enumerate() {
                let (dy, height) = self.align_items.place(size.height, line.height);
                let frame = Rect::from_origin_size(
                    Point::new(x, y + dy),
                    Size::new(size.width, height),
                );
                self.frames.push_with_leading(frame, y);
                x += size.width;
                if k + 1 < n {
                    x += self.interitem_spacing + extra_gap;
                }
            }
            y += line.height;
            if line_index + 1 < lines.len() {
                y += self.line_spacing + extra_line_gap;
            }
        }

        let content_height = match self.align_content {
            AlignContent::Start => y,
            _ => y.max(finite_or(available.height, 0.0)),
        };
        self.content_size = Size::new(finite_or(width, max_used).max(max_used), content_height);
        vtrace!(count, lines = lines.len(), "FlowLayout::layout");
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
