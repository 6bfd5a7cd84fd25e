use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::layout::{Layout, SortedFrames};
use crate::{Axis, LayoutContext, Rect, Size};

/// Every item fills the container; items are stacked on top of each other.
#[derive(Clone, Debug, Default)]
pub struct OverlayLayout {
    frames: SortedFrames,
    content_size: Size,
}

impl OverlayLayout {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layout for OverlayLayout {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let available = context.collection_size();
        let count = context.number_of_items();
        let mut fill = Size::new(
            if available.width.is_finite() { available.width } else { 0.0 },
            if available.height.is_finite() { available.height } else { 0.0 },
        );
        // Unbounded axes take the largest measured extent.
        if !available.width.is_finite() || !available.height.is_finite() {
            for i in 0..count {
                let measured = context.size(i, available);
                if !available.width.is_finite() {
                    fill.width = fill.width.max(measured.width);
                }
                if !available.height.is_finite() {
                    fill.height = fill.height.max(measured.height);
                }
            }
        }
        self.frames = SortedFrames::new(Axis::Vertical);
        for _ in 0..count {
            self.frames.push(Rect::from_origin_size(Default::default(), fill));
        }
        self.content_size = fill;
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

/// Computes the frame of item `index` from its measured size and the container size.
pub type FrameProvider = Arc<dyn Fn(usize, Size, Size) -> Rect + Send + Sync>;

/// A layout whose frames come from a caller-supplied closure.
///
/// Frames carry no ordering guarantee, so the visible query is a linear scan.
#[derive(Clone)]
pub struct ClosureLayout {
    frame_provider: FrameProvider,
    frames: Vec<Rect>,
    content_size: Size,
}

impl ClosureLayout {
    pub fn new(frame_provider: impl Fn(usize, Size, Size) -> Rect + Send + Sync + 'static) -> Self {
        Self {
            frame_provider: Arc::new(frame_provider),
            frames: Vec::new(),
            content_size: Size::ZERO,
        }
    }
}

impl Layout for ClosureLayout {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let available = context.collection_size();
        let count = context.number_of_items();
        self.frames.clear();
        self.frames.reserve(count);
        let mut content = Size::ZERO;
        for i in 0..count {
            let measured = context.size(i, available);
            let frame = (self.frame_provider)(i, measured, available);
            content.width = content.width.max(frame.max_x());
            content.height = content.height.max(frame.max_y());
            self.frames.push(frame);
        }
        self.content_size = content;
    }

    fn content_size(&self) -> Size {
        self.content_size
    }

    fn frame(&self, at: usize) -> Rect {
        self.frames.get(at).copied().unwrap_or(Rect::ZERO)
    }

    fn visible_indexes(&self, visible_frame: Rect, _visible_frame_less_inset: Rect) -> Vec<usize> {
        self.frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.intersects(&visible_frame))
            .map(|(i, _)| i)
            .collect()
    }
}

impl core::fmt::Debug for ClosureLayout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClosureLayout")
            .field("frames", &self.frames.len())
            .field("content_size", &self.content_size)
            .finish_non_exhaustive()
    }
}
