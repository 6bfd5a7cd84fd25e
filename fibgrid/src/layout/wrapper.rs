use alloc::string::String;
use alloc::vec::Vec;

use crate::layout::Layout;
use crate::{EdgeInsets, LayoutContext, Point, Rect, Size};

/// Lays the inner layout out in a container shrunk by `insets`, then offsets its frames.
#[derive(Clone, Debug)]
pub struct InsetLayout<L> {
    inner: L,
    insets: EdgeInsets,
}

impl<L: Layout> InsetLayout<L> {
    pub fn new(inner: L, insets: EdgeInsets) -> Self {
        Self { inner, insets }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn insets(&self) -> EdgeInsets {
        self.insets
    }

    fn offset(&self) -> Point {
        Point::new(self.insets.left, self.insets.top)
    }
}

struct InsetContext<'a> {
    inner: &'a mut dyn LayoutContext,
    insets: EdgeInsets,
}

impl LayoutContext for InsetContext<'_> {
    fn collection_size(&self) -> Size {
        self.inner.collection_size().inset_by(self.insets)
    }

    fn number_of_items(&self) -> usize {
        self.inner.number_of_items()
    }

    fn identifier(&self, at: usize) -> String {
        self.inner.identifier(at)
    }

    fn size(&mut self, at: usize, collection_size: Size) -> Size {
        self.inner.size(at, collection_size)
    }
}

impl<L: Layout> Layout for InsetLayout<L> {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let mut inset = InsetContext {
            inner: context,
            insets: self.insets,
        };
        self.inner.layout(&mut inset);
    }

    fn content_size(&self) -> Size {
        self.inner.content_size().outset_by(self.insets)
    }

    fn frame(&self, at: usize) -> Rect {
        self.inner.frame(at).translate(self.offset())
    }

    fn visible_indexes(&self, visible_frame: Rect, visible_frame_less_inset: Rect) -> Vec<usize> {
        let back = Point::ZERO - self.offset();
        self.inner.visible_indexes(
            visible_frame.translate(back),
            visible_frame_less_inset.translate(back),
        )
    }
}

/// Swaps the axes of the inner layout: a vertical layout becomes a horizontal one.
#[derive(Clone, Debug)]
pub struct TransposeLayout<L> {
    inner: L,
}

impl<L: Layout> TransposeLayout<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

struct TransposedContext<'a> {
    inner: &'a mut dyn LayoutContext,
}

impl LayoutContext for TransposedContext<'_> {
    fn collection_size(&self) -> Size {
        self.inner.collection_size().transposed()
    }

    fn number_of_items(&self) -> usize {
        self.inner.number_of_items()
    }

    fn identifier(&self, at: usize) -> String {
        self.inner.identifier(at)
    }

    fn size(&mut self, at: usize, collection_size: Size) -> Size {
        self.inner
            .size(at, collection_size.transposed())
            .transposed()
    }
}

impl<L: Layout> Layout for TransposeLayout<L> {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        let mut transposed = TransposedContext { inner: context };
        self.inner.layout(&mut transposed);
    }

    fn content_size(&self) -> Size {
        self.inner.content_size().transposed()
    }

    fn frame(&self, at: usize) -> Rect {
        self.inner.frame(at).transposed()
    }

    fn visible_indexes(&self, visible_frame: Rect, visible_frame_less_inset: Rect) -> Vec<usize> {
        self.inner
            .visible_indexes(visible_frame.transposed(), visible_frame_less_inset.transposed())
    }
}

/// Grows (or, with negative values, shrinks) the region used for visibility queries.
///
/// Positive insets load items just outside the viewport before they scroll in.
#[derive(Clone, Debug)]
pub struct VisibleFrameInsetLayout<L> {
    inner: L,
    insets: EdgeInsets,
}

impl<L: Layout> VisibleFrameInsetLayout<L> {
    pub fn new(inner: L, insets: EdgeInsets) -> Self {
        Self { inner, insets }
    }
}

impl<L: Layout> Layout for VisibleFrameInsetLayout<L> {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        self.inner.layout(context);
    }

    fn content_size(&self) -> Size {
        self.inner.content_size()
    }

    fn frame(&self, at: usize) -> Rect {
        self.inner.frame(at)
    }

    fn visible_indexes(&self, visible_frame: Rect, visible_frame_less_inset: Rect) -> Vec<usize> {
        self.inner
            .visible_indexes(visible_frame.outset_by(self.insets), visible_frame_less_inset)
    }
}
