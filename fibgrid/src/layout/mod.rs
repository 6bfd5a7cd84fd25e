//! Layouts: pure functions from a [`LayoutContext`] to a set of frames.
//!
//! Every layout caches the frames of its last pass. Wrapper layouts ([`InsetLayout`],
//! [`TransposeLayout`], [`VisibleFrameInsetLayout`]) decorate an inner layout by adjusting
//! the context on the way in and the frames/visible queries on the way out.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::{Axis, EdgeInsets, LayoutContext, Rect, Size};

mod flow;
mod simple;
mod sorted;
mod stack;
mod waterfall;
mod wrapper;

pub use flow::FlowLayout;
pub use simple::{ClosureLayout, FrameProvider, OverlayLayout};
pub use sorted::SortedFrames;
pub use stack::StackLayout;
pub use waterfall::WaterfallLayout;
pub use wrapper::{InsetLayout, TransposeLayout, VisibleFrameInsetLayout};

/// Computes frames for the items of a [`LayoutContext`].
///
/// `frame(at)` is only meaningful for `at < number_of_items` after `layout` ran at least once.
/// Before that (or out of range) implementations return [`Rect::ZERO`].
pub trait Layout {
    fn layout(&mut self, context: &mut dyn LayoutContext);

    /// The aggregate size of the last pass.
    fn content_size(&self) -> Size;

    fn frame(&self, at: usize) -> Rect;

    /// Indexes whose frames intersect `visible_frame`, ascending.
    ///
    /// `visible_frame_less_inset` is the same region after subtracting content insets; layouts
    /// that pin items (sticky headers) position against it.
    fn visible_indexes(&self, visible_frame: Rect, visible_frame_less_inset: Rect) -> Vec<usize>;
}

impl<L: Layout + ?Sized> Layout for Box<L> {
    fn layout(&mut self, context: &mut dyn LayoutContext) {
        (**self).layout(context);
    }

    fn content_size(&self) -> Size {
        (**self).content_size()
    }

    fn frame(&self, at: usize) -> Rect {
        (**self).frame(at)
    }

    fn visible_indexes(&self, visible_frame: Rect, visible_frame_less_inset: Rect) -> Vec<usize> {
        (**self).visible_indexes(visible_frame, visible_frame_less_inset)
    }
}

/// Chainable wrappers for any [`Layout`].
///
/// Wrappers apply in call order: `l.transposed().inset_by(i)` expresses `i` in the outer
/// (post-transpose) space, and is identical to `l.inset_by(i.transposed()).transposed()`.
pub trait LayoutExt: Layout + Sized {
    fn inset_by(self, insets: EdgeInsets) -> InsetLayout<Self> {
        InsetLayout::new(self, insets)
    }

    fn transposed(self) -> TransposeLayout<Self> {
        TransposeLayout::new(self)
    }

    fn inset_visible_frame_by(self, insets: EdgeInsets) -> VisibleFrameInsetLayout<Self> {
        VisibleFrameInsetLayout::new(self, insets)
    }

    fn boxed(self) -> Box<dyn Layout>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<L: Layout> LayoutExt for L {}

/// How leftover main-axis space is distributed between items (and, for flow layouts,
/// between lines).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Distribution of lines across the cross axis of a flow layout.
pub type AlignContent = JustifyContent;

impl JustifyContent {
    /// Returns `(leading offset, extra spacing between items)` for `count` items sharing
    /// `leftover` free space.
    pub fn distribute(self, leftover: f64, count: usize) -> (f64, f64) {
        if count == 0 || !(leftover > 0.0) || !leftover.is_finite() {
            return (0.0, 0.0);
        }
        let n = count as f64;
        match self {
            Self::Start => (0.0, 0.0),
            Self::Center => (leftover / 2.0, 0.0),
            Self::End => (leftover, 0.0),
            Self::SpaceBetween => {
                if count == 1 {
                    (0.0, 0.0)
                } else {
                    (0.0, leftover / (n - 1.0))
                }
            }
            Self::SpaceAround => {
                let gap = leftover / n;
                (gap / 2.0, gap)
            }
            Self::SpaceEvenly => {
                let gap = leftover / (n + 1.0);
                (gap, gap)
            }
        }
    }
}

/// Cross-axis placement of an item within its line (or the container).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlignItems {
    #[default]
    Start,
    Center,
    End,
    Stretch,
}

impl AlignItems {
    /// Returns `(offset, extent)` of an item of `size` inside a line of `line` extent.
    pub fn place(self, size: f64, line: f64) -> (f64, f64) {
        match self {
            Self::Start => (0.0, size),
            Self::Center => ((line - size) / 2.0, size),
            Self::End => (line - size, size),
            Self::Stretch => (0.0, line.max(size)),
        }
    }
}

pub(crate) fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

pub(crate) fn main_axis_interval(rect: &Rect, axis: Axis) -> (f64, f64) {
    (rect.min(axis), rect.max(axis))
}
