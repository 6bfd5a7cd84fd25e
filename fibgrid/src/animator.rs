use crate::{Point, Rect, View};

/// What the reconciler knows about the pass an animator call belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationContext {
    /// The pass follows a reload (data may have changed), not just a scroll.
    pub is_reloading: bool,
    /// How far the content offset moved since the previous pass because of anchoring.
    pub content_offset_delta: Point,
    /// The raw viewport, in content coordinates.
    pub visible_frame: Rect,
}

/// Applies frame/alpha transitions to views entering, staying in, or leaving the visible set.
///
/// Every method has a working default, so an animator only overrides what it animates.
pub trait Animator<V: View> {
    /// A view was dequeued for a newly visible item.
    fn insert(&self, view: &mut V, frame: Rect, _context: &AnimationContext) {
        view.set_frame(frame);
        view.set_alpha(1.0);
    }

    /// A retained view may have a new frame.
    fn update(&self, view: &mut V, frame: Rect, _context: &AnimationContext) {
        if view.frame() != frame {
            view.set_frame(frame);
        }
    }

    /// A retained view is moved by `delta` so it keeps its on-screen position while the
    /// content offset changes. Runs before `update`.
    fn shift(&self, view: &mut V, delta: Point, _context: &AnimationContext) {
        view.set_frame(view.frame().translate(delta));
    }

    /// A view is leaving the visible set and will be recycled right after this call.
    fn delete(&self, _view: &mut V, _context: &AnimationContext) {}
}

/// Applies every change immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultAnimator;

impl<V: View> Animator<V> for DefaultAnimator {}
