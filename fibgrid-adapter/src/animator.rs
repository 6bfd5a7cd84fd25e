use fibgrid::{AnimationContext, Animation, Animator, Rect, View};

/// Forwards reload transitions to the platform through [`View::animate`].
///
/// Scroll passes apply frames immediately; only passes that follow a reload animate, so
/// moved and inserted items glide into place after a data change. Anchoring shifts are
/// applied without animation so transitions start from where the view is on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionAnimator {
    pub animation: Animation,
    /// Inserted views start transparent and fade in.
    pub fade_in: bool,
}

impl TransitionAnimator {
    pub fn new(animation: Animation) -> Self {
        Self {
            animation,
            fade_in: true,
        }
    }

    pub fn with_fade_in(mut self, fade_in: bool) -> Self {
        self.fade_in = fade_in;
        self
    }
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::new(Animation::new(250))
    }
}

impl<V: View> Animator<V> for TransitionAnimator {
    fn insert(&self, view: &mut V, frame: Rect, context: &AnimationContext) {
        view.set_frame(frame);
        if context.is_reloading && self.fade_in {
            view.set_alpha(0.0);
            view.animate(frame, 1.0, self.animation);
        } else {
            view.set_alpha(1.0);
        }
    }

    fn update(&self, view: &mut V, frame: Rect, context: &AnimationContext) {
        if view.frame() == frame {
            return;
        }
        if context.is_reloading {
            let alpha = view.alpha();
            view.animate(frame, alpha, self.animation);
        } else {
            view.set_frame(frame);
        }
    }
}
