use alloc::boxed::Box;

use crate::key::Map;
use crate::{Rect, ViewType};

/// A platform view as seen by the engine: a positionable box that can be attached to and
/// detached from the grid's container.
///
/// The engine never creates views itself; it asks a [`ViewRegistry`] factory and recycles
/// them through a [`crate::ReuseManager`].
pub trait View {
    fn frame(&self) -> Rect;

    fn set_frame(&mut self, frame: Rect);

    fn alpha(&self) -> f64 {
        1.0
    }

    fn set_alpha(&mut self, _alpha: f64) {}

    fn set_hidden(&mut self, _hidden: bool) {}

    /// Adds the view to the grid's container.
    fn attach(&mut self) {}

    /// Removes the view from the grid's container.
    fn detach(&mut self) {}

    /// Called when a view comes out of a reuse pool, before it is bound to new data.
    fn prepare_for_reuse(&mut self) {}

    /// Animates to `frame`/`alpha` using the platform's animation API.
    ///
    /// The default applies the target state immediately.
    fn animate(&mut self, frame: Rect, alpha: f64, _animation: Animation) {
        self.set_frame(frame);
        self.set_alpha(alpha);
    }
}

/// Timing for a platform animation request.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Animation {
    pub duration_ms: u64,
    pub delay_ms: u64,
}

impl Animation {
    pub const NONE: Animation = Animation {
        duration_ms: 0,
        delay_ms: 0,
    };

    pub const fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            delay_ms: 0,
        }
    }
}

type ViewFactory<V> = Box<dyn FnMut() -> V>;

/// Maps a [`ViewType`] to the factory that creates views of that type.
///
/// The factory is resolved once per type; binding data to a view never downcasts.
pub struct ViewRegistry<V> {
    factories: Map<ViewType, ViewFactory<V>>,
    fallback: Option<ViewFactory<V>>,
}

impl<V> ViewRegistry<V> {
    pub fn new() -> Self {
        Self {
            factories: Map::new(),
            fallback: None,
        }
    }

    pub fn register(&mut self, view_type: ViewType, factory: impl FnMut() -> V + 'static) {
        vdebug!(view_type = view_type.name(), "ViewRegistry::register");
        self.factories.insert(view_type, Box::new(factory));
    }

    pub fn with(mut self, view_type: ViewType, factory: impl FnMut() -> V + 'static) -> Self {
        self.register(view_type, factory);
        self
    }

    /// A factory used for types without a registration.
    pub fn set_fallback(&mut self, factory: impl FnMut() -> V + 'static) {
        self.fallback = Some(Box::new(factory));
    }

    pub fn with_fallback(mut self, factory: impl FnMut() -> V + 'static) -> Self {
        self.set_fallback(factory);
        self
    }

    pub fn contains(&self, view_type: ViewType) -> bool {
        self.factories.contains_key(&view_type) || self.fallback.is_some()
    }

    /// Creates a view of `view_type`, or `None` when nothing can build it.
    pub fn create(&mut self, view_type: ViewType) -> Option<V> {
        if let Some(factory) = self.factories.get_mut(&view_type) {
            return Some(factory());
        }
        self.fallback.as_mut().map(|factory| factory())
    }
}

impl<V> Default for ViewRegistry<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> core::fmt::Debug for ViewRegistry<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("types", &self.factories.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
