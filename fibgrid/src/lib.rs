//! A headless engine for virtualized collection views.
//!
//! For platform-side utilities (transition animators, scroll tweens, content-offset
//! clamping), see the `fibgrid-adapter` crate.
//!
//! This crate keeps on-screen views proportional to the viewport, not to the data set:
//! - [`Layout`]s compute frames from a [`LayoutContext`] and answer "which items intersect this
//!   rect" with a binary search.
//! - [`Provider`] trees describe the data, nest sections, and bind views.
//! - [`Grid`] flattens the tree, diffs the visible set on every viewport change, and recycles
//!   views through a [`ReuseManager`].
//! - Reload and invalidate-layout requests are coalesced and run when the host calls
//!   [`Grid::tick`].
//!
//! It is UI-agnostic. A platform layer is expected to provide:
//! - a [`View`] implementation and a [`ViewRegistry`] of view factories
//! - the viewport bounds, content offset, and content insets
//! - a monotonic clock (`now_ms`) through `tick`
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod animator;
mod context;
mod flatten;
mod grid;
mod key;
mod layout;
mod options;
mod provider;
mod reconciler;
mod reuse;
mod scheduler;
mod types;
mod view;
mod visible;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use animator::{AnimationContext, Animator, DefaultAnimator};
pub use context::{LayoutContext, SizesContext};
pub use flatten::{FlatItem, Flattened, disambiguate};
pub use grid::{DidReloadCallback, Grid, GridStats};
pub use layout::{
    AlignContent, AlignItems, ClosureLayout, FlowLayout, FrameProvider, InsetLayout,
    JustifyContent, Layout, LayoutExt, OverlayLayout, SortedFrames, StackLayout,
    TransposeLayout, VisibleFrameInsetLayout, WaterfallLayout,
};
pub use options::{DEFAULT_COALESCE_DELAY_MS, DEFAULT_IDLE_LIFESPAN_MS, GridOptions, ReuseOptions};
pub use provider::{
    AppearHandler, ComposedHeaderProvider, ComposedProvider, DisappearHandler, HeaderBinder,
    HeaderSizeSource, IdentifierSource, ItemProvider, Provider, SizeCache, SizeHashSource,
    SizeSource, ViewBinder, ViewTypeSource,
};
pub use reuse::{ReuseManager, SharedReuseManager};
pub use scheduler::{Debouncer, GridPhase, PassKind, PassScheduler};
pub use types::{Align, Axis, EdgeInsets, Point, Rect, Size, ViewType};
pub use view::{Animation, View, ViewRegistry};
pub use visible::VisibleSet;
