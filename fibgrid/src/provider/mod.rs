//! Providers own items (or child sections), a [`crate::Layout`], and reload hooks.
//!
//! A provider tree is flattened by the grid on every reload: leaf items keep their order,
//! sections are expanded in place, and identifiers are prefixed with their section's
//! identifier.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{Animator, Rect, Size, View, ViewType};

mod composed;
mod header;
mod items;
mod size_cache;

pub use composed::ComposedProvider;
pub use header::{ComposedHeaderProvider, HeaderBinder, HeaderSizeSource};
pub use items::{
    AppearHandler, DisappearHandler, IdentifierSource, ItemProvider, SizeHashSource, SizeSource,
    ViewBinder, ViewTypeSource,
};
pub use size_cache::SizeCache;

/// A node of the provider tree.
///
/// Every index in `0..number_of_items()` is either a leaf item (rendered by a view) or a
/// child section (`section(at)` returns `Some`). Leaf-only methods (`view_type_at`, `bind`,
/// `on_appear`, `on_disappear`) are never called for section indexes.
pub trait Provider<V: View> {
    /// The identifier of this provider inside its parent.
    fn identifier(&self) -> Option<&str> {
        None
    }

    fn number_of_items(&self) -> usize;

    /// The caller-supplied identifier of the item at `at`, before disambiguation.
    fn identifier_at(&self, at: usize) -> String;

    /// Distinguishes "same identity, different size inputs".
    fn size_hash_at(&self, _at: usize) -> Option<String> {
        None
    }

    /// The view class used to render the leaf at `at`; also its reuse pool key.
    fn view_type_at(&self, _at: usize) -> ViewType {
        ViewType::DEFAULT
    }

    /// Lays out every item (and child section) against `collection_size`.
    fn layout(&mut self, collection_size: Size);

    fn content_size(&self) -> Size;

    /// The frame of the item at `at` in this provider's coordinates.
    fn frame(&self, at: usize) -> Rect;

    /// Indexes intersecting `visible_frame`, ascending, in this provider's coordinates.
    ///
    /// Takes `&mut self` so providers can pin items (sticky headers) against
    /// `visible_frame_less_inset`; pinned frames are then reported by `frame`.
    fn visible_indexes(&mut self, visible_frame: Rect, visible_frame_less_inset: Rect)
    -> Vec<usize>;

    fn section(&self, _at: usize) -> Option<&dyn Provider<V>> {
        None
    }

    fn section_mut(&mut self, _at: usize) -> Option<&mut dyn Provider<V>> {
        None
    }

    /// Configures `view` for the leaf at `at`.
    fn bind(&self, _at: usize, _view: &mut V) {}

    /// The leaf at `at` entered the inset-adjusted visible region.
    fn on_appear(&self, _at: usize, _view: &mut V) {}

    /// The leaf with flattened identifier `identifier` left the visible region.
    ///
    /// The item may no longer exist in the data, so only its identifier is passed.
    fn on_disappear(&self, _identifier: &str, _view: &mut V) {}

    fn will_reload(&mut self) {}

    fn did_reload(&mut self) {}

    fn animator(&self) -> Option<Rc<dyn Animator<V>>> {
        None
    }
}

impl<V: View, P: Provider<V> + ?Sized> Provider<V> for alloc::boxed::Box<P> {
    fn identifier(&self) -> Option<&str> {
        (**self).identifier()
    }

    fn number_of_items(&self) -> usize {
        (**self).number_of_items()
    }

    fn identifier_at(&self, at: usize) -> String {
        (**self).identifier_at(at)
    }

    fn size_hash_at(&self, at: usize) -> Option<String> {
        (**self).size_hash_at(at)
    }

    fn view_type_at(&self, at: usize) -> ViewType {
        (**self).view_type_at(at)
    }

    fn layout(&mut self, collection_size: Size) {
        (**self).layout(collection_size);
    }

    fn content_size(&self) -> Size {
        (**self).content_size()
    }

    fn frame(&self, at: usize) -> Rect {
        (**self).frame(at)
    }

    fn visible_indexes(
        &mut self,
        visible_frame: Rect,
        visible_frame_less_inset: Rect,
    ) -> Vec<usize> {
        (**self).visible_indexes(visible_frame, visible_frame_less_inset)
    }

    fn section(&self, at: usize) -> Option<&dyn Provider<V>> {
        (**self).section(at)
    }

    fn section_mut(&mut self, at: usize) -> Option<&mut dyn Provider<V>> {
        (**self).section_mut(at)
    }

    fn bind(&self, at: usize, view: &mut V) {
        (**self).bind(at, view);
    }

    fn on_appear(&self, at: usize, view: &mut V) {
        (**self).on_appear(at, view);
    }

    fn on_disappear(&self, identifier: &str, view: &mut V) {
        (**self).on_disappear(identifier, view);
    }

    fn will_reload(&mut self) {
        (**self).will_reload();
    }

    fn did_reload(&mut self) {
        (**self).did_reload();
    }

    fn animator(&self) -> Option<Rc<dyn Animator<V>>> {
        (**self).animator()
    }
}
