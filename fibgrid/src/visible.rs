use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::{Rect, ViewType};

/// One visible item, as moved in and out of a [`VisibleSet`].
#[derive(Debug)]
pub(crate) struct VisibleEntry<V> {
    pub(crate) index: usize,
    pub(crate) identifier: String,
    pub(crate) frame: Rect,
    pub(crate) view: V,
    pub(crate) view_type: ViewType,
    pub(crate) appeared: bool,
    pub(crate) path: Rc<[usize]>,
    pub(crate) local: usize,
}

/// The items currently rendered, in ascending flat-index order.
///
/// Stored as parallel arrays; position `i` of every array describes the same item.
#[derive(Debug)]
pub struct VisibleSet<V> {
    indexes: Vec<usize>,
    identifiers: Vec<String>,
    frames: Vec<Rect>,
    views: Vec<V>,
    view_types: Vec<ViewType>,
    appeared: Vec<bool>,
    sources: Vec<(Rc<[usize]>, usize)>,
}

impl<V> VisibleSet<V> {
    pub fn new() -> Self {
        Self {
            indexes: Vec::new(),
            identifiers: Vec::new(),
            frames: Vec::new(),
            views: Vec::new(),
            view_types: Vec::new(),
            appeared: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn frames(&self) -> &[Rect] {
        &self.frames
    }

    pub fn views(&self) -> &[V] {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut [V] {
        &mut self.views
    }

    /// Whether the item at position `i` is inside the inset-adjusted region.
    pub fn has_appeared(&self, i: usize) -> bool {
        self.appeared.get(i).copied().unwrap_or(false)
    }

    pub fn position_of(&self, identifier: &str) -> Option<usize> {
        self.identifiers.iter().position(|id| id == identifier)
    }

    pub fn view(&self, identifier: &str) -> Option<&V> {
        self.views.get(self.position_of(identifier)?)
    }

    pub fn view_mut(&mut self, identifier: &str) -> Option<&mut V> {
        let i = self.position_of(identifier)?;
        self.views.get_mut(i)
    }

    /// All arrays have the same length.
    pub fn is_consistent(&self) -> bool {
        let n = self.indexes.len();
        self.identifiers.len() == n
            && self.frames.len() == n
            && self.views.len() == n
            && self.view_types.len() == n
            && self.appeared.len() == n
            && self.sources.len() == n
    }

    pub(crate) fn push(&mut self, entry: VisibleEntry<V>) {
        self.indexes.push(entry.index);
        self.identifiers.push(entry.identifier);
        self.frames.push(entry.frame);
        self.views.push(entry.view);
        self.view_types.push(entry.view_type);
        self.appeared.push(entry.appeared);
        self.sources.push((entry.path, entry.local));
    }

    pub(crate) fn set_frame(&mut self, i: usize, frame: Rect) {
        if let Some(f) = self.frames.get_mut(i) {
            *f = frame;
        }
    }

    pub(crate) fn set_appeared(&mut self, i: usize, appeared: bool) {
        if let Some(a) = self.appeared.get_mut(i) {
            *a = appeared;
        }
    }

    /// Splits position `i` into the parts the appearance pass needs.
    pub(crate) fn entry_parts_mut(
        &mut self,
        i: usize,
    ) -> Option<(&str, &mut V, &(Rc<[usize]>, usize))> {
        let identifier = self.identifiers.get(i)?;
        let view = self.views.get_mut(i)?;
        let source = self.sources.get(i)?;
        Some((identifier.as_str(), view, source))
    }

    /// Empties the set, handing every entry back in order.
    pub(crate) fn take_entries(&mut self) -> Vec<VisibleEntry<V>> {
        let indexes = core::mem::take(&mut self.indexes);
        let identifiers = core::mem::take(&mut self.identifiers);
        let frames = core::mem::take(&mut self.frames);
        let views = core::mem::take(&mut self.views);
        let view_types = core::mem::take(&mut self.view_types);
        let appeared = core::mem::take(&mut self.appeared);
        let sources = core::mem::take(&mut self.sources);
        indexes
            .into_iter()
            .zip(identifiers)
            .zip(frames)
            .zip(views)
            .zip(view_types)
            .zip(appeared)
            .zip(sources)
            .map(
                |((((((index, identifier), frame), view), view_type), appeared), (path, local))| {
                    VisibleEntry {
                        index,
                        identifier,
                        frame,
                        view,
                        view_type,
                        appeared,
                        path,
                        local,
                    }
                },
            )
            .collect()
    }
}

impl<V> Default for VisibleSet<V> {
    fn default() -> Self {
        Self::new()
    }
}
