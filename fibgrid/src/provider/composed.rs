use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use super::Provider;
use crate::{Animator, Layout, LayoutContext, Rect, Size, StackLayout, View};

/// A provider whose items are child providers (sections).
///
/// Each section is measured by laying it out against the constraint its parent layout
/// offers and reporting its content size.
pub struct ComposedProvider<V> {
    identifier: Option<String>,
    sections: Vec<Box<dyn Provider<V>>>,
    layout: Box<dyn Layout>,
    animator: Option<Rc<dyn Animator<V>>>,
}

impl<V: View> ComposedProvider<V> {
    pub fn new(sections: Vec<Box<dyn Provider<V>>>) -> Self {
        Self {
            identifier: None,
            sections,
            layout: Box::new(StackLayout::column()),
            animator: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn with_animator(mut self, animator: Rc<dyn Animator<V>>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn sections(&self) -> &[Box<dyn Provider<V>>] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<Box<dyn Provider<V>>> {
        &mut self.sections
    }

    pub fn set_layout(&mut self, layout: impl Layout + 'static) {
        self.layout = Box::new(layout);
    }
}

/// Identifier of a section: its own identifier, or its index.
pub(crate) fn section_identifier<V: View>(section: &dyn Provider<V>, at: usize) -> String {
    match section.identifier() {
        Some(id) => id.into(),
        None => format!("{at}"),
    }
}

/// Measures sections by laying them out.
pub(crate) struct SectionsContext<'a, V> {
    pub(crate) collection_size: Size,
    pub(crate) sections: &'a mut [Box<dyn Provider<V>>],
}

impl<V: View> LayoutContext for SectionsContext<'_, V> {
    fn collection_size(&self) -> Size {
        self.collection_size
    }

    fn number_of_items(&self) -> usize {
        self.sections.len()
    }

    fn identifier(&self, at: usize) -> String {
        match self.sections.get(at) {
            Some(section) => section_identifier(&**section, at),
            None => {
                contract_violation!("identifier queried out of range", index = at);
                String::new()
            }
        }
    }

    fn size(&mut self, at: usize, collection_size: Size) -> Size {
        match self.sections.get_mut(at) {
            Some(section) => {
                section.layout(collection_size);
                section.content_size()
            }
            None => {
                contract_violation!("size queried out of range", index = at);
                Size::ZERO
            }
        }
    }
}

impl<V: View> Provider<V> for ComposedProvider<V> {
    fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    fn number_of_items(&self) -> usize {
        self.sections.len()
    }

    fn identifier_at(&self, at: usize) -> String {
        match self.sections.get(at) {
            Some(section) => section_identifier(&**section, at),
            None => format!("{at}"),
        }
    }

    fn layout(&mut self, collection_size: Size) {
        let mut context = SectionsContext {
            collection_size,
            sections: &mut self.sections,
        };
        self.layout.layout(&mut context);
    }

    fn content_size(&self) -> Size {
        self.layout.content_size()
    }

    fn frame(&self, at: usize) -> Rect {
        self.layout.frame(at)
    }

    fn visible_indexes(
        &mut self,
        visible_frame: Rect,
        visible_frame_less_inset: Rect,
    ) -> Vec<usize> {
        self.layout
            .visible_indexes(visible_frame, visible_frame_less_inset)
    }

    fn section(&self, at: usize) -> Option<&dyn Provider<V>> {
        self.sections.get(at).map(|s| &**s as &dyn Provider<V>)
    }

    fn section_mut(&mut self, at: usize) -> Option<&mut dyn Provider<V>> {
        match self.sections.get_mut(at) {
            Some(s) => Some(&mut **s),
            None => None,
        }
    }

    fn will_reload(&mut self) {
        for section in &mut self.sections {
            section.will_reload();
        }
    }

    fn did_reload(&mut self) {
        for section in &mut self.sections {
            section.did_reload();
        }
    }

    fn animator(&self) -> Option<Rc<dyn Animator<V>>> {
        self.animator.clone()
    }
}

impl<V> core::fmt::Debug for ComposedProvider<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComposedProvider")
            .field("identifier", &self.identifier)
            .field("sections", &self.sections.len())
            .finish_non_exhaustive()
    }
}
