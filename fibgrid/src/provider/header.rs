use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::Provider;
use super::composed::section_identifier;
use crate::key::Map;
use crate::{Animator, Layout, LayoutContext, Rect, Size, StackLayout, View, ViewType};

/// Measures the header of section `section` against the constraint of the pass.
pub type HeaderSizeSource = Arc<dyn Fn(usize, Size) -> Size + Send + Sync>;

/// Configures a header view for section `section`.
pub type HeaderBinder<V> = Rc<dyn Fn(&mut V, usize)>;

/// Sections, each preceded by a header item.
///
/// Items are laid out as `[header 0, section 0, header 1, section 1, ...]`. Sticky headers
/// pin to the top edge of the inset-adjusted visible frame while their section is on
/// screen, and get pushed up by the bottom of their section. Pinning is vertical only.
pub struct ComposedHeaderProvider<V> {
    identifier: Option<String>,
    sections: Vec<Box<dyn Provider<V>>>,
    layout: Box<dyn Layout>,
    animator: Option<Rc<dyn Animator<V>>>,
    header_view_type: ViewType,
    header_size: HeaderSizeSource,
    header_binder: HeaderBinder<V>,
    sticky: bool,
    pinned: Map<usize, Rect>,
}

impl<V: View> ComposedHeaderProvider<V> {
    pub fn new(
        sections: Vec<Box<dyn Provider<V>>>,
        header_size: impl Fn(usize, Size) -> Size + Send + Sync + 'static,
        header_binder: impl Fn(&mut V, usize) + 'static,
    ) -> Self {
        Self {
            identifier: None,
            sections,
            layout: Box::new(StackLayout::column()),
            animator: None,
            header_view_type: ViewType::DEFAULT,
            header_size: Arc::new(header_size),
            header_binder: Rc::new(header_binder),
            sticky: false,
            pinned: Map::new(),
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

    pub fn with_header_view_type(mut self, view_type: ViewType) -> Self {
        self.header_view_type = view_type;
        self
    }

    pub fn with_sticky_headers(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn sections(&self) -> &[Box<dyn Provider<V>>] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut Vec<Box<dyn Provider<V>>> {
        &mut self.sections
    }

    /// Whether the header at item index `at` is currently pinned away from its laid-out frame.
    pub fn is_pinned(&self, at: usize) -> bool {
        self.pinned.contains_key(&at)
    }

    fn header_identifier(&self, section: usize) -> String {
        match self.sections.get(section) {
            Some(s) => format!("{}-header", section_identifier(&**s, section)),
            None => format!("{section}-header"),
        }
    }

    fn pin_headers(&mut self, indexes: &mut Vec<usize>, top: f64) {
        let section_count = self.sections.len();
        let mut headers: Vec<usize> = indexes
            .iter()
            .filter(|&&i| i % 2 == 1)
            .map(|&i| i - 1)
            .collect();
        indexes.append(&mut headers);
        indexes.sort_unstable();
        indexes.dedup();

        for &at in indexes.iter() {
            if at % 2 == 1 || at / 2 >= section_count {
                continue;
            }
            let header = self.layout.frame(at);
            let section = self.layout.frame(at + 1);
            let limit = section.max_y() - header.size.height;
            let y = header.min_y().max(top.min(limit));
            if y != header.min_y() {
                let pinned = Rect::new(header.min_x(), y, header.size.width, header.size.height);
                self.pinned.insert(at, pinned);
            }
        }
    }
}

struct HeaderSectionsContext<'a, V> {
    collection_size: Size,
    sections: &'a mut [Box<dyn Provider<V>>],
    header_size: &'a HeaderSizeSource,
}

impl<V: View> LayoutContext for HeaderSectionsContext<'_, V> {
    fn collection_size(&self) -> Size {
        self.collection_size
    }

    fn number_of_items(&self) -> usize {
        self.sections.len() * 2
    }

    fn identifier(&self, at: usize) -> String {
        match self.sections.get(at / 2) {
            Some(s) if at % 2 == 1 => section_identifier(&**s, at / 2),
            Some(s) => format!("{}-header", section_identifier(&**s, at / 2)),
            None => {
                contract_violation!("identifier queried out of range", index = at);
                String::new()
            }
        }
    }

    fn size(&mut self, at: usize, collection_size: Size) -> Size {
        let section = at / 2;
        match self.sections.get_mut(section) {
            Some(s) if at % 2 == 1 => {
                s.layout(collection_size);
                s.content_size()
            }
            Some(_) => (self.header_size)(section, collection_size),
            None => {
                contract_violation!("size queried out of range", index = at);
                Size::ZERO
            }
        }
    }
}

impl<V: View> Provider<V> for ComposedHeaderProvider<V> {
    fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    fn number_of_items(&self) -> usize {
        self.sections.len() * 2
    }

    fn identifier_at(&self, at: usize) -> String {
        let section = at / 2;
        match self.sections.get(section) {
            Some(s) if at % 2 == 1 => section_identifier(&**s, section),
            _ => self.header_identifier(section),
        }
    }

    fn view_type_at(&self, _at: usize) -> ViewType {
        self.header_view_type
    }

    fn layout(&mut self, collection_size: Size) {
        self.pinned.clear();
        let mut context = HeaderSectionsContext {
            collection_size,
            sections: &mut self.sections,
            header_size: &self.header_size,
        };
        self.layout.layout(&mut context);
    }

    fn content_size(&self) -> Size {
        self.layout.content_size()
    }

    fn frame(&self, at: usize) -> Rect {
        match self.pinned.get(&at) {
            Some(&pinned) => pinned,
            None => self.layout.frame(at),
        }
    }

    fn visible_indexes(
        &mut self,
        visible_frame: Rect,
        visible_frame_less_inset: Rect,
    ) -> Vec<usize> {
        self.pinned.clear();
        let mut indexes = self
            .layout
            .visible_indexes(visible_frame, visible_frame_less_inset);
        if self.sticky {
            self.pin_headers(&mut indexes, visible_frame_less_inset.min_y());
        }
        indexes
    }

    fn section(&self, at: usize) -> Option<&dyn Provider<V>> {
        if at % 2 == 0 {
            return None;
        }
        self.sections.get(at / 2).map(|s| &**s as &dyn Provider<V>)
    }

    fn section_mut(&mut self, at: usize) -> Option<&mut dyn Provider<V>> {
        if at % 2 == 0 {
            return None;
        }
        match self.sections.get_mut(at / 2) {
            Some(s) => Some(&mut **s),
            None => None,
        }
    }

    fn bind(&self, at: usize, view: &mut V) {
        (self.header_binder)(view, at / 2);
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

impl<V> core::fmt::Debug for ComposedHeaderProvider<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComposedHeaderProvider")
            .field("identifier", &self.identifier)
            .field("sections", &self.sections.len())
            .field("sticky", &self.sticky)
            .finish_non_exhaustive()
    }
}
