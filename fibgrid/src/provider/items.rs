use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use super::{Provider, SizeCache};
use crate::{Animator, Layout, LayoutContext, Rect, Size, StackLayout, View, ViewType};

/// Identifier of a data element. Receives the element and its index.
pub type IdentifierSource<D> = Arc<dyn Fn(&D, usize) -> String + Send + Sync>;

/// Measures a data element against the collection size of the pass.
pub type SizeSource<D> = Arc<dyn Fn(usize, &D, Size) -> Size + Send + Sync>;

/// Summarizes the size-relevant inputs of a data element.
pub type SizeHashSource<D> = Arc<dyn Fn(&D) -> String + Send + Sync>;

pub type ViewTypeSource<D> = Arc<dyn Fn(&D) -> ViewType + Send + Sync>;

/// Configures a view for a data element.
pub type ViewBinder<D, V> = Rc<dyn Fn(&mut V, &D, usize)>;

pub type AppearHandler<D, V> = Rc<dyn Fn(&mut V, &D, usize)>;

/// Receives the flattened identifier; the element itself may be gone.
pub type DisappearHandler<V> = Rc<dyn Fn(&mut V, &str)>;

/// A leaf provider over a `Vec<D>`.
///
/// Measuring closures are `Send + Sync` and never see a view; binding closures run on the
/// thread that owns the views.
///
/// When a size hash source is set, measured sizes are cached by
/// `(identifier, size hash, constraint)` and reused across reloads.
pub struct ItemProvider<D, V> {
    identifier: Option<String>,
    data: Vec<D>,
    layout: Box<dyn Layout>,
    identifier_source: IdentifierSource<D>,
    size_source: SizeSource<D>,
    size_hash_source: Option<SizeHashSource<D>>,
    view_type_source: Option<ViewTypeSource<D>>,
    binder: ViewBinder<D, V>,
    appear: Option<AppearHandler<D, V>>,
    disappear: Option<DisappearHandler<V>>,
    animator: Option<Rc<dyn Animator<V>>>,
    size_cache: SizeCache,
}

impl<D, V: View> ItemProvider<D, V> {
    /// Items are identified by their index and laid out in a column until configured
    /// otherwise.
    pub fn new(
        data: Vec<D>,
        size: impl Fn(usize, &D, Size) -> Size + Send + Sync + 'static,
        bind: impl Fn(&mut V, &D, usize) + 'static,
    ) -> Self {
        Self {
            identifier: None,
            data,
            layout: Box::new(StackLayout::column()),
            identifier_source: Arc::new(|_, i| format!("{i}")),
            size_source: Arc::new(size),
            size_hash_source: None,
            view_type_source: None,
            binder: Rc::new(bind),
            appear: None,
            disappear: None,
            animator: None,
            size_cache: SizeCache::new(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_identifier_source(
        mut self,
        f: impl Fn(&D, usize) -> String + Send + Sync + 'static,
    ) -> Self {
        self.identifier_source = Arc::new(f);
        self
    }

    pub fn with_size_hash(mut self, f: impl Fn(&D) -> String + Send + Sync + 'static) -> Self {
        self.size_hash_source = Some(Arc::new(f));
        self
    }

    pub fn with_view_type(mut self, f: impl Fn(&D) -> ViewType + Send + Sync + 'static) -> Self {
        self.view_type_source = Some(Arc::new(f));
        self
    }

    pub fn with_layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn with_on_appear(mut self, f: impl Fn(&mut V, &D, usize) + 'static) -> Self {
        self.appear = Some(Rc::new(f));
        self
    }

    pub fn with_on_disappear(mut self, f: impl Fn(&mut V, &str) + 'static) -> Self {
        self.disappear = Some(Rc::new(f));
        self
    }

    pub fn with_animator(mut self, animator: Rc<dyn Animator<V>>) -> Self {
        self.animator = Some(animator);
        self
    }

    pub fn data(&self) -> &[D] {
        &self.data
    }

    /// Mutable access to the data, for use before the provider is handed to a grid.
    pub fn data_mut(&mut self) -> &mut Vec<D> {
        &mut self.data
    }

    pub fn set_data(&mut self, data: Vec<D>) {
        self.data = data;
    }

    pub fn set_layout(&mut self, layout: impl Layout + 'static) {
        self.layout = Box::new(layout);
    }

    pub fn size_cache(&self) -> &SizeCache {
        &self.size_cache
    }

    pub fn size_cache_mut(&mut self) -> &mut SizeCache {
        &mut self.size_cache
    }
}

struct ItemsContext<'a, D> {
    collection_size: Size,
    data: &'a [D],
    identifier_source: &'a IdentifierSource<D>,
    size_source: &'a SizeSource<D>,
    size_hash_source: Option<&'a SizeHashSource<D>>,
    cache: &'a mut SizeCache,
}

impl<D> LayoutContext for ItemsContext<'_, D> {
    fn collection_size(&self) -> Size {
        self.collection_size
    }

    fn number_of_items(&self) -> usize {
        self.data.len()
    }

    fn identifier(&self, at: usize) -> String {
        match self.data.get(at) {
            Some(d) => (self.identifier_source)(d, at),
            None => {
                contract_violation!("identifier queried out of range", index = at);
                String::new()
            }
        }
    }

    fn size(&mut self, at: usize, collection_size: Size) -> Size {
        let Some(d) = self.data.get(at) else {
            contract_violation!("size queried out of range", index = at);
            return Size::ZERO;
        };
        let Some(hash_source) = self.size_hash_source else {
            return (self.size_source)(at, d, collection_size);
        };
        let identifier = (self.identifier_source)(d, at);
        let hash = hash_source(d);
        if let Some(size) = self.cache.get(&identifier, &hash, collection_size) {
            return size;
        }
        let size = (self.size_source)(at, d, collection_size);
        self.cache.insert(&identifier, &hash, collection_size, size);
        size
    }
}

impl<D, V: View> Provider<V> for ItemProvider<D, V> {
    fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    fn number_of_items(&self) -> usize {
        self.data.len()
    }

    fn identifier_at(&self, at: usize) -> String {
        match self.data.get(at) {
            Some(d) => (self.identifier_source)(d, at),
            None => format!("{at}"),
        }
    }

    fn size_hash_at(&self, at: usize) -> Option<String> {
        let source = self.size_hash_source.as_ref()?;
        self.data.get(at).map(|d| source(d))
    }

    fn view_type_at(&self, at: usize) -> ViewType {
        match (&self.view_type_source, self.data.get(at)) {
            (Some(source), Some(d)) => source(d),
            _ => ViewType::DEFAULT,
        }
    }

    fn layout(&mut self, collection_size: Size) {
        self.size_cache.begin_pass();
        let mut context = ItemsContext {
            collection_size,
            data: &self.data,
            identifier_source: &self.identifier_source,
            size_source: &self.size_source,
            size_hash_source: self.size_hash_source.as_ref(),
            cache: &mut self.size_cache,
        };
        self.layout.layout(&mut context);
        vtrace!(
            items = self.data.len(),
            cached = self.size_cache.len(),
            "ItemProvider::layout"
        );
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

    fn bind(&self, at: usize, view: &mut V) {
        match self.data.get(at) {
            Some(d) => (self.binder)(view, d, at),
            None => contract_violation!("bind out of range", index = at),
        }
    }

    fn on_appear(&self, at: usize, view: &mut V) {
        if let (Some(appear), Some(d)) = (&self.appear, self.data.get(at)) {
            appear(view, d, at);
        }
    }

    fn on_disappear(&self, identifier: &str, view: &mut V) {
        if let Some(disappear) = &self.disappear {
            disappear(view, identifier);
        }
    }

    fn animator(&self) -> Option<Rc<dyn Animator<V>>> {
        self.animator.clone()
    }
}

impl<D, V> core::fmt::Debug for ItemProvider<D, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ItemProvider")
            .field("identifier", &self.identifier)
            .field("items", &self.data.len())
            .field("size_cache", &self.size_cache.len())
            .finish_non_exhaustive()
    }
}
