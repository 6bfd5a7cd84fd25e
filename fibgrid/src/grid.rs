use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::reconciler::{LoadPass, Reconciler};
use crate::{
    AnimationContext, Animator, DefaultAnimator, EdgeInsets, Flattened, GridOptions, GridPhase,
    PassKind, PassScheduler, Point, Provider, Rect, ReuseManager, ScrollAnchor,
    SharedReuseManager, Size, View, ViewRegistry, VisibleSet, anchor,
};

/// Called after every completed reload, with the grid itself.
pub type DidReloadCallback<V> = Box<dyn FnMut(&mut Grid<V>)>;

/// Counters for one grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridStats {
    pub reloads: u64,
    pub invalidations: u64,
    pub load_passes: u64,
    /// Load passes that found the same visible indexes and only re-checked appearance.
    pub cheap_passes: u64,
    pub views_created: u64,
    pub views_reused: u64,
}

/// A viewport-driven virtualized grid.
///
/// The host owns the clock and the platform views' container. It reports viewport changes
/// (`set_bounds`, `set_content_offset`, `set_content_inset`) and calls [`Grid::tick`] from
/// its frame or timer callback. Reload and invalidate requests are coalesced and run from
/// `tick` once their window elapses, or immediately through [`Grid::layout_if_needed`].
///
/// Requests are stamped with the time of the last `tick` (or [`Grid::set_now_ms`]).
pub struct Grid<V: View> {
    options: GridOptions,
    provider: Option<Box<dyn Provider<V>>>,
    /// The tree the visible views were bound from, until the next reload retires them.
    retired: Option<Box<dyn Provider<V>>>,
    provider_replaced: bool,
    flat: Flattened,
    reconciler: Reconciler<V>,
    reuse: SharedReuseManager<V>,
    owns_pool: bool,
    registry: ViewRegistry<V>,
    animator: Rc<dyn Animator<V>>,
    scheduler: PassScheduler,
    bounds: Rect,
    content_inset: EdgeInsets,
    content_size: Size,
    now_ms: u64,
    reloading: bool,
    generation: u64,
    did_reload: Vec<DidReloadCallback<V>>,
    stats: GridStats,
}

impl<V: View> Grid<V> {
    pub fn new(registry: ViewRegistry<V>) -> Self {
        Self::with_options(registry, GridOptions::default())
    }

    pub fn with_options(registry: ViewRegistry<V>, options: GridOptions) -> Self {
        Self {
            options,
            provider: None,
            retired: None,
            provider_replaced: false,
            flat: Flattened::default(),
            reconciler: Reconciler::new(),
            reuse: ReuseManager::shared(options.reuse),
            owns_pool: true,
            registry,
            animator: Rc::new(DefaultAnimator),
            scheduler: PassScheduler::new(options.coalesce_delay_ms),
            bounds: Rect::ZERO,
            content_inset: EdgeInsets::ZERO,
            content_size: Size::ZERO,
            now_ms: 0,
            reloading: false,
            generation: 0,
            did_reload: Vec::new(),
            stats: GridStats::default(),
        }
    }

    /// Shares `reuse` with other grids. Visible views go back to the previous pool.
    pub fn with_reuse_manager(mut self, reuse: SharedReuseManager<V>) -> Self {
        self.clear_visible(false);
        self.reuse = reuse;
        self.owns_pool = false;
        self
    }

    pub fn reuse_manager(&self) -> &SharedReuseManager<V> {
        &self.reuse
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: GridOptions) {
        self.scheduler.set_delay_ms(options.coalesce_delay_ms);
        if self.owns_pool {
            if let Ok(mut reuse) = self.reuse.try_borrow_mut() {
                reuse.set_options(options.reuse);
            }
        }
        self.options = options;
    }

    pub fn registry(&self) -> &ViewRegistry<V> {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ViewRegistry<V> {
        &mut self.registry
    }

    /// Used for items whose providers have no animator.
    pub fn set_animator(&mut self, animator: Rc<dyn Animator<V>>) {
        self.animator = animator;
    }

    // Provider and reloading.

    /// Replaces the provider tree and schedules a reload.
    ///
    /// Visible views stay until the reload diffs them against the new tree. Views that leave
    /// get their disappear callbacks and exit animations from the tree that bound them.
    /// This is also how changed data is published: build a provider over the new data and
    /// assign it.
    pub fn set_provider(&mut self, provider: impl Provider<V> + 'static) {
        let previous = self.provider.replace(Box::new(provider));
        // A provider replaced before its first reload never bound a view.
        if !self.provider_replaced {
            self.retired = previous;
        }
        self.provider_replaced = true;
        self.set_needs_reload();
    }

    /// Removes the provider, recycling every visible view.
    pub fn take_provider(&mut self) -> Option<Box<dyn Provider<V>>> {
        self.clear_visible(true);
        self.retired = None;
        self.provider_replaced = false;
        self.flat = Flattened::default();
        self.content_size = Size::ZERO;
        self.provider.take()
    }

    pub fn provider(&self) -> Option<&dyn Provider<V>> {
        self.provider.as_deref()
    }

    /// Trait-level access to the current tree. Data changes go through [`Grid::set_provider`].
    pub fn provider_mut(&mut self) -> Option<&mut dyn Provider<V>> {
        match self.provider.as_mut() {
            Some(p) => Some(&mut **p),
            None => None,
        }
    }

    pub fn set_needs_reload(&mut self) {
        self.scheduler.request_reload(self.now_ms);
    }

    /// Ignored while a reload is pending.
    pub fn set_needs_invalidate_layout(&mut self) {
        self.scheduler.request_invalidate_layout(self.now_ms);
    }

    pub fn phase(&self) -> GridPhase {
        self.scheduler.phase()
    }

    pub fn is_reloading(&self) -> bool {
        self.reloading
    }

    /// Registers a callback fired after every completed reload.
    pub fn on_did_reload(&mut self, callback: impl FnMut(&mut Grid<V>) + 'static) {
        self.did_reload.push(Box::new(callback));
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Advances the grid clock without running anything. Time never goes backwards.
    pub fn set_now_ms(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Runs the pass that is due, if any, then the reuse pool's idle timer.
    pub fn tick(&mut self, now_ms: u64) -> Option<PassKind> {
        self.set_now_ms(now_ms);
        let ran = self.scheduler.poll(self.now_ms);
        if let Some(kind) = ran {
            self.run_pass(kind);
        }
        if let Ok(mut reuse) = self.reuse.try_borrow_mut() {
            reuse.tick(self.now_ms);
        }
        ran
    }

    /// Runs a pending pass now, ignoring the coalescing window.
    pub fn layout_if_needed(&mut self) -> Option<PassKind> {
        let kind = self.scheduler.flush()?;
        self.run_pass(kind);
        Some(kind)
    }

    /// When `tick` has work next: a pending pass or the pool's idle eviction.
    pub fn next_due_ms(&self) -> Option<u64> {
        let eviction = self
            .reuse
            .try_borrow()
            .ok()
            .and_then(|r| r.eviction_due_ms());
        match (self.scheduler.next_due_ms(), eviction) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn run_pass(&mut self, kind: PassKind) {
        match kind {
            PassKind::Reload => self.reload(),
            PassKind::InvalidateLayout => self.invalidate_layout(),
        }
    }

    /// Re-reads the provider tree, lays it out, and reconciles the visible set.
    ///
    /// Calling this from inside a reload (e.g. a did-reload callback) does nothing.
    pub fn reload(&mut self) {
        if self.reloading {
            vtrace!("Grid::reload: already reloading");
            return;
        }
        let Some(mut provider) = self.provider.take() else {
            self.scheduler.begin(PassKind::Reload);
            self.clear_visible(false);
            self.retired = None;
            self.flat = Flattened::default();
            self.content_size = Size::ZERO;
            self.scheduler.finish();
            return;
        };
        self.reloading = true;
        self.scheduler.begin(PassKind::Reload);

        let captured = if self.options.anchor_on_reload {
            anchor::capture(
                &self.reconciler.visible,
                &self.flat,
                self.visible_frame_less_inset(),
                self.bounds.origin,
            )
        } else {
            None
        };
        self.provider_replaced = false;
        let retired = self.retired.take();

        provider.will_reload();
        self.relayout(&mut *provider);

        let old_offset = self.bounds.origin;
        if let Some(target) = captured.and_then(|a| anchor::target_offset(&self.flat, &a)) {
            self.bounds.origin = self.clamp_content_offset(target);
        }
        let delta = self.bounds.origin - old_offset;
        vdebug!(
            items = self.flat.len(),
            content_width = self.content_size.width,
            content_height = self.content_size.height,
            delta_x = delta.x,
            delta_y = delta.y,
            "Grid::reload"
        );
        self.load_with(&mut *provider, retired.as_deref(), true, delta);
        drop(retired);
        provider.did_reload();
        self.provider = Some(provider);
        self.stats.reloads += 1;
        self.scheduler.finish();

        let mut callbacks = core::mem::take(&mut self.did_reload);
        for callback in callbacks.iter_mut() {
            callback(self);
        }
        callbacks.append(&mut self.did_reload);
        self.did_reload = callbacks;
        self.reloading = false;
    }

    /// Re-measures and re-positions without re-reading data or firing reload hooks.
    pub fn invalidate_layout(&mut self) {
        if self.reloading || self.provider_replaced {
            return;
        }
        let Some(mut provider) = self.provider.take() else {
            return;
        };
        self.scheduler.begin(PassKind::InvalidateLayout);
        self.relayout(&mut *provider);
        self.load_with(&mut *provider, None, false, Point::ZERO);
        self.provider = Some(provider);
        self.stats.invalidations += 1;
        self.scheduler.finish();
    }

    /// Recomputes the visible set for the current viewport against the current layout.
    pub fn load_cells(&mut self) {
        // A replaced provider has no layout yet; its reload is pending.
        if self.provider_replaced {
            return;
        }
        let Some(mut provider) = self.provider.take() else {
            return;
        };
        self.load_with(&mut *provider, None, false, Point::ZERO);
        self.provider = Some(provider);
    }

    fn relayout(&mut self, provider: &mut dyn Provider<V>) {
        provider.layout(self.collection_size());
        self.generation += 1;
        self.flat = Flattened::build(&*provider, self.generation);
        self.content_size = provider.content_size();
    }

    /// `exit_root` is the tree that bound the current views when it differs from `provider`.
    fn load_with(
        &mut self,
        provider: &mut dyn Provider<V>,
        exit_root: Option<&dyn Provider<V>>,
        is_reloading: bool,
        delta: Point,
    ) {
        let visible_frame = self.visible_frame();
        let visible_frame_less_inset = self.visible_frame_less_inset();
        let visible = self
            .flat
            .visible(provider, visible_frame, visible_frame_less_inset);
        let Ok(mut reuse) = self.reuse.try_borrow_mut() else {
            contract_violation!("reuse pool already borrowed during a load pass");
            return;
        };
        let pass = LoadPass {
            root: &*provider,
            exit_root,
            flat: &self.flat,
            visible,
            visible_frame_less_inset,
            context: AnimationContext {
                is_reloading,
                content_offset_delta: delta,
                visible_frame,
            },
            reuse: &mut reuse,
            registry: &mut self.registry,
            fallback_animator: &self.animator,
            now_ms: self.now_ms,
        };
        self.reconciler.load(pass, &mut self.stats);
    }

    fn clear_visible(&mut self, notify: bool) {
        let Ok(mut reuse) = self.reuse.try_borrow_mut() else {
            contract_violation!("reuse pool already borrowed while clearing");
            return;
        };
        let root = if notify {
            self.retired.as_deref().or(self.provider.as_deref())
        } else {
            None
        };
        self.reconciler.clear(root, &mut reuse, self.now_ms);
    }

    // Viewport.

    /// The viewport in content coordinates; its origin is the content offset.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// A size change invalidates the layout; any change reloads the visible set.
    pub fn set_bounds(&mut self, bounds: Rect) {
        if bounds == self.bounds {
            return;
        }
        let resized = bounds.size != self.bounds.size;
        self.bounds = bounds;
        if resized {
            self.set_needs_invalidate_layout();
        }
        self.load_cells();
    }

    pub fn content_offset(&self) -> Point {
        self.bounds.origin
    }

    pub fn set_content_offset(&mut self, offset: Point) {
        if offset == self.bounds.origin {
            return;
        }
        self.bounds.origin = offset;
        self.load_cells();
    }

    pub fn content_inset(&self) -> EdgeInsets {
        self.content_inset
    }

    pub fn set_content_inset(&mut self, inset: EdgeInsets) {
        if inset == self.content_inset {
            return;
        }
        self.content_inset = inset;
        self.set_needs_invalidate_layout();
        self.load_cells();
    }

    pub fn content_size(&self) -> Size {
        self.content_size
    }

    /// The size offered to the root layout: the viewport minus content insets.
    pub fn collection_size(&self) -> Size {
        self.bounds.size.inset_by(self.content_inset)
    }

    pub fn visible_frame(&self) -> Rect {
        self.bounds
    }

    pub fn visible_frame_less_inset(&self) -> Rect {
        self.bounds.inset_by(self.content_inset)
    }

    pub fn min_content_offset(&self) -> Point {
        Point::new(-self.content_inset.left, -self.content_inset.top)
    }

    pub fn max_content_offset(&self) -> Point {
        let min = self.min_content_offset();
        let x = self.content_size.width + self.content_inset.right - self.bounds.size.width;
        let y = self.content_size.height + self.content_inset.bottom - self.bounds.size.height;
        Point::new(x.max(min.x), y.max(min.y))
    }

    pub fn clamp_content_offset(&self, offset: Point) -> Point {
        let min = self.min_content_offset();
        let max = self.max_content_offset();
        Point::new(offset.x.clamp(min.x, max.x), offset.y.clamp(min.y, max.y))
    }

    // Queries.

    pub fn visible_set(&self) -> &VisibleSet<V> {
        &self.reconciler.visible
    }

    pub fn visible_identifiers(&self) -> &[String] {
        self.reconciler.visible.identifiers()
    }

    pub fn visible_indexes(&self) -> &[usize] {
        self.reconciler.visible.indexes()
    }

    pub fn view(&self, identifier: &str) -> Option<&V> {
        self.reconciler.visible.view(identifier)
    }

    pub fn view_mut(&mut self, identifier: &str) -> Option<&mut V> {
        self.reconciler.visible.view_mut(identifier)
    }

    pub fn flattened(&self) -> &Flattened {
        &self.flat
    }

    pub fn index_for(&self, identifier: &str) -> Option<usize> {
        self.flat.index_of(identifier)
    }

    /// The laid-out frame of `identifier`, visible or not.
    pub fn frame_for(&self, identifier: &str) -> Option<Rect> {
        self.flat.frame_of(identifier)
    }

    pub fn stats(&self) -> GridStats {
        self.stats
    }

    pub fn capture_anchor(&self) -> Option<ScrollAnchor> {
        anchor::capture_first_visible_anchor(self)
    }

    pub fn apply_anchor(&mut self, anchor: &ScrollAnchor) -> bool {
        anchor::apply_anchor(self, anchor)
    }

    // Interaction.

    /// While an item is being interacted with (dragged), its view is held instead of
    /// recycled when it scrolls out, and handed back if it scrolls in again.
    pub fn begin_interaction(&mut self, identifier: &str) {
        self.reconciler.begin_interaction(identifier);
    }

    pub fn end_interaction(&mut self, identifier: &str) {
        let Ok(mut reuse) = self.reuse.try_borrow_mut() else {
            contract_violation!("reuse pool already borrowed while ending an interaction");
            return;
        };
        self.reconciler
            .end_interaction(identifier, &mut reuse, self.now_ms);
    }

    pub fn is_interacting(&self, identifier: &str) -> bool {
        self.reconciler.is_interacting(identifier)
    }

    /// Views held off screen by an interaction.
    pub fn held_view_count(&self) -> usize {
        self.reconciler.held_count()
    }
}

impl<V: View> core::fmt::Debug for Grid<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Grid")
            .field("options", &self.options)
            .field("bounds", &self.bounds)
            .field("content_inset", &self.content_inset)
            .field("content_size", &self.content_size)
            .field("items", &self.flat.len())
            .field("visible", &self.reconciler.visible.len())
            .field("phase", &self.scheduler.phase())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
