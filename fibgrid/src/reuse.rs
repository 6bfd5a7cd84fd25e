use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::key::{Map, Set};
use crate::{ReuseOptions, View, ViewType};

/// A pool handle shared between grids living on the same thread.
pub type SharedReuseManager<V> = Rc<RefCell<ReuseManager<V>>>;

/// Per-type pools of recycled views.
///
/// Eviction is deliberately coarse: one idle timer for all pools, reset by every
/// [`ReuseManager::queue`]. When it fires, every pooled view is dropped. The pools are bounded
/// by the number of views that went off screen since the last idle period.
///
/// The manager takes views by value, so a view is either in a pool or owned by a grid,
/// never both.
#[derive(Debug)]
pub struct ReuseManager<V> {
    options: ReuseOptions,
    pools: Map<ViewType, Vec<V>>,
    warmed: Set<ViewType>,
    evict_at_ms: Option<u64>,
}

impl<V: View> ReuseManager<V> {
    pub fn new(options: ReuseOptions) -> Self {
        Self {
            options,
            pools: Map::new(),
            warmed: Set::new(),
            evict_at_ms: None,
        }
    }

    pub fn shared(options: ReuseOptions) -> SharedReuseManager<V> {
        Rc::new(RefCell::new(Self::new(options)))
    }

    pub fn options(&self) -> &ReuseOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ReuseOptions) {
        if !options.enabled {
            self.clear();
        }
        self.options = options;
    }

    /// Pops a pooled view of `view_type`, or builds one with `factory`.
    ///
    /// The first time a type is requested, its pool is pre-warmed with
    /// `options.prewarm_count` extra views.
    pub fn dequeue(&mut self, view_type: ViewType, mut factory: impl FnMut() -> V) -> V {
        self.prewarm(view_type, &mut || Some(factory()));
        match self.dequeue_pooled(view_type) {
            Some(view) => view,
            None => factory(),
        }
    }

    /// Pops a pooled view of `view_type` without creating one.
    pub fn dequeue_pooled(&mut self, view_type: ViewType) -> Option<V> {
        let mut view = self.pools.get_mut(&view_type)?.pop()?;
        vtrace!(view_type = view_type.name(), "ReuseManager::dequeue reused");
        view.prepare_for_reuse();
        view.set_hidden(false);
        Some(view)
    }

    /// Fills the pool of `view_type` with `options.prewarm_count` views the first time the
    /// type is seen. Stops early when `factory` returns `None`.
    pub fn prewarm(&mut self, view_type: ViewType, factory: &mut impl FnMut() -> Option<V>) {
        if self.warmed.contains(&view_type) {
            return;
        }
        self.warmed.insert(view_type);
        let n = self.options.prewarm_count;
        if n == 0 || !self.options.enabled {
            return;
        }
        vdebug!(view_type = view_type.name(), count = n, "ReuseManager::prewarm");
        let pool = self.pools.entry(view_type).or_default();
        for _ in 0..n {
            let Some(mut view) = factory() else {
                break;
            };
            view.set_hidden(true);
            pool.push(view);
        }
    }

    /// Returns a view to the pool of `view_type` and restarts the idle timer.
    ///
    /// A type without a pool gets a new one.
    pub fn queue(&mut self, view_type: ViewType, mut view: V, now_ms: u64) {
        view.detach();
        if !self.options.enabled {
            return;
        }
        view.set_hidden(true);
        self.pools.entry(view_type).or_default().push(view);
        self.evict_at_ms = Some(now_ms.saturating_add(self.options.idle_lifespan_ms));
    }

    /// Fires the idle timer if it is due. Returns the number of views released.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let Some(due) = self.evict_at_ms else {
            return 0;
        };
        if now_ms < due {
            return 0;
        }
        self.evict_at_ms = None;
        let released = self.pooled_count();
        self.pools.clear();
        vdebug!(released, "ReuseManager: idle eviction");
        released
    }

    /// When the idle timer fires next, if armed.
    pub fn eviction_due_ms(&self) -> Option<u64> {
        self.evict_at_ms
    }

    pub fn pooled_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn pooled_count_of(&self, view_type: ViewType) -> usize {
        self.pools.get(&view_type).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.pools.clear();
        self.evict_at_ms = None;
    }
}

impl<V: View> Default for ReuseManager<V> {
    fn default() -> Self {
        Self::new(ReuseOptions::default())
    }
}

#[cfg(feature = "std")]
impl<V: View + 'static> ReuseManager<V> {
    /// The pool shared by every grid on this thread that views `V`.
    ///
    /// Created on first use with default options.
    pub fn thread_default() -> SharedReuseManager<V> {
        use std::any::{Any, TypeId};
        use std::boxed::Box;
        use std::collections::HashMap;

        std::thread_local! {
            static DEFAULTS: RefCell<HashMap<TypeId, Box<dyn Any>>> = RefCell::new(HashMap::new());
        }

        DEFAULTS.with(|defaults| {
            let mut defaults = defaults.borrow_mut();
            let entry = defaults
                .entry(TypeId::of::<V>())
                .or_insert_with(|| Box::new(ReuseManager::<V>::shared(ReuseOptions::default())));
            match entry.downcast_ref::<SharedReuseManager<V>>() {
                Some(shared) => Rc::clone(shared),
                None => {
                    contract_violation!("thread default pool has the wrong type");
                    ReuseManager::<V>::shared(ReuseOptions::default())
                }
            }
        })
    }
}
