//! Diffing of the visible set against a new visible query.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::flatten::resolve_path;
use crate::key::{Map, Set};
use crate::visible::VisibleEntry;
use crate::{
    AnimationContext, Animator, Flattened, GridStats, Point, Provider, Rect, ReuseManager, View,
    ViewRegistry, VisibleSet,
};

/// Everything one load pass reads.
pub(crate) struct LoadPass<'a, V: View> {
    pub(crate) root: &'a dyn Provider<V>,
    /// The tree that bound the outgoing views, when a reload replaced `root`.
    pub(crate) exit_root: Option<&'a dyn Provider<V>>,
    pub(crate) flat: &'a Flattened,
    /// `(flat index, frame)` pairs, ascending.
    pub(crate) visible: Vec<(usize, Rect)>,
    pub(crate) visible_frame_less_inset: Rect,
    pub(crate) context: AnimationContext,
    pub(crate) reuse: &'a mut ReuseManager<V>,
    pub(crate) registry: &'a mut ViewRegistry<V>,
    pub(crate) fallback_animator: &'a Rc<dyn Animator<V>>,
    pub(crate) now_ms: u64,
}

/// Owns the visible views and moves them between the visible set, the reuse pool, and the
/// interaction hold list.
#[derive(Debug)]
pub(crate) struct Reconciler<V> {
    pub(crate) visible: VisibleSet<V>,
    held: Vec<VisibleEntry<V>>,
    interacting: Set<String>,
    last_generation: Option<u64>,
}

/// The closest animator: the owning provider's, then the root's, then the grid's.
fn animator_for<V: View>(
    root: &dyn Provider<V>,
    path: &[usize],
    fallback: &Rc<dyn Animator<V>>,
) -> Rc<dyn Animator<V>> {
    resolve_path(root, path)
        .and_then(|p| p.animator())
        .or_else(|| root.animator())
        .unwrap_or_else(|| Rc::clone(fallback))
}

impl<V: View> Reconciler<V> {
    pub(crate) fn new() -> Self {
        Self {
            visible: VisibleSet::new(),
            held: Vec::new(),
            interacting: Set::new(),
            last_generation: None,
        }
    }

    pub(crate) fn load(&mut self, pass: LoadPass<'_, V>, stats: &mut GridStats) {
        let LoadPass {
            root,
            exit_root,
            flat,
            visible,
            visible_frame_less_inset,
            context,
            reuse,
            registry,
            fallback_animator,
            now_ms,
        } = pass;
        stats.load_passes += 1;

        let same_indexes = self.visible.len() == visible.len()
            && self
                .visible
                .indexes()
                .iter()
                .zip(&visible)
                .all(|(&a, &(b, _))| a == b);
        if !context.is_reloading && same_indexes && self.last_generation == Some(flat.generation())
        {
            stats.cheap_passes += 1;
            self.refresh_frames(root, &visible, &context, fallback_animator);
            self.update_appearance(root, visible_frame_less_inset);
            return;
        }
        self.last_generation = Some(flat.generation());

        let mut new_positions: Map<&str, usize> = Map::new();
        for (pos, &(index, _)) in visible.iter().enumerate() {
            if let Some(item) = flat.get(index) {
                new_positions.insert(item.identifier.as_str(), pos);
            }
        }

        let mut retained: Vec<Option<VisibleEntry<V>>> =
            (0..visible.len()).map(|_| None).collect();
        let mut exits = Vec::new();
        for entry in self.visible.take_entries() {
            let keep = new_positions
                .get(entry.identifier.as_str())
                .copied()
                .filter(|&pos| {
                    retained[pos].is_none()
                        && flat
                            .get(visible[pos].0)
                            .is_some_and(|item| item.view_type == entry.view_type)
                });
            match keep {
                Some(pos) => retained[pos] = Some(entry),
                None => exits.push(entry),
            }
        }

        let exit_root = exit_root.unwrap_or(root);
        for mut entry in exits {
            if entry.appeared {
                match resolve_path(exit_root, &entry.path) {
                    Some(p) => p.on_disappear(&entry.identifier, &mut entry.view),
                    None => vdebug!(
                        identifier = entry.identifier.as_str(),
                        "Reconciler::load: outgoing section no longer exists"
                    ),
                }
            }
            let animator = animator_for(exit_root, &entry.path, fallback_animator);
            animator.delete(&mut entry.view, &context);
            self.recycle(entry, reuse, now_ms);
        }

        for (pos, (index, frame)) in visible.into_iter().enumerate() {
            let Some(item) = flat.get(index) else {
                continue;
            };
            let provider = resolve_path(root, &item.path);
            let animator = animator_for(root, &item.path, fallback_animator);

            if let Some(mut entry) = retained[pos].take() {
                if context.content_offset_delta != Point::ZERO {
                    animator.shift(&mut entry.view, context.content_offset_delta, &context);
                }
                if context.is_reloading {
                    if let Some(p) = provider {
                        p.bind(item.local, &mut entry.view);
                    }
                }
                animator.update(&mut entry.view, frame, &context);
                entry.index = index;
                entry.frame = frame;
                entry.path = Rc::clone(&item.path);
                entry.local = item.local;
                self.visible.push(entry);
                continue;
            }

            let held = self
                .held
                .iter()
                .position(|h| h.identifier == item.identifier && h.view_type == item.view_type);
            let (mut view, fresh) = match held {
                Some(h) => (self.held.swap_remove(h).view, false),
                None => {
                    let view_type = item.view_type;
                    let mut made = 0usize;
                    let mut factory = || {
                        let view = registry.create(view_type);
                        made += usize::from(view.is_some());
                        view
                    };
                    reuse.prewarm(view_type, &mut factory);
                    let view = match reuse.dequeue_pooled(view_type) {
                        Some(view) => {
                            stats.views_reused += 1;
                            Some(view)
                        }
                        None => factory(),
                    };
                    stats.views_created += made as u64;
                    match view {
                        Some(view) => (view, true),
                        None => {
                            contract_violation!(
                                "no factory for view type",
                                view_type = view_type.name()
                            );
                            continue;
                        }
                    }
                }
            };

            if fresh {
                view.attach();
            }
            if let Some(p) = provider {
                p.bind(item.local, &mut view);
            }
            if fresh {
                animator.insert(&mut view, frame, &context);
            } else {
                animator.update(&mut view, frame, &context);
            }
            self.visible.push(VisibleEntry {
                index,
                identifier: item.identifier.clone(),
                frame,
                view,
                view_type: item.view_type,
                appeared: false,
                path: Rc::clone(&item.path),
                local: item.local,
            });
        }

        vtrace!(
            visible = self.visible.len(),
            pooled = reuse.pooled_count(),
            "Reconciler::load"
        );
        debug_assert!(self.visible.is_consistent());
        self.update_appearance(root, visible_frame_less_inset);
    }

    fn refresh_frames(
        &mut self,
        root: &dyn Provider<V>,
        visible: &[(usize, Rect)],
        context: &AnimationContext,
        fallback_animator: &Rc<dyn Animator<V>>,
    ) {
        for (i, &(_, frame)) in visible.iter().enumerate() {
            if self.visible.frames().get(i) == Some(&frame) {
                continue;
            }
            if let Some((_, view, (path, _))) = self.visible.entry_parts_mut(i) {
                animator_for(root, path, fallback_animator).update(view, frame, context);
            }
            self.visible.set_frame(i, frame);
        }
    }

    /// Fires disappear callbacks for items that left `region`, then appear callbacks for items
    /// that entered it.
    fn update_appearance(&mut self, root: &dyn Provider<V>, region: Rect) {
        let n = self.visible.len();
        for i in 0..n {
            let inside = self
                .visible
                .frames()
                .get(i)
                .is_some_and(|f| f.intersects(&region));
            if inside || !self.visible.has_appeared(i) {
                continue;
            }
            if let Some((identifier, view, (path, _))) = self.visible.entry_parts_mut(i) {
                if let Some(p) = resolve_path(root, path) {
                    p.on_disappear(identifier, view);
                }
            }
            self.visible.set_appeared(i, false);
        }
        for i in 0..n {
            let inside = self
                .visible
                .frames()
                .get(i)
                .is_some_and(|f| f.intersects(&region));
            if !inside || self.visible.has_appeared(i) {
                continue;
            }
            if let Some((_, view, (path, local))) = self.visible.entry_parts_mut(i) {
                if let Some(p) = resolve_path(root, path) {
                    p.on_appear(*local, view);
                }
            }
            self.visible.set_appeared(i, true);
        }
    }

    fn recycle(&mut self, entry: VisibleEntry<V>, reuse: &mut ReuseManager<V>, now_ms: u64) {
        if self.interacting.contains(&entry.identifier) {
            vtrace!(identifier = entry.identifier.as_str(), "Reconciler: holding view");
            self.held.push(entry);
            return;
        }
        reuse.queue(entry.view_type, entry.view, now_ms);
    }

    /// Recycles every visible view. Disappear callbacks run when `root` is given.
    pub(crate) fn clear(
        &mut self,
        root: Option<&dyn Provider<V>>,
        reuse: &mut ReuseManager<V>,
        now_ms: u64,
    ) {
        for mut entry in self.visible.take_entries() {
            if let (true, Some(root)) = (entry.appeared, root) {
                if let Some(p) = resolve_path(root, &entry.path) {
                    p.on_disappear(&entry.identifier, &mut entry.view);
                }
            }
            self.recycle(entry, reuse, now_ms);
        }
        self.last_generation = None;
    }

    pub(crate) fn begin_interaction(&mut self, identifier: &str) {
        self.interacting.insert(identifier.into());
    }

    /// Returns a held view to the pool once its interaction ends off screen.
    pub(crate) fn end_interaction(
        &mut self,
        identifier: &str,
        reuse: &mut ReuseManager<V>,
        now_ms: u64,
    ) {
        self.interacting.remove(identifier);
        if let Some(pos) = self.held.iter().position(|h| h.identifier == identifier) {
            let entry = self.held.swap_remove(pos);
            reuse.queue(entry.view_type, entry.view, now_ms);
        }
    }

    pub(crate) fn is_interacting(&self, identifier: &str) -> bool {
        self.interacting.contains(identifier)
    }

    pub(crate) fn held_count(&self) -> usize {
        self.held.len()
    }
}
