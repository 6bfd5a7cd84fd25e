//! Flattening of a provider tree into one indexed list of leaf items.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::key::{Map, Set};
use crate::{Point, Provider, Rect, View, ViewType};

/// Makes sibling identifiers unique.
///
/// The first occurrence of an identifier is kept; later ones get the first free `id(n)`
/// suffix, counting from 1. `["a", "a", "b"]` becomes `["a", "a(1)", "b"]`.
pub fn disambiguate(identifiers: impl IntoIterator<Item = String>) -> Vec<String> {
    let identifiers: Vec<String> = identifiers.into_iter().collect();
    let mut used: Set<String> = Set::new();
    for id in &identifiers {
        used.insert(id.clone());
    }

    let mut seen: Set<&str> = Set::new();
    let mut next_suffix: Map<&str, usize> = Map::new();
    let mut out = Vec::with_capacity(identifiers.len());
    for id in &identifiers {
        if seen.insert(id.as_str()) {
            out.push(id.clone());
            continue;
        }
        let n = next_suffix.entry(id.as_str()).or_insert(1);
        let unique = loop {
            let candidate = format!("{id}({n})");
            *n += 1;
            if !used.contains(&candidate) {
                break candidate;
            }
        };
        used.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// A leaf item of the flattened tree.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatItem {
    /// Unique across the tree: section identifiers joined with `/`, then the item's own.
    pub identifier: String,
    pub size_hash: Option<String>,
    pub view_type: ViewType,
    /// The laid-out frame in root coordinates, ignoring pinning.
    pub frame: Rect,
    /// Section indexes from the root to the provider that owns this item.
    pub path: Rc<[usize]>,
    /// The item's index inside that provider.
    pub local: usize,
}

#[derive(Clone, Copy, Debug)]
enum Entry {
    Item(usize),
    Section(usize),
}

#[derive(Clone, Debug)]
struct FlatNode {
    path: Rc<[usize]>,
    entries: Vec<Entry>,
}

/// The provider tree as a flat list, plus the node structure needed to run visible queries
/// recursively.
///
/// Rebuilt after every layout; `generation` tells consecutive builds apart.
#[derive(Clone, Debug, Default)]
pub struct Flattened {
    items: Vec<FlatItem>,
    nodes: Vec<FlatNode>,
    index_of: Map<String, usize>,
    generation: u64,
}

impl Flattened {
    /// Flattens `root`, which must have been laid out.
    pub fn build<V: View>(root: &dyn Provider<V>, generation: u64) -> Self {
        let mut out = Self {
            generation,
            ..Self::default()
        };
        out.flatten_node(root, Rc::from(Vec::new()), "", Point::ZERO);
        vtrace!(
            items = out.items.len(),
            nodes = out.nodes.len(),
            generation,
            "Flattened::build"
        );
        out
    }

    fn flatten_node<V: View>(
        &mut self,
        provider: &dyn Provider<V>,
        path: Rc<[usize]>,
        prefix: &str,
        origin: Point,
    ) {
        let node = self.nodes.len();
        self.nodes.push(FlatNode {
            path: Rc::clone(&path),
            entries: Vec::new(),
        });

        let n = provider.number_of_items();
        let ids = disambiguate((0..n).map(|i| provider.identifier_at(i)));
        let mut entries = Vec::with_capacity(n);
        for (i, id) in ids.into_iter().enumerate() {
            let frame = provider.frame(i).translate(origin);
            if let Some(section) = provider.section(i) {
                let child = self.nodes.len();
                let mut child_path = path.to_vec();
                child_path.push(i);
                let child_prefix = format!("{prefix}{id}/");
                self.flatten_node(section, Rc::from(child_path), &child_prefix, frame.origin);
                entries.push(Entry::Section(child));
            } else {
                let index = self.items.len();
                let identifier = self.unique_identifier(format!("{prefix}{id}"));
                self.index_of.insert(identifier.clone(), index);
                self.items.push(FlatItem {
                    identifier,
                    size_hash: provider.size_hash_at(i),
                    view_type: provider.view_type_at(i),
                    frame,
                    path: Rc::clone(&path),
                    local: i,
                });
                entries.push(Entry::Item(index));
            }
        }
        self.nodes[node].entries = entries;
    }

    // A leaf whose own identifier contains `/` can collide with a prefixed one.
    fn unique_identifier(&self, identifier: String) -> String {
        if !self.index_of.contains_key(&identifier) {
            return identifier;
        }
        let mut n = 1usize;
        loop {
            let candidate = format!("{identifier}({n})");
            if !self.index_of.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[FlatItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&FlatItem> {
        self.items.get(index)
    }

    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.index_of.get(identifier).copied()
    }

    pub fn frame_of(&self, identifier: &str) -> Option<Rect> {
        self.index_of(identifier)
            .and_then(|i| self.items.get(i))
            .map(|item| item.frame)
    }

    /// Visible leaf items as `(flat index, frame in root coordinates)`, ascending.
    ///
    /// Frames come from the live providers, so pinned items report their pinned frame.
    pub fn visible<V: View>(
        &self,
        root: &mut dyn Provider<V>,
        visible_frame: Rect,
        visible_frame_less_inset: Rect,
    ) -> Vec<(usize, Rect)> {
        let mut out = Vec::new();
        if !self.nodes.is_empty() {
            self.visible_in(
                0,
                root,
                visible_frame,
                visible_frame_less_inset,
                Point::ZERO,
                &mut out,
            );
        }
        out
    }

    fn visible_in<V: View>(
        &self,
        node: usize,
        provider: &mut dyn Provider<V>,
        visible_frame: Rect,
        visible_frame_less_inset: Rect,
        origin: Point,
        out: &mut Vec<(usize, Rect)>,
    ) {
        let Some(node) = self.nodes.get(node) else {
            return;
        };
        let to_local = Point::ZERO - origin;
        let indexes = provider.visible_indexes(
            visible_frame.translate(to_local),
            visible_frame_less_inset.translate(to_local),
        );
        for at in indexes {
            let frame = provider.frame(at).translate(origin);
            match node.entries.get(at) {
                Some(Entry::Item(index)) => out.push((*index, frame)),
                Some(&Entry::Section(child)) => {
                    if let Some(section) = provider.section_mut(at) {
                        self.visible_in(
                            child,
                            section,
                            visible_frame,
                            visible_frame_less_inset,
                            frame.origin,
                            out,
                        );
                    }
                }
                // Data changed since the last flatten; the pending reload will catch up.
                None => vtrace!(index = at, "Flattened::visible: stale index"),
            }
        }
    }
}

/// Walks `path` down from `root`.
pub fn resolve_path<'a, V: View>(
    root: &'a dyn Provider<V>,
    path: &[usize],
) -> Option<&'a dyn Provider<V>> {
    let mut provider = root;
    for &at in path {
        provider = provider.section(at)?;
    }
    Some(provider)
}
