use alloc::string::String;
use alloc::vec::Vec;

use crate::Size;
use crate::key::Map;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct SizeKey {
    identifier: String,
    size_hash: String,
    constraint_width: u64,
    constraint_height: u64,
}

impl SizeKey {
    fn new(identifier: &str, size_hash: &str, constraint: Size) -> Self {
        Self {
            identifier: identifier.into(),
            size_hash: size_hash.into(),
            constraint_width: constraint.width.to_bits(),
            constraint_height: constraint.height.to_bits(),
        }
    }
}

/// Measured sizes keyed by `(identifier, size hash, constraint)`.
///
/// Entries survive exactly one layout pass: anything not looked up or stored during a
/// pass is dropped when the next pass begins, so the cache never outgrows the data.
#[derive(Clone, Debug, Default)]
pub struct SizeCache {
    current: Map<SizeKey, Size>,
    previous: Map<SizeKey, Size>,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a layout pass, retiring the entries the last pass did not touch.
    pub fn begin_pass(&mut self) {
        self.previous = core::mem::take(&mut self.current);
    }

    pub fn get(&mut self, identifier: &str, size_hash: &str, constraint: Size) -> Option<Size> {
        let key = SizeKey::new(identifier, size_hash, constraint);
        if let Some(&size) = self.current.get(&key) {
            return Some(size);
        }
        let size = self.previous.remove(&key)?;
        self.current.insert(key, size);
        Some(size)
    }

    pub fn insert(&mut self, identifier: &str, size_hash: &str, constraint: Size, size: Size) {
        self.current
            .insert(SizeKey::new(identifier, size_hash, constraint), size);
    }

    pub fn len(&self) -> usize {
        self.current.len() + self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.previous.clear();
    }

    /// Entries as `(identifier, size_hash, constraint, size)`, for persisting across sessions.
    pub fn export(&self) -> Vec<(String, String, Size, Size)> {
        let mut out = Vec::with_capacity(self.len());
        for (k, &size) in self.current.iter().chain(self.previous.iter()) {
            let constraint = Size::new(
                f64::from_bits(k.constraint_width),
                f64::from_bits(k.constraint_height),
            );
            out.push((k.identifier.clone(), k.size_hash.clone(), constraint, size));
        }
        out
    }

    /// Replaces the cache with `entries`. They count as touched by the current pass.
    pub fn import(&mut self, entries: impl IntoIterator<Item = (String, String, Size, Size)>) {
        self.clear();
        for (identifier, size_hash, constraint, size) in entries {
            self.insert(&identifier, &size_hash, constraint, size);
        }
        vdebug!(entries = self.current.len(), "SizeCache::import");
    }
}
