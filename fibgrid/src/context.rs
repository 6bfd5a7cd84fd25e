use alloc::string::String;
use alloc::vec::Vec;

use crate::Size;

/// A read-only view over the items a [`crate::Layout`] positions.
///
/// Contexts are built per layout pass and never own the items. `size` takes `&mut self`
/// because measuring a nested section lays that section out first.
pub trait LayoutContext {
    /// The space available to the layout.
    fn collection_size(&self) -> Size;

    fn number_of_items(&self) -> usize;

    /// The stable identifier of the item at `at`.
    fn identifier(&self, at: usize) -> String;

    /// Measures the item at `at` against `collection_size`.
    fn size(&mut self, at: usize, collection_size: Size) -> Size;
}

/// A [`LayoutContext`] over pre-measured sizes.
///
/// It owns plain values only, so it can be moved to another thread and laid out there.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SizesContext {
    pub collection_size: Size,
    pub items: Vec<(String, Size)>,
}

impl SizesContext {
    pub fn new(collection_size: Size, items: Vec<(String, Size)>) -> Self {
        Self {
            collection_size,
            items,
        }
    }

    /// Builds a context whose identifiers are the item indexes.
    pub fn from_sizes(collection_size: Size, sizes: impl IntoIterator<Item = Size>) -> Self {
        let items = sizes
            .into_iter()
            .enumerate()
            .map(|(i, size)| (alloc::format!("{i}"), size))
            .collect();
        Self {
            collection_size,
            items,
        }
    }
}

impl LayoutContext for SizesContext {
    fn collection_size(&self) -> Size {
        self.collection_size
    }

    fn number_of_items(&self) -> usize {
        self.items.len()
    }

    fn identifier(&self, at: usize) -> String {
        match self.items.get(at) {
            Some((id, _)) => id.clone(),
            None => {
                contract_violation!("identifier queried out of range", index = at);
                String::new()
            }
        }
    }

    fn size(&mut self, at: usize, _collection_size: Size) -> Size {
        match self.items.get(at) {
            Some((_, size)) => *size,
            None => {
                contract_violation!("size queried out of range", index = at);
                Size::ZERO
            }
        }
    }
}
