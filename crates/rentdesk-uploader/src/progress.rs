use std::collections::HashMap;

use crate::item::ItemId;

/// Per-item upload progress, 0-100. Display only; later reports overwrite
/// earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressMap {
    inner: HashMap<ItemId, u8>,
}

impl ProgressMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: &ItemId, percent: u8) {
        self.inner.insert(id.clone(), percent.min(100));
    }

    pub fn get(&self, id: &ItemId) -> Option<u8> {
        self.inner.get(id).copied()
    }

    pub fn remove(&mut self, id: &ItemId) {
        self.inner.remove(id);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
