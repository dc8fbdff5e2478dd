//! Catalogue of all known items, addressable by id or by string name.

use crate::item::Item;
use std::collections::HashMap;
use warecore_ids::ItemId;

#[derive(Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<ItemId, Item>,
    string_to_id: HashMap<String, ItemId>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: Item) {
        let id = item.id;
        let string_id = item.string_id.clone();
        self.string_to_id.insert(string_id, id);
        self.items.insert(id, item);
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(&id)
    }

    pub fn by_string(&self, s: &str) -> Option<ItemId> {
        self.string_to_id.get(s).copied()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.keys().copied()
    }
}
