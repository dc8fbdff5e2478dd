//! Catalogue items and their three-tier quantity accounting (§3).

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::collections::HashMap;
use warecore_ids::{ItemId, RackId};

/// A catalogue item: identity, unit weight, and the three non-negative
/// counters invariant 1 relates (`total == available + reserved`).
#[derive(Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize, Clone, Debug)]
pub struct Item {
    pub id: ItemId,
    pub string_id: String,
    pub unit_weight: f64,
    total: u32,
    reserved: u32,
    /// Multiset "stored in rack R" count, kept in lockstep with each
    /// rack's own stored-quantity map by the `inventory` module so a
    /// caller can answer "how much of I is in R" without visiting every
    /// rack.
    stored_in: HashMap<RackId, u32>,
}

impl Item {
    pub fn new(id: ItemId, string_id: String, unit_weight: f64) -> Self {
        Self {
            id,
            string_id,
            unit_weight,
            total: 0,
            reserved: 0,
            stored_in: HashMap::new(),
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    pub fn available(&self) -> u32 {
        self.total - self.reserved
    }

    pub fn stored_in(&self, rack: RackId) -> u32 {
        self.stored_in.get(&rack).copied().unwrap_or(0)
    }

    pub fn stored_total(&self) -> u32 {
        self.stored_in.values().sum()
    }

    /// Physically add (positive) or remove (negative) `delta` units of
    /// this item in `rack`. Called only by `inventory::add_stock`, which
    /// keeps this in lockstep with the owning `Rack`'s own stored map.
    pub(crate) fn adjust_stored(&mut self, rack: RackId, delta: i64) {
        let entry = self.stored_in.entry(rack).or_insert(0);
        *entry = (*entry as i64 + delta).max(0) as u32;
        if *entry == 0 {
            self.stored_in.remove(&rack);
        }
        self.total = (self.total as i64 + delta).max(0) as u32;
    }

    /// Move `qty` units from available to reserved (system-wide general
    /// reservation, §4.3). Negative `qty` confirms a reservation back to
    /// available.
    pub(crate) fn adjust_reserved(&mut self, qty: i64) {
        self.reserved = (self.reserved as i64 + qty).clamp(0, self.total as i64) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_total_equals_available_plus_reserved() {
        let mut item = Item::new(ItemId::new(0), "widget".into(), 1.0);
        item.adjust_stored(RackId::new(0), 10);
        item.adjust_reserved(3);
        assert_eq!(item.total(), item.available() + item.reserved());
        assert_eq!(item.available(), 7);
    }

    #[test]
    fn test_stored_in_tracks_per_rack() {
        let mut item = Item::new(ItemId::new(0), "widget".into(), 1.0);
        item.adjust_stored(RackId::new(1), 4);
        item.adjust_stored(RackId::new(2), 6);
        assert_eq!(item.stored_in(RackId::new(1)), 4);
        assert_eq!(item.stored_total(), 10);
        assert_eq!(item.total(), 10);
    }
}
