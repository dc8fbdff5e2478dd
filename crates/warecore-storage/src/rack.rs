//! Movable storage racks (§3).

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::collections::HashMap;
use warecore_grid::Position;
use warecore_ids::{AgentId, ItemId, RackId, WarehouseError, WarehouseResult};

/// A rack's lifecycle: idle at home, allocated to an agent but not yet
/// picked up, or loaded (being carried). Transitions are monotone within
/// a single task (idle -> allocated -> loaded -> allocated -> idle).
#[derive(
    Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize,
    Clone, Copy, PartialEq, Eq, Debug, Default,
)]
pub enum RackState {
    #[default]
    Idle,
    Allocated,
    Loaded,
}

/// A movable storage rack.
#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Rack {
    pub id: RackId,
    pub home_position: Position,
    pub container_weight: f64,
    pub capacity: f64,
    /// Units currently physically present on the rack, by item.
    stored: HashMap<ItemId, u32>,
    /// Units moved out of `stored` and earmarked for a specific task but
    /// not yet physically removed (§4.3 `Rack.reserve`).
    task_reserved: HashMap<ItemId, u32>,
    pub stored_weight: f64,
    pub state: RackState,
    pub allocated_to: Option<AgentId>,
}

impl Rack {
    pub fn new(id: RackId, home_position: Position, container_weight: f64, capacity: f64) -> Self {
        Self {
            id,
            home_position,
            container_weight,
            capacity,
            stored: HashMap::new(),
            task_reserved: HashMap::new(),
            stored_weight: 0.0,
            state: RackState::Idle,
            allocated_to: None,
        }
    }

    pub fn stored(&self, item: ItemId) -> u32 {
        self.stored.get(&item).copied().unwrap_or(0)
    }

    pub fn task_reserved(&self, item: ItemId) -> u32 {
        self.task_reserved.get(&item).copied().unwrap_or(0)
    }

    pub fn is_allocated(&self) -> bool {
        self.state != RackState::Idle
    }

    /// Physically add (`delta > 0`) or remove (`delta < 0`) `qty` units of
    /// `item`, whose unit weight is `unit_weight`. Enforces invariant 2
    /// (`0 <= stored_weight <= capacity`). Does not touch `Item` - the
    /// caller (`inventory::add_stock`) is responsible for mirroring the
    /// change there.
    pub(crate) fn add_stock(&mut self, item: ItemId, delta: i64, unit_weight: f64) -> WarehouseResult<()> {
        let current = self.stored(item) as i64;
        let next = current + delta;
        if next < 0 {
            return Err(WarehouseError::CapacityExceeded(format!(
                "rack {} cannot remove {} units of item {} (only {} present)",
                self.id, -delta, item, current
            )));
        }
        let next_weight = self.stored_weight + delta as f64 * unit_weight;
        if next_weight < -1e-9 || next_weight > self.capacity + 1e-9 {
            return Err(WarehouseError::CapacityExceeded(format!(
                "rack {} weight {:.2} would exceed capacity {:.2}",
                self.id, next_weight, self.capacity
            )));
        }
        if next == 0 {
            self.stored.remove(&item);
        } else {
            self.stored.insert(item, next as u32);
        }
        self.stored_weight = next_weight.max(0.0);
        Ok(())
    }

    /// Move `qty` units of `item` from present stock into the
    /// task-reservation bucket (§4.3 `Rack.reserve`). A negative `qty`
    /// physically confirms the reservation: call `add_stock` with the
    /// same magnitude to actually remove the units at task completion.
    pub(crate) fn reserve(&mut self, item: ItemId, qty: i64) -> WarehouseResult<()> {
        if qty > 0 {
            let present = self.stored(item) as i64;
            if present < qty {
                return Err(WarehouseError::CapacityExceeded(format!(
                    "rack {} has only {} of item {}, cannot reserve {}",
                    self.id, present, item, qty
                )));
            }
        }
        let entry = self.task_reserved.entry(item).or_insert(0);
        *entry = (*entry as i64 + qty).max(0) as u32;
        if *entry == 0 {
            self.task_reserved.remove(&item);
        }
        Ok(())
    }

    /// Remaining weight capacity, useful for refill feasibility checks.
    pub fn remaining_capacity(&self) -> f64 {
        (self.capacity - self.stored_weight).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rack() -> Rack {
        Rack::new(RackId::new(0), Position::new(0, 0), 5.0, 100.0)
    }

    #[test]
    fn test_add_stock_tracks_weight() {
        let mut r = rack();
        r.add_stock(ItemId::new(1), 10, 2.0).unwrap();
        assert_eq!(r.stored(ItemId::new(1)), 10);
        assert_eq!(r.stored_weight, 20.0);
    }

    #[test]
    fn test_add_stock_rejects_capacity_overflow() {
        let mut r = rack();
        assert!(r.add_stock(ItemId::new(1), 60, 2.0).is_err());
    }

    #[test]
    fn test_add_stock_rejects_removing_more_than_present() {
        let mut r = rack();
        r.add_stock(ItemId::new(1), 5, 1.0).unwrap();
        assert!(r.add_stock(ItemId::new(1), -6, 1.0).is_err());
    }

    #[test]
    fn test_reserve_then_confirm_removes_stock() {
        let mut r = rack();
        r.add_stock(ItemId::new(1), 10, 1.0).unwrap();
        r.reserve(ItemId::new(1), 4).unwrap();
        assert_eq!(r.stored(ItemId::new(1)), 10); // still physically present
        assert_eq!(r.task_reserved(ItemId::new(1)), 4);
        r.reserve(ItemId::new(1), -4).unwrap();
        r.add_stock(ItemId::new(1), -4, 1.0).unwrap();
        assert_eq!(r.stored(ItemId::new(1)), 6);
        assert_eq!(r.task_reserved(ItemId::new(1)), 0);
    }
}
