//! Coordinating operations that keep `Item` and `Rack` accounting in
//! lockstep (§4.3).
//!
//! `Item` and `Rack` never hold references to each other - cross-entity
//! mutation goes through these free functions instead, operating on
//! `&mut` borrows the caller obtained from the Warehouse's own id-keyed
//! maps (see DESIGN.md on resolving the source's Agent/Task/Rack/Order
//! reference cycles).

use crate::item::Item;
use crate::rack::Rack;
use warecore_ids::{ItemId, WarehouseResult};

/// Physically add (`delta > 0`) or remove (`delta < 0`) stock of `item`
/// on `rack`, keeping `Item.total` and `Rack.stored_weight` in sync.
pub fn add_stock(item: &mut Item, rack: &mut Rack, delta: i64) -> WarehouseResult<()> {
    rack.add_stock(item.id, delta, item.unit_weight)?;
    item.adjust_stored(rack.id, delta);
    Ok(())
}

/// System-wide general reservation at item level (§4.3 `Item.reserve`).
/// Positive `qty` reserves; negative confirms back to available.
pub fn reserve_item(item: &mut Item, qty: i64) {
    item.adjust_reserved(qty);
}

/// Move `qty` units of `item` on `rack` from present stock into the
/// task-reservation bucket. Negative `qty` releases a reservation back
/// to present stock without removing it.
pub fn reserve_on_rack(rack: &mut Rack, item: ItemId, qty: i64) -> WarehouseResult<()> {
    rack.reserve(item, qty)
}

/// Task completion: the rack physically parts with `qty` previously
/// task-reserved units of `item` (§4.3 "on task completion").
pub fn confirm_removal(item: &mut Item, rack: &mut Rack, qty: i64) -> WarehouseResult<()> {
    rack.reserve(item.id, -qty)?;
    add_stock(item, rack, -qty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rack::Rack;
    use warecore_grid::Position;
    use warecore_ids::RackId;

    #[test]
    fn test_full_collect_cycle_preserves_invariant_1() {
        let mut item = Item::new(ItemId::new(0), "widget".into(), 1.0);
        let mut rack = Rack::new(RackId::new(0), Position::new(0, 0), 1.0, 100.0);

        add_stock(&mut item, &mut rack, 10).unwrap();
        reserve_item(&mut item, 3);
        reserve_on_rack(&mut rack, item.id, 3).unwrap();
        confirm_removal(&mut item, &mut rack, 3).unwrap();

        assert_eq!(item.total(), item.available() + item.reserved());
        assert_eq!(item.total(), 7);
        assert_eq!(item.reserved(), 0);
        assert_eq!(rack.stored(item.id), 7);
    }
}
