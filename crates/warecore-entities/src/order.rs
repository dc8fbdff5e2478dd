//! Customer orders: collect (gate receives items) and refill (rack
//! receives items from gate), with their pending/reserved/fulfilled
//! lifecycle (§3, §4.3).

use rkyv::{Archive, Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use warecore_ids::{GateId, ItemId, OrderId, RackId, TaskId};
use warecore_storage::{item::Item, Rack};

#[derive(Archive, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum OrderKind {
    Collect,
    /// §9 open question: restricted to exactly one rack, matching the
    /// source's own restriction.
    Refill { rack_id: RackId },
}

#[derive(Archive, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum OrderStatus {
    Inactive,
    Active,
    Fulfilled,
    Dismissed,
}

#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Order {
    pub id: OrderId,
    pub kind: OrderKind,
    pub gate_id: GateId,
    pub status: OrderStatus,
    pending_items: HashMap<ItemId, u32>,
    original_items: HashMap<ItemId, u32>,
    reserved_items: HashMap<TaskId, HashMap<ItemId, u32>>,
    live_tasks: HashSet<TaskId>,
    /// Consecutive ticks the dispatcher has tried and failed to make
    /// progress on this order, consulted by `DismissalPolicy`.
    pub no_progress_ticks: u32,
}

impl Order {
    pub fn new(id: OrderId, kind: OrderKind, gate_id: GateId, items: Vec<(ItemId, u32)>) -> Self {
        let mut pending_items = HashMap::new();
        for (item, qty) in &items {
            *pending_items.entry(*item).or_insert(0) += qty;
        }
        Self {
            id,
            kind,
            gate_id,
            status: OrderStatus::Inactive,
            original_items: pending_items.clone(),
            pending_items,
            reserved_items: HashMap::new(),
            live_tasks: HashSet::new(),
            no_progress_ticks: 0,
        }
    }

    pub fn pending_units(&self) -> u32 {
        self.pending_items.values().sum()
    }

    pub fn pending(&self, item: ItemId) -> u32 {
        self.pending_items.get(&item).copied().unwrap_or(0)
    }

    pub fn pending_items(&self) -> &HashMap<ItemId, u32> {
        &self.pending_items
    }

    pub fn original_items(&self) -> &HashMap<ItemId, u32> {
        &self.original_items
    }

    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Active && self.pending_units() > 0
    }

    pub fn live_task_count(&self) -> usize {
        self.live_tasks.len()
    }

    /// Reserve every unit at item level and enter *active* (§4.3).
    pub fn activate<'a>(&mut self, items: impl Iterator<Item = &'a mut Item>) {
        for item in items {
            if let Some(&qty) = self.pending_items.get(&item.id) {
                if qty > 0 {
                    warecore_storage::inventory::reserve_item(item, qty as i64);
                }
            }
        }
        self.status = OrderStatus::Active;
    }

    /// Per-task item planning (§4.3). Collect orders take what each
    /// rack can supply towards the still-pending quantities; refill
    /// orders take the whole pending list from their one fixed rack.
    pub fn plan_items_to_reserve(&self, rack: &Rack) -> HashMap<ItemId, u32> {
        match &self.kind {
            OrderKind::Collect => {
                let mut plan = HashMap::new();
                for (&item, &needed) in &self.pending_items {
                    let take = needed.min(rack.stored(item));
                    if take > 0 {
                        plan.insert(item, take);
                    }
                }
                plan
            }
            OrderKind::Refill { rack_id } => {
                if *rack_id == rack.id {
                    self.pending_items.clone()
                } else {
                    HashMap::new()
                }
            }
        }
    }

    /// Record that `task` will supply `items`, converting the general
    /// reservation into a task-specific one and subtracting from
    /// `pending_items`. The caller has already performed the matching
    /// `Item`/`Rack` reservation moves (see `warecore-dispatcher`).
    pub fn assign_to_task(&mut self, task: TaskId, items: HashMap<ItemId, u32>) {
        for (&item, &qty) in &items {
            let entry = self.pending_items.entry(item).or_insert(0);
            *entry = entry.saturating_sub(qty);
            if *entry == 0 {
                self.pending_items.remove(&item);
            }
        }
        self.reserved_items.entry(task).or_default().extend(items);
        self.live_tasks.insert(task);
        self.no_progress_ticks = 0;
    }

    /// Undo `assign_to_task`: drop `task` from this order's live set and
    /// give its reserved quantities back to `pending_items`, for use when
    /// a rack allocated to it turns out to be redundant and is unwound
    /// (§9 redundant-rack removal pass) before the task ever ran.
    pub fn revert_task_assignment(&mut self, task: TaskId) -> HashMap<ItemId, u32> {
        let items = self.reserved_items.remove(&task).unwrap_or_default();
        for (&item, &qty) in &items {
            *self.pending_items.entry(item).or_insert(0) += qty;
        }
        self.live_tasks.remove(&task);
        items
    }

    /// A task completed; if nothing remains pending or in flight the
    /// order becomes fulfilled (§3 invariant 7).
    pub fn task_completed(&mut self, task: TaskId) {
        self.live_tasks.remove(&task);
        if self.pending_units() == 0 && self.live_tasks.is_empty() {
            self.status = OrderStatus::Fulfilled;
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == OrderStatus::Fulfilled
    }

    pub fn dismiss(&mut self) {
        self.status = OrderStatus::Dismissed;
    }

    /// Sum of everything actually reserved/delivered across all tasks,
    /// for the §8 historical-delivery check.
    pub fn delivered_items(&self) -> HashMap<ItemId, u32> {
        let mut totals = HashMap::new();
        for items in self.reserved_items.values() {
            for (&item, &qty) in items {
                *totals.entry(item).or_insert(0) += qty;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_grid::Position;
    use warecore_ids::RackId;
    use warecore_storage::item::Item;

    #[test]
    fn test_collect_plan_takes_min_of_needed_and_stored() {
        let order = Order::new(
            OrderId::new(0),
            OrderKind::Collect,
            GateId::new(0),
            vec![(ItemId::new(1), 5)],
        );
        let mut rack = Rack::new(RackId::new(0), Position::new(0, 0), 1.0, 100.0);
        let mut item = Item::new(ItemId::new(1), "widget".into(), 1.0);
        warecore_storage::inventory::add_stock(&mut item, &mut rack, 3).unwrap();

        let plan = order.plan_items_to_reserve(&rack);
        assert_eq!(plan.get(&ItemId::new(1)), Some(&3));
    }

    #[test]
    fn test_fulfilled_when_pending_and_live_tasks_empty() {
        let mut order = Order::new(
            OrderId::new(0),
            OrderKind::Collect,
            GateId::new(0),
            vec![(ItemId::new(1), 2)],
        );
        order.status = OrderStatus::Active;
        let mut items = HashMap::new();
        items.insert(ItemId::new(1), 2);
        order.assign_to_task(TaskId::new(0), items);
        assert!(!order.is_fulfilled());
        order.task_completed(TaskId::new(0));
        assert!(order.is_fulfilled());
    }

    #[test]
    fn test_revert_task_assignment_restores_pending() {
        let mut order = Order::new(
            OrderId::new(0),
            OrderKind::Collect,
            GateId::new(0),
            vec![(ItemId::new(1), 5)],
        );
        order.status = OrderStatus::Active;
        let mut items = HashMap::new();
        items.insert(ItemId::new(1), 3);
        order.assign_to_task(TaskId::new(0), items);
        assert_eq!(order.pending(ItemId::new(1)), 2);

        let reverted = order.revert_task_assignment(TaskId::new(0));
        assert_eq!(reverted.get(&ItemId::new(1)), Some(&3));
        assert_eq!(order.pending(ItemId::new(1)), 5);
        assert_eq!(order.live_task_count(), 0);
    }

    #[test]
    fn test_refill_plan_only_matches_its_own_rack() {
        let rack_a = RackId::new(0);
        let rack_b = RackId::new(1);
        let order = Order::new(
            OrderId::new(0),
            OrderKind::Refill { rack_id: rack_a },
            GateId::new(0),
            vec![(ItemId::new(1), 10)],
        );
        let other_rack = Rack::new(rack_b, Position::new(0, 0), 1.0, 100.0);
        assert!(order.plan_items_to_reserve(&other_rack).is_empty());
    }
}
