//! A single (agent, rack) assignment serving one or more merged orders,
//! driven through its phases by the per-tick agent state machine (§4.6).

use rkyv::{Archive, Deserialize, Serialize};
use std::collections::HashMap;
use warecore_ids::{AgentId, GateId, ItemId, OrderId, RackId, TaskId, Tick};

#[derive(Archive, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TaskPhase {
    ApproachRack,
    Load,
    ApproachGate,
    BindGate,
    UnbindGate,
    ReturnRack,
    Offload,
    Done,
}

impl TaskPhase {
    pub fn next(&self) -> TaskPhase {
        match self {
            TaskPhase::ApproachRack => TaskPhase::Load,
            TaskPhase::Load => TaskPhase::ApproachGate,
            TaskPhase::ApproachGate => TaskPhase::BindGate,
            TaskPhase::BindGate => TaskPhase::UnbindGate,
            TaskPhase::UnbindGate => TaskPhase::ReturnRack,
            TaskPhase::ReturnRack => TaskPhase::Offload,
            TaskPhase::Offload => TaskPhase::Done,
            TaskPhase::Done => TaskPhase::Done,
        }
    }
}

#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Task {
    pub id: TaskId,
    pub agent_id: AgentId,
    pub rack_id: RackId,
    pub gate_id: GateId,
    pub phase: TaskPhase,
    pub orders: Vec<OrderId>,
    /// Aggregate items this task will physically remove from the rack
    /// across all its merged orders, confirmed at `BindGate`.
    items_to_deliver: HashMap<ItemId, u32>,
    pub created_tick: Tick,
}

impl Task {
    pub fn new(id: TaskId, agent_id: AgentId, rack_id: RackId, gate_id: GateId, now: Tick) -> Self {
        Self {
            id,
            agent_id,
            rack_id,
            gate_id,
            phase: TaskPhase::ApproachRack,
            orders: Vec::new(),
            items_to_deliver: HashMap::new(),
            created_tick: now,
        }
    }

    pub fn items_to_deliver(&self) -> &HashMap<ItemId, u32> {
        &self.items_to_deliver
    }

    /// Merge `order` into this task for `items` worth of reservations.
    /// The caller (dispatcher / order-merge path) has already performed
    /// the `Item`/`Rack` reservation bookkeeping.
    pub fn merge_order(&mut self, order: OrderId, items: HashMap<ItemId, u32>) {
        if !self.orders.contains(&order) {
            self.orders.push(order);
        }
        for (item, qty) in items {
            *self.items_to_deliver.entry(item).or_insert(0) += qty;
        }
    }

    pub fn advance_phase(&mut self) {
        self.phase = self.phase.next();
    }

    pub fn is_done(&self) -> bool {
        self.phase == TaskPhase::Done
    }

    /// Added travel cost of merging one more order into this already
    /// running task (§4.4 `estimated_steps`, allocated-rack branch). The
    /// agent is already committed to this rack and gate regardless of
    /// the new order, so riding along costs nothing extra - merging is
    /// always preferred over dispatching a fresh agent when it's legal.
    pub fn estimated_merge_steps(&self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_sequence_matches_spec_order() {
        let mut phase = TaskPhase::ApproachRack;
        let expected = [
            TaskPhase::Load,
            TaskPhase::ApproachGate,
            TaskPhase::BindGate,
            TaskPhase::UnbindGate,
            TaskPhase::ReturnRack,
            TaskPhase::Offload,
            TaskPhase::Done,
        ];
        for e in expected {
            phase = phase.next();
            assert_eq!(phase, e);
        }
    }

    #[test]
    fn test_merge_order_aggregates_items() {
        let mut task = Task::new(
            TaskId::new(0),
            AgentId::new(0),
            RackId::new(0),
            GateId::new(0),
            Tick::ZERO,
        );
        let mut items = HashMap::new();
        items.insert(ItemId::new(1), 3);
        task.merge_order(OrderId::new(0), items.clone());
        task.merge_order(OrderId::new(1), items);
        assert_eq!(task.items_to_deliver().get(&ItemId::new(1)), Some(&6));
        assert_eq!(task.orders.len(), 2);
    }
}
