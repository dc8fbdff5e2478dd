//! Rack and agent ranking (§4.4 `select_rack` / `select_agent`).

use std::collections::HashMap;
use warecore_entities::{Agent, Order, OrderKind, Task};
use warecore_grid::Position;
use warecore_ids::{AgentId, GateId, RackId, TaskId};
use warecore_storage::{ItemCatalog, Rack};

/// Distance-field lookups the ranking functions need, kept behind a
/// trait so this crate never has to know how guide maps are stored
/// (`warecore-sim` owns one `GuideMap` per gate and per rack).
pub trait DistanceField {
    /// `D_gate(pos)`: steps from `pos` to `gate`, or `None` if unreachable.
    fn gate_distance(&self, gate: GateId, pos: Position) -> Option<u32>;
    /// `D_R(pos)`: steps from `pos` to `rack`'s home cell, or `None` if
    /// unreachable.
    fn rack_distance(&self, rack: RackId, pos: Position) -> Option<u32>;
}

/// Units this rack could contribute towards `order`'s still-pending
/// quantities (§4.4 `max_supply`).
pub fn max_supply(order: &Order, rack: &Rack) -> u32 {
    match &order.kind {
        OrderKind::Collect => order
            .pending_items()
            .iter()
            .map(|(&item, &needed)| needed.min(rack.stored(item)))
            .sum(),
        OrderKind::Refill { rack_id } => {
            if *rack_id == rack.id {
                order.pending_units()
            } else {
                0
            }
        }
    }
}

/// One-way travel cost of bringing `rack` into service for `order`
/// (§4.4 `estimated_steps`): zero extra steps if the rack is already
/// allocated to a running task (the agent is going there regardless),
/// else the distance from the rack to the order's delivery gate.
pub fn estimated_steps(
    order: &Order,
    rack: &Rack,
    tasks: &HashMap<TaskId, Task>,
    agents: &HashMap<AgentId, Agent>,
    distances: &impl DistanceField,
) -> Option<u32> {
    if rack.is_allocated() {
        let agent_id = rack.allocated_to?;
        let task_id = agents.get(&agent_id)?.active_task?;
        Some(tasks.get(&task_id)?.estimated_merge_steps())
    } else {
        distances.gate_distance(order.gate_id, rack.home_position)
    }
}

/// The weight an assigned agent's load capacity must cover (§4.4
/// `select_agent`): the rack's current physical weight for a collect,
/// plus the incoming weight for a refill (nothing is removed from the
/// rack in that case, so its present weight is additive, not replaced).
pub fn effective_weight(order: &Order, rack: &Rack, catalog: &ItemCatalog) -> f64 {
    match &order.kind {
        OrderKind::Collect => rack.stored_weight,
        OrderKind::Refill { .. } => {
            let added: f64 = order
                .pending_items()
                .iter()
                .map(|(&item, &qty)| {
                    catalog.get(item).map(|i| i.unit_weight).unwrap_or(0.0) * qty as f64
                })
                .sum();
            rack.stored_weight + added
        }
    }
}

/// Pick the rack minimising `rank(R) = estimated_steps(R) / max_supply(R)`
/// among `candidate_racks`, breaking ties by smaller rack id. Racks that
/// can supply nothing, or are unreachable, are discarded (§4.4).
pub fn select_rack(
    order: &Order,
    candidate_racks: &[RackId],
    racks: &HashMap<RackId, Rack>,
    tasks: &HashMap<TaskId, Task>,
    agents: &HashMap<AgentId, Agent>,
    distances: &impl DistanceField,
) -> Option<RackId> {
    let mut best: Option<(f64, RackId)> = None;
    for &rack_id in candidate_racks {
        let Some(rack) = racks.get(&rack_id) else { continue };
        let supply = max_supply(order, rack);
        if supply == 0 {
            continue;
        }
        let Some(steps) = estimated_steps(order, rack, tasks, agents, distances) else { continue };
        let rank = steps as f64 / supply as f64;
        let better = match best {
            None => true,
            Some((best_rank, best_id)) => rank < best_rank || (rank == best_rank && rack_id < best_id),
        };
        if better {
            best = Some((rank, rack_id));
        }
    }
    best.map(|(_, rack_id)| rack_id)
}

/// Pick the agent that should crew `rack` for `order` (§4.4
/// `select_agent`). If `rack` is already allocated, only its allocating
/// agent is a candidate (and only if it can still carry the effective
/// weight); otherwise the closest capable ready agent wins, ties broken
/// by smaller agent id.
pub fn select_agent(
    order: &Order,
    rack_id: RackId,
    racks: &HashMap<RackId, Rack>,
    agents: &HashMap<AgentId, Agent>,
    ready_agents: &[AgentId],
    catalog: &ItemCatalog,
    distances: &impl DistanceField,
) -> Option<AgentId> {
    let rack = racks.get(&rack_id)?;
    let weight = effective_weight(order, rack, catalog);

    if rack.is_allocated() {
        let agent_id = rack.allocated_to?;
        let agent = agents.get(&agent_id)?;
        return (agent.load_capacity >= weight).then_some(agent_id);
    }

    let mut best: Option<(u32, AgentId)> = None;
    for &agent_id in ready_agents {
        let Some(agent) = agents.get(&agent_id) else { continue };
        if agent.load_capacity < weight {
            continue;
        }
        let Some(dist) = distances.rack_distance(rack_id, agent.position) else { continue };
        let better = match best {
            None => true,
            Some((best_dist, best_id)) => dist < best_dist || (dist == best_dist && agent_id < best_id),
        };
        if better {
            best = Some((dist, agent_id));
        }
    }
    best.map(|(_, agent_id)| agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use warecore_entities::{Agent, Order};
    use warecore_grid::Direction;
    use warecore_ids::{GateId, ItemId, OrderId};
    use warecore_storage::{inventory, item::Item};

    struct FlatDistance;
    impl DistanceField for FlatDistance {
        fn gate_distance(&self, _gate: GateId, pos: Position) -> Option<u32> {
            Some(pos.col)
        }
        fn rack_distance(&self, _rack: RackId, pos: Position) -> Option<u32> {
            Some(pos.col)
        }
    }

    fn order_with(items: Vec<(ItemId, u32)>) -> Order {
        let mut o = Order::new(OrderId::new(0), OrderKind::Collect, GateId::new(0), items);
        o.status = warecore_entities::OrderStatus::Active;
        o
    }

    #[test]
    fn test_select_rack_prefers_higher_max_supply_at_equal_distance() {
        let order = order_with(vec![(ItemId::new(1), 10)]);
        let mut racks = Map::new();
        let mut item = Item::new(ItemId::new(1), "w".into(), 1.0);

        let mut small = Rack::new(RackId::new(0), Position::new(0, 3), 1.0, 100.0);
        inventory::add_stock(&mut item, &mut small, 2).unwrap();
        let mut big = Rack::new(RackId::new(1), Position::new(0, 3), 1.0, 100.0);
        inventory::add_stock(&mut item, &mut big, 8).unwrap();

        racks.insert(small.id, small);
        racks.insert(big.id, big);

        let tasks = Map::new();
        let agents = Map::new();
        let chosen = select_rack(&order, &[RackId::new(0), RackId::new(1)], &racks, &tasks, &agents, &FlatDistance).unwrap();
        assert_eq!(chosen, RackId::new(1));
    }

    #[test]
    fn test_select_rack_discards_zero_supply() {
        let order = order_with(vec![(ItemId::new(1), 10)]);
        let mut racks = Map::new();
        racks.insert(RackId::new(0), Rack::new(RackId::new(0), Position::new(0, 0), 1.0, 100.0));
        let tasks = Map::new();
        let agents = Map::new();
        assert!(select_rack(&order, &[RackId::new(0)], &racks, &tasks, &agents, &FlatDistance).is_none());
    }

    #[test]
    fn test_select_agent_picks_nearest_capable() {
        let order = order_with(vec![(ItemId::new(1), 1)]);
        let mut racks = Map::new();
        let mut rack = Rack::new(RackId::new(0), Position::new(0, 0), 1.0, 50.0);
        let mut item = Item::new(ItemId::new(1), "w".into(), 5.0);
        inventory::add_stock(&mut item, &mut rack, 4).unwrap();
        racks.insert(rack.id, rack);

        let mut agents = Map::new();
        let far = Agent::new(AgentId::new(1), Position::new(0, 9), Direction::Up, 100.0);
        let near = Agent::new(AgentId::new(2), Position::new(0, 1), Direction::Up, 100.0);
        // Rack weighs 20 (4 units * weight 5); too heavy for this one.
        let weak = Agent::new(AgentId::new(3), Position::new(0, 0), Direction::Up, 5.0);
        agents.insert(far.id, far);
        agents.insert(near.id, near.clone());
        agents.insert(weak.id, weak);

        let catalog = ItemCatalog::new();
        let chosen = select_agent(
            &order,
            RackId::new(0),
            &racks,
            &agents,
            &[AgentId::new(1), AgentId::new(2), AgentId::new(3)],
            &catalog,
            &FlatDistance,
        )
        .unwrap();
        assert_eq!(chosen, near.id);
    }

    #[test]
    fn test_select_agent_allocated_rack_returns_only_its_agent() {
        let order = order_with(vec![(ItemId::new(1), 1)]);
        let mut racks = Map::new();
        let mut rack = Rack::new(RackId::new(0), Position::new(0, 0), 1.0, 50.0);
        rack.allocated_to = Some(AgentId::new(7));
        rack.state = warecore_storage::RackState::Allocated;
        racks.insert(RackId::new(0), rack);

        let mut agents = Map::new();
        let owner = Agent::new(AgentId::new(7), Position::new(0, 5), Direction::Up, 100.0);
        agents.insert(owner.id, owner);

        let catalog = ItemCatalog::new();
        let chosen = select_agent(&order, RackId::new(0), &racks, &agents, &[], &catalog, &FlatDistance).unwrap();
        assert_eq!(chosen, AgentId::new(7));
    }
}
