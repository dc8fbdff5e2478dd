//! `dispatch(order, ready_agents)` main loop (§4.4).

use crate::rank::{select_agent, select_rack, DistanceField};
use std::collections::HashMap;
use warecore_entities::{Order, OrderKind, Task};
use warecore_ids::{AgentId, IdGenerator, ItemId, RackId, TaskId, Tick};
use warecore_storage::{inventory, Item, ItemCatalog, Rack, RackState};

/// Tasks newly created by this call; callers insert them into the
/// warehouse's own task map and activate them (§9: the Warehouse owns
/// all entity maps, dispatch only mutates through `&mut` borrows it is
/// handed).
pub struct DispatchOutcome {
    pub new_tasks: Vec<Task>,
}

/// Attempt to make progress on `order` against `candidate_racks`,
/// assigning ready agents to new or already-running tasks (§4.4). Mutates
/// `order` (pending units, live tasks), `ready_agents` (assigned agents
/// removed), `racks` (allocation state), and `items` (reservation
/// counters) in place; returns any brand-new tasks for the caller to
/// register. Idempotent and exception-free: a call that cannot make
/// progress simply returns with no new tasks.
pub fn dispatch(
    order: &mut Order,
    candidate_racks: Vec<RackId>,
    ready_agents: &mut Vec<AgentId>,
    racks: &mut HashMap<RackId, Rack>,
    agents: &HashMap<AgentId, warecore_entities::Agent>,
    tasks: &mut HashMap<TaskId, Task>,
    items: &mut HashMap<ItemId, Item>,
    catalog: &ItemCatalog,
    distances: &impl DistanceField,
    task_ids: &mut IdGenerator<TaskId>,
    now: Tick,
    redundant_rack_threshold: usize,
) -> DispatchOutcome {
    let mut candidate_racks = candidate_racks;
    let mut filtered_once = false;
    let mut new_tasks = Vec::new();

    while order.is_pending() && !candidate_racks.is_empty() {
        if ready_agents.is_empty() && !filtered_once {
            candidate_racks.retain(|r| racks.get(r).map(|rack| rack.is_allocated()).unwrap_or(false));
            filtered_once = true;
            if candidate_racks.is_empty() {
                break;
            }
        }

        let Some(rack_id) = select_rack(order, &candidate_racks, racks, tasks, agents, distances) else {
            break;
        };
        candidate_racks.retain(|&r| r != rack_id);

        let Some(agent_id) = select_agent(order, rack_id, racks, agents, ready_agents, catalog, distances)
        else {
            continue;
        };

        let already_allocated = racks.get(&rack_id).map(|r| r.is_allocated()).unwrap_or(false);
        if already_allocated {
            // §4.4: "A already has an active task (because R was already
            // allocated to A): A.active_task.add_order(order)".
            let Some(task_id) = agents.get(&agent_id).and_then(|a| a.active_task) else {
                continue;
            };
            let Some(rack) = racks.get_mut(&rack_id) else { continue };
            let plan = order.plan_items_to_reserve(rack);
            if plan.is_empty() {
                continue;
            }
            reserve_plan(&order.kind, rack, items, &plan);
            if let Some(task) = tasks.get_mut(&task_id) {
                task.merge_order(order.id, plan.clone());
            }
            order.assign_to_task(task_id, plan);
        } else {
            let rack = racks.get_mut(&rack_id).unwrap();
            let plan = order.plan_items_to_reserve(rack);
            if plan.is_empty() {
                continue;
            }
            rack.allocated_to = Some(agent_id);
            rack.state = warecore_storage::RackState::Allocated;

            let task_id = task_ids.next();
            let mut task = Task::new(task_id, agent_id, rack_id, order.gate_id, now);
            reserve_plan(&order.kind, rack, items, &plan);
            task.merge_order(order.id, plan.clone());
            order.assign_to_task(task_id, plan);

            ready_agents.retain(|&a| a != agent_id);
            new_tasks.push(task);
        }
    }

    trim_redundant_racks(order, &mut new_tasks, racks, items, ready_agents, redundant_rack_threshold);

    DispatchOutcome { new_tasks }
}

/// §9: "greedy stage 1 plus the redundant-rack removal pass bounded by a
/// configurable threshold on the current selected count". Stage 1 above
/// picks racks one at a time against a live snapshot of remaining stock
/// and can end up having freshly allocated more racks to one order than
/// `redundant_rack_threshold` permits; this pass walks the newly created
/// tasks (never ones this order merged into an already-running task, since
/// those didn't consume a new rack allocation) and unwinds the
/// smallest-contribution ones until the count is back at the threshold,
/// returning their reservations and racks to the pool for the next order.
fn trim_redundant_racks(
    order: &mut Order,
    new_tasks: &mut Vec<Task>,
    racks: &mut HashMap<RackId, Rack>,
    items: &mut HashMap<ItemId, Item>,
    ready_agents: &mut Vec<AgentId>,
    threshold: usize,
) {
    while new_tasks.len() > threshold {
        let Some((idx, _)) = new_tasks
            .iter()
            .enumerate()
            .min_by_key(|(_, t)| t.items_to_deliver().values().sum::<u32>())
        else {
            break;
        };
        let task = new_tasks.remove(idx);
        let reverted = order.revert_task_assignment(task.id);

        if let Some(rack) = racks.get_mut(&task.rack_id) {
            unreserve_plan(&order.kind, rack, items, &reverted);
            rack.allocated_to = None;
            rack.state = RackState::Idle;
        }
        if !ready_agents.contains(&task.agent_id) {
            ready_agents.push(task.agent_id);
        }
    }
}

/// Inverse of `reserve_plan`: hand the reservation back to the item and
/// rack ledgers when a redundant rack allocation is unwound.
fn unreserve_plan(kind: &OrderKind, rack: &mut Rack, items: &mut HashMap<ItemId, Item>, plan: &HashMap<ItemId, u32>) {
    for (&item_id, &qty) in plan {
        if qty == 0 {
            continue;
        }
        if let Some(item) = items.get_mut(&item_id) {
            inventory::reserve_item(item, qty as i64);
        }
        if matches!(kind, OrderKind::Collect) {
            let _ = inventory::reserve_on_rack(rack, item_id, -(qty as i64));
        }
    }
}

/// Convert `order`'s general item-level reservation into a task-specific
/// one (§4.3). A collect order pulls physically-present stock, so the
/// rack's own `task_reserved` ledger tracks it pending removal. A refill
/// order adds stock that doesn't exist on this rack yet, so there is
/// nothing to earmark on the rack side - the incoming units stay tracked
/// purely through `Order`/`Task` bookkeeping until they are physically
/// added at Offload.
fn reserve_plan(
    kind: &OrderKind,
    rack: &mut Rack,
    items: &mut HashMap<ItemId, Item>,
    plan: &HashMap<ItemId, u32>,
) {
    for (&item_id, &qty) in plan {
        if qty == 0 {
            continue;
        }
        if let Some(item) = items.get_mut(&item_id) {
            inventory::reserve_item(item, -(qty as i64));
        }
        if matches!(kind, OrderKind::Collect) {
            let _ = inventory::reserve_on_rack(rack, item_id, qty as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_entities::OrderStatus;
    use warecore_grid::Position;
    use warecore_ids::{GateId, OrderId};

    fn task_with(id: u32, rack: u32, agent: u32, qty: u32) -> Task {
        let mut task = Task::new(TaskId::new(id), AgentId::new(agent), RackId::new(rack), GateId::new(0), Tick::ZERO);
        let mut items = HashMap::new();
        items.insert(ItemId::new(1), qty);
        task.merge_order(OrderId::new(0), items);
        task
    }

    #[test]
    fn test_trim_redundant_racks_unwinds_smallest_contributors_over_threshold() {
        let mut order = Order::new(OrderId::new(0), OrderKind::Collect, GateId::new(0), vec![(ItemId::new(1), 30)]);
        order.status = OrderStatus::Active;

        let mut racks = HashMap::new();
        let mut items = HashMap::new();
        let mut ready_agents = Vec::new();
        let mut new_tasks = Vec::new();

        let mut stock_item = Item::new(ItemId::new(1), "widget".into(), 1.0);

        // Three racks allocated to this order with uneven contributions;
        // a threshold of 2 must unwind the smallest one (rack 2, qty 1).
        for (rack_id, agent_id, qty) in [(0u32, 0u32, 20u32), (1, 1, 9), (2, 2, 1)] {
            let mut rack = Rack::new(RackId::new(rack_id), Position::new(0, 0), 1.0, 100.0);
            rack.allocated_to = Some(AgentId::new(agent_id));
            rack.state = RackState::Allocated;
            inventory::add_stock(&mut stock_item, &mut rack, qty as i64).unwrap();
            inventory::reserve_on_rack(&mut rack, ItemId::new(1), qty as i64).unwrap();
            racks.insert(RackId::new(rack_id), rack);

            let task = task_with(rack_id, rack_id, agent_id, qty);
            let mut plan = HashMap::new();
            plan.insert(ItemId::new(1), qty);
            order.assign_to_task(task.id, plan);
            new_tasks.push(task);
        }

        trim_redundant_racks(&mut order, &mut new_tasks, &mut racks, &mut items, &mut ready_agents, 2);

        assert_eq!(new_tasks.len(), 2);
        assert!(new_tasks.iter().all(|t| t.rack_id != RackId::new(2)), "smallest contributor should be unwound");
        assert_eq!(racks[&RackId::new(2)].state, RackState::Idle);
        assert!(racks[&RackId::new(2)].allocated_to.is_none());
        assert!(ready_agents.contains(&AgentId::new(2)));
        assert_eq!(order.pending(ItemId::new(1)), 1, "unwound rack's reservation returns to pending");
    }

    #[test]
    fn test_trim_redundant_racks_is_noop_under_threshold() {
        let mut order = Order::new(OrderId::new(0), OrderKind::Collect, GateId::new(0), vec![(ItemId::new(1), 10)]);
        order.status = OrderStatus::Active;
        let mut racks = HashMap::new();
        let mut items = HashMap::new();
        let mut ready_agents = Vec::new();
        let mut new_tasks = vec![task_with(0, 0, 0, 10)];
        let mut plan = HashMap::new();
        plan.insert(ItemId::new(1), 10);
        order.assign_to_task(TaskId::new(0), plan);

        trim_redundant_racks(&mut order, &mut new_tasks, &mut racks, &mut items, &mut ready_agents, 3);
        assert_eq!(new_tasks.len(), 1);
    }
}
