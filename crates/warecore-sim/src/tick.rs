//! The discrete §4.7 tick loop: dispatch, retreat, agent advance, in
//! that order, once per call to `Warehouse::tick`. Split out of
//! `warehouse.rs` so the state container and its per-tick behaviour can
//! be read (and reviewed) separately.

use std::collections::{HashMap, HashSet};

use warecore_dispatcher::{dispatch, DistanceField};
use warecore_entities::{Action, AgentStatus, OrderKind, Task, TaskPhase};
use warecore_grid::{GuideMap, Position};
use warecore_ids::{AgentId, GateId, RackId, TaskId};
use warecore_metrics::LogKind;
use warecore_planner::{commit_plan, drop_plan_by_id, execute_step, plan, slide_towards_target, SlideTarget, StepOutcome};
use warecore_storage::{inventory, RackState};

use crate::task_fsm::{self, NextStep};
use crate::warehouse::Warehouse;

/// Borrows only the two guide-map tables, so a dispatch pass can rank
/// racks and agents without taking a whole `&Warehouse` borrow that
/// would conflict with the `&mut self.racks` / `&mut self.agents` the
/// same call needs.
struct Guides<'a> {
    gate_guides: &'a HashMap<GateId, GuideMap>,
    rack_guides: &'a HashMap<RackId, GuideMap>,
}

impl DistanceField for Guides<'_> {
    fn gate_distance(&self, gate: GateId, pos: Position) -> Option<u32> {
        self.gate_guides.get(&gate).and_then(|g| g.distance(pos))
    }

    fn rack_distance(&self, rack: RackId, pos: Position) -> Option<u32> {
        self.rack_guides.get(&rack).and_then(|g| g.distance(pos))
    }
}

/// What each agent with a running task is making progress towards, as a
/// pre-snapshotted owned map rather than a live borrow of `self.agents` -
/// the slide fallback needs `&mut self.agents` in the same call.
struct SimTargets<'a> {
    agent_tasks: &'a HashMap<AgentId, TaskId>,
    tasks: &'a HashMap<TaskId, Task>,
    rack_guides: &'a HashMap<RackId, GuideMap>,
    gate_guides: &'a HashMap<GateId, GuideMap>,
}

impl SlideTarget for SimTargets<'_> {
    fn guide_map_for(&self, agent: AgentId) -> Option<&GuideMap> {
        let task_id = self.agent_tasks.get(&agent)?;
        let task = self.tasks.get(task_id)?;
        match task.phase {
            TaskPhase::ApproachRack | TaskPhase::ReturnRack => self.rack_guides.get(&task.rack_id),
            TaskPhase::ApproachGate => self.gate_guides.get(&task.gate_id),
            _ => None,
        }
    }
}

impl Warehouse {
    /// Advance the whole simulation by exactly one discrete tick (§4.7).
    pub fn tick(&mut self) {
        self.run_dispatch_phase();
        self.run_retreat_phase();
        self.run_agent_phase();
        self.tick = self.tick.succ();
    }

    /// Step 1: iterate pending orders FIFO, dispatching each against the
    /// current ready-agent pool. Orders still pending afterwards are
    /// re-queued for next tick unless the dismissal policy has given up
    /// on them (§7.2).
    fn run_dispatch_phase(&mut self) {
        let pending: Vec<_> = self.pending_orders.drain(..).collect();

        for order_id in pending {
            let Some(mut order) = self.orders.remove(&order_id) else { continue };

            if order.status == warecore_entities::OrderStatus::Inactive {
                let pending_ids: Vec<_> = order.pending_items().keys().copied().collect();
                let mut item_refs = Vec::with_capacity(pending_ids.len());
                for item_id in pending_ids {
                    if let Some(item) = self.items.get_mut(&item_id) {
                        item_refs.push(item);
                    }
                }
                order.activate(item_refs.into_iter());
            }

            let candidate_racks = self.candidate_racks_for(&order);
            let progress_before = order.no_progress_ticks;
            let guides = Guides { gate_guides: &self.gate_guides, rack_guides: &self.rack_guides };

            let outcome = dispatch(
                &mut order,
                candidate_racks,
                &mut self.ready_agents,
                &mut self.racks,
                &self.agents,
                &mut self.tasks,
                &mut self.items,
                &self.catalog,
                &guides,
                &mut self.task_ids,
                self.tick,
                self.policies.redundant_rack_threshold,
            );

            for task in outcome.new_tasks {
                let task_id = task.id;
                let agent_id = task.agent_id;
                if let Some(agent) = self.agents.get_mut(&agent_id) {
                    agent.active_task = Some(task_id);
                    agent.status = AgentStatus::Active;
                }
                self.tasks.insert(task_id, task);
                let _ = self.events.record(self.tick, LogKind::TaskAssigned { task_id, agent_id });
            }

            if order.is_pending() {
                if order.no_progress_ticks == progress_before {
                    order.no_progress_ticks += 1;
                }
                if self.policies.dismissal.should_dismiss(&order, order.no_progress_ticks) {
                    order.dismiss();
                    let _ = self.events.record(self.tick, LogKind::OrderDismissed { order_id });
                    self.orders.insert(order_id, order);
                } else {
                    self.orders.insert(order_id, order);
                    self.pending_orders.push_back(order_id);
                }
            } else {
                self.orders.insert(order_id, order);
            }
        }
    }

    /// Step 2: agents stuck `Blocked` by a failed plan get one
    /// opportunistic slide per tick towards their task's current
    /// sub-target, displacing lower-priority occupants out of the way
    /// (§4.5.4). An agent that moves is returned to `Active` so the
    /// agent-advance phase below requests it a fresh plan next tick.
    fn run_retreat_phase(&mut self) {
        let blocked: Vec<AgentId> =
            self.agents.values().filter(|a| a.status == AgentStatus::Blocked).map(|a| a.id).collect();
        if blocked.is_empty() {
            return;
        }

        let agent_tasks: HashMap<AgentId, TaskId> =
            self.agents.iter().filter_map(|(&id, a)| a.active_task.map(|t| (id, t))).collect();
        let targets =
            SimTargets { agent_tasks: &agent_tasks, tasks: &self.tasks, rack_guides: &self.rack_guides, gate_guides: &self.gate_guides };

        let mut touched = HashSet::new();
        for agent_id in blocked {
            let moved =
                slide_towards_target(&mut self.grid, &mut self.timeline, &mut self.agents, &targets, agent_id, self.tick, &mut touched);
            if moved {
                if let Some(agent) = self.agents.get_mut(&agent_id) {
                    agent.status = AgentStatus::Active;
                }
            }
        }
    }

    /// Step 3: every `Active` agent gets one chance to make progress,
    /// in strict priority order (highest priority, i.e. lowest numeric
    /// priority, first) with smaller agent id breaking ties (§4.7).
    fn run_agent_phase(&mut self) {
        let mut active: Vec<AgentId> =
            self.agents.values().filter(|a| a.status == AgentStatus::Active).map(|a| a.id).collect();
        active.sort_by_key(|&id| self.agents[&id].priority_key());

        let mut touched = HashSet::new();
        for agent_id in active {
            self.advance_agent(agent_id, &mut touched);
        }
    }

    fn advance_agent(&mut self, agent_id: AgentId, touched: &mut HashSet<AgentId>) {
        let has_plan = self.agents.get(&agent_id).map(|a| a.has_plan()).unwrap_or(false);

        if !has_plan {
            self.request_replan(agent_id);
            return;
        }

        // `targets` borrows `self.tasks`/`self.rack_guides`/`self.gate_guides`
        // immutably; it must be dropped before `request_replan` can take
        // `&mut self` (including `&mut self.tasks`), so it's scoped to this
        // block rather than built once per tick.
        let outcome = {
            let agent_tasks: HashMap<AgentId, TaskId> =
                self.agents.iter().filter_map(|(&id, a)| a.active_task.map(|t| (id, t))).collect();
            let targets = SimTargets {
                agent_tasks: &agent_tasks,
                tasks: &self.tasks,
                rack_guides: &self.rack_guides,
                gate_guides: &self.gate_guides,
            };
            execute_step(&mut self.grid, &mut self.timeline, &mut self.agents, &targets, agent_id, self.tick, touched)
        };

        match outcome {
            // A committed plan only ever contains Move/rotation steps
            // (`warecore_planner::astar` never emits a facility action);
            // arrival at the target is noticed next tick, when
            // `request_replan` finds the agent already standing on it.
            StepOutcome::Applied(_) => {}
            StepOutcome::Failed | StepOutcome::NoPlan => {
                self.request_replan(agent_id);
            }
        }
    }

    /// Ask the agent's active task what it should do next and either
    /// perform an in-place facility action, commit a freshly searched
    /// plan towards the next sub-target, or mark the agent `Blocked` if
    /// no path exists (§4.5.1, §4.6, §4.7 step 3).
    fn request_replan(&mut self, agent_id: AgentId) {
        let Some(task_id) = self.agents.get(&agent_id).and_then(|a| a.active_task) else { return };
        let Some(task) = self.tasks.get(&task_id).cloned() else { return };

        let next = task_fsm::next_step(&task, &self.racks, &self.gates, self.tick, self.policies.gate_dwell.as_ref());

        match next {
            None => {}
            Some(NextStep::InPlace(action)) => {
                self.apply_facility_action(agent_id, action);
                self.advance_task_phase(task_id);
            }
            Some(NextStep::Position(target)) => {
                let Some(pos) = self.agents.get(&agent_id).map(|a| a.position) else { return };
                if pos == target {
                    // The agent is already on its sub-target's cell (a
                    // zero-length move, e.g. returning to a rack it
                    // never left); nothing to execute, so the phase
                    // advances immediately and we ask again this tick.
                    self.advance_task_phase(task_id);
                    self.request_replan(agent_id);
                    return;
                }

                let planned = match self.agents.get(&agent_id) {
                    Some(agent) => plan(&self.grid, &self.timeline, &self.agents, agent, target, self.tick),
                    None => return,
                };

                match planned {
                    Some(p) if !p.actions.is_empty() => {
                        commit_plan(&mut self.timeline, &mut self.agents, agent_id, p);
                    }
                    Some(_) => {
                        self.advance_task_phase(task_id);
                    }
                    None => {
                        if let Some(agent) = self.agents.get_mut(&agent_id) {
                            agent.status = AgentStatus::Blocked;
                        }
                    }
                }
            }
        }
    }

    fn advance_task_phase(&mut self, task_id: TaskId) {
        let done = match self.tasks.get_mut(&task_id) {
            Some(task) => {
                task.advance_phase();
                task.is_done()
            }
            None => return,
        };
        if done {
            self.finish_task(task_id);
        }
    }

    /// Apply the semantic side effect of a one-tick facility action
    /// (§4.6 phases 2, 4, 5, 7). `Move`/rotations/`Retreat` need nothing
    /// further - `warecore-planner::exec` already applied those.
    fn apply_facility_action(&mut self, agent_id: AgentId, action: Action) {
        let Some(task_id) = self.agents.get(&agent_id).and_then(|a| a.active_task) else { return };

        match action {
            Action::Load => {
                let Some(rack_id) = self.tasks.get(&task_id).map(|t| t.rack_id) else { return };
                if let Some(rack) = self.racks.get_mut(&rack_id) {
                    rack.state = RackState::Loaded;
                }
                if let Some(agent) = self.agents.get_mut(&agent_id) {
                    agent.carrying = Some(rack_id);
                }
            }
            Action::BindGate => {
                let Some(task) = self.tasks.get(&task_id).cloned() else { return };
                if let Some(gate) = self.gates.get_mut(&task.gate_id) {
                    gate.bind(task_id, self.tick);
                }
                self.confirm_task_items(&task);
            }
            Action::UnbindGate => {
                let Some(gate_id) = self.tasks.get(&task_id).map(|t| t.gate_id) else { return };
                if let Some(gate) = self.gates.get_mut(&gate_id) {
                    gate.unbind();
                }
            }
            Action::Offload => {
                let Some(rack_id) = self.tasks.get(&task_id).map(|t| t.rack_id) else { return };
                if let Some(rack) = self.racks.get_mut(&rack_id) {
                    rack.state = RackState::Allocated;
                }
                if let Some(agent) = self.agents.get_mut(&agent_id) {
                    agent.carrying = None;
                }
            }
            _ => {}
        }
    }

    /// Physically confirm `task`'s reserved items at `BindGate` (§4.6
    /// phase 4): a collect order removes them from the rack, a refill
    /// order adds them, in both cases releasing the order-level general
    /// reservation `Order::activate` took out at submission time. Which
    /// direction applies is read from the task's founding order, since
    /// merging is only ever done between orders of the same kind on the
    /// same rack.
    fn confirm_task_items(&mut self, task: &Task) {
        let Some(kind) = task.orders.first().and_then(|oid| self.orders.get(oid)).map(|o| o.kind.clone()) else {
            return;
        };
        let items: Vec<(_, _)> = task.items_to_deliver().iter().map(|(&i, &q)| (i, q)).collect();

        for (item_id, qty) in items {
            if qty == 0 {
                continue;
            }
            let (Some(rack), Some(item)) = (self.racks.get_mut(&task.rack_id), self.items.get_mut(&item_id)) else {
                continue;
            };
            match kind {
                OrderKind::Collect => {
                    let _ = inventory::confirm_removal(item, rack, qty as i64);
                }
                OrderKind::Refill { .. } => {
                    let _ = inventory::add_stock(item, rack, qty as i64);
                    inventory::reserve_item(item, -(qty as i64));
                }
            }
        }
    }

    /// A task reaching `Done` (§4.6 phase 7 completing): release the
    /// rack, free the agent back to `Ready`, and settle every order it
    /// carried (§4.3's "on task completion").
    fn finish_task(&mut self, task_id: TaskId) {
        let Some(task) = self.tasks.get(&task_id).cloned() else { return };

        if let Some(rack) = self.racks.get_mut(&task.rack_id) {
            rack.state = RackState::Idle;
            rack.allocated_to = None;
        }

        if let Some(agent) = self.agents.get_mut(&task.agent_id) {
            agent.active_task = None;
            agent.carrying = None;
            agent.status = AgentStatus::Ready;
        }
        drop_plan_by_id(&mut self.timeline, &mut self.agents, task.agent_id);
        if !self.ready_agents.contains(&task.agent_id) {
            self.ready_agents.push(task.agent_id);
        }

        let _ = self
            .events
            .record(self.tick, LogKind::TaskCompleted { task_id, items: task.items_to_deliver().clone() });

        for &order_id in &task.orders {
            if let Some(order) = self.orders.get_mut(&order_id) {
                order.task_completed(task_id);
                if order.is_fulfilled() {
                    let _ = self.events.record(self.tick, LogKind::OrderFulfilled { order_id });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_config::{AgentConfig, GateConfig, GridDimensions, ItemConfig, PolicyConfig, RackConfig, WarehouseConfig};

    fn simple_config() -> WarehouseConfig {
        WarehouseConfig {
            dimensions: GridDimensions { rows: 1, cols: 5 },
            obstacles: Vec::new(),
            items: vec![ItemConfig { id: "widget".into(), unit_weight: 1.0 }],
            racks: vec![RackConfig {
                id: "r0".into(),
                row: 0,
                col: 2,
                container_weight: 1.0,
                capacity: 100.0,
                initial_stock: [("widget".to_string(), 10)].into_iter().collect(),
            }],
            gates: vec![GateConfig { id: "g0".into(), row: 0, col: 4 }],
            stations: Vec::new(),
            agents: vec![AgentConfig {
                id: "a0".into(),
                row: 0,
                col: 0,
                direction: "right".into(),
                load_capacity: 50.0,
            }],
            policies: PolicyConfig::default(),
            orders: Vec::new(),
        }
    }

    #[test]
    fn test_collect_order_runs_to_fulfillment() {
        let cfg = simple_config();
        let mut wh = Warehouse::from_config(&cfg).expect("valid config");

        let order_id = wh
            .submit_order(crate::warehouse::SubmitOrderRequest {
                external_id: "o0".into(),
                kind: crate::warehouse::SubmitOrderKind::Collect,
                gate_external_id: "g0".into(),
                items: vec![("widget".into(), 5)],
            })
            .expect("feasible order");

        for _ in 0..200 {
            wh.tick();
            if wh.orders.get(&order_id).map(|o| o.is_fulfilled()).unwrap_or(false) {
                break;
            }
        }

        let order = wh.orders.get(&order_id).expect("order retained after completion");
        assert!(order.is_fulfilled(), "order should be fulfilled well within 200 ticks");
        let item = wh.items.values().find(|i| i.string_id == "widget").unwrap();
        assert_eq!(item.stored_total(), 5);
        assert_eq!(item.reserved(), 0);
    }
}
