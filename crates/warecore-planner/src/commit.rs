//! Committing a freshly searched `Plan` to the shared reservation
//! timeline (§4.5.1's "on reaching the goal... reserve each visited
//! (pos, tick)" side effect, kept separate from `astar::plan` itself so
//! the search stays a pure function of its inputs per the Design Notes'
//! "planner as a pure function of (world snapshot, agent, target)" rule).

use crate::astar::Plan;
use crate::drop::drop_plan;
use std::collections::HashMap;
use warecore_entities::Agent;
use warecore_grid::ReservationTimeline;
use warecore_ids::AgentId;

/// Write `plan`'s reservations into `timeline` under `agent_id`, dropping
/// any lower-priority agent's plan first when it already holds a slot
/// `plan` needs (§4.5.1). The A* search itself only ever returns plans
/// whose reserved cells are free, held by the planning agent, or held by
/// a strictly lower-priority agent (see `astar::plan`'s `is_timeline_clear`),
/// so every conflict this function resolves is a legitimate preemption.
pub fn commit_plan(
    timeline: &mut ReservationTimeline,
    agents: &mut HashMap<AgentId, Agent>,
    agent_id: AgentId,
    plan: Plan,
) {
    for &(pos, tick) in plan.reservations.iter() {
        if let Some(holder) = timeline.scheduled_at(pos, tick) {
            if holder != agent_id {
                if let Some(other) = agents.get_mut(&holder) {
                    drop_plan(timeline, other);
                }
            }
        }
        timeline
            .reserve(pos, tick, agent_id)
            .expect("conflicting holder was just cleared above");
    }

    if let Some(agent) = agents.get_mut(&agent_id) {
        agent.plan = plan.actions;
        agent.reserved = plan.reservations;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar;
    use std::collections::HashMap as Map;
    use warecore_grid::{Direction, Position, WarehouseGrid};
    use warecore_ids::Tick;

    fn grid() -> WarehouseGrid {
        WarehouseGrid::new(1, 5).unwrap()
    }

    #[test]
    fn test_commit_preempts_lower_priority_holder() {
        let grid = grid();
        let mut timeline = ReservationTimeline::new();
        let mut agents = Map::new();

        let low = Agent::new(AgentId::new(5), Position::new(0, 2), Direction::Up, 10.0);
        agents.insert(low.id, low.clone());
        let high = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Right, 10.0);
        agents.insert(high.id, high.clone());

        // Low-priority agent (id 5) holds cell (0,1) at tick 1.
        timeline.reserve(Position::new(0, 1), Tick::new(1), low.id).unwrap();
        agents.get_mut(&low.id).unwrap().reserved.push_back((Position::new(0, 1), Tick::new(1)));

        let plan = astar::plan(&grid, &timeline, &agents, &high, Position::new(0, 1), Tick::ZERO).unwrap();
        commit_plan(&mut timeline, &mut agents, high.id, plan);

        assert_eq!(timeline.scheduled_at(Position::new(0, 1), Tick::new(1)), Some(high.id));
        assert!(agents[&low.id].plan.is_empty());
        assert!(agents[&low.id].reserved.is_empty());
    }
}
