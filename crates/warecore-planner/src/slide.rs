//! Guide-map replanner fallback (§4.5.4): purely-spatial, opportunistic
//! local movement for an agent that is off-plan, recursively displacing
//! lower-priority agents out of the way.

use std::collections::{HashMap, HashSet};
use warecore_entities::Agent;
use warecore_grid::{Direction, GuideMap, Position, ReservationTimeline, WarehouseGrid};
use warecore_ids::{AgentId, Tick};

/// Supplies the guide map an agent should make progress against while
/// sliding, if it currently has one (e.g. its task's next sub-target).
/// Kept as a trait so this crate never needs to know about tasks, racks,
/// or gates directly.
pub trait SlideTarget {
    fn guide_map_for(&self, agent: AgentId) -> Option<&GuideMap>;
}

/// Move `agent_id` one cell closer to its guide-map target, recursively
/// sliding lower-priority occupants out of the way as needed. Each agent
/// is offered at most one displacement per tick (`touched`), which is
/// what guarantees the recursion terminates; an equal-or-higher-priority
/// incumbent anywhere along the chain blocks the whole attempt.
///
/// Returns `true` if `agent_id` actually moved.
pub fn slide_towards_target(
    grid: &mut WarehouseGrid,
    timeline: &mut ReservationTimeline,
    agents: &mut HashMap<AgentId, Agent>,
    targets: &impl SlideTarget,
    agent_id: AgentId,
    now: Tick,
    touched: &mut HashSet<AgentId>,
) -> bool {
    try_displace(grid, timeline, agents, targets, agent_id, None, now, touched)
}

/// Recursive worker. `requester_priority` is `None` for the top-level
/// call (any occupant may move) and `Some(p)` when called to clear a cell
/// for a higher-priority requester with priority `p` (§4.5.4: "a higher
/// priority incumbent blocks displacement").
pub(crate) fn try_displace(
    grid: &mut WarehouseGrid,
    timeline: &mut ReservationTimeline,
    agents: &mut HashMap<AgentId, Agent>,
    targets: &impl SlideTarget,
    agent_id: AgentId,
    requester_priority: Option<u32>,
    now: Tick,
    touched: &mut HashSet<AgentId>,
) -> bool {
    if touched.contains(&agent_id) {
        return false;
    }
    touched.insert(agent_id);

    let Some(agent) = agents.get(&agent_id) else {
        return false;
    };
    if let Some(req_priority) = requester_priority {
        // Equal-or-higher-priority incumbent blocks displacement.
        if agent.priority <= req_priority {
            return false;
        }
    }
    let my_priority = agent.priority;
    let cur_pos = agent.position;

    let guide = targets.guide_map_for(agent_id);
    let cur_dist = guide.and_then(|g| g.distance(cur_pos));

    let mut candidates: Vec<Position> = Direction::ALL
        .iter()
        .filter_map(|&d| grid.neighbor(cur_pos, d))
        .filter(|&p| grid.cell_at(p).map(|c| c.is_passable()).unwrap_or(false))
        .collect();

    // §4.5.4: "moves one cell in any direction d such that D_target(cur) >
    // D_target(neighbor)". When the agent has no active target, any
    // passable neighbour is acceptable opportunistic recovery.
    if let (Some(g), Some(d)) = (guide, cur_dist) {
        candidates.retain(|&p| g.distance(p).map(|nd| nd < d).unwrap_or(false));
    }

    for candidate in candidates {
        let occupant = grid.cell_at(candidate).and_then(|c| c.current_agent);
        let vacated = match occupant {
            None => true,
            Some(other) => try_displace(grid, timeline, agents, targets, other, Some(my_priority), now, touched),
        };
        if !vacated {
            continue;
        }

        let _ = grid.set_agent(cur_pos, None);
        let _ = grid.set_agent(candidate, Some(agent_id));
        if let Some(agent) = agents.get_mut(&agent_id) {
            agent.position = candidate;
            agent.last_action_tick = now;
        }
        let _ = timeline.reserve(candidate, now, agent_id);
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_entities::{Agent, AgentStatus};
    use warecore_grid::{Direction, WarehouseGrid};

    struct NoTargets;
    impl SlideTarget for NoTargets {
        fn guide_map_for(&self, _agent: AgentId) -> Option<&GuideMap> {
            None
        }
    }

    #[test]
    fn test_slide_moves_into_free_neighbor_with_no_target() {
        let mut grid = WarehouseGrid::new(1, 3).unwrap();
        let mut timeline = ReservationTimeline::new();
        let mut agents = HashMap::new();
        let agent = Agent::new(AgentId::new(1), Position::new(0, 1), Direction::Up, 10.0);
        grid.set_agent(Position::new(0, 1), Some(agent.id)).unwrap();
        agents.insert(agent.id, agent);

        let mut touched = HashSet::new();
        let moved = slide_towards_target(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(1), Tick::new(1), &mut touched);
        assert!(moved);
        assert_ne!(agents[&AgentId::new(1)].position, Position::new(0, 1));
    }

    #[test]
    fn test_higher_priority_incumbent_blocks_displacement() {
        let mut grid = WarehouseGrid::new(1, 2).unwrap();
        let mut timeline = ReservationTimeline::new();
        let mut agents = HashMap::new();

        // id 1 has higher priority (lower number) than id 2.
        let blocker = Agent::new(AgentId::new(1), Position::new(0, 1), Direction::Up, 10.0);
        grid.set_agent(Position::new(0, 1), Some(blocker.id)).unwrap();
        let mut mover = Agent::new(AgentId::new(2), Position::new(0, 0), Direction::Up, 10.0);
        mover.status = AgentStatus::Blocked;
        grid.set_agent(Position::new(0, 0), Some(mover.id)).unwrap();

        agents.insert(blocker.id, blocker);
        agents.insert(mover.id, mover);

        let mut touched = HashSet::new();
        let moved = try_displace(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(1), Some(2), Tick::new(1), &mut touched);
        assert!(!moved, "agent 1 outranks priority 2 and must not be displaced");
    }
}
