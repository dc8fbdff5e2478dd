//! Priority preemption: dropping an agent's plan (§4.5.3).

use std::collections::HashMap;
use warecore_entities::Agent;
use warecore_grid::ReservationTimeline;
use warecore_ids::AgentId;

/// Walk `agent`'s remaining plan virtually, clearing every `(pos, tick)`
/// reservation it holds on the shared timeline, then empty its action
/// list. Called both when a higher-priority agent needs a cell (from
/// `commit_plan`) and when execution fails (from `execute_step`).
pub fn drop_plan(timeline: &mut ReservationTimeline, agent: &mut Agent) {
    for (pos, tick) in agent.reserved.drain(..) {
        timeline.clear(pos, tick);
    }
    agent.plan.clear();
}

/// Look up `agent_id` in `agents` and drop its plan, if it exists. A
/// convenience for call sites that only have an id, not a `&mut Agent`.
pub fn drop_plan_by_id(
    timeline: &mut ReservationTimeline,
    agents: &mut HashMap<AgentId, Agent>,
    agent_id: AgentId,
) {
    if let Some(agent) = agents.get_mut(&agent_id) {
        drop_plan(timeline, agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_grid::{Direction, Position};
    use warecore_ids::Tick;

    #[test]
    fn test_drop_plan_clears_every_reservation() {
        let mut timeline = ReservationTimeline::new();
        let mut agent = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Up, 10.0);

        let pos = Position::new(0, 1);
        timeline.reserve(pos, Tick::new(1), agent.id).unwrap();
        agent.reserved.push_back((pos, Tick::new(1)));
        agent.plan.push_back(warecore_entities::Action::Move);

        drop_plan(&mut timeline, &mut agent);

        assert!(agent.plan.is_empty());
        assert!(agent.reserved.is_empty());
        assert_eq!(timeline.scheduled_at(pos, Tick::new(1)), None);
    }
}
