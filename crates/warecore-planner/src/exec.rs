//! Plan execution: advancing one agent by one primitive action per tick
//! (§4.5.2).

use crate::drop::drop_plan;
use crate::slide::{try_displace, SlideTarget};
use std::collections::{HashMap, HashSet};
use warecore_entities::Action;
use warecore_grid::WarehouseGrid;
use warecore_grid::{Position, ReservationTimeline};
use warecore_ids::{AgentId, Tick};

/// Outcome of attempting to execute one step of an agent's plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action was applied; the agent moved or rotated.
    Applied(Action),
    /// The plan was empty; nothing to do.
    NoPlan,
    /// The next action's reservation could not be honoured (the physical
    /// world deviated from the planned timeline); the plan was dropped
    /// and the caller should request a replan.
    Failed,
}

/// Execute one step of `agent_id`'s current plan against `grid` and
/// `timeline` (§4.5.2). A rotation never fails; a MOVE fails only when
/// the target cell is occupied by an agent that can neither be treated
/// as the mover itself nor displaced out of the way this tick (§4.5.2:
/// "empty of agents or occupied by an agent that can be slid"), tried
/// here via the same displacement machinery the guide-map fallback uses
/// (`crate::slide`), with the mover's own priority as the requester.
pub fn execute_step(
    grid: &mut WarehouseGrid,
    timeline: &mut ReservationTimeline,
    agents: &mut HashMap<AgentId, warecore_entities::Agent>,
    targets: &impl SlideTarget,
    agent_id: AgentId,
    now: Tick,
    touched: &mut HashSet<AgentId>,
) -> StepOutcome {
    let Some(agent) = agents.get(&agent_id) else {
        return StepOutcome::NoPlan;
    };
    let Some(&action) = agent.plan.front() else {
        return StepOutcome::NoPlan;
    };

    match action {
        Action::RotateLeft | Action::RotateRight => {
            let agent = agents.get_mut(&agent_id).unwrap();
            agent.direction = if action == Action::RotateLeft {
                agent.direction.rotate_left()
            } else {
                agent.direction.rotate_right()
            };
            consume_step(agent, timeline, now);
            StepOutcome::Applied(action)
        }
        Action::Move => {
            let from = agent.position;
            let dir = agent.direction;
            let my_priority = agent.priority;
            let Some(to) = grid.neighbor(from, dir) else {
                let agent = agents.get_mut(&agent_id).unwrap();
                drop_plan(timeline, agent);
                return StepOutcome::Failed;
            };

            let occupant = grid.cell_at(to).and_then(|c| c.current_agent);
            let clear_to_move = match occupant {
                None => true,
                Some(other) if other == agent_id => true,
                Some(other) => {
                    try_displace(grid, timeline, agents, targets, other, Some(my_priority), now, touched)
                }
            };

            if !clear_to_move {
                let agent = agents.get_mut(&agent_id).unwrap();
                drop_plan(timeline, agent);
                return StepOutcome::Failed;
            }

            let _ = grid.set_agent(from, None);
            let _ = grid.set_agent(to, Some(agent_id));

            let agent = agents.get_mut(&agent_id).unwrap();
            agent.position = to;
            consume_step(agent, timeline, now);
            StepOutcome::Applied(Action::Move)
        }
        other => {
            // In-place facility actions (Load/Offload/BindGate/...) are
            // driven by the task state machine, not the motion planner;
            // encountering one here just consumes it as a no-op step.
            let agent = agents.get_mut(&agent_id).unwrap();
            consume_step(agent, timeline, now);
            StepOutcome::Applied(other)
        }
    }
}

/// Pop the executed action and its matching reservation, clearing the
/// timeline slot it consumed (the agent is no longer future-reserving a
/// cell it now physically occupies).
fn consume_step(agent: &mut warecore_entities::Agent, timeline: &mut ReservationTimeline, now: Tick) {
    agent.plan.pop_front();
    if let Some((pos, tick)) = agent.reserved.pop_front() {
        timeline.clear(pos, tick);
        debug_assert_eq!(pos, agent.position, "reservation pos must match the agent's new position");
        let _ = tick;
    }
    agent.last_action_tick = now;
}

/// Reserve `agent`'s current (position, tick) on the timeline so the §8
/// invariant "current (pos,tick) matches its own timeline entry" holds
/// even outside a formal plan (e.g. after a retreat or slide step).
pub fn reserve_current_position(
    timeline: &mut ReservationTimeline,
    agent_id: AgentId,
    pos: Position,
    tick: Tick,
) {
    let _ = timeline.reserve(pos, tick, agent_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_entities::{Action, Agent, AgentStatus};
    use warecore_grid::{Direction, GuideMap, WarehouseGrid};

    struct NoTargets;
    impl SlideTarget for NoTargets {
        fn guide_map_for(&self, _agent: AgentId) -> Option<&GuideMap> {
            None
        }
    }

    fn setup() -> (WarehouseGrid, ReservationTimeline, HashMap<AgentId, Agent>) {
        let grid = WarehouseGrid::new(1, 3).unwrap();
        (grid, ReservationTimeline::new(), HashMap::new())
    }

    #[test]
    fn test_move_into_empty_cell_advances_position() {
        let (mut grid, mut timeline, mut agents) = setup();
        let mut agent = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Right, 10.0);
        agent.status = AgentStatus::Active;
        agent.plan.push_back(Action::Move);
        agent.reserved.push_back((Position::new(0, 1), Tick::new(1)));
        grid.set_agent(Position::new(0, 0), Some(agent.id)).unwrap();
        timeline.reserve(Position::new(0, 1), Tick::new(1), agent.id).unwrap();
        agents.insert(agent.id, agent);

        let mut touched = HashSet::new();
        let outcome =
            execute_step(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(1), Tick::new(1), &mut touched);
        assert_eq!(outcome, StepOutcome::Applied(Action::Move));
        assert_eq!(agents[&AgentId::new(1)].position, Position::new(0, 1));
        assert!(agents[&AgentId::new(1)].plan.is_empty());
    }

    /// A 2-cell grid leaves the higher-priority blocker nowhere to be
    /// displaced to, so the move fails exactly as it did before the
    /// mover could attempt a slide.
    #[test]
    fn test_move_blocked_by_higher_priority_agent_with_no_room_drops_plan() {
        let mut grid = WarehouseGrid::new(1, 2).unwrap();
        let mut timeline = ReservationTimeline::new();
        let mut agents = HashMap::new();

        // Lower agent id outranks higher id (§3); mover (id 2) cannot
        // displace the higher-priority blocker (id 1).
        let mut mover = Agent::new(AgentId::new(2), Position::new(0, 0), Direction::Right, 10.0);
        mover.plan.push_back(Action::Move);
        mover.reserved.push_back((Position::new(0, 1), Tick::new(1)));
        grid.set_agent(Position::new(0, 0), Some(mover.id)).unwrap();

        let blocker = Agent::new(AgentId::new(1), Position::new(0, 1), Direction::Up, 10.0);
        grid.set_agent(Position::new(0, 1), Some(blocker.id)).unwrap();

        agents.insert(mover.id, mover);
        agents.insert(blocker.id, blocker);

        let mut touched = HashSet::new();
        let outcome =
            execute_step(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(2), Tick::new(1), &mut touched);
        assert_eq!(outcome, StepOutcome::Failed);
        assert!(agents[&AgentId::new(2)].plan.is_empty());
        assert_eq!(agents[&AgentId::new(2)].position, Position::new(0, 0));
        assert_eq!(agents[&AgentId::new(1)].position, Position::new(0, 1), "higher-priority blocker must not move");
    }

    /// With room to slide into and a lower-priority occupant, the move
    /// succeeds by displacing the occupant instead of dropping the plan
    /// (§4.5.2).
    #[test]
    fn test_move_displaces_lower_priority_occupant_into_free_cell() {
        let mut grid = WarehouseGrid::new(1, 3).unwrap();
        let mut timeline = ReservationTimeline::new();
        let mut agents = HashMap::new();

        let mut mover = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Right, 10.0);
        mover.plan.push_back(Action::Move);
        mover.reserved.push_back((Position::new(0, 1), Tick::new(1)));
        grid.set_agent(Position::new(0, 0), Some(mover.id)).unwrap();

        let occupant = Agent::new(AgentId::new(2), Position::new(0, 1), Direction::Up, 10.0);
        grid.set_agent(Position::new(0, 1), Some(occupant.id)).unwrap();

        agents.insert(mover.id, mover);
        agents.insert(occupant.id, occupant);

        let mut touched = HashSet::new();
        let outcome =
            execute_step(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(1), Tick::new(1), &mut touched);
        assert_eq!(outcome, StepOutcome::Applied(Action::Move));
        assert_eq!(agents[&AgentId::new(1)].position, Position::new(0, 1));
        assert_eq!(agents[&AgentId::new(2)].position, Position::new(0, 2), "occupant should have been slid clear");
    }

    #[test]
    fn test_rotation_always_succeeds() {
        let (mut grid, mut timeline, mut agents) = setup();
        let mut agent = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Up, 10.0);
        agent.plan.push_back(Action::RotateRight);
        agent.reserved.push_back((Position::new(0, 0), Tick::new(1)));
        agents.insert(agent.id, agent);

        let mut touched = HashSet::new();
        let outcome =
            execute_step(&mut grid, &mut timeline, &mut agents, &NoTargets, AgentId::new(1), Tick::new(1), &mut touched);
        assert_eq!(outcome, StepOutcome::Applied(Action::RotateRight));
        assert_eq!(agents[&AgentId::new(1)].direction, Direction::Right);
    }
}
