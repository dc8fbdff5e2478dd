//! Translating a task's current phase into the next thing its agent
//! should do (§4.6): either a grid cell to approach, or a one-tick
//! in-place facility action. Kept separate from the tick loop itself so
//! the phase table reads as a single, reviewable switch rather than
//! being interleaved with borrow-juggling.

use std::collections::HashMap;
use warecore_entities::{Action, Gate, Task, TaskPhase};
use warecore_grid::Position;
use warecore_ids::{GateId, RackId, Tick};
use warecore_policies::GateDwellPolicy;
use warecore_storage::Rack;

/// What a task's agent should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextStep {
    /// Approach this grid cell (a planner target).
    Position(Position),
    /// Take this one-tick facility action in place.
    InPlace(Action),
}

/// `None` means the task has nothing left to do this tick: either it is
/// `Done`, or it is in `UnbindGate` waiting out the gate's dwell policy
/// (§4.6 phase 5, §9 open question resolved by `GateDwellPolicy`).
pub fn next_step(
    task: &Task,
    racks: &HashMap<RackId, Rack>,
    gates: &HashMap<GateId, Gate>,
    now: Tick,
    dwell_policy: &dyn GateDwellPolicy,
) -> Option<NextStep> {
    match task.phase {
        TaskPhase::ApproachRack | TaskPhase::ReturnRack => {
            racks.get(&task.rack_id).map(|r| NextStep::Position(r.home_position))
        }
        TaskPhase::Load => Some(NextStep::InPlace(Action::Load)),
        TaskPhase::ApproachGate => gates.get(&task.gate_id).map(|g| NextStep::Position(g.position)),
        TaskPhase::BindGate => Some(NextStep::InPlace(Action::BindGate)),
        TaskPhase::UnbindGate => {
            let gate = gates.get(&task.gate_id)?;
            if gate.dwell_elapsed(now) >= dwell_policy.dwell_ticks(gate) {
                Some(NextStep::InPlace(Action::UnbindGate))
            } else {
                None
            }
        }
        TaskPhase::Offload => Some(NextStep::InPlace(Action::Offload)),
        TaskPhase::Done => None,
    }
}

/// Facility actions carry semantic effects the tick loop must apply
/// (rack/gate/item mutation, phase advance) beyond the grid motion
/// `warecore-planner::exec` already performs; `Move`/rotations/`Retreat`
/// need nothing further once executed.
pub fn is_facility_action(action: Action) -> bool {
    matches!(action, Action::Load | Action::BindGate | Action::UnbindGate | Action::Offload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_grid::Position;
    use warecore_ids::{AgentId, GateId as GId, RackId as RId, TaskId};
    use warecore_policies::FixedDwellPolicy;

    fn task(phase: TaskPhase) -> Task {
        let mut t = Task::new(TaskId::new(0), AgentId::new(0), RId::new(0), GId::new(0), Tick::ZERO);
        t.phase = phase;
        t
    }

    #[test]
    fn test_approach_rack_targets_rack_home_position() {
        let mut racks = HashMap::new();
        racks.insert(RId::new(0), Rack::new(RId::new(0), Position::new(2, 3), 1.0, 10.0));
        let gates = HashMap::new();
        let policy = FixedDwellPolicy::default();
        let step = next_step(&task(TaskPhase::ApproachRack), &racks, &gates, Tick::ZERO, &policy);
        assert_eq!(step, Some(NextStep::Position(Position::new(2, 3))));
    }

    #[test]
    fn test_unbind_gate_waits_for_dwell() {
        let racks = HashMap::new();
        let mut gates = HashMap::new();
        let mut gate = Gate::new(GId::new(0), Position::new(0, 0));
        gate.bind(TaskId::new(0), Tick::new(5));
        gates.insert(GId::new(0), gate);
        let policy = FixedDwellPolicy::new(3);

        let t = task(TaskPhase::UnbindGate);
        assert_eq!(next_step(&t, &racks, &gates, Tick::new(6), &policy), None);
        assert_eq!(
            next_step(&t, &racks, &gates, Tick::new(8), &policy),
            Some(NextStep::InPlace(Action::UnbindGate))
        );
    }

    #[test]
    fn test_done_phase_has_no_next_step() {
        let racks = HashMap::new();
        let gates = HashMap::new();
        let policy = FixedDwellPolicy::default();
        assert_eq!(next_step(&task(TaskPhase::Done), &racks, &gates, Tick::ZERO, &policy), None);
    }
}
