//! Mobile robots (§3 `Agent`).

use crate::action::Action;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::collections::VecDeque;
use warecore_grid::{Direction, Position};
use warecore_ids::{AgentId, RackId, TaskId, Tick};

/// §9 open question resolution: priority is purely id-based (this
/// crate carries no battery/age subsystem to weight it by), but the
/// field is kept distinct from the id itself so a future policy could
/// override it without renumbering agents.
#[derive(Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AgentStatus {
    Ready,
    Active,
    Blocked,
    Deactivated,
}

#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub position: Position,
    pub direction: Direction,
    pub priority: u32,
    pub load_capacity: f64,
    pub status: AgentStatus,
    pub active_task: Option<TaskId>,
    /// The rack currently being carried, if any (§4.5.1 successor rule 4).
    pub carrying: Option<RackId>,
    pub plan: VecDeque<Action>,
    /// One (position, tick) reservation per entry of `plan`, in lockstep,
    /// so `drop_plan` can clear the remaining timeline without replaying
    /// the action sequence (§4.5.3).
    pub reserved: VecDeque<(Position, Tick)>,
    pub last_action_tick: Tick,
}

impl Agent {
    pub fn new(id: AgentId, position: Position, direction: Direction, load_capacity: f64) -> Self {
        Self {
            id,
            position,
            direction,
            priority: id.as_u32(),
            load_capacity,
            status: AgentStatus::Ready,
            active_task: None,
            carrying: None,
            plan: VecDeque::new(),
            reserved: VecDeque::new(),
            last_action_tick: Tick::ZERO,
        }
    }

    /// Deterministic ordering key used everywhere strict priority order
    /// with an id tie-break is required (§4.5.1, §4.7).
    pub fn priority_key(&self) -> (u32, AgentId) {
        (self.priority, self.id)
    }

    pub fn has_plan(&self) -> bool {
        !self.plan.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.status == AgentStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_id_outranks_higher_id() {
        let a = Agent::new(AgentId::new(1), Position::new(0, 0), Direction::Up, 10.0);
        let b = Agent::new(AgentId::new(2), Position::new(0, 0), Direction::Up, 10.0);
        assert!(a.priority_key() < b.priority_key());
    }
}
