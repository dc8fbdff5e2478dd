//! Delivery/receive gates (§3 `Gate`).

use rkyv::{Archive, Deserialize, Serialize};
use warecore_grid::Position;
use warecore_ids::{GateId, TaskId, Tick};

/// A gate is bound to at most one task at a time (§8 boundary test:
/// "at no point are two agents bound to the same gate simultaneously").
#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Gate {
    pub id: GateId,
    pub position: Position,
    pub bound_task: Option<TaskId>,
    pub bound_since: Option<Tick>,
}

impl Gate {
    pub fn new(id: GateId, position: Position) -> Self {
        Self {
            id,
            position,
            bound_task: None,
            bound_since: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound_task.is_some()
    }

    pub fn bind(&mut self, task: TaskId, now: Tick) {
        self.bound_task = Some(task);
        self.bound_since = Some(now);
    }

    pub fn unbind(&mut self) {
        self.bound_task = None;
        self.bound_since = None;
    }

    /// Ticks elapsed since binding, used against the gate dwell policy.
    pub fn dwell_elapsed(&self, now: Tick) -> u32 {
        match self.bound_since {
            Some(since) => now.since(since) as u32,
            None => 0,
        }
    }
}
