//! The outbound `Log` event kinds (§6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use warecore_ids::{AgentId, ItemId, OrderId, TaskId, Tick};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogKind {
    TaskAssigned { task_id: TaskId, agent_id: AgentId },
    TaskCompleted { task_id: TaskId, items: HashMap<ItemId, u32> },
    OrderFulfilled { order_id: OrderId },
    OrderDismissed { order_id: OrderId },
}

/// A single logged occurrence, timestamped by simulation tick rather
/// than wall-clock time (the core has no notion of wall-clock duration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub tick: Tick,
    pub kind: LogKind,
}
