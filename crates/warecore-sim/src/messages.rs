//! The abstract message contract at the core's boundary (§6). These
//! types are transport-agnostic: the `simulate` CLI mode moves them
//! across stdin/stdout as JSON lines, `deploy` mode moves the same
//! types across a WebSocket in `warecore-ui`. Neither transport nor
//! wire framing lives in this crate.

use serde::{Deserialize, Serialize};
use warecore_entities::Action;
use warecore_ids::{AgentId, OrderId, Tick, WarehouseError};
use warecore_metrics::LogKind;

use crate::warehouse::{SubmitOrderKind, SubmitOrderRequest};

/// An inbound control message accepted at the start of a tick.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    SubmitOrder {
        id: String,
        kind: OrderKindWire,
        gate: String,
        #[serde(default)]
        rack: Option<String>,
        items: Vec<(String, u32)>,
    },
    Pause,
    Resume,
    Stop,
    Exit,
    RobotEvent { agent_id: u32, kind: RobotEventKind },
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKindWire {
    Collect,
    Refill,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RobotEventKind {
    Done,
    BatteryLevel { level: f64 },
    Blocked,
    Unblocked,
    Error { code: String },
}

impl InboundEvent {
    /// Resolves a `SubmitOrder` event into the request shape
    /// `Warehouse::submit_order` expects. Returns `None` for every other
    /// variant.
    pub fn into_submit_request(self) -> Option<SubmitOrderRequest> {
        match self {
            InboundEvent::SubmitOrder { id, kind, gate, rack, items } => Some(SubmitOrderRequest {
                external_id: id,
                kind: match kind {
                    OrderKindWire::Collect => SubmitOrderKind::Collect,
                    OrderKindWire::Refill => SubmitOrderKind::Refill { rack_external_id: rack.unwrap_or_default() },
                },
                gate_external_id: gate,
                items,
            }),
            _ => None,
        }
    }
}

/// A message emitted by the core, destined for an external collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    ActionFor { agent_id: AgentId, action: Action },
    Log { tick: Tick, kind: LogKind },
    Ack { request_type: &'static str, status: AckStatus },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AckStatus {
    Ok,
    Error { code: &'static str, reason: String },
}

impl AckStatus {
    pub fn from_result<T>(result: &Result<T, WarehouseError>) -> Self {
        match result {
            Ok(_) => AckStatus::Ok,
            Err(e) => AckStatus::Error { code: e.code(), reason: e.to_string() },
        }
    }
}

/// Builds the `Ack` an inbound `SubmitOrder` produces (§6). The
/// resolved `OrderId` on success is logged separately via `LogKind`,
/// not folded into the ack itself.
pub fn submit_order_ack(result: &Result<OrderId, WarehouseError>) -> OutboundEvent {
    OutboundEvent::Ack { request_type: "submit_order", status: AckStatus::from_result(result) }
}
