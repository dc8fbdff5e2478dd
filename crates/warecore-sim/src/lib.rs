//! Warecore Sim - the `Warehouse` state container and the discrete
//! per-tick orchestration that drives dispatch, motion, and the task
//! state machine (§4.7).

pub mod messages;
pub mod policy_set;
pub mod task_fsm;
pub mod tick;
pub mod warehouse;

pub use messages::{AckStatus, InboundEvent, OrderKindWire, OutboundEvent, RobotEventKind, submit_order_ack};
pub use policy_set::PolicySet;
pub use task_fsm::{is_facility_action, next_step, NextStep};
pub use warehouse::{SubmitOrderKind, SubmitOrderRequest, Warehouse};
