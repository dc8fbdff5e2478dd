//! Core identifiers, tick counter, errors, and determinism primitives
//! shared by every other Warecore crate.

pub mod error;
pub mod id;
pub mod rng;
pub mod tick;

pub use error::{WarehouseError, WarehouseResult};
pub use id::{AgentId, GateId, IdGenerator, ItemId, OrderId, RackId, StationId, TaskId};
pub use rng::WarehouseRng;
pub use tick::Tick;
