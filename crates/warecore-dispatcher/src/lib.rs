//! Warecore Dispatcher - matching pending orders to racks and agents
//! (§4.4).

pub mod dispatch;
pub mod rank;

pub use dispatch::{dispatch, DispatchOutcome};
pub use rank::{effective_weight, estimated_steps, max_supply, select_agent, select_rack, DistanceField};
