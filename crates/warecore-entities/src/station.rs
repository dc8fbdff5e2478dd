//! Recharge points (§3 `Station`).
//!
//! Battery modelling is out of scope for this core (no battery
//! dimension appears anywhere in the data model), so a station is
//! nothing more than a positioned facility the grid and guide maps can
//! route around - it has no behaviour of its own yet.

use rkyv::{Archive, Deserialize, Serialize};
use warecore_grid::Position;
use warecore_ids::StationId;

#[derive(Archive, Deserialize, Serialize, Clone, Debug)]
pub struct Station {
    pub id: StationId,
    pub position: Position,
}

impl Station {
    pub fn new(id: StationId, position: Position) -> Self {
        Self { id, position }
    }
}
