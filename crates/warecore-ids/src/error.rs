//! Error types shared across the warehouse core
//!
//! `WarehouseError` carries the stable error codes from the external
//! interface contract (§6) plus the handful of internal failure modes
//! (`CellBusy`, `NotFound`) that crates built on top of `warecore-ids`
//! need to report.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("duplicate id: {entity_type} {id} already exists")]
    DuplicateId { entity_type: &'static str, id: u32 },

    #[error("invalid direction: {0}")]
    InvalidDirection(u8),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("order infeasible: {reason}")]
    OrderInfeasible { reason: String },

    #[error("rack {rack_id} unreachable from gate {gate_id}")]
    RackUnreachable { rack_id: u32, gate_id: u32 },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: &'static str, id: u32 },

    #[error("cell ({row},{col}) at tick {tick} is already reserved by a different agent")]
    CellBusy { row: u32, col: u32, tick: u64 },

    #[error("invalid state transition: {0}")]
    InvalidState(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WarehouseError {
    pub fn agent_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Agent", id }
    }

    pub fn rack_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Rack", id }
    }

    pub fn item_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Item", id }
    }

    pub fn gate_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Gate", id }
    }

    pub fn station_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Station", id }
    }

    pub fn order_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Order", id }
    }

    pub fn task_not_found(id: u32) -> Self {
        Self::NotFound { entity_type: "Task", id }
    }

    /// The stable error code used in outbound `Ack` messages (§6).
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDimensions(_) => "invalid_dimensions",
            Self::DuplicateId { .. } => "duplicate_id",
            Self::InvalidDirection(_) => "invalid_direction",
            Self::CapacityExceeded(_) => "capacity_exceeded",
            Self::OrderInfeasible { .. } => "order_infeasible",
            Self::RackUnreachable { .. } => "rack_unreachable",
            Self::NotFound { .. } => "not_found",
            Self::CellBusy { .. } => "cell_busy",
            Self::InvalidState(_) => "invalid_state",
            Self::Io(_) => "io_error",
        }
    }
}

pub type WarehouseResult<T> = Result<T, WarehouseError>;
