//! Warecore Config - scenario configuration loading and validation.

pub mod scenario;
pub mod validation;

pub use scenario::{
    AgentConfig, ConfigError, GateConfig, GridDimensions, ItemConfig, OrderSeedConfig, PolicyConfig,
    RackConfig, StationConfig, WarehouseConfig,
};
pub use validation::{validate_scenario, FieldPath, ValidationError, ValidationErrorKind};
