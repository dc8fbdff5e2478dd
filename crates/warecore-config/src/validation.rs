//! Configuration validation: catches cross-reference and value errors
//! before a `Warehouse` is ever built, producing actionable, located
//! diagnostics instead of a panic deep inside grid construction.

use crate::scenario::WarehouseConfig;
use std::collections::HashSet;
use std::fmt;

/// Path to a configuration field, e.g. `racks[2].initial_stock`.
#[derive(Debug, Clone)]
pub struct FieldPath(pub String);

impl FieldPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn field(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}.{}", self.0, name))
        }
    }

    pub fn index(&self, idx: usize) -> Self {
        Self(format!("{}[{}]", self.0, idx))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ValidationErrorKind,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self { path, kind, suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.path, self.kind)?;
        if let Some(s) = &self.suggestion {
            write!(f, " ({s})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum ValidationErrorKind {
    OutOfBounds { row: u32, col: u32, rows: u32, cols: u32 },
    DuplicateId { id: String },
    DuplicateCell { row: u32, col: u32 },
    UnknownItem { item_id: String },
    UnknownDirection { value: String },
    UnknownGate { gate_id: String },
    UnknownRack { rack_id: String },
    UnknownOrderKind { value: String },
    ValueMustBePositive { field: String, value: f64 },
    CapacityExceeded { rack_id: String, stored_weight: f64, capacity: f64 },
    EmptyCollection { field: String },
    /// A seeded order passed static validation but was rejected once the
    /// `Warehouse` actually tried to admit it (§7.1) - availability and
    /// rack-capacity checks that need the live inventory ledger, not just
    /// the config file, to evaluate.
    OrderSeedRejected { order_id: String, reason: String },
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { row, col, rows, cols } => {
                write!(f, "({row},{col}) is outside the {rows}x{cols} grid")
            }
            Self::DuplicateId { id } => write!(f, "id '{id}' is used more than once"),
            Self::DuplicateCell { row, col } => {
                write!(f, "cell ({row},{col}) is occupied by more than one facility")
            }
            Self::UnknownItem { item_id } => write!(f, "references unknown item '{item_id}'"),
            Self::UnknownDirection { value } => write!(f, "'{value}' is not a cardinal direction"),
            Self::UnknownGate { gate_id } => write!(f, "references unknown gate '{gate_id}'"),
            Self::UnknownRack { rack_id } => write!(f, "references unknown rack '{rack_id}'"),
            Self::UnknownOrderKind { value } => write!(f, "'{value}' is not 'collect' or 'refill'"),
            Self::ValueMustBePositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::CapacityExceeded { rack_id, stored_weight, capacity } => write!(
                f,
                "rack '{rack_id}' initial stock weighs {stored_weight:.2}, exceeding capacity {capacity:.2}"
            ),
            Self::EmptyCollection { field } => write!(f, "{field} must not be empty"),
            Self::OrderSeedRejected { order_id, reason } => {
                write!(f, "seeded order '{order_id}' rejected: {reason}")
            }
        }
    }
}

/// Validate `config` in full, returning every error found rather than
/// stopping at the first (so a scenario author sees the whole picture
/// at once).
pub fn validate_scenario(config: &WarehouseConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let root = FieldPath::root();
    let rows = config.dimensions.rows;
    let cols = config.dimensions.cols;

    if rows == 0 || cols == 0 {
        errors.push(
            ValidationError::new(
                root.field("dimensions"),
                ValidationErrorKind::ValueMustBePositive {
                    field: "rows/cols".into(),
                    value: 0.0,
                },
            )
            .with_suggestion("both dimensions must be at least 1"),
        );
    }

    if config.items.is_empty() {
        errors.push(ValidationError::new(
            root.field("items"),
            ValidationErrorKind::EmptyCollection { field: "items".into() },
        ));
    }
    if config.agents.is_empty() {
        errors.push(ValidationError::new(
            root.field("agents"),
            ValidationErrorKind::EmptyCollection { field: "agents".into() },
        ));
    }

    let mut occupied: HashSet<(u32, u32)> = HashSet::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();

    let mut check_cell = |path: FieldPath, row: u32, col: u32, errors: &mut Vec<ValidationError>| {
        if row >= rows || col >= cols {
            errors.push(ValidationError::new(
                path,
                ValidationErrorKind::OutOfBounds { row, col, rows, cols },
            ));
            return;
        }
        if !occupied.insert((row, col)) {
            errors.push(ValidationError::new(path, ValidationErrorKind::DuplicateCell { row, col }));
        }
    };

    for (i, rack) in config.racks.iter().enumerate() {
        let path = root.field("racks").index(i);
        if !seen_ids.insert(rack.id.as_str()) {
            errors.push(ValidationError::new(
                path.field("id"),
                ValidationErrorKind::DuplicateId { id: rack.id.clone() },
            ));
        }
        check_cell(path.clone(), rack.row, rack.col, &mut errors);
        if rack.capacity <= 0.0 {
            errors.push(ValidationError::new(
                path.field("capacity"),
                ValidationErrorKind::ValueMustBePositive { field: "capacity".into(), value: rack.capacity },
            ));
        }
        let mut stored_weight = 0.0;
        for (item_id, qty) in &rack.initial_stock {
            match config.items.iter().find(|i| &i.id == item_id) {
                Some(item) => stored_weight += item.unit_weight * *qty as f64,
                None => errors.push(ValidationError::new(
                    path.field("initial_stock"),
                    ValidationErrorKind::UnknownItem { item_id: item_id.clone() },
                )),
            }
        }
        if stored_weight > rack.capacity {
            errors.push(ValidationError::new(
                path.field("initial_stock"),
                ValidationErrorKind::CapacityExceeded {
                    rack_id: rack.id.clone(),
                    stored_weight,
                    capacity: rack.capacity,
                },
            ));
        }
    }

    for (i, gate) in config.gates.iter().enumerate() {
        let path = root.field("gates").index(i);
        if !seen_ids.insert(gate.id.as_str()) {
            errors.push(ValidationError::new(
                path.field("id"),
                ValidationErrorKind::DuplicateId { id: gate.id.clone() },
            ));
        }
        check_cell(path, gate.row, gate.col, &mut errors);
    }

    for (i, station) in config.stations.iter().enumerate() {
        let path = root.field("stations").index(i);
        if !seen_ids.insert(station.id.as_str()) {
            errors.push(ValidationError::new(
                path.field("id"),
                ValidationErrorKind::DuplicateId { id: station.id.clone() },
            ));
        }
        check_cell(path, station.row, station.col, &mut errors);
    }

    for (i, item) in config.items.iter().enumerate() {
        if item.unit_weight <= 0.0 {
            errors.push(ValidationError::new(
                root.field("items").index(i).field("unit_weight"),
                ValidationErrorKind::ValueMustBePositive {
                    field: "unit_weight".into(),
                    value: item.unit_weight,
                },
            ));
        }
    }

    let mut agent_ids: HashSet<&str> = HashSet::new();
    for (i, agent) in config.agents.iter().enumerate() {
        let path = root.field("agents").index(i);
        if !agent_ids.insert(agent.id.as_str()) {
            errors.push(ValidationError::new(
                path.field("id"),
                ValidationErrorKind::DuplicateId { id: agent.id.clone() },
            ));
        }
        if agent.row >= rows || agent.col >= cols {
            errors.push(ValidationError::new(
                path.clone(),
                ValidationErrorKind::OutOfBounds { row: agent.row, col: agent.col, rows, cols },
            ));
        }
        if agent.load_capacity <= 0.0 {
            errors.push(ValidationError::new(
                path.field("load_capacity"),
                ValidationErrorKind::ValueMustBePositive {
                    field: "load_capacity".into(),
                    value: agent.load_capacity,
                },
            ));
        }
        if !matches!(agent.direction.to_lowercase().as_str(), "up" | "down" | "left" | "right") {
            errors.push(
                ValidationError::new(
                    path.field("direction"),
                    ValidationErrorKind::UnknownDirection { value: agent.direction.clone() },
                )
                .with_suggestion("use one of: up, down, left, right"),
            );
        }
    }

    let mut order_ids: HashSet<&str> = HashSet::new();
    for (i, order) in config.orders.iter().enumerate() {
        let path = root.field("orders").index(i);
        if !order_ids.insert(order.id.as_str()) {
            errors.push(ValidationError::new(
                path.field("id"),
                ValidationErrorKind::DuplicateId { id: order.id.clone() },
            ));
        }
        if !matches!(order.kind.as_str(), "collect" | "refill") {
            errors.push(
                ValidationError::new(
                    path.field("kind"),
                    ValidationErrorKind::UnknownOrderKind { value: order.kind.clone() },
                )
                .with_suggestion("use 'collect' or 'refill'"),
            );
        }
        if !config.gates.iter().any(|g| g.id == order.gate) {
            errors.push(ValidationError::new(
                path.field("gate"),
                ValidationErrorKind::UnknownGate { gate_id: order.gate.clone() },
            ));
        }
        if order.kind == "refill" {
            match &order.rack {
                Some(rack_id) if !config.racks.iter().any(|r| &r.id == rack_id) => {
                    errors.push(ValidationError::new(
                        path.field("rack"),
                        ValidationErrorKind::UnknownRack { rack_id: rack_id.clone() },
                    ));
                }
                None => errors.push(
                    ValidationError::new(path.field("rack"), ValidationErrorKind::EmptyCollection { field: "rack".into() })
                        .with_suggestion("refill orders must name exactly one rack"),
                ),
                _ => {}
            }
        }
        if order.items.is_empty() {
            errors.push(ValidationError::new(
                path.field("items"),
                ValidationErrorKind::EmptyCollection { field: "items".into() },
            ));
        }
        for (item_id, qty) in &order.items {
            if !config.items.iter().any(|i| &i.id == item_id) {
                errors.push(ValidationError::new(
                    path.field("items"),
                    ValidationErrorKind::UnknownItem { item_id: item_id.clone() },
                ));
            }
            if *qty == 0 {
                errors.push(ValidationError::new(
                    path.field("items").field(item_id),
                    ValidationErrorKind::ValueMustBePositive { field: item_id.clone(), value: 0.0 },
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{AgentConfig, GateConfig, GridDimensions, ItemConfig, RackConfig, WarehouseConfig};
    use std::collections::HashMap;

    fn minimal_config() -> WarehouseConfig {
        WarehouseConfig {
            dimensions: GridDimensions { rows: 3, cols: 3 },
            obstacles: vec![],
            items: vec![ItemConfig { id: "widget".into(), unit_weight: 1.0 }],
            racks: vec![RackConfig {
                id: "rack-0".into(),
                row: 0,
                col: 2,
                container_weight: 1.0,
                capacity: 100.0,
                initial_stock: HashMap::new(),
            }],
            gates: vec![GateConfig { id: "gate-0".into(), row: 0, col: 0 }],
            stations: vec![],
            agents: vec![AgentConfig {
                id: "agent-0".into(),
                row: 0,
                col: 1,
                direction: "up".into(),
                load_capacity: 10.0,
            }],
            policies: Default::default(),
            orders: vec![],
        }
    }

    #[test]
    fn test_order_seed_referencing_unknown_gate_is_flagged() {
        use crate::scenario::OrderSeedConfig;
        let mut config = minimal_config();
        config.orders.push(OrderSeedConfig {
            id: "order-0".into(),
            kind: "collect".into(),
            gate: "no-such-gate".into(),
            rack: None,
            items: HashMap::from([("widget".into(), 1)]),
        });
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::UnknownGate { .. })));
    }

    #[test]
    fn test_refill_order_seed_without_a_rack_is_flagged() {
        use crate::scenario::OrderSeedConfig;
        let mut config = minimal_config();
        config.orders.push(OrderSeedConfig {
            id: "order-0".into(),
            kind: "refill".into(),
            gate: "gate-0".into(),
            rack: None,
            items: HashMap::from([("widget".into(), 1)]),
        });
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::EmptyCollection { field } if field == "rack")));
    }

    #[test]
    fn test_minimal_config_is_valid() {
        assert!(validate_scenario(&minimal_config()).is_empty());
    }

    #[test]
    fn test_out_of_bounds_rack_is_flagged() {
        let mut config = minimal_config();
        config.racks[0].col = 99;
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::OutOfBounds { .. })));
    }

    #[test]
    fn test_unknown_item_in_initial_stock_is_flagged() {
        let mut config = minimal_config();
        config.racks[0].initial_stock.insert("ghost".into(), 5);
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::UnknownItem { .. })));
    }

    #[test]
    fn test_overfull_rack_is_flagged() {
        let mut config = minimal_config();
        config.racks[0].capacity = 2.0;
        config.racks[0].initial_stock.insert("widget".into(), 10);
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::CapacityExceeded { .. })));
    }

    #[test]
    fn test_duplicate_cell_between_rack_and_gate_is_flagged() {
        let mut config = minimal_config();
        config.gates[0].row = config.racks[0].row;
        config.gates[0].col = config.racks[0].col;
        let errors = validate_scenario(&config);
        assert!(errors.iter().any(|e| matches!(e.kind, ValidationErrorKind::DuplicateCell { .. })));
    }
}
