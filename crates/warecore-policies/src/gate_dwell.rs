use crate::traits::GateDwellPolicy;
use std::collections::HashMap;
use warecore_entities::Gate;
use warecore_ids::GateId;

/// Every gate dwells for the same fixed number of ticks. Default is 1,
/// the spec's stated minimum.
pub struct FixedDwellPolicy {
    ticks: u32,
}

impl FixedDwellPolicy {
    pub fn new(ticks: u32) -> Self {
        Self { ticks: ticks.max(1) }
    }
}

impl Default for FixedDwellPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl GateDwellPolicy for FixedDwellPolicy {
    fn dwell_ticks(&self, _gate: &Gate) -> u32 {
        self.ticks
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Per-gate overrides, falling back to a default for unlisted gates.
pub struct PerGateDwellPolicy {
    default_ticks: u32,
    overrides: HashMap<GateId, u32>,
}

impl PerGateDwellPolicy {
    pub fn new(default_ticks: u32, overrides: HashMap<GateId, u32>) -> Self {
        Self {
            default_ticks: default_ticks.max(1),
            overrides,
        }
    }
}

impl GateDwellPolicy for PerGateDwellPolicy {
    fn dwell_ticks(&self, gate: &Gate) -> u32 {
        self.overrides.get(&gate.id).copied().unwrap_or(self.default_ticks).max(1)
    }

    fn name(&self) -> &'static str {
        "per_gate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_grid::Position;

    #[test]
    fn test_fixed_dwell_floors_at_one() {
        let policy = FixedDwellPolicy::new(0);
        let gate = Gate::new(GateId::new(0), Position::new(0, 0));
        assert_eq!(policy.dwell_ticks(&gate), 1);
    }

    #[test]
    fn test_per_gate_override_takes_priority() {
        let mut overrides = HashMap::new();
        overrides.insert(GateId::new(1), 5);
        let policy = PerGateDwellPolicy::new(1, overrides);
        let gate0 = Gate::new(GateId::new(0), Position::new(0, 0));
        let gate1 = Gate::new(GateId::new(1), Position::new(0, 1));
        assert_eq!(policy.dwell_ticks(&gate0), 1);
        assert_eq!(policy.dwell_ticks(&gate1), 5);
    }
}
