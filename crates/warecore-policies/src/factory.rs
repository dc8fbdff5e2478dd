use crate::dismissal::{NeverDismissPolicy, ThresholdDismissalPolicy};
use crate::gate_dwell::FixedDwellPolicy;
use crate::traits::{DismissalPolicy, GateDwellPolicy};

pub fn create_gate_dwell_policy(name: &str, ticks: u32) -> Box<dyn GateDwellPolicy> {
    match name {
        "fixed" => Box::new(FixedDwellPolicy::new(ticks)),
        _ => Box::new(FixedDwellPolicy::default()),
    }
}

pub fn create_dismissal_policy(name: &str, threshold_ticks: u32) -> Box<dyn DismissalPolicy> {
    match name {
        "threshold" => Box::new(ThresholdDismissalPolicy::new(threshold_ticks)),
        "never" => Box::new(NeverDismissPolicy),
        _ => Box::new(ThresholdDismissalPolicy::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_gate_dwell_name_falls_back_to_fixed_default() {
        let policy = create_gate_dwell_policy("nonsense", 1);
        assert_eq!(policy.name(), "fixed");
    }

    #[test]
    fn test_unknown_dismissal_name_falls_back_to_threshold_default() {
        let policy = create_dismissal_policy("nonsense", 500);
        assert_eq!(policy.name(), "threshold");
    }
}
