use crate::traits::DismissalPolicy;
use warecore_entities::Order;

/// Dismiss an order once it has gone `threshold_ticks` consecutive ticks
/// without the dispatcher being able to make any progress on it. Default
/// threshold is 500 ticks (§9 Design Notes).
pub struct ThresholdDismissalPolicy {
    threshold_ticks: u32,
}

impl ThresholdDismissalPolicy {
    pub fn new(threshold_ticks: u32) -> Self {
        Self { threshold_ticks }
    }
}

impl Default for ThresholdDismissalPolicy {
    fn default() -> Self {
        Self::new(500)
    }
}

impl DismissalPolicy for ThresholdDismissalPolicy {
    fn should_dismiss(&self, _order: &Order, consecutive_no_progress_ticks: u32) -> bool {
        consecutive_no_progress_ticks >= self.threshold_ticks
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

/// Never dismiss orders; useful for scenarios/tests that want orders to
/// wait indefinitely rather than be dropped.
pub struct NeverDismissPolicy;

impl DismissalPolicy for NeverDismissPolicy {
    fn should_dismiss(&self, _order: &Order, _consecutive_no_progress_ticks: u32) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "never"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warecore_entities::OrderKind;
    use warecore_ids::{GateId, ItemId, OrderId};

    fn sample_order() -> Order {
        Order::new(OrderId::new(0), OrderKind::Collect, GateId::new(0), vec![(ItemId::new(1), 1)])
    }

    #[test]
    fn test_threshold_dismisses_at_exactly_the_configured_value() {
        let policy = ThresholdDismissalPolicy::new(500);
        let order = sample_order();
        assert!(!policy.should_dismiss(&order, 499));
        assert!(policy.should_dismiss(&order, 500));
    }

    #[test]
    fn test_never_dismiss_ignores_the_counter() {
        let policy = NeverDismissPolicy;
        let order = sample_order();
        assert!(!policy.should_dismiss(&order, u32::MAX));
    }
}
