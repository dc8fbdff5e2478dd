//! Bundle of the §4.8 open-question policies, mirroring the generalised
//! workspace's `PolicySet` (one `Box<dyn Trait>` per pluggable decision,
//! plus a `names()` accessor for logging and a `Default` wiring in the
//! spec's stated defaults).

use warecore_policies::{create_dismissal_policy, create_gate_dwell_policy, DismissalPolicy, GateDwellPolicy};

pub struct PolicySet {
    pub gate_dwell: Box<dyn GateDwellPolicy>,
    pub dismissal: Box<dyn DismissalPolicy>,
    /// Bound on how many freshly allocated racks a single dispatch call
    /// may leave standing for one order before the redundant-rack removal
    /// pass unwinds the weakest ones (§9). A plain numeric knob rather
    /// than a swappable policy - the pass's removal rule isn't a point of
    /// open design, only the threshold is.
    pub redundant_rack_threshold: usize,
}

impl PolicySet {
    pub fn names(&self) -> (&'static str, &'static str) {
        (self.gate_dwell.name(), self.dismissal.name())
    }
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            gate_dwell: create_gate_dwell_policy("fixed", 1),
            dismissal: create_dismissal_policy("threshold", 500),
            redundant_rack_threshold: 3,
        }
    }
}
