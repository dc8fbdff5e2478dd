//! Warecore Policies - pluggable policies covering free design
//! parameters deliberately left open rather than hard-coded.

pub mod dismissal;
pub mod factory;
pub mod gate_dwell;
pub mod traits;

pub use dismissal::{NeverDismissPolicy, ThresholdDismissalPolicy};
pub use factory::{create_dismissal_policy, create_gate_dwell_policy};
pub use gate_dwell::{FixedDwellPolicy, PerGateDwellPolicy};
pub use traits::{DismissalPolicy, GateDwellPolicy};
