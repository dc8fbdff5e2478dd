//! Policy traits for the explicit "do NOT guess" free parameters
//! (§9 Design Notes / Open Questions). Each trait has one default
//! implementation; both decisions are recorded, with rationale, in
//! DESIGN.md.

use warecore_entities::{Gate, Order};

pub trait GateDwellPolicy: Send + Sync {
    /// Minimum number of ticks a task must hold `UnbindGate` before the
    /// gate releases (§4.6 phase 5).
    fn dwell_ticks(&self, gate: &Gate) -> u32;

    fn name(&self) -> &'static str;
}

pub trait DismissalPolicy: Send + Sync {
    /// Whether an order that has made no dispatch progress for
    /// `consecutive_no_progress_ticks` should be dismissed (§7.2).
    fn should_dismiss(&self, order: &Order, consecutive_no_progress_ticks: u32) -> bool;

    fn name(&self) -> &'static str;
}
