//! Warecore Planner - space-time A* search, reservation commit/drop, and
//! per-tick plan execution (§4.5).

pub mod astar;
pub mod commit;
pub mod drop;
pub mod exec;
pub mod slide;

pub use astar::{plan, Plan, PriorityLookup};
pub use commit::commit_plan;
pub use drop::{drop_plan, drop_plan_by_id};
pub use exec::{execute_step, reserve_current_position, StepOutcome};
pub use slide::{slide_towards_target, SlideTarget};
