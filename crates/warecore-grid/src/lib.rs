//! Warecore Grid - static cell geometry, the fleet-wide space-time
//! reservation timeline, and per-facility guide maps.

pub mod geometry;
pub mod grid;
pub mod guide_map;
pub mod reservation;

pub use geometry::{Direction, Position};
pub use grid::{CellType, Facility, GridCell, WarehouseGrid};
pub use guide_map::GuideMap;
pub use reservation::ReservationTimeline;
