//! Warecore Storage - items, racks, and the inventory accounting that
//! keeps them in lockstep.

pub mod catalog;
pub mod inventory;
pub mod item;
pub mod rack;

pub use catalog::ItemCatalog;
pub use item::Item;
pub use rack::{Rack, RackState};
