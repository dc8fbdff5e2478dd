//! Primitive actions an agent can be told to take in a single tick (§6
//! outbound `ActionFor`).

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(
    Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize,
    Clone, Copy, PartialEq, Eq, Debug,
)]
pub enum Action {
    Move,
    RotateLeft,
    RotateRight,
    Retreat,
    Load,
    Offload,
    BindGate,
    UnbindGate,
    Stop,
}
