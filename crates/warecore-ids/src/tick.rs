//! Discrete simulation tick counter
//!
//! Unlike a continuous-time kernel, the warehouse core advances in whole
//! ticks: every agent action costs exactly one tick and the whole world
//! steps in lockstep (see the tick loop in `warecore-sim`).

use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A single discrete step of the simulation clock.
#[derive(
    Archive, Deserialize, Serialize, SerdeDeserialize, SerdeSerialize,
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[rkyv(compare(PartialEq))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
    pub const MAX: Tick = Tick(u64::MAX);

    #[inline]
    pub const fn new(t: u64) -> Self {
        Tick(t)
    }

    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Ticks elapsed since `start`, saturating at zero if `start` is later.
    #[inline]
    pub fn since(&self, start: Tick) -> u64 {
        self.0.saturating_sub(start.0)
    }

    #[inline]
    pub fn succ(&self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl Sub<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn sub(self, rhs: u64) -> Tick {
        Tick(self.0 - rhs)
    }
}

impl AddAssign<u64> for Tick {
    #[inline]
    fn add_assign(&mut self, rhs: u64) {
        self.0 += rhs;
    }
}

impl SubAssign<u64> for Tick {
    #[inline]
    fn sub_assign(&mut self, rhs: u64) {
        self.0 -= rhs;
    }
}

impl fmt::Debug for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_arithmetic() {
        let t = Tick::new(10);
        assert_eq!((t + 5).as_u64(), 15);
        assert_eq!((t - 3).as_u64(), 7);
    }

    #[test]
    fn test_tick_since() {
        assert_eq!(Tick::new(10).since(Tick::new(4)), 6);
        assert_eq!(Tick::new(4).since(Tick::new(10)), 0);
    }

    #[test]
    fn test_tick_succ_is_monotone() {
        let t = Tick::ZERO;
        assert!(t.succ() > t);
    }
}
