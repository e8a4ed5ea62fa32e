//! Pluggable uniform randomness.

use crate::types::Vec2;
use rand::{Rng, RngCore};
use std::f64::consts::TAU;

/// A source of uniform reals in `[0, 1)`.
///
/// Every random draw in the simulation goes through this trait, so seeding the
/// source makes a whole run reproducible.
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;

    /// Uniform real in `[lo, hi)`
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    fn index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "index range must be non-empty");
        ((self.next_f64() * n as f64) as usize).min(n.saturating_sub(1))
    }

    /// Unit vector with a uniformly random heading
    fn unit_vector(&mut self) -> Vec2 {
        Vec2::from_angle(self.next_f64() * TAU)
    }

    /// Point uniformly placed in the unit square
    fn unit_point(&mut self) -> Vec2 {
        let x = self.next_f64();
        let y = self.next_f64();
        Vec2::new(x, y)
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
