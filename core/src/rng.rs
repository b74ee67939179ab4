//! Seeded column streams for synthetic populations.
//!
//! RULE: Synthetic data never touches a platform RNG.
//! Each generated column owns a PCG stream whose seed mixes the
//! population seed with the column's fixed slot number, so a new
//! column can be added without disturbing the values of the others.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Odd 64-bit constant (2^64 / φ) spreading slot numbers across the seed space.
const SLOT_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct ColumnStream {
    slot: StreamSlot,
    rng:  Pcg64Mcg,
}

impl ColumnStream {
    pub fn new(population_seed: u64, slot: StreamSlot) -> Self {
        let seed = population_seed ^ (slot as u64).wrapping_mul(SLOT_MIX);
        Self { slot, rng: Pcg64Mcg::seed_from_u64(seed) }
    }

    pub fn slot(&self) -> StreamSlot {
        self.slot
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform in `[lo, hi)`. A collapsed range returns `lo`.
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }

    /// Whole number in `[0, n)`; zero for `n == 0`.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Heavy right tail starting at `x_min`; smaller `alpha` means a longer tail.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        let u: f64 = self.rng.gen::<f64>().max(1e-10);
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Fixed slot numbers, one per generated column.
/// Append only: renumbering changes every existing population.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Usage        = 0,
    Outage       = 1,
    Billing      = 2,
    PaymentDelay = 3,
    Tickets      = 4,
}
