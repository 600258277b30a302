//! RNG module - seeded, deterministic randomness for every game
//!
//! All randomness a game uses (targets, patterns, phase offsets, scrambles)
//! comes from one [`SimpleRng`] injected at construction, so a seed replays
//! a session exactly.

use crate::types::{Slot, SlotSet, SLOT_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Scales the full 32-bit output instead of taking a remainder: the low
    /// bits of a power-of-two LCG cycle with a short period.
    pub fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0);
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Uniform float in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Uniform pick from a non-empty slice.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.next_range(items.len() as u32) as usize]
    }

    /// Uniform slot from `pool`, or `None` if the pool is empty.
    pub fn choose_slot(&mut self, pool: SlotSet) -> Option<Slot> {
        if pool.is_empty() {
            return None;
        }
        let nth = self.next_range(pool.len() as u32) as usize;
        pool.iter().nth(nth)
    }

    /// Uniform slot from the 11 that are not `previous`.
    pub fn choose_slot_except(&mut self, previous: Option<Slot>) -> Slot {
        let pool = match previous {
            Some(prev) => SlotSet::FULL.difference(SlotSet::EMPTY.with(prev)),
            None => SlotSet::FULL,
        };
        self.choose_slot(pool).unwrap_or(Slot::ALL[0])
    }

    /// `count` distinct slots, uniformly at random.
    pub fn sample_slots(&mut self, count: usize) -> SlotSet {
        let mut deck = Slot::ALL;
        self.shuffle(&mut deck);
        deck[..count.min(SLOT_COUNT)].iter().copied().collect()
    }

    /// Current RNG state (reseeding from it continues the same stream)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
