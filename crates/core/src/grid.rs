//! Lights Out grid.
//!
//! Pressing a slot flips it and its neighbors in one step. Flipping is an
//! XOR with the slot's neighbor mask, so pressing the same slot twice is the
//! identity, and replaying any press sequence undoes it.

use crate::types::{Slot, SlotSet};

/// Twelve lights, one per slot. A set bit is a lit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LightGrid(SlotSet);

impl LightGrid {
    pub const fn new() -> Self {
        Self(SlotSet::EMPTY)
    }

    pub fn from_lit(lit: SlotSet) -> Self {
        Self(lit)
    }

    /// Press `slot`: flip it and every neighbor.
    pub fn toggle(&mut self, slot: Slot) {
        self.0 = self.0.symmetric_difference(slot.neighbors());
    }

    pub fn is_lit(&self, slot: Slot) -> bool {
        self.0.contains(slot)
    }

    pub fn lit(&self) -> SlotSet {
        self.0
    }

    pub fn lit_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_solved(&self) -> bool {
        self.0.is_empty()
    }
}
