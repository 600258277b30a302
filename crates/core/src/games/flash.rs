//! Single-key white blink for "that key does nothing" feedback.
//!
//! The flash only tracks which slot is lit and until when; the owning game
//! repaints the slot itself once the flash is over, so a key whose meaning
//! changed in the meantime comes back in its new color.

use crate::types::Slot;

pub(crate) const FLASH_SECS: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct KeyFlash {
    pending: Option<(Slot, f64)>,
}

impl KeyFlash {
    /// Flash `slot` until `now + FLASH_SECS`. Returns a slot whose earlier
    /// flash was cut short and needs repainting.
    pub fn start(&mut self, slot: Slot, now: f64) -> Option<Slot> {
        let previous = self.pending.map(|(prev, _)| prev).filter(|&prev| prev != slot);
        self.pending = Some((slot, now + FLASH_SECS));
        previous
    }

    /// The flashed slot, once its time is up.
    pub fn due(&mut self, now: f64) -> Option<Slot> {
        match self.pending {
            Some((slot, until)) if now >= until => {
                self.pending = None;
                Some(slot)
            }
            _ => None,
        }
    }

    pub fn slot(&self) -> Option<Slot> {
        self.pending.map(|(slot, _)| slot)
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn shift(&mut self, dt: f64) {
        if let Some((_, until)) = &mut self.pending {
            *until += dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_comes_due_once() {
        let mut flash = KeyFlash::default();
        assert_eq!(flash.start(Slot::ALL[3], 1.0), None);
        assert_eq!(flash.due(1.05), None);
        assert_eq!(flash.due(1.1), Some(Slot::ALL[3]));
        assert_eq!(flash.due(2.0), None);
    }

    #[test]
    fn test_new_flash_hands_back_the_old_slot() {
        let mut flash = KeyFlash::default();
        flash.start(Slot::ALL[3], 1.0);
        assert_eq!(flash.start(Slot::ALL[4], 1.02), Some(Slot::ALL[3]));
        assert_eq!(flash.start(Slot::ALL[4], 1.04), None);
        assert_eq!(flash.slot(), Some(Slot::ALL[4]));
    }
}
