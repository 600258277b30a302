//! Collaborator interfaces: time and input.

use crate::slot::Slot;

/// A key transition on the pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub slot: Slot,
    pub pressed: bool,
}

impl KeyEvent {
    pub const fn press(slot: Slot) -> Self {
        Self { slot, pressed: true }
    }

    pub const fn release(slot: Slot) -> Self {
        Self { slot, pressed: false }
    }

    /// Build a press from a raw index; out-of-range indices yield `None`.
    pub fn press_index(index: u8) -> Option<Self> {
        Slot::new(index).map(Self::press)
    }
}

/// Rotary encoder activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderEvent {
    /// Detents turned since the last poll; positive is clockwise.
    Rotate(i32),
    /// Push-button press (debounced upstream).
    Press,
}

/// Polled input. Implementations never block.
pub trait InputSource {
    fn poll(&mut self) -> Option<KeyEvent>;

    fn poll_encoder(&mut self) -> Option<i32>;

    fn poll_encoder_press(&mut self) -> bool;

    /// At most one encoder event, press taking priority over rotation.
    fn poll_encoder_event(&mut self) -> Option<EncoderEvent> {
        if self.poll_encoder_press() {
            return Some(EncoderEvent::Press);
        }
        match self.poll_encoder() {
            Some(0) | None => None,
            Some(delta) => Some(EncoderEvent::Rotate(delta)),
        }
    }
}

/// Monotonic time in seconds; never decreases.
pub trait Clock {
    fn now(&self) -> f64;
}
