//! Key mapping from terminal events to keypad input.
//!
//! The twelve keys are laid out on the left of a QWERTY keyboard in the same
//! 3x4 shape as the pad:
//!
//! ```text
//!  1 2 3      0  1  2
//!  q w e      3  4  5
//!  a s d      6  7  8
//!  z x c      9 10 11
//! ```
//!
//! Arrow keys turn the encoder, Enter or Space pushes it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{EncoderEvent, Slot};

/// One decoded terminal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadInput {
    Key(Slot),
    Encoder(EncoderEvent),
}

const LAYOUT: [char; 12] = ['1', '2', '3', 'q', 'w', 'e', 'a', 's', 'd', 'z', 'x', 'c'];

/// Slot bound to a character, case-insensitive.
pub fn slot_for_char(c: char) -> Option<Slot> {
    let c = c.to_ascii_lowercase();
    LAYOUT
        .iter()
        .position(|&k| k == c)
        .and_then(|i| Slot::new(i as u8))
}

/// Character printed on a slot's key cap.
pub fn char_for_slot(slot: Slot) -> char {
    LAYOUT[slot.index()]
}

/// Map a terminal key to pad input.
pub fn map_key_event(key: KeyEvent) -> Option<PadInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    match key.code {
        KeyCode::Left | KeyCode::Down => Some(PadInput::Encoder(EncoderEvent::Rotate(-1))),
        KeyCode::Right | KeyCode::Up => Some(PadInput::Encoder(EncoderEvent::Rotate(1))),
        KeyCode::Enter | KeyCode::Char(' ') => Some(PadInput::Encoder(EncoderEvent::Press)),
        KeyCode::Char(c) => slot_for_char(c).map(PadInput::Key),
        _ => None,
    }
}

/// Check if key should quit the program.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}
