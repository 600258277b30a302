//! Terminal input module (host-facing).
//!
//! Maps `crossterm` key events onto pad keys and encoder events and exposes
//! them through the polled [`InputSource`](crate::types::InputSource)
//! interface the host consumes. Also provides a scripted source for tests.

pub mod map;
pub mod source;

pub use keypad_arcade_types as types;

pub use map::{char_for_slot, map_key_event, should_quit, slot_for_char, PadInput};
pub use source::{Scripted, ScriptedInput, TerminalInput};
