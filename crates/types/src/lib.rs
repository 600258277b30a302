//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the arcade.
//! All types are plain data with no I/O, making them usable in any context
//! (game logic, terminal rendering, the host loop).
//!
//! # Key Grid
//!
//! The keypad is a 3-column by 4-row grid of backlit keys:
//!
//! ```text
//!  0  1  2
//!  3  4  5
//!  6  7  8
//!  9 10 11
//! ```
//!
//! - **Slots**: 12 (indexed 0-11, row-major)
//! - **Adjacency**: a slot's orthogonal neighbors plus itself
//!
//! # Timing
//!
//! Timing values are in seconds (`f64`), read from a monotonic [`Clock`]:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 20 | Host loop interval (well under the 50ms budget) |
//! | `INTRO_SECS` | 3.0 | 3-2-1 countdown before the first round |
//! | `REVEAL_SECS` | 1.0 | Failure feedback shown before a game goes terminal |
//!
//! # Examples
//!
//! ```
//! use keypad_arcade_types::{Slot, SlotSet, SLOT_COUNT};
//!
//! let center = Slot::new(4).unwrap();
//! assert_eq!(center.row(), 1);
//! assert_eq!(center.col(), 1);
//!
//! // Five-point cross around the center key.
//! let cross = center.neighbors();
//! assert_eq!(cross.len(), 5);
//! assert!(cross.contains(center));
//!
//! assert!(Slot::new(SLOT_COUNT as u8).is_none());
//! assert!(SlotSet::EMPTY.is_empty());
//! ```

mod color;
mod io;
mod slot;

pub use color::{Rgb, Tone, GAME_COLORS, KEY_TONES_HZ};
pub use io::{Clock, EncoderEvent, InputSource, KeyEvent};
pub use slot::{Slot, SlotSet, GRID_COLS, GRID_ROWS, SLOT_COUNT};

/// Host loop interval in milliseconds.
pub const TICK_MS: u32 = 20;

/// Intro countdown before a game's first round.
pub const INTRO_SECS: f64 = 3.0;

/// How long failure feedback stays up before the terminal transition.
pub const REVEAL_SECS: f64 = 1.0;

/// Volume levels exposed by the menu (0 = mute).
pub const MAX_VOLUME: u8 = 5;

/// Volume a fresh install starts with.
pub const DEFAULT_VOLUME: u8 = 3;
