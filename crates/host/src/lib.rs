//! Host shell for the keypad arcade.
//!
//! Owns the pieces that sit around a running game: the selection menu, the
//! results screen, persisted best scores, settings, volume, and the wall
//! clock. [`GameHost`] ties them together and hands the single
//! [`ResourceArbiter`](crate::core::ResourceArbiter) back and forth with
//! the game it launches.

pub use keypad_arcade_core as core;
pub use keypad_arcade_types as types;

pub mod clock;
pub mod error;
pub mod host;
pub mod menu;
pub mod scores;
pub mod settings;

pub use clock::MonotonicClock;
pub use error::StoreError;
pub use host::{GameHost, Screen};
pub use menu::{Menu, VOLUME_DOWN, VOLUME_UP};
pub use scores::HighScores;
pub use settings::Settings;
