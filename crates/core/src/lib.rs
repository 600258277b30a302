//! Core game logic - pure, deterministic, and testable
//!
//! Every mini-game is a tick-driven state machine that talks to the outside
//! world only through the [`ResourceArbiter`] it is given. No module here
//! reads a clock, sleeps, or touches a file:
//!
//! - **Deterministic**: a seed and a list of `(time, input)` pairs replay a
//!   session exactly
//! - **Non-blocking**: countdowns, flashes and reveals are deadline-gated
//!   sub-states checked on each `tick`
//! - **Clean hand-off**: every exit path leaves the arbiter blank
//!
//! # Module Structure
//!
//! - [`machine`]: the [`GameStateMachine`] contract and the shared lifecycle driver
//! - [`game`]: [`GameKind`] registry and the [`Game`] sum type
//! - [`games`]: the eleven rule sets
//! - [`arbiter`]: output capabilities plus a recording double for tests
//! - [`cue`]: audio cues with synthesized fallback
//! - [`config`]: per-game tunables
//! - [`scoring`]: scoring and difficulty curves
//! - [`grid`]: Lights Out grid
//! - [`rng`], [`timer`]: seeded randomness and round timers
//!
//! # Example
//!
//! ```
//! use keypad_arcade_core::{
//!     ArcadeConfig, Control, Game, GameKind, GameStateMachine, RecordingArbiter,
//! };
//! use keypad_arcade_core::types::KeyEvent;
//!
//! let config = ArcadeConfig::instant();
//! let mut game = Game::new(GameKind::TogglePuzzle, RecordingArbiter::new(), &config, 7);
//! game.start(0.0);
//! assert!(game.arbiter().lit_count() > 0);
//!
//! game.on_key(KeyEvent::press_index(4).unwrap());
//! assert_eq!(game.tick(0.02), Control::Continue);
//!
//! let arbiter = game.release();
//! assert!(arbiter.is_clean());
//! ```

pub use keypad_arcade_types as types;

pub mod arbiter;
pub mod config;
pub mod cue;
pub mod game;
pub mod games;
pub mod grid;
pub mod machine;
pub mod rng;
pub mod scoring;
pub mod timer;

pub use arbiter::{AssetError, RecordingArbiter, Region, ResourceArbiter};
pub use config::{
    ArcadeConfig, ColorCycleConfig, ConfigError, HotPotatoConfig, PatternCopyConfig, PianoConfig,
    ReactionChaseConfig, ReactionTimerConfig, SequenceRecallConfig, SetRecallConfig,
    SpawnDespawnConfig, TicTacToeConfig, TogglePuzzleConfig,
};
pub use cue::{play_cue, play_key_tone, Cue};
pub use game::{Game, GameKind};
pub use grid::LightGrid;
pub use machine::{
    Control, EndReason, Expected, GameStateMachine, Machine, MiniGame, Outcome, Phase, Session,
    Step,
};
pub use rng::SimpleRng;
pub use timer::{ManualClock, RoundTimer};
