//! Terminal stand-in for the keypad hardware.
//!
//! The twelve backlit keys, the four-line display and the speaker are
//! simulated by [`TermArbiter`], painted into a framebuffer by [`PadView`]
//! and flushed by [`TerminalRenderer`]. Rendering is split from I/O:
//!
//! - `arbiter` and `pad_view` are pure and unit-tested
//! - `renderer` owns stdout and only diffs and writes frames

pub mod arbiter;
pub mod fb;
pub mod pad_view;
pub mod renderer;

pub use keypad_arcade_core as core;
pub use keypad_arcade_types as types;

pub use arbiter::{PadState, TermArbiter};
pub use fb::{Cell, CellStyle, FrameBuffer};
pub use pad_view::{PadView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
