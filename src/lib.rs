//! Keypad arcade (workspace facade crate).
//!
//! Eleven timing, memory and party games for a 12-key backlit keypad with a
//! rotary encoder and a small text display. The implementation lives in
//! dedicated crates under `crates/`; this package re-exports them under
//! short names and hosts the terminal binaries.

pub use keypad_arcade_core as core;
pub use keypad_arcade_host as host;
pub use keypad_arcade_input as input;
pub use keypad_arcade_term as term;
pub use keypad_arcade_types as types;
