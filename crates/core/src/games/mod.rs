//! The mini-games, one rule set per file.

pub mod color_cycle;
pub(crate) mod flash;
pub mod hot_potato;
pub mod pattern_copy;
pub mod piano;
pub mod reaction_chase;
pub mod reaction_timer;
pub mod sequence_recall;
pub mod set_recall;
pub mod spawn_despawn;
pub mod tic_tac_toe;
pub mod toggle_puzzle;

pub use color_cycle::ColorCycleMatch;
pub use hot_potato::HotPotato;
pub use pattern_copy::PatternCopy;
pub use piano::Piano;
pub use reaction_chase::ReactionChase;
pub use reaction_timer::ReactionTimer;
pub use sequence_recall::SequenceRecall;
pub use set_recall::SetRecall;
pub use spawn_despawn::{SpawnDespawn, SpawnStats};
pub use tic_tac_toe::{Player, Tally, TicTacToe};
pub use toggle_puzzle::TogglePuzzle;
