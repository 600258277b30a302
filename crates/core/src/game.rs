//! Game registry and the sum type the host drives.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::arbiter::ResourceArbiter;
use crate::config::ArcadeConfig;
use crate::games::{
    ColorCycleMatch, HotPotato, PatternCopy, Piano, ReactionChase, ReactionTimer, SequenceRecall,
    SetRecall, SpawnDespawn, TicTacToe, TogglePuzzle,
};
use crate::machine::{Control, GameStateMachine, Machine, Phase};
use crate::types::{EncoderEvent, KeyEvent};

/// Identifies a mini-game, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameKind {
    ReactionChase,
    SequenceRecall,
    SpawnDespawn,
    ColorCycleMatch,
    SetRecall,
    TogglePuzzle,
    ReactionTimer,
    Piano,
    PatternCopy,
    HotPotato,
    TicTacToe,
}

impl GameKind {
    pub const ALL: [GameKind; 11] = [
        GameKind::ReactionChase,
        GameKind::SequenceRecall,
        GameKind::SpawnDespawn,
        GameKind::ColorCycleMatch,
        GameKind::SetRecall,
        GameKind::TogglePuzzle,
        GameKind::ReactionTimer,
        GameKind::Piano,
        GameKind::PatternCopy,
        GameKind::HotPotato,
        GameKind::TicTacToe,
    ];

    /// Display name, also the key in the high-score file.
    pub const fn name(self) -> &'static str {
        match self {
            GameKind::ReactionChase => "Speed Chase",
            GameKind::SequenceRecall => "Simon Says",
            GameKind::SpawnDespawn => "Whack-a-Mole",
            GameKind::ColorCycleMatch => "Color Match",
            GameKind::SetRecall => "Memory Grid",
            GameKind::TogglePuzzle => "Lights Out",
            GameKind::ReactionTimer => "Reaction",
            GameKind::Piano => "Piano",
            GameKind::PatternCopy => "Pattern Copy",
            GameKind::HotPotato => "Hot Potato",
            GameKind::TicTacToe => "Tic-Tac-Toe",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            GameKind::ReactionChase => "Hit the lit key fast",
            GameKind::SequenceRecall => "Repeat the sequence",
            GameKind::SpawnDespawn => "Hit moles for 30s",
            GameKind::ColorCycleMatch => "Find the same color",
            GameKind::SetRecall => "Remember the pattern",
            GameKind::TogglePuzzle => "Turn all lights off",
            GameKind::ReactionTimer => "Test your reflexes",
            GameKind::Piano => "Play music",
            GameKind::PatternCopy => "Copy the pattern",
            GameKind::HotPotato => "Pass it quick",
            GameKind::TicTacToe => "2 player classic",
        }
    }

    /// Free-play modes start without the intro countdown and leave on the
    /// first encoder press.
    pub const fn is_free_play(self) -> bool {
        matches!(self, GameKind::Piano | GameKind::TicTacToe)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// Any of the games, behind one [`GameStateMachine`].
#[derive(Debug)]
pub enum Game<A> {
    ReactionChase(Machine<ReactionChase, A>),
    SequenceRecall(Machine<SequenceRecall, A>),
    SpawnDespawn(Machine<SpawnDespawn, A>),
    ColorCycleMatch(Machine<ColorCycleMatch, A>),
    SetRecall(Machine<SetRecall, A>),
    TogglePuzzle(Machine<TogglePuzzle, A>),
    ReactionTimer(Machine<ReactionTimer, A>),
    Piano(Machine<Piano, A>),
    PatternCopy(Machine<PatternCopy, A>),
    HotPotato(Machine<HotPotato, A>),
    TicTacToe(Machine<TicTacToe, A>),
}

macro_rules! dispatch {
    ($game:expr, $m:ident => $body:expr) => {
        match $game {
            Game::ReactionChase($m) => $body,
            Game::SequenceRecall($m) => $body,
            Game::SpawnDespawn($m) => $body,
            Game::ColorCycleMatch($m) => $body,
            Game::SetRecall($m) => $body,
            Game::TogglePuzzle($m) => $body,
            Game::ReactionTimer($m) => $body,
            Game::Piano($m) => $body,
            Game::PatternCopy($m) => $body,
            Game::HotPotato($m) => $body,
            Game::TicTacToe($m) => $body,
        }
    };
}

impl<A: ResourceArbiter> Game<A> {
    /// Build `kind` around `arb`, taking its tunables from `config`.
    ///
    /// A config that fails validation is replaced by the defaults, so a bad
    /// tunable can never take the arbiter down with it.
    pub fn new(kind: GameKind, arb: A, config: &ArcadeConfig, seed: u32) -> Self {
        let fallback;
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!("{e}; {} uses default tunables", kind.name());
                fallback = ArcadeConfig {
                    intro_secs: config.intro_secs.max(0.0),
                    ..ArcadeConfig::default()
                };
                &fallback
            }
        };
        let intro = if kind.is_free_play() {
            0.0
        } else {
            config.intro_secs
        };

        macro_rules! build {
            ($variant:ident, $game:expr) => {
                Game::$variant(Machine::new($game, arb, seed).with_intro_secs(intro))
            };
        }

        match kind {
            GameKind::ReactionChase => {
                build!(ReactionChase, ReactionChase::new(config.reaction_chase.clone()))
            }
            GameKind::SequenceRecall => {
                build!(SequenceRecall, SequenceRecall::new(config.sequence_recall.clone()))
            }
            GameKind::SpawnDespawn => {
                build!(SpawnDespawn, SpawnDespawn::new(config.spawn_despawn.clone()))
            }
            GameKind::ColorCycleMatch => {
                build!(ColorCycleMatch, ColorCycleMatch::new(config.color_cycle.clone()))
            }
            GameKind::SetRecall => build!(SetRecall, SetRecall::new(config.set_recall.clone())),
            GameKind::TogglePuzzle => {
                build!(TogglePuzzle, TogglePuzzle::new(config.toggle_puzzle.clone()))
            }
            GameKind::ReactionTimer => {
                build!(ReactionTimer, ReactionTimer::new(config.reaction_timer.clone()))
            }
            GameKind::Piano => build!(Piano, Piano::new(config.piano.clone())),
            GameKind::PatternCopy => {
                build!(PatternCopy, PatternCopy::new(config.pattern_copy.clone()))
            }
            GameKind::HotPotato => build!(HotPotato, HotPotato::new(config.hot_potato.clone())),
            GameKind::TicTacToe => build!(TicTacToe, TicTacToe::new(config.tic_tac_toe.clone())),
        }
    }

    pub fn with_high_score(self, high_score: u32) -> Self {
        macro_rules! carry {
            ($($variant:ident),*) => {
                match self {
                    $(Game::$variant(m) => Game::$variant(m.with_high_score(high_score)),)*
                }
            };
        }
        carry!(
            ReactionChase,
            SequenceRecall,
            SpawnDespawn,
            ColorCycleMatch,
            SetRecall,
            TogglePuzzle,
            ReactionTimer,
            Piano,
            PatternCopy,
            HotPotato,
            TicTacToe
        )
    }
}

impl<A: ResourceArbiter> GameStateMachine for Game<A> {
    type Arbiter = A;

    fn kind(&self) -> GameKind {
        dispatch!(self, m => m.kind())
    }

    fn start(&mut self, now: f64) {
        dispatch!(self, m => m.start(now))
    }

    fn tick(&mut self, now: f64) -> Control {
        dispatch!(self, m => m.tick(now))
    }

    fn on_key(&mut self, event: KeyEvent) {
        dispatch!(self, m => m.on_key(event))
    }

    fn on_encoder(&mut self, event: EncoderEvent) {
        dispatch!(self, m => m.on_encoder(event))
    }

    fn reset(&mut self) {
        dispatch!(self, m => m.reset())
    }

    fn suspend(&mut self, now: f64) {
        dispatch!(self, m => m.suspend(now))
    }

    fn resume(&mut self, now: f64) {
        dispatch!(self, m => m.resume(now))
    }

    fn current_score(&self) -> u32 {
        dispatch!(self, m => m.current_score())
    }

    fn high_score(&self) -> u32 {
        dispatch!(self, m => m.high_score())
    }

    fn level(&self) -> u32 {
        dispatch!(self, m => m.level())
    }

    fn phase(&self) -> Phase {
        dispatch!(self, m => m.phase())
    }

    fn arbiter(&self) -> &A {
        dispatch!(self, m => m.arbiter())
    }

    fn release(self) -> A {
        dispatch!(self, m => m.release())
    }
}
