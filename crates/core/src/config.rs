//! Tunables for every game.
//!
//! Every struct deserializes with `#[serde(default)]`, so a settings file
//! only needs the fields it overrides. [`ArcadeConfig::validate`] keeps each
//! difficulty curve bounded: floors below starting values, caps above them,
//! decay factors strictly between 0 and 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Rgb, Slot, SlotSet, INTRO_SECS, SLOT_COUNT};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field}: {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

fn check(ok: bool, field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            reason: reason.into(),
        })
    }
}

fn check_decay(value: f64, field: &'static str) -> Result<(), ConfigError> {
    check(
        value > 0.0 && value < 1.0,
        field,
        format!("{value} must be strictly between 0 and 1"),
    )
}

fn check_floor(floor: f64, initial: f64, field: &'static str) -> Result<(), ConfigError> {
    check(
        floor > 0.0 && floor <= initial,
        field,
        format!("floor {floor} must be positive and at most {initial}"),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionChaseConfig {
    pub initial_time_limit: f64,
    pub min_time_limit: f64,
    pub decay_factor: f64,
    pub base_points: u32,
    pub speed_bonus_multiplier: u32,
    pub feedback_secs: f64,
}

impl Default for ReactionChaseConfig {
    fn default() -> Self {
        Self {
            initial_time_limit: 2.0,
            min_time_limit: 0.3,
            decay_factor: 0.92,
            base_points: 10,
            speed_bonus_multiplier: 2,
            feedback_secs: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceRecallConfig {
    /// The four playable keys, each bound to one of `colors`.
    pub keys: [Slot; 4],
    pub colors: [Rgb; 4],
    pub display_secs: f64,
    pub min_display_secs: f64,
    pub gap_secs: f64,
    /// "Watch..." pause before each playback.
    pub lead_in_secs: f64,
    pub input_timeout: f64,
    pub speed_up_every: u32,
    pub speed_up_factor: f64,
    pub celebrate_secs: f64,
}

impl Default for SequenceRecallConfig {
    fn default() -> Self {
        Self {
            keys: [Slot::ALL[0], Slot::ALL[1], Slot::ALL[3], Slot::ALL[4]],
            colors: [Rgb::RED, Rgb::BLUE, Rgb::GREEN, Rgb::YELLOW],
            display_secs: 0.5,
            min_display_secs: 0.2,
            gap_secs: 0.2,
            lead_in_secs: 0.5,
            input_timeout: 5.0,
            speed_up_every: 5,
            speed_up_factor: 0.85,
            celebrate_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnDespawnConfig {
    pub duration: f64,
    pub initial_visible: f64,
    pub min_visible: f64,
    pub visible_step: f64,
    pub initial_spawn_interval: f64,
    pub min_spawn_interval: f64,
    pub spawn_interval_step: f64,
    /// Seconds of play per difficulty step.
    pub difficulty_step_secs: f64,
    pub max_simultaneous: usize,
    /// Targets added per spawn interval, bounded by `max_simultaneous`.
    pub spawn_batch: usize,
    pub hit_points: u32,
    pub miss_penalty: u32,
    pub target_color: Rgb,
}

impl Default for SpawnDespawnConfig {
    fn default() -> Self {
        Self {
            duration: 30.0,
            initial_visible: 1.5,
            min_visible: 0.4,
            visible_step: 0.15,
            initial_spawn_interval: 1.0,
            min_spawn_interval: 0.3,
            spawn_interval_step: 0.1,
            difficulty_step_secs: 5.0,
            max_simultaneous: 4,
            spawn_batch: 1,
            hit_points: 10,
            miss_penalty: 5,
            target_color: Rgb::new(139, 69, 19),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorCycleConfig {
    pub palette: Vec<Rgb>,
    pub initial_cycle_interval: f64,
    pub min_cycle_interval: f64,
    pub cycle_factor: f64,
    pub round_time_limit: f64,
    pub points_per_match: u32,
}

impl Default for ColorCycleConfig {
    fn default() -> Self {
        Self {
            palette: vec![
                Rgb::RED,
                Rgb::GREEN,
                Rgb::BLUE,
                Rgb::YELLOW,
                Rgb::CYAN,
                Rgb::PURPLE,
            ],
            initial_cycle_interval: 0.8,
            min_cycle_interval: 0.2,
            cycle_factor: 0.9,
            round_time_limit: 6.0,
            points_per_match: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetRecallConfig {
    pub initial_pattern_size: usize,
    pub max_pattern_size: usize,
    pub display_base_secs: f64,
    pub display_per_slot_secs: f64,
    pub input_timeout: f64,
    pub points_per_slot: u32,
    pub reveal_secs: f64,
    pub celebrate_secs: f64,
}

impl Default for SetRecallConfig {
    fn default() -> Self {
        Self {
            initial_pattern_size: 3,
            max_pattern_size: 10,
            display_base_secs: 1.5,
            display_per_slot_secs: 0.3,
            input_timeout: 10.0,
            points_per_slot: 10,
            reveal_secs: 1.5,
            celebrate_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TogglePuzzleConfig {
    pub initial_random_moves: u32,
    pub max_random_moves: u32,
    pub base_score: u32,
    pub solved_secs: f64,
}

impl Default for TogglePuzzleConfig {
    fn default() -> Self {
        Self {
            initial_random_moves: 5,
            max_random_moves: 15,
            base_score: 100,
            solved_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionTimerConfig {
    pub rounds: u32,
    /// Random wait before the keys turn green, drawn from `min..max`.
    pub min_wait_secs: f64,
    pub max_wait_secs: f64,
    /// Milliseconds booked for a press before green.
    pub false_start_ms: u32,
    pub result_secs: f64,
    /// Score is `max(0, score_ceiling_ms - average_ms)`.
    pub score_ceiling_ms: u32,
}

impl Default for ReactionTimerConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            min_wait_secs: 1.5,
            max_wait_secs: 5.0,
            false_start_ms: 1000,
            result_secs: 2.0,
            score_ceiling_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternCopyConfig {
    pub initial_pattern_size: usize,
    pub max_pattern_size: usize,
    pub initial_show_secs: f64,
    pub min_show_secs: f64,
    /// Show time lost per completed level.
    pub show_step_secs: f64,
    /// "Level N" card before each pattern.
    pub announce_secs: f64,
    pub input_timeout: f64,
    pub points_per_slot: u32,
    pub reveal_secs: f64,
    pub celebrate_secs: f64,
}

impl Default for PatternCopyConfig {
    fn default() -> Self {
        Self {
            initial_pattern_size: 3,
            max_pattern_size: 8,
            initial_show_secs: 2.0,
            min_show_secs: 0.5,
            show_step_secs: 0.15,
            announce_secs: 1.0,
            input_timeout: 10.0,
            points_per_slot: 10,
            reveal_secs: 2.0,
            celebrate_secs: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotPotatoConfig {
    pub rounds: u32,
    /// Fuse length, drawn from `min..max` each round.
    pub min_fuse_secs: f64,
    pub max_fuse_secs: f64,
    pub initial_move_interval: f64,
    pub min_move_interval: f64,
    /// Move interval lost per survived round.
    pub move_interval_step: f64,
    /// Final stretch of the fuse: no auto-moves, flashing and beeping.
    pub warning_secs: f64,
    /// A pass this close to the explosion means the player was holding it.
    pub hold_secs: f64,
    pub explode_secs: f64,
    pub safe_secs: f64,
    pub caught_secs: f64,
    pub survive_points: u32,
    /// Per survived round, paid once all rounds are survived.
    pub victory_bonus: u32,
}

impl Default for HotPotatoConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            min_fuse_secs: 2.0,
            max_fuse_secs: 6.0,
            initial_move_interval: 0.8,
            min_move_interval: 0.2,
            move_interval_step: 0.05,
            warning_secs: 1.0,
            hold_secs: 0.3,
            explode_secs: 0.6,
            safe_secs: 1.5,
            caught_secs: 2.0,
            survive_points: 10,
            victory_bonus: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoConfig {
    pub initial_octave: i32,
    pub min_octave: i32,
    pub max_octave: i32,
    pub note_secs: f32,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            initial_octave: 4,
            min_octave: 2,
            max_octave: 7,
            note_secs: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicTacToeConfig {
    /// How long the winning line blinks before the result card.
    pub win_blink_secs: f64,
    pub draw_flash_secs: f64,
}

impl Default for TicTacToeConfig {
    fn default() -> Self {
        Self {
            win_blink_secs: 1.5,
            draw_flash_secs: 0.8,
        }
    }
}

/// Everything a game needs besides its arbiter and seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub intro_secs: f64,
    pub reaction_chase: ReactionChaseConfig,
    pub sequence_recall: SequenceRecallConfig,
    pub spawn_despawn: SpawnDespawnConfig,
    pub color_cycle: ColorCycleConfig,
    pub set_recall: SetRecallConfig,
    pub toggle_puzzle: TogglePuzzleConfig,
    pub reaction_timer: ReactionTimerConfig,
    pub pattern_copy: PatternCopyConfig,
    pub hot_potato: HotPotatoConfig,
    pub piano: PianoConfig,
    pub tic_tac_toe: TicTacToeConfig,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            intro_secs: INTRO_SECS,
            reaction_chase: ReactionChaseConfig::default(),
            sequence_recall: SequenceRecallConfig::default(),
            spawn_despawn: SpawnDespawnConfig::default(),
            color_cycle: ColorCycleConfig::default(),
            set_recall: SetRecallConfig::default(),
            toggle_puzzle: TogglePuzzleConfig::default(),
            reaction_timer: ReactionTimerConfig::default(),
            pattern_copy: PatternCopyConfig::default(),
            hot_potato: HotPotatoConfig::default(),
            piano: PianoConfig::default(),
            tic_tac_toe: TicTacToeConfig::default(),
        }
    }
}

impl ArcadeConfig {
    /// Defaults with no intro countdown, for tests and demos.
    pub fn instant() -> Self {
        Self {
            intro_secs: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.intro_secs >= 0.0, "intro_secs", "must not be negative")?;

        let rc = &self.reaction_chase;
        check_decay(rc.decay_factor, "reaction_chase.decay_factor")?;
        check_floor(
            rc.min_time_limit,
            rc.initial_time_limit,
            "reaction_chase.min_time_limit",
        )?;

        let sr = &self.sequence_recall;
        check(
            SlotSet::from_slots(&sr.keys).len() == sr.keys.len(),
            "sequence_recall.keys",
            "keys must be distinct",
        )?;
        check_decay(sr.speed_up_factor, "sequence_recall.speed_up_factor")?;
        check_floor(
            sr.min_display_secs,
            sr.display_secs,
            "sequence_recall.min_display_secs",
        )?;
        check(
            sr.speed_up_every > 0,
            "sequence_recall.speed_up_every",
            "must be at least 1",
        )?;
        check(
            sr.input_timeout > 0.0,
            "sequence_recall.input_timeout",
            "must be positive",
        )?;

        let sd = &self.spawn_despawn;
        check(sd.duration > 0.0, "spawn_despawn.duration", "must be positive")?;
        check_floor(sd.min_visible, sd.initial_visible, "spawn_despawn.min_visible")?;
        check_floor(
            sd.min_spawn_interval,
            sd.initial_spawn_interval,
            "spawn_despawn.min_spawn_interval",
        )?;
        check(
            sd.difficulty_step_secs > 0.0,
            "spawn_despawn.difficulty_step_secs",
            "must be positive",
        )?;
        check(
            (1..=SLOT_COUNT).contains(&sd.max_simultaneous),
            "spawn_despawn.max_simultaneous",
            format!("must be within 1..={SLOT_COUNT}"),
        )?;
        check(
            sd.spawn_batch >= 1,
            "spawn_despawn.spawn_batch",
            "must be at least 1",
        )?;

        let cc = &self.color_cycle;
        check(
            cc.palette.len() >= 2,
            "color_cycle.palette",
            "needs at least two colors",
        )?;
        check_decay(cc.cycle_factor, "color_cycle.cycle_factor")?;
        check_floor(
            cc.min_cycle_interval,
            cc.initial_cycle_interval,
            "color_cycle.min_cycle_interval",
        )?;
        check(
            cc.round_time_limit > 0.0,
            "color_cycle.round_time_limit",
            "must be positive",
        )?;

        let st = &self.set_recall;
        check(
            st.initial_pattern_size >= 1 && st.initial_pattern_size <= st.max_pattern_size,
            "set_recall.initial_pattern_size",
            "must be between 1 and max_pattern_size",
        )?;
        check(
            st.max_pattern_size < SLOT_COUNT,
            "set_recall.max_pattern_size",
            format!("must leave at least one wrong key (< {SLOT_COUNT})"),
        )?;
        check(
            st.input_timeout > 0.0,
            "set_recall.input_timeout",
            "must be positive",
        )?;

        let tp = &self.toggle_puzzle;
        check(
            tp.initial_random_moves >= 1 && tp.initial_random_moves <= tp.max_random_moves,
            "toggle_puzzle.initial_random_moves",
            "must be between 1 and max_random_moves",
        )?;

        let rt = &self.reaction_timer;
        check(rt.rounds >= 1, "reaction_timer.rounds", "must be at least 1")?;
        check(
            rt.min_wait_secs > 0.0 && rt.min_wait_secs <= rt.max_wait_secs,
            "reaction_timer.min_wait_secs",
            "must be positive and at most max_wait_secs",
        )?;

        let pc = &self.pattern_copy;
        check(
            pc.initial_pattern_size >= 1 && pc.initial_pattern_size <= pc.max_pattern_size,
            "pattern_copy.initial_pattern_size",
            "must be between 1 and max_pattern_size",
        )?;
        check(
            pc.max_pattern_size < SLOT_COUNT,
            "pattern_copy.max_pattern_size",
            format!("must leave at least one wrong key (< {SLOT_COUNT})"),
        )?;
        check_floor(
            pc.min_show_secs,
            pc.initial_show_secs,
            "pattern_copy.min_show_secs",
        )?;
        check(
            pc.input_timeout > 0.0,
            "pattern_copy.input_timeout",
            "must be positive",
        )?;

        let hp = &self.hot_potato;
        check(hp.rounds >= 1, "hot_potato.rounds", "must be at least 1")?;
        check(
            hp.warning_secs < hp.min_fuse_secs && hp.min_fuse_secs <= hp.max_fuse_secs,
            "hot_potato.min_fuse_secs",
            "must exceed warning_secs and be at most max_fuse_secs",
        )?;
        check_floor(
            hp.min_move_interval,
            hp.initial_move_interval,
            "hot_potato.min_move_interval",
        )?;

        let pn = &self.piano;
        check(
            pn.min_octave <= pn.initial_octave && pn.initial_octave <= pn.max_octave,
            "piano.initial_octave",
            "must lie within min_octave..=max_octave",
        )?;
        check(
            (0..=9).contains(&pn.min_octave) && (0..=9).contains(&pn.max_octave),
            "piano.max_octave",
            "octaves must lie within 0..=9",
        )?;

        Ok(())
    }
}
