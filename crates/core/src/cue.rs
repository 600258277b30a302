//! Audio cues with synthesized fallback.
//!
//! A cue first asks the arbiter for a recorded asset of the same name; when
//! that is unavailable the cue's tone table is played instead. A missing
//! asset never blocks or fails a round.

use log::debug;

use crate::arbiter::ResourceArbiter;
use crate::types::{Slot, Tone, KEY_TONES_HZ};

/// Duration of a per-key feedback tone.
pub const KEY_TONE_SECS: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    Correct,
    Wrong,
    LevelUp,
    GameOver,
    Select,
    Countdown,
}

impl Cue {
    pub fn asset_name(self) -> &'static str {
        match self {
            Cue::Correct => "correct",
            Cue::Wrong => "wrong",
            Cue::LevelUp => "level_up",
            Cue::GameOver => "game_over",
            Cue::Select => "menu_select",
            Cue::Countdown => "countdown",
        }
    }

    pub fn tones(self) -> &'static [Tone] {
        const CORRECT: [Tone; 2] = [Tone::new(880, 0.1), Tone::new(1100, 0.1)];
        const WRONG: [Tone; 2] = [Tone::new(440, 0.2), Tone::new(220, 0.3)];
        const LEVEL_UP: [Tone; 4] = [
            Tone::new(523, 0.1),
            Tone::new(659, 0.1),
            Tone::new(784, 0.1),
            Tone::new(1047, 0.2),
        ];
        const GAME_OVER: [Tone; 4] = [
            Tone::new(440, 0.2),
            Tone::new(349, 0.2),
            Tone::new(294, 0.2),
            Tone::new(220, 0.4),
        ];
        const SELECT: [Tone; 2] = [Tone::new(660, 0.05), Tone::new(880, 0.05)];
        const COUNTDOWN: [Tone; 1] = [Tone::new(440, 0.1)];

        match self {
            Cue::Correct => &CORRECT,
            Cue::Wrong => &WRONG,
            Cue::LevelUp => &LEVEL_UP,
            Cue::GameOver => &GAME_OVER,
            Cue::Select => &SELECT,
            Cue::Countdown => &COUNTDOWN,
        }
    }
}

/// Play `cue`, falling back to its tone table if no asset exists.
pub fn play_cue<A: ResourceArbiter + ?Sized>(arb: &mut A, cue: Cue) {
    if let Err(err) = arb.play_asset(cue.asset_name()) {
        debug!("{err}; synthesizing {:?}", cue);
        arb.play_sequence(cue.tones());
    }
}

/// The pitch bound to a key.
pub fn play_key_tone<A: ResourceArbiter + ?Sized>(arb: &mut A, slot: Slot) {
    arb.play_tone(KEY_TONES_HZ[slot.index()], KEY_TONE_SECS);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::RecordingArbiter;

    #[test]
    fn test_missing_asset_falls_back_to_tones() {
        let mut arb = RecordingArbiter::new();
        play_cue(&mut arb, Cue::LevelUp);
        assert_eq!(arb.tones(), Cue::LevelUp.tones());
        assert!(arb.assets_played().is_empty());
    }

    #[test]
    fn test_available_asset_skips_synthesis() {
        let mut arb = RecordingArbiter::new().with_assets(&["wrong"]);
        play_cue(&mut arb, Cue::Wrong);
        assert!(arb.tones().is_empty());
        assert_eq!(arb.assets_played(), ["wrong".to_string()]);
    }

    #[test]
    fn test_key_tone_pitch() {
        let mut arb = RecordingArbiter::new();
        play_key_tone(&mut arb, Slot::new(5).unwrap());
        assert_eq!(arb.tones()[0].freq_hz, 440);
    }
}
