//! The pad's outputs, simulated in memory and painted by [`PadView`](crate::PadView).

use log::trace;

use crate::core::{Region, ResourceArbiter};
use crate::types::{Rgb, Slot, Tone, DEFAULT_VOLUME, MAX_VOLUME, SLOT_COUNT};

/// Everything the pad currently shows or plays.
#[derive(Debug, Clone, PartialEq)]
pub struct PadState {
    pub leds: [Rgb; SLOT_COUNT],
    pub lines: [String; 4],
    pub volume: u8,
    /// Most recent audible tone.
    pub last_tone: Option<Tone>,
    /// Audible tones since start; lets the runner ring the bell once per tone.
    pub tone_count: u64,
}

impl Default for PadState {
    fn default() -> Self {
        Self {
            leds: [Rgb::OFF; SLOT_COUNT],
            lines: Default::default(),
            volume: DEFAULT_VOLUME,
            last_tone: None,
            tone_count: 0,
        }
    }
}

/// [`ResourceArbiter`] over a [`PadState`].
#[derive(Debug, Clone, Default)]
pub struct TermArbiter {
    state: PadState,
}

impl TermArbiter {
    pub fn new(volume: u8) -> Self {
        Self {
            state: PadState {
                volume: volume.min(MAX_VOLUME),
                ..PadState::default()
            },
        }
    }

    pub fn state(&self) -> &PadState {
        &self.state
    }

    pub fn volume(&self) -> u8 {
        self.state.volume
    }
}

impl ResourceArbiter for TermArbiter {
    fn set_slot_color(&mut self, slot: Slot, color: Rgb) {
        self.state.leds[slot.index()] = color;
    }

    fn set_all(&mut self, color: Rgb) {
        self.state.leds = [color; SLOT_COUNT];
    }

    fn draw_text(&mut self, region: Region, text: &str) {
        self.state.lines[region.index()] = text.to_string();
    }

    fn clear_display(&mut self) {
        self.state.lines.iter_mut().for_each(String::clear);
    }

    fn play_tone(&mut self, freq_hz: u16, duration_s: f32) {
        if self.state.volume == 0 {
            return;
        }
        trace!("tone {freq_hz} Hz for {duration_s:.2}s");
        self.state.last_tone = Some(Tone::new(freq_hz, duration_s));
        self.state.tone_count += 1;
    }

    fn set_volume(&mut self, level: u8) {
        self.state.volume = level.min(MAX_VOLUME);
    }
}
