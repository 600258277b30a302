//! The single gateway to the shared LEDs, display and speaker.
//!
//! Exactly one game holds the arbiter at a time. Games receive it by value
//! at construction and hand it back through
//! [`GameStateMachine::release`](crate::machine::GameStateMachine::release),
//! which leaves it cleared.

use thiserror::Error;

use crate::types::{Rgb, Slot, Tone, SLOT_COUNT};

/// Text lines of the 128x64 display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Top-left status (level, round).
    Header,
    /// Top-right status (lights lit, remaining).
    HeaderRight,
    /// Large centered message.
    Center,
    /// Bottom line (score, progress).
    Footer,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Header,
        Region::HeaderRight,
        Region::Center,
        Region::Footer,
    ];

    pub const fn index(self) -> usize {
        match self {
            Region::Header => 0,
            Region::HeaderRight => 1,
            Region::Center => 2,
            Region::Footer => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("audio asset `{0}` is not available")]
    Missing(String),
}

/// Output capabilities a game may drive.
pub trait ResourceArbiter {
    fn set_slot_color(&mut self, slot: Slot, color: Rgb);

    fn set_all(&mut self, color: Rgb);

    fn clear_all(&mut self) {
        self.set_all(Rgb::OFF);
    }

    fn draw_text(&mut self, region: Region, text: &str);

    fn clear_display(&mut self);

    fn play_tone(&mut self, freq_hz: u16, duration_s: f32);

    fn play_sequence(&mut self, tones: &[Tone]) {
        for tone in tones {
            self.play_tone(tone.freq_hz, tone.duration_s);
        }
    }

    /// Play a named audio asset. Hosts without asset storage keep the default.
    fn play_asset(&mut self, name: &str) -> Result<(), AssetError> {
        Err(AssetError::Missing(name.to_string()))
    }

    /// Speaker volume, 0 = mute.
    fn set_volume(&mut self, _level: u8) {}
}

/// In-memory arbiter for headless hosts and tests.
///
/// Keeps the last color of every key, the text of every display region and
/// a log of every tone played.
#[derive(Debug, Clone, Default)]
pub struct RecordingArbiter {
    leds: [Rgb; SLOT_COUNT],
    text: [String; 4],
    tones: Vec<Tone>,
    assets: Vec<String>,
    available_assets: Vec<String>,
    volume: u8,
}

impl RecordingArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend these asset names exist.
    pub fn with_assets(mut self, names: &[&str]) -> Self {
        self.available_assets = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn led(&self, slot: Slot) -> Rgb {
        self.leds[slot.index()]
    }

    pub fn leds(&self) -> &[Rgb; SLOT_COUNT] {
        &self.leds
    }

    pub fn lit_count(&self) -> usize {
        self.leds.iter().filter(|c| !c.is_off()).count()
    }

    pub fn text(&self, region: Region) -> &str {
        &self.text[region.index()]
    }

    pub fn display_is_clear(&self) -> bool {
        self.text.iter().all(|t| t.is_empty())
    }

    pub fn is_clean(&self) -> bool {
        self.lit_count() == 0 && self.display_is_clear()
    }

    pub fn tones(&self) -> &[Tone] {
        &self.tones
    }

    pub fn assets_played(&self) -> &[String] {
        &self.assets
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn take_tones(&mut self) -> Vec<Tone> {
        std::mem::take(&mut self.tones)
    }
}

impl ResourceArbiter for RecordingArbiter {
    fn set_slot_color(&mut self, slot: Slot, color: Rgb) {
        self.leds[slot.index()] = color;
    }

    fn set_all(&mut self, color: Rgb) {
        self.leds = [color; SLOT_COUNT];
    }

    fn draw_text(&mut self, region: Region, text: &str) {
        let line = &mut self.text[region.index()];
        line.clear();
        line.push_str(text);
    }

    fn clear_display(&mut self) {
        for line in &mut self.text {
            line.clear();
        }
    }

    fn play_tone(&mut self, freq_hz: u16, duration_s: f32) {
        self.tones.push(Tone::new(freq_hz, duration_s));
    }

    fn play_asset(&mut self, name: &str) -> Result<(), AssetError> {
        if self.available_assets.iter().any(|a| a == name) {
            self.assets.push(name.to_string());
            Ok(())
        } else {
            Err(AssetError::Missing(name.to_string()))
        }
    }

    fn set_volume(&mut self, level: u8) {
        self.volume = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_arbiter_tracks_leds_and_text() {
        let mut arb = RecordingArbiter::new();
        let slot = Slot::new(4).unwrap();
        arb.set_slot_color(slot, Rgb::RED);
        arb.draw_text(Region::Center, "GO!");
        assert_eq!(arb.led(slot), Rgb::RED);
        assert_eq!(arb.text(Region::Center), "GO!");
        assert!(!arb.is_clean());

        arb.clear_all();
        arb.clear_display();
        assert!(arb.is_clean());
    }

    #[test]
    fn test_default_sequence_plays_each_tone() {
        let mut arb = RecordingArbiter::new();
        arb.play_sequence(&[Tone::new(440, 0.1), Tone::new(220, 0.2)]);
        assert_eq!(arb.tones().len(), 2);
        assert_eq!(arb.tones()[1].freq_hz, 220);
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let mut arb = RecordingArbiter::new().with_assets(&["correct"]);
        assert!(arb.play_asset("correct").is_ok());
        assert_eq!(
            arb.play_asset("fanfare"),
            Err(AssetError::Missing("fanfare".to_string()))
        );
    }
}
