//! Piano: a free-play instrument, one chromatic octave across the keys.
//!
//! Keys rest at quarter brightness and light fully while their note sounds.
//! Rotating the encoder shifts the octave; pressing it leaves. Nothing is
//! scored.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::PianoConfig;
use crate::game::GameKind;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::types::{Rgb, Slot, SLOT_COUNT};

/// C4 up to B4, one semitone per key.
const BASE_NOTES_HZ: [u16; SLOT_COUNT] = [262, 277, 294, 311, 330, 349, 370, 392, 415, 440, 466, 494];

const NOTE_NAMES: [&str; SLOT_COUNT] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const NOTE_COLORS: [Rgb; SLOT_COUNT] = [
    Rgb::new(255, 0, 0),
    Rgb::new(255, 64, 0),
    Rgb::new(255, 128, 0),
    Rgb::new(255, 200, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(128, 255, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 255, 128),
    Rgb::new(0, 255, 255),
    Rgb::new(0, 128, 255),
    Rgb::new(0, 0, 255),
    Rgb::new(128, 0, 255),
];

const BASE_OCTAVE: i32 = 4;

/// Frequency of `slot`'s note in `octave`.
pub fn note_hz(slot: Slot, octave: i32) -> u16 {
    let scaled = f64::from(BASE_NOTES_HZ[slot.index()]) * 2f64.powi(octave - BASE_OCTAVE);
    scaled.round().clamp(1.0, f64::from(u16::MAX)) as u16
}

#[derive(Debug, Clone)]
pub struct Piano {
    config: PianoConfig,
    octave: i32,
    lit_until: [Option<f64>; SLOT_COUNT],
    playing: bool,
}

impl Piano {
    pub fn new(config: PianoConfig) -> Self {
        Self {
            octave: config.initial_octave,
            config,
            lit_until: [None; SLOT_COUNT],
            playing: false,
        }
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    fn draw_keyboard<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        for slot in Slot::ALL {
            s.arb.set_slot_color(slot, NOTE_COLORS[slot.index()].divide(4));
        }
    }

    fn draw_octave<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, "PIANO MODE");
        s.arb.draw_text(Region::Center, &format!("Octave: {}", self.octave));
        s.arb.draw_text(Region::Footer, "Push knob to exit");
    }
}

impl MiniGame for Piano {
    const KIND: GameKind = GameKind::Piano;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.playing = true;
        self.draw_keyboard(s);
        self.draw_octave(s);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        let mut faded = false;
        for slot in Slot::ALL {
            let lit = &mut self.lit_until[slot.index()];
            if lit.is_some_and(|until| now >= until) {
                *lit = None;
                s.arb.set_slot_color(slot, NOTE_COLORS[slot.index()].divide(4));
                faded = true;
            }
        }
        if faded && self.lit_until.iter().all(Option::is_none) {
            self.draw_octave(s);
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        if !self.playing {
            return Step::Continue;
        }
        let freq = note_hz(slot, self.octave);
        s.arb.set_slot_color(slot, NOTE_COLORS[slot.index()]);
        s.arb.play_tone(freq, self.config.note_secs);
        self.lit_until[slot.index()] = Some(now + f64::from(self.config.note_secs));

        s.arb.clear_display();
        s.arb.draw_text(Region::Header, "PIANO MODE");
        s.arb.draw_text(
            Region::Center,
            &format!("{}{}", NOTE_NAMES[slot.index()], self.octave),
        );
        s.arb.draw_text(Region::Footer, &format!("Octave: {}", self.octave));
        Step::Continue
    }

    fn rotate<A: ResourceArbiter>(&mut self, s: &mut Session<A>, delta: i32, _now: f64) -> Step {
        let octave = self
            .octave
            .saturating_add(delta)
            .clamp(self.config.min_octave, self.config.max_octave);
        if octave != self.octave {
            self.octave = octave;
            debug!("piano: octave {octave}");
            s.arb.play_tone(note_hz(Slot::ALL[0], octave), 0.05);
        }
        self.draw_octave(s);
        Step::Continue
    }

    fn encoder_press<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _now: f64) -> Option<Step> {
        Some(Step::Finish {
            reason: EndReason::Quit,
            linger: 0.0,
        })
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.lit_until = [None; SLOT_COUNT];
        self.draw_keyboard(s);
        self.draw_octave(s);
    }

    fn shift(&mut self, dt: f64) {
        for until in self.lit_until.iter_mut().flatten() {
            *until += dt;
        }
    }

    fn phase(&self) -> Phase {
        if self.playing {
            Phase::AwaitingInput
        } else {
            Phase::Idle
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::RecordingArbiter;
    use crate::machine::{Control, GameStateMachine, Machine};
    use crate::types::{EncoderEvent, KeyEvent};

    type Keys = Machine<Piano, RecordingArbiter>;

    fn machine() -> Keys {
        Machine::new(Piano::new(PianoConfig::default()), RecordingArbiter::new(), 1)
            .with_intro_secs(0.0)
    }

    #[test]
    fn test_note_frequency_follows_octave() {
        assert_eq!(note_hz(Slot::ALL[9], 4), 440);
        assert_eq!(note_hz(Slot::ALL[9], 5), 880);
        assert_eq!(note_hz(Slot::ALL[0], 3), 131);
        assert_eq!(note_hz(Slot::ALL[11], 7), 3952);
    }

    #[test]
    fn test_keys_rest_dim_and_light_while_sounding() {
        let mut m = machine();
        m.start(0.0);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::new(63, 0, 0));

        m.on_key(KeyEvent::press(Slot::ALL[1]));
        m.tick(1.0);
        assert_eq!(m.arbiter().led(Slot::ALL[1]), Rgb::new(255, 64, 0));
        assert_eq!(m.arbiter().text(Region::Center), "C#4");
        let last = m.arbiter().tones().last().copied().unwrap();
        assert_eq!(last.freq_hz, 277);

        m.tick(1.2);
        assert_eq!(m.arbiter().led(Slot::ALL[1]), Rgb::new(63, 16, 0));
        assert_eq!(m.arbiter().text(Region::Center), "Octave: 4");
    }

    #[test]
    fn test_rotation_clamps_octave() {
        let mut m = machine();
        m.start(0.0);
        m.on_encoder(EncoderEvent::Rotate(10));
        m.tick(0.1);
        assert_eq!(m.game().octave(), 7);
        m.on_encoder(EncoderEvent::Rotate(-10));
        m.tick(0.2);
        assert_eq!(m.game().octave(), 2);
        assert_eq!(m.arbiter().text(Region::Center), "Octave: 2");
    }

    #[test]
    fn test_encoder_press_leaves_at_once() {
        let mut m = machine();
        m.start(0.0);
        m.on_encoder(EncoderEvent::Press);
        match m.tick(0.1) {
            Control::Terminate(outcome) => {
                assert_eq!(outcome.reason, EndReason::Quit);
                assert_eq!(outcome.score, 0);
            }
            other => panic!("expected terminate, got {:?}", other),
        }
        assert!(m.release().is_clean());
    }
}
