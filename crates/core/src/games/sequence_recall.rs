//! SequenceRecall: watch a growing sequence on four keys, then repeat it.
//!
//! Playback is a chain of deadlines (lead-in, then lit/gap per element)
//! walked by `advance`, so a late tick catches up instead of stretching the
//! animation. Each deadline is derived from the previous one, not from `now`.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::SequenceRecallConfig;
use crate::cue::{play_cue, play_key_tone, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, Expected, MiniGame, Phase, Session, Step};
use crate::scoring::sequence_display_time;
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot};

/// How long an out-of-alphabet press flashes white.
const FLASH_SECS: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Playback { index: usize, lit: bool, until: f64 },
    Input { cursor: usize, timer: RoundTimer },
    Celebrate { until: f64 },
}

#[derive(Debug, Clone)]
pub struct SequenceRecall {
    config: SequenceRecallConfig,
    /// Indexes into `config.keys`.
    sequence: Vec<usize>,
    display_time: f64,
    stage: Stage,
    flash: Option<(Slot, f64)>,
}

impl SequenceRecall {
    pub fn new(config: SequenceRecallConfig) -> Self {
        Self {
            display_time: config.display_secs,
            config,
            sequence: Vec::new(),
            stage: Stage::Idle,
            flash: None,
        }
    }

    /// The sequence as slots, oldest first.
    pub fn sequence(&self) -> Vec<Slot> {
        self.sequence.iter().map(|&i| self.config.keys[i]).collect()
    }

    pub fn display_time(&self) -> f64 {
        self.display_time
    }

    /// Position of the next expected element while awaiting input.
    pub fn cursor(&self) -> Option<usize> {
        match self.stage {
            Stage::Input { cursor, .. } => Some(cursor),
            _ => None,
        }
    }

    fn key_index(&self, slot: Slot) -> Option<usize> {
        self.config.keys.iter().position(|&k| k == slot)
    }

    fn expected_slot(&self, cursor: usize) -> Slot {
        self.config.keys[self.sequence[cursor]]
    }

    fn push_element<A: ResourceArbiter>(&mut self, s: &mut Session<A>) {
        let next = s.rng.next_range(self.config.keys.len() as u32) as usize;
        self.sequence.push(next);
    }

    fn start_playback<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        debug!(
            "sequence recall: playing {} elements at {:.3}s each",
            self.sequence.len(),
            self.display_time
        );
        self.flash = None;
        self.stage = Stage::Playback {
            index: 0,
            lit: false,
            until: now + self.config.lead_in_secs,
        };
        self.draw_watching(s);
    }

    fn draw_watching<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        let len = self.sequence.len();
        s.arb.clear_all();
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Length: {len}"));
        s.arb.draw_text(Region::Center, "Watch...");
    }

    fn draw_hints<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for (key, color) in self.config.keys.iter().zip(self.config.colors) {
            s.arb.set_slot_color(*key, color.divide(4));
        }
    }

    fn draw_input<A: ResourceArbiter>(&self, s: &mut Session<A>, cursor: usize) {
        self.draw_hints(s);
        s.arb.clear_display();
        s.arb.draw_text(
            Region::Header,
            &format!("Length: {}", self.sequence.len()),
        );
        s.arb.draw_text(
            Region::Center,
            &format!("Your turn {}/{}", cursor, self.sequence.len()),
        );
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
    }

    /// Walk the playback deadlines up to `now`.
    fn step_playback<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        while let Stage::Playback { index, lit, until } = self.stage {
            if now < until {
                return;
            }
            let key = self.sequence[index];
            let slot = self.config.keys[key];
            if !lit {
                s.arb.set_slot_color(slot, self.config.colors[key]);
                play_key_tone(&mut s.arb, slot);
                self.stage = Stage::Playback {
                    index,
                    lit: true,
                    until: until + self.display_time,
                };
            } else if index + 1 < self.sequence.len() {
                s.arb.set_slot_color(slot, Rgb::OFF);
                self.stage = Stage::Playback {
                    index: index + 1,
                    lit: false,
                    until: until + self.config.gap_secs,
                };
            } else {
                s.arb.set_slot_color(slot, Rgb::OFF);
                self.stage = Stage::Input {
                    cursor: 0,
                    timer: RoundTimer::start(until, self.config.input_timeout),
                };
                self.draw_input(s, 0);
            }
        }
    }

    fn complete_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let len = self.sequence.len();
        s.score = len as u32;
        s.level = len as u32;
        self.display_time = sequence_display_time(
            self.display_time,
            len,
            self.config.speed_up_every,
            self.config.speed_up_factor,
            self.config.min_display_secs,
        );
        debug!(
            "sequence recall: completed length {len}, display now {:.3}s",
            self.display_time
        );

        s.arb.set_all(Rgb::GREEN);
        s.arb.draw_text(Region::Center, "Correct!");
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
        play_cue(&mut s.arb, Cue::Correct);
        self.flash = None;
        self.stage = Stage::Celebrate {
            until: now + self.config.celebrate_secs,
        };
    }

    fn restore_flash<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        if let Some((slot, until)) = self.flash {
            if now >= until {
                let color = match self.key_index(slot) {
                    Some(i) => self.config.colors[i].divide(4),
                    None => Rgb::OFF,
                };
                s.arb.set_slot_color(slot, color);
                self.flash = None;
            }
        }
    }
}

impl MiniGame for SequenceRecall {
    const KIND: GameKind = GameKind::SequenceRecall;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.push_element(s);
        self.start_playback(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Idle => Step::Continue,
            Stage::Playback { .. } => {
                self.step_playback(s, now);
                Step::Continue
            }
            Stage::Celebrate { until } => {
                if now >= until {
                    self.push_element(s);
                    self.start_playback(s, now);
                }
                Step::Continue
            }
            Stage::Input { cursor, timer } => {
                self.restore_flash(s, now);
                if !timer.expired(now) {
                    return Step::Continue;
                }
                let expected = self.expected_slot(cursor);
                s.arb.clear_all();
                s.arb.set_slot_color(expected, Rgb::GREEN);
                s.arb.draw_text(Region::Center, "Too slow!");
                play_cue(&mut s.arb, Cue::Wrong);
                Step::fail(EndReason::Timeout {
                    expected: Expected::Slot(expected),
                })
            }
        }
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        let Stage::Input { cursor, .. } = self.stage else {
            return Step::Continue;
        };

        let Some(key) = self.key_index(slot) else {
            s.arb.set_slot_color(slot, Rgb::WHITE);
            self.flash = Some((slot, now + FLASH_SECS));
            return Step::Continue;
        };

        let expected = self.expected_slot(cursor);
        if key != self.sequence[cursor] {
            s.arb.clear_all();
            s.arb.set_slot_color(slot, Rgb::RED);
            s.arb.set_slot_color(expected, Rgb::GREEN);
            s.arb.draw_text(Region::Center, "Wrong!");
            play_cue(&mut s.arb, Cue::Wrong);
            return Step::fail(EndReason::WrongKey {
                pressed: slot,
                expected: Expected::Slot(expected),
            });
        }

        self.restore_flash(s, f64::INFINITY);
        s.arb.set_slot_color(slot, self.config.colors[key]);
        play_key_tone(&mut s.arb, slot);
        self.flash = Some((slot, now + FLASH_SECS));

        let cursor = cursor + 1;
        if cursor == self.sequence.len() {
            self.complete_round(s, now);
        } else {
            self.stage = Stage::Input {
                cursor,
                timer: RoundTimer::start(now, self.config.input_timeout),
            };
            s.arb.draw_text(
                Region::Center,
                &format!("Your turn {}/{}", cursor, self.sequence.len()),
            );
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        match self.stage {
            // Replay from the top: a half-seen sequence is no use.
            Stage::Playback { .. } => self.start_playback(s, now),
            Stage::Input { cursor, .. } => {
                self.flash = None;
                self.draw_input(s, cursor);
            }
            Stage::Celebrate { .. } => s.arb.set_all(Rgb::GREEN),
            Stage::Idle => {}
        }
    }

    fn shift(&mut self, dt: f64) {
        match &mut self.stage {
            Stage::Playback { until, .. } | Stage::Celebrate { until } => *until += dt,
            Stage::Input { timer, .. } => timer.shift(dt),
            Stage::Idle => {}
        }
        if let Some((_, until)) = &mut self.flash {
            *until += dt;
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Playback { .. } | Stage::Celebrate { .. } => Phase::Showing,
            Stage::Input { .. } => Phase::AwaitingInput,
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
    use crate::types::KeyEvent;

    type Recall = Machine<SequenceRecall, RecordingArbiter>;

    fn machine(seed: u32) -> Recall {
        Machine::new(
            SequenceRecall::new(SequenceRecallConfig::default()),
            RecordingArbiter::new(),
            seed,
        )
        .with_intro_secs(0.0)
    }

    fn tick_until(m: &mut Recall, now: &mut f64, phase: Phase) {
        for _ in 0..100_000 {
            if m.phase() == phase {
                return;
            }
            *now += 0.02;
            m.tick(*now);
        }
        panic!("never reached {:?}", phase);
    }

    fn replay(m: &mut Recall, now: &mut f64) {
        for slot in m.game().sequence() {
            m.on_key(KeyEvent::press(slot));
            *now += 0.1;
            assert_eq!(m.tick(*now), Control::Continue);
        }
    }

    #[test]
    fn test_playback_then_input_with_dim_hints() {
        let mut m = machine(3);
        m.start(0.0);
        assert_eq!(m.phase(), Phase::Showing);
        let mut now = 0.0;
        tick_until(&mut m, &mut now, Phase::AwaitingInput);
        // lead-in 0.5 + one element at 0.5
        assert!(now >= 1.0 && now < 1.1, "input opened at {now}");
        let hint = m.arbiter().led(Slot::ALL[0]);
        assert_eq!(hint, Rgb::RED.divide(4));
        assert!(m.arbiter().led(Slot::ALL[11]).is_off());
    }

    #[test]
    fn test_sequence_grows_by_one_per_round() {
        let mut m = machine(11);
        m.start(0.0);
        let mut now = 0.0;
        for round in 1..=7 {
            tick_until(&mut m, &mut now, Phase::AwaitingInput);
            let before = m.game().sequence();
            assert_eq!(before.len(), round);
            replay(&mut m, &mut now);
            assert_eq!(m.current_score(), round as u32);
            tick_until(&mut m, &mut now, Phase::AwaitingInput);
            let after = m.game().sequence();
            assert_eq!(after.len(), round + 1);
            assert_eq!(&after[..round], &before[..]);
        }
    }

    #[test]
    fn test_display_time_changes_only_on_interval() {
        let mut m = machine(5);
        m.start(0.0);
        let mut now = 0.0;
        let mut previous = m.game().display_time();
        for len in 1..=11 {
            tick_until(&mut m, &mut now, Phase::AwaitingInput);
            replay(&mut m, &mut now);
            let current = m.game().display_time();
            if len % 5 == 0 {
                assert!(current < previous, "len {len}");
            } else {
                assert_eq!(current, previous, "len {len}");
            }
            previous = current;
        }
    }

    #[test]
    fn test_out_of_alphabet_press_is_ignored() {
        let mut m = machine(8);
        m.start(0.0);
        let mut now = 0.0;
        tick_until(&mut m, &mut now, Phase::AwaitingInput);
        m.on_key(KeyEvent::press(Slot::ALL[11]));
        now += 0.05;
        assert_eq!(m.tick(now), Control::Continue);
        assert_eq!(m.phase(), Phase::AwaitingInput);
        assert_eq!(m.game().cursor(), Some(0));
        assert_eq!(m.arbiter().led(Slot::ALL[11]), Rgb::WHITE);

        now += 0.5;
        m.tick(now);
        assert!(m.arbiter().led(Slot::ALL[11]).is_off());
    }

    #[test]
    fn test_mismatch_is_terminal_with_expected_slot() {
        let mut m = machine(21);
        m.start(0.0);
        let mut now = 0.0;
        tick_until(&mut m, &mut now, Phase::AwaitingInput);
        let expected = m.game().sequence()[0];
        let wrong = *SequenceRecallConfig::default()
            .keys
            .iter()
            .find(|&&k| k != expected)
            .unwrap();
        m.on_key(KeyEvent::press(wrong));
        now += 0.1;
        m.tick(now);
        assert_eq!(m.phase(), Phase::Resolving);
        match m.tick(now + 5.0) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::WrongKey {
                    pressed: wrong,
                    expected: Expected::Slot(expected)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_input_timeout_resets_on_each_correct_press() {
        let mut m = machine(2);
        m.start(0.0);
        let mut now = 0.0;
        tick_until(&mut m, &mut now, Phase::AwaitingInput);
        replay(&mut m, &mut now);
        tick_until(&mut m, &mut now, Phase::AwaitingInput);

        let first = m.game().sequence()[0];
        now += 4.0;
        m.on_key(KeyEvent::press(first));
        m.tick(now);
        assert_eq!(m.game().cursor(), Some(1));

        now += 4.0;
        assert_eq!(m.tick(now), Control::Continue);
        assert_eq!(m.phase(), Phase::AwaitingInput);

        now += 1.0;
        m.tick(now);
        assert_eq!(m.phase(), Phase::Resolving);
    }
}
