//! PatternCopy: copy a briefly shown pattern key for key.
//!
//! Each level is announced, then the pattern is shown for a viewing time
//! that shrinks every level. Copying is order-free but every press must be
//! part of the pattern; one stray key ends the session.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::PatternCopyConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::games::flash::KeyFlash;
use crate::machine::{EndReason, Expected, MiniGame, Phase, Session, Step};
use crate::scoring::pattern_points;
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot, SlotSet};

const PATTERN_COLOR: Rgb = Rgb::new(0, 200, 255);
const SHOW_TONE_HZ: u16 = 660;
const HIDE_TONE_HZ: u16 = 440;
const FOUND_TONE_HZ: u16 = 550;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Announce { until: f64 },
    Memorize { until: f64 },
    Copy(RoundTimer),
    Celebrate { until: f64 },
}

#[derive(Debug, Clone)]
pub struct PatternCopy {
    config: PatternCopyConfig,
    pattern_size: usize,
    show_secs: f64,
    pattern: SlotSet,
    found: SlotSet,
    flash: KeyFlash,
    stage: Stage,
}

impl PatternCopy {
    pub fn new(config: PatternCopyConfig) -> Self {
        Self {
            pattern_size: config.initial_pattern_size,
            show_secs: config.initial_show_secs,
            config,
            pattern: SlotSet::EMPTY,
            found: SlotSet::EMPTY,
            flash: KeyFlash::default(),
            stage: Stage::Idle,
        }
    }

    pub fn pattern(&self) -> SlotSet {
        self.pattern
    }

    pub fn found(&self) -> SlotSet {
        self.found
    }

    /// Viewing time of the next pattern.
    pub fn show_secs(&self) -> f64 {
        self.show_secs
    }

    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    fn new_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        s.level += 1;
        self.pattern = s.rng.sample_slots(self.pattern_size);
        self.found = SlotSet::EMPTY;
        self.flash.clear();
        self.stage = Stage::Announce {
            until: now + self.config.announce_secs,
        };
        debug!(
            "pattern copy level {}: {} keys shown for {:.2}s",
            s.level, self.pattern_size, self.show_secs
        );
        self.draw_announce(s);
    }

    fn draw_announce<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level {}", s.level));
        s.arb.draw_text(
            Region::Center,
            &format!("Pattern: {} keys", self.pattern_size),
        );
        s.arb.draw_text(Region::Footer, "Watch closely!");
    }

    fn draw_memorize<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for slot in self.pattern.iter() {
            s.arb.set_slot_color(slot, PATTERN_COLOR);
        }
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level {}", s.level));
        s.arb.draw_text(Region::Center, "MEMORIZE!");
    }

    fn draw_copy<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for slot in self.found.iter() {
            s.arb.set_slot_color(slot, Rgb::GREEN);
        }
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level {}", s.level));
        s.arb.draw_text(Region::Center, "Your turn!");
        self.draw_progress(s);
    }

    fn draw_progress<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.draw_text(
            Region::Footer,
            &format!("{}/{}", self.found.len(), self.pattern.len()),
        );
    }

    fn repaint<A: ResourceArbiter>(&self, s: &mut Session<A>, slot: Slot) {
        let color = if self.found.contains(slot) {
            Rgb::GREEN
        } else {
            Rgb::OFF
        };
        s.arb.set_slot_color(slot, color);
    }

    fn reveal<A: ResourceArbiter>(&mut self, s: &mut Session<A>, wrong: Option<Slot>) {
        self.flash.clear();
        s.arb.clear_all();
        for slot in self.pattern.iter() {
            s.arb.set_slot_color(slot, PATTERN_COLOR);
        }
        if let Some(slot) = wrong {
            s.arb.set_slot_color(slot, Rgb::RED);
        }
        play_cue(&mut s.arb, Cue::Wrong);
    }

    fn finish(&self, reason: EndReason) -> Step {
        Step::Finish {
            reason,
            linger: self.config.reveal_secs,
        }
    }

    fn complete<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let points = pattern_points(self.pattern.len(), self.config.points_per_slot);
        s.add_score(points);
        self.pattern_size = (self.pattern_size + 1).min(self.config.max_pattern_size);
        self.show_secs = (self.show_secs - self.config.show_step_secs).max(self.config.min_show_secs);
        debug!("pattern copy: level {} copied, +{points}", s.level);

        self.flash.clear();
        s.arb.set_all(Rgb::GREEN);
        s.arb.draw_text(Region::Center, "Copied!");
        play_cue(&mut s.arb, Cue::Correct);
        self.stage = Stage::Celebrate {
            until: now + self.config.celebrate_secs,
        };
    }
}

impl MiniGame for PatternCopy {
    const KIND: GameKind = GameKind::PatternCopy;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.new_round(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Idle => {}
            Stage::Announce { until } => {
                if now >= until {
                    self.stage = Stage::Memorize {
                        until: until + self.show_secs,
                    };
                    self.draw_memorize(s);
                    s.arb.play_tone(SHOW_TONE_HZ, 0.1);
                }
            }
            Stage::Memorize { until } => {
                if now >= until {
                    self.stage = Stage::Copy(RoundTimer::start(until, self.config.input_timeout));
                    self.draw_copy(s);
                    s.arb.play_tone(HIDE_TONE_HZ, 0.1);
                }
            }
            Stage::Copy(timer) => {
                if timer.expired(now) {
                    self.reveal(s, None);
                    s.arb.draw_text(Region::Center, "Time's up!");
                    return self.finish(EndReason::Timeout {
                        expected: Expected::Slots(self.pattern),
                    });
                }
                if let Some(slot) = self.flash.due(now) {
                    self.repaint(s, slot);
                }
            }
            Stage::Celebrate { until } => {
                if now >= until {
                    self.new_round(s, now);
                }
            }
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        if !matches!(self.stage, Stage::Copy(_)) {
            return Step::Continue;
        }

        if self.found.contains(slot) {
            if let Some(previous) = self.flash.start(slot, now) {
                self.repaint(s, previous);
            }
            s.arb.set_slot_color(slot, Rgb::WHITE);
            return Step::Continue;
        }

        if !self.pattern.contains(slot) {
            self.reveal(s, Some(slot));
            s.arb.draw_text(Region::Center, "Wrong key!");
            return self.finish(EndReason::WrongKey {
                pressed: slot,
                expected: Expected::Slots(self.pattern),
            });
        }

        self.found.insert(slot);
        s.arb.set_slot_color(slot, Rgb::GREEN);
        s.arb.play_tone(FOUND_TONE_HZ, 0.05);
        self.draw_progress(s);

        if self.found == self.pattern {
            self.complete(s, now);
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.flash.clear();
        match self.stage {
            Stage::Announce { .. } => self.draw_announce(s),
            Stage::Memorize { .. } => self.draw_memorize(s),
            Stage::Copy(_) => self.draw_copy(s),
            Stage::Celebrate { .. } => s.arb.set_all(Rgb::GREEN),
            Stage::Idle => {}
        }
    }

    fn shift(&mut self, dt: f64) {
        self.flash.shift(dt);
        match &mut self.stage {
            Stage::Announce { until } | Stage::Memorize { until } | Stage::Celebrate { until } => {
                *until += dt
            }
            Stage::Copy(timer) => timer.shift(dt),
            Stage::Idle => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Announce { .. } | Stage::Memorize { .. } | Stage::Celebrate { .. } => {
                Phase::Showing
            }
            Stage::Copy(_) => Phase::AwaitingInput,
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

    type Copier = Machine<PatternCopy, RecordingArbiter>;

    fn machine(seed: u32) -> Copier {
        Machine::new(
            PatternCopy::new(PatternCopyConfig::default()),
            RecordingArbiter::new(),
            seed,
        )
        .with_intro_secs(0.0)
    }

    fn press(m: &mut Copier, slot: Slot, now: f64) -> Control {
        m.on_key(KeyEvent::press(slot));
        m.tick(now)
    }

    #[test]
    fn test_announce_then_memorize_then_copy() {
        let mut m = machine(3);
        m.start(0.0);
        assert_eq!(m.arbiter().lit_count(), 0);
        assert_eq!(m.arbiter().text(Region::Center), "Pattern: 3 keys");

        m.tick(1.0);
        assert_eq!(m.arbiter().lit_count(), 3);
        for slot in m.game().pattern().iter() {
            assert_eq!(m.arbiter().led(slot), PATTERN_COLOR);
        }

        m.tick(2.99);
        assert_eq!(m.phase(), Phase::Showing);
        m.tick(3.0);
        assert_eq!(m.phase(), Phase::AwaitingInput);
        assert_eq!(m.arbiter().lit_count(), 0);
    }

    #[test]
    fn test_copied_pattern_scores_and_shortens_viewing() {
        let mut m = machine(5);
        m.start(0.0);
        m.tick(1.0);
        m.tick(3.0);
        let pattern: Vec<Slot> = m.game().pattern().iter().collect();
        for (i, &slot) in pattern.iter().enumerate() {
            assert_eq!(press(&mut m, slot, 3.1 + i as f64 * 0.1), Control::Continue);
        }
        assert_eq!(m.current_score(), 30);
        assert_eq!(m.game().pattern_size(), 4);
        assert!((m.game().show_secs() - 1.85).abs() < 1e-9);

        m.tick(4.0);
        assert_eq!(m.level(), 2);
        assert_eq!(m.game().pattern().len(), 4);
    }

    #[test]
    fn test_viewing_time_stops_at_its_floor() {
        let mut m = machine(9);
        m.start(0.0);
        let mut now = 0.0;
        for _ in 0..14 {
            // Announce, then the pattern.
            now += 1.0;
            m.tick(now);
            now += m.game().show_secs();
            m.tick(now);
            assert_eq!(m.phase(), Phase::AwaitingInput);
            let pattern: Vec<Slot> = m.game().pattern().iter().collect();
            for slot in pattern {
                now += 0.05;
                press(&mut m, slot, now);
            }
            now += 0.5;
            m.tick(now);
        }
        assert_eq!(m.game().show_secs(), 0.5);
        assert_eq!(m.game().pattern_size(), 8);
    }

    #[test]
    fn test_repress_flashes_without_scoring() {
        let mut m = machine(14);
        m.start(0.0);
        m.tick(1.0);
        m.tick(3.0);
        let first = m.game().pattern().iter().next().unwrap();
        press(&mut m, first, 3.1);
        press(&mut m, first, 3.2);
        assert_eq!(m.arbiter().led(first), Rgb::WHITE);
        assert_eq!(m.game().found().len(), 1);
        m.tick(3.35);
        assert_eq!(m.arbiter().led(first), Rgb::GREEN);
        assert_eq!(m.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_stray_key_reveals_and_ends() {
        let mut m = machine(14);
        m.start(0.0);
        m.tick(1.0);
        m.tick(3.0);
        let pattern = m.game().pattern();
        let wrong = pattern.complement().iter().next().unwrap();
        press(&mut m, wrong, 3.1);
        assert_eq!(m.phase(), Phase::Resolving);
        assert_eq!(m.arbiter().led(wrong), Rgb::RED);
        for slot in pattern.iter() {
            assert_eq!(m.arbiter().led(slot), PATTERN_COLOR);
        }
        match m.tick(5.2) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::WrongKey {
                    pressed: wrong,
                    expected: Expected::Slots(pattern)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_window_times_out() {
        let mut m = machine(6);
        m.start(0.0);
        m.tick(1.0);
        m.tick(3.0);
        m.tick(12.9);
        assert_eq!(m.phase(), Phase::AwaitingInput);
        m.tick(13.0);
        assert_eq!(m.phase(), Phase::Resolving);
        assert_eq!(m.arbiter().text(Region::Center), "Time's up!");
    }
}
