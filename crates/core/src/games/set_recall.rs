//! SetRecall (memory grid): memorize a lit set of keys, then find them all.
//!
//! One timeout covers the whole answer, and order does not matter. A miss
//! reveals the pattern: found keys green, unfound blue, the wrong key red.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::SetRecallConfig;
use crate::cue::{play_cue, play_key_tone, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, Expected, MiniGame, Phase, Session, Step};
use crate::scoring::{pattern_display_time, pattern_points};
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot, SlotSet};

const PATTERN_COLOR: Rgb = Rgb::CYAN;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Memorize { until: f64 },
    Recall(RoundTimer),
    Celebrate { until: f64 },
}

#[derive(Debug, Clone)]
pub struct SetRecall {
    config: SetRecallConfig,
    pattern_size: usize,
    pattern: SlotSet,
    found: SlotSet,
    stage: Stage,
}

impl SetRecall {
    pub fn new(config: SetRecallConfig) -> Self {
        Self {
            pattern_size: config.initial_pattern_size,
            config,
            pattern: SlotSet::EMPTY,
            found: SlotSet::EMPTY,
            stage: Stage::Idle,
        }
    }

    pub fn pattern(&self) -> SlotSet {
        self.pattern
    }

    pub fn found(&self) -> SlotSet {
        self.found
    }

    /// Size of the current pattern, or of the next one after a completed round.
    pub fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    fn new_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.pattern = s.rng.sample_slots(self.pattern_size);
        self.found = SlotSet::EMPTY;
        let show_for = pattern_display_time(
            self.config.display_base_secs,
            self.config.display_per_slot_secs,
            self.pattern_size,
        );
        self.stage = Stage::Memorize {
            until: now + show_for,
        };
        s.level += 1;
        debug!(
            "set recall level {}: {} slots shown for {:.2}s",
            s.level, self.pattern_size, show_for
        );
        self.draw_memorize(s);
    }

    fn draw_memorize<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for slot in self.pattern.iter() {
            s.arb.set_slot_color(slot, PATTERN_COLOR);
        }
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level: {}", s.level));
        s.arb.draw_text(Region::Center, "Memorize!");
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
    }

    fn draw_recall<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for slot in self.found.iter() {
            s.arb.set_slot_color(slot, Rgb::GREEN);
        }
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level: {}", s.level));
        s.arb.draw_text(Region::Center, "Find them!");
        self.draw_progress(s);
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
    }

    fn draw_progress<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.draw_text(
            Region::HeaderRight,
            &format!("{}/{}", self.found.len(), self.pattern.len()),
        );
    }

    fn reveal<A: ResourceArbiter>(&self, s: &mut Session<A>, wrong: Option<Slot>) {
        s.arb.clear_all();
        for slot in self.pattern.iter() {
            let color = if self.found.contains(slot) {
                Rgb::GREEN
            } else {
                Rgb::BLUE
            };
            s.arb.set_slot_color(slot, color);
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
}

impl MiniGame for SetRecall {
    const KIND: GameKind = GameKind::SetRecall;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.new_round(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Idle => Step::Continue,
            Stage::Memorize { until } => {
                if now >= until {
                    self.stage = Stage::Recall(RoundTimer::start(until, self.config.input_timeout));
                    self.draw_recall(s);
                }
                Step::Continue
            }
            Stage::Recall(timer) => {
                if !timer.expired(now) {
                    return Step::Continue;
                }
                self.reveal(s, None);
                s.arb.draw_text(Region::Center, "Time's up!");
                self.finish(EndReason::Timeout {
                    expected: Expected::Slots(self.pattern),
                })
            }
            Stage::Celebrate { until } => {
                if now >= until {
                    self.new_round(s, now);
                }
                Step::Continue
            }
        }
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        if !matches!(self.stage, Stage::Recall(_)) || self.found.contains(slot) {
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
        play_key_tone(&mut s.arb, slot);
        self.draw_progress(s);

        if self.found == self.pattern {
            let points = pattern_points(self.pattern.len(), self.config.points_per_slot);
            s.add_score(points);
            self.pattern_size = (self.pattern_size + 1).min(self.config.max_pattern_size);
            debug!("set recall: pattern complete, +{points}");
            s.arb.set_all(Rgb::GREEN);
            s.arb.draw_text(Region::Center, "Perfect!");
            s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
            play_cue(&mut s.arb, Cue::LevelUp);
            self.stage = Stage::Celebrate {
                until: now + self.config.celebrate_secs,
            };
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        match self.stage {
            Stage::Memorize { .. } => self.draw_memorize(s),
            Stage::Recall(_) => self.draw_recall(s),
            Stage::Celebrate { .. } => s.arb.set_all(Rgb::GREEN),
            Stage::Idle => {}
        }
    }

    fn shift(&mut self, dt: f64) {
        match &mut self.stage {
            Stage::Memorize { until } | Stage::Celebrate { until } => *until += dt,
            Stage::Recall(timer) => timer.shift(dt),
            Stage::Idle => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Memorize { .. } | Stage::Celebrate { .. } => Phase::Showing,
            Stage::Recall(_) => Phase::AwaitingInput,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
