//! ReactionChase: one lit key at a time, press it before the window closes.
//!
//! Every hit shrinks the window by `decay_factor` (down to a floor) and moves
//! the target to one of the other eleven keys. A wrong key or a timeout ends
//! the session.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::ReactionChaseConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, Expected, MiniGame, Phase, Session, Step};
use crate::scoring::{decayed, reaction_points};
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot, GAME_COLORS};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Target(RoundTimer),
    /// Success flash before the next target.
    Feedback { until: f64 },
}

#[derive(Debug, Clone)]
pub struct ReactionChase {
    config: ReactionChaseConfig,
    time_limit: f64,
    target: Option<Slot>,
    color: Rgb,
    stage: Stage,
}

impl ReactionChase {
    pub fn new(config: ReactionChaseConfig) -> Self {
        Self {
            time_limit: config.initial_time_limit,
            config,
            target: None,
            color: Rgb::OFF,
            stage: Stage::Idle,
        }
    }

    pub fn target(&self) -> Option<Slot> {
        self.target
    }

    /// Window for the current (or next) target.
    pub fn time_limit(&self) -> f64 {
        self.time_limit
    }

    pub fn round_timer(&self) -> Option<RoundTimer> {
        match self.stage {
            Stage::Target(timer) => Some(timer),
            _ => None,
        }
    }

    fn next_target<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let target = s.rng.choose_slot_except(self.target);
        self.target = Some(target);
        self.color = s.rng.choose(&GAME_COLORS);
        self.stage = Stage::Target(RoundTimer::start(now, self.time_limit));
        s.level += 1;
        debug!(
            "reaction chase round {}: target {} window {:.3}s",
            s.level,
            target.index(),
            self.time_limit
        );
        self.draw(s);
    }

    fn draw<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        let (level, score) = (s.level, s.score);
        let arb = &mut s.arb;
        arb.clear_all();
        if let (Stage::Target(_), Some(target)) = (self.stage, self.target) {
            arb.set_slot_color(target, self.color);
        }
        arb.clear_display();
        arb.draw_text(Region::Header, &format!("Round: {level}"));
        arb.draw_text(Region::Footer, &format!("Score: {score}"));
    }
}

impl MiniGame for ReactionChase {
    const KIND: GameKind = GameKind::ReactionChase;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.next_target(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Idle => Step::Continue,
            Stage::Feedback { until } => {
                if now >= until {
                    self.next_target(s, now);
                }
                Step::Continue
            }
            Stage::Target(timer) => {
                if !timer.expired(now) {
                    return Step::Continue;
                }
                let Some(target) = self.target else {
                    return Step::Continue;
                };
                s.arb.clear_all();
                s.arb.set_slot_color(target, Rgb::RED);
                s.arb.draw_text(Region::Center, "Time's up!");
                play_cue(&mut s.arb, Cue::Wrong);
                Step::fail(EndReason::Timeout {
                    expected: Expected::Slot(target),
                })
            }
        }
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        let (Stage::Target(timer), Some(target)) = (self.stage, self.target) else {
            return Step::Continue;
        };

        if slot != target {
            s.arb.clear_all();
            s.arb.set_slot_color(slot, Rgb::RED);
            s.arb.set_slot_color(target, Rgb::GREEN);
            s.arb.draw_text(Region::Center, "Wrong key!");
            play_cue(&mut s.arb, Cue::Wrong);
            return Step::fail(EndReason::WrongKey {
                pressed: slot,
                expected: Expected::Slot(target),
            });
        }

        let points = reaction_points(
            self.config.base_points,
            self.config.speed_bonus_multiplier,
            timer.elapsed(now),
            self.time_limit,
        );
        s.add_score(points);
        self.time_limit = decayed(
            self.time_limit,
            self.config.decay_factor,
            self.config.min_time_limit,
        );
        debug!(
            "reaction chase hit after {:.3}s: +{points}, next window {:.3}s",
            timer.elapsed(now),
            self.time_limit
        );

        play_cue(&mut s.arb, Cue::Correct);
        s.arb.set_slot_color(target, Rgb::GREEN);
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));

        if self.config.feedback_secs > 0.0 {
            self.stage = Stage::Feedback {
                until: now + self.config.feedback_secs,
            };
        } else {
            self.next_target(s, now);
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.draw(s);
    }

    fn shift(&mut self, dt: f64) {
        match &mut self.stage {
            Stage::Target(timer) => timer.shift(dt),
            Stage::Feedback { until } => *until += dt,
            Stage::Idle => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Target(_) => Phase::AwaitingInput,
            Stage::Feedback { .. } => Phase::Showing,
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

    fn machine(seed: u32) -> Machine<ReactionChase, RecordingArbiter> {
        let config = ReactionChaseConfig {
            feedback_secs: 0.0,
            ..ReactionChaseConfig::default()
        };
        Machine::new(ReactionChase::new(config), RecordingArbiter::new(), seed).with_intro_secs(0.0)
    }

    #[test]
    fn test_start_lights_exactly_the_target() {
        let mut m = machine(42);
        m.start(0.0);
        let target = m.game().target().unwrap();
        assert_eq!(m.arbiter().lit_count(), 1);
        assert!(!m.arbiter().led(target).is_off());
        assert_eq!(m.phase(), Phase::AwaitingInput);
    }

    #[test]
    fn test_hit_scores_and_shrinks_window() {
        let mut m = machine(42);
        m.start(0.0);
        let target = m.game().target().unwrap();
        m.on_key(KeyEvent::press(target));
        assert_eq!(m.tick(0.5), Control::Continue);
        assert_eq!(m.current_score(), 25);
        assert!((m.game().time_limit() - 1.84).abs() < 1e-9);
        assert_ne!(m.game().target(), Some(target));
    }

    #[test]
    fn test_wrong_key_reports_expected_slot() {
        let mut m = machine(7);
        m.start(0.0);
        let target = m.game().target().unwrap();
        let wrong = Slot::ALL[(target.index() + 1) % 12];
        m.on_key(KeyEvent::press(wrong));
        assert_eq!(m.tick(0.1), Control::Continue);
        assert_eq!(m.phase(), Phase::Resolving);

        match m.tick(5.0) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::WrongKey {
                    pressed: wrong,
                    expected: Expected::Slot(target)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
        assert!(m.arbiter().is_clean());
    }

    #[test]
    fn test_press_exactly_at_boundary_is_timeout() {
        let mut m = machine(9);
        m.start(0.0);
        let target = m.game().target().unwrap();
        m.on_key(KeyEvent::press(target));
        m.tick(2.0);
        assert_eq!(m.current_score(), 0);
        assert_eq!(m.phase(), Phase::Resolving);
        match m.tick(10.0) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::Timeout {
                    expected: Expected::Slot(target)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_window_never_below_floor() {
        let mut m = machine(5);
        m.start(0.0);
        let mut now = 0.0;
        for _ in 0..60 {
            let target = m.game().target().unwrap();
            now += 0.05;
            m.on_key(KeyEvent::press(target));
            assert_eq!(m.tick(now), Control::Continue);
            assert!(m.game().time_limit() >= 0.3);
        }
        assert_eq!(m.game().time_limit(), 0.3);
    }
}
