//! ReactionTimer: wait for green, then press any key as fast as possible.
//!
//! Each round holds the keys yellow for a random wait. Pressing before the
//! keys turn green is a false start and books a fixed penalty time. After
//! the last round the score is set once from the average genuine reaction.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::ReactionTimerConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::scoring::{average_reaction_ms, reaction_timer_score};
use crate::types::{Rgb, Slot};

const GO_TONE_HZ: u16 = 880;
const GO_TONE_SECS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Ready { go_at: f64 },
    Go { green_at: f64 },
    Result { until: f64 },
}

/// Color and label for a reaction of `ms` milliseconds.
fn rating(ms: u32) -> (Rgb, &'static str) {
    match ms {
        0..=199 => (Rgb::CYAN, "AMAZING!"),
        200..=299 => (Rgb::GREEN, "Great!"),
        300..=399 => (Rgb::YELLOW, "Good"),
        _ => (Rgb::ORANGE, "Slow..."),
    }
}

#[derive(Debug, Clone)]
pub struct ReactionTimer {
    config: ReactionTimerConfig,
    times_ms: Vec<u32>,
    stage: Stage,
}

impl ReactionTimer {
    pub fn new(config: ReactionTimerConfig) -> Self {
        Self {
            times_ms: Vec::with_capacity(config.rounds as usize),
            config,
            stage: Stage::Idle,
        }
    }

    /// Recorded times so far, false starts included as the penalty.
    pub fn times_ms(&self) -> &[u32] {
        &self.times_ms
    }

    /// When the current wait turns green, while waiting.
    pub fn go_at(&self) -> Option<f64> {
        match self.stage {
            Stage::Ready { go_at } => Some(go_at),
            _ => None,
        }
    }

    fn wait_secs<A: ResourceArbiter>(&self, s: &mut Session<A>) -> f64 {
        let span = self.config.max_wait_secs - self.config.min_wait_secs;
        self.config.min_wait_secs + s.rng.next_f64() * span
    }

    fn new_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        s.level += 1;
        self.get_ready(s, now);
    }

    fn get_ready<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let wait = self.wait_secs(s);
        self.stage = Stage::Ready { go_at: now + wait };
        debug!("reaction timer round {}: green in {wait:.2}s", s.level);

        s.arb.set_all(Rgb::YELLOW);
        s.arb.clear_display();
        s.arb.draw_text(
            Region::Header,
            &format!("Round {}/{}", s.level, self.config.rounds),
        );
        s.arb.draw_text(Region::Center, "Get ready...");
    }

    fn go_green<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.stage = Stage::Go { green_at: now };
        s.arb.set_all(Rgb::GREEN);
        s.arb.play_tone(GO_TONE_HZ, GO_TONE_SECS);
        s.arb.clear_display();
        s.arb.draw_text(Region::Center, "GO!");
    }

    fn false_start<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.times_ms.push(self.config.false_start_ms);
        debug!("reaction timer round {}: false start", s.level);

        s.arb.set_all(Rgb::RED);
        play_cue(&mut s.arb, Cue::Wrong);
        s.arb.clear_display();
        s.arb.draw_text(Region::Center, "TOO EARLY!");
        s.arb.draw_text(Region::Footer, "Wait for GREEN");
        self.stage = Stage::Result {
            until: now + self.config.result_secs,
        };
    }

    fn record<A: ResourceArbiter>(&mut self, s: &mut Session<A>, ms: u32, now: f64) {
        self.times_ms.push(ms);
        let (color, label) = rating(ms);
        debug!("reaction timer round {}: {ms}ms", s.level);

        s.arb.set_all(color);
        play_cue(&mut s.arb, Cue::Correct);
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("{ms}ms"));
        s.arb.draw_text(Region::Center, label);
        self.stage = Stage::Result {
            until: now + self.config.result_secs,
        };
    }

    fn wrap_up<A: ResourceArbiter>(&mut self, s: &mut Session<A>) -> Step {
        let score = reaction_timer_score(self.config.score_ceiling_ms, &self.times_ms);
        s.set_score(score);
        debug!(
            "reaction timer: average {}ms, score {score}",
            average_reaction_ms(&self.times_ms)
        );
        Step::Finish {
            reason: EndReason::Completed,
            linger: 0.0,
        }
    }
}

impl MiniGame for ReactionTimer {
    const KIND: GameKind = GameKind::ReactionTimer;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.new_round(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Ready { go_at } if now >= go_at => self.go_green(s, now),
            Stage::Result { until } if now >= until => {
                if s.level >= self.config.rounds {
                    return self.wrap_up(s);
                }
                self.new_round(s, now);
            }
            _ => {}
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _slot: Slot, now: f64) -> Step {
        match self.stage {
            Stage::Ready { .. } => self.false_start(s, now),
            // A press handled on the tick that lit green was made before
            // the player could see it.
            Stage::Go { green_at } if now <= green_at => self.false_start(s, now),
            Stage::Go { green_at } => {
                let ms = ((now - green_at) * 1000.0).round() as u32;
                self.record(s, ms, now);
            }
            Stage::Idle | Stage::Result { .. } => {}
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        match self.stage {
            // A paused wait or reaction starts the round's wait over.
            Stage::Ready { .. } | Stage::Go { .. } => self.get_ready(s, now),
            Stage::Result { .. } | Stage::Idle => {}
        }
    }

    fn shift(&mut self, dt: f64) {
        match &mut self.stage {
            Stage::Ready { go_at } => *go_at += dt,
            Stage::Go { green_at } => *green_at += dt,
            Stage::Result { until } => *until += dt,
            Stage::Idle => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Ready { .. } | Stage::Result { .. } => Phase::Showing,
            Stage::Go { .. } => Phase::AwaitingInput,
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

    type Timer = Machine<ReactionTimer, RecordingArbiter>;

    fn machine(config: ReactionTimerConfig, seed: u32) -> Timer {
        Machine::new(ReactionTimer::new(config), RecordingArbiter::new(), seed)
            .with_intro_secs(0.0)
    }

    fn press(m: &mut Timer, now: f64) -> Control {
        m.on_key(KeyEvent::press(Slot::ALL[4]));
        m.tick(now)
    }

    /// Tick until green and react `ms` later; returns the time of the press.
    fn react(m: &mut Timer, ms: f64) -> f64 {
        let go_at = m.game().go_at().unwrap();
        m.tick(go_at);
        assert_eq!(m.phase(), Phase::AwaitingInput);
        let at = go_at + ms / 1000.0;
        assert_eq!(press(m, at), Control::Continue);
        at
    }

    #[test]
    fn test_wait_is_drawn_from_the_configured_range() {
        for seed in 1..20 {
            let mut m = machine(ReactionTimerConfig::default(), seed);
            m.start(0.0);
            let go_at = m.game().go_at().unwrap();
            assert!((1.5..5.0).contains(&go_at), "seed {seed}: {go_at}");
            assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::YELLOW);
        }
    }

    #[test]
    fn test_reaction_is_timed_and_rated() {
        let mut m = machine(ReactionTimerConfig::default(), 3);
        m.start(0.0);
        react(&mut m, 250.0);
        assert_eq!(m.game().times_ms(), &[250]);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::GREEN);
        assert_eq!(m.arbiter().text(Region::Center), "Great!");
        assert_eq!(m.phase(), Phase::Showing);
    }

    #[test]
    fn test_early_press_books_the_penalty() {
        let mut m = machine(ReactionTimerConfig::default(), 3);
        m.start(0.0);
        assert_eq!(press(&mut m, 0.5), Control::Continue);
        assert_eq!(m.game().times_ms(), &[1000]);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::RED);
        assert_eq!(m.arbiter().text(Region::Center), "TOO EARLY!");

        // Next round after the result is shown.
        m.tick(2.5);
        assert_eq!(m.level(), 2);
        assert!(m.game().go_at().is_some());
    }

    #[test]
    fn test_press_on_the_green_tick_is_a_false_start() {
        let mut m = machine(ReactionTimerConfig::default(), 8);
        m.start(0.0);
        let go_at = m.game().go_at().unwrap();
        assert_eq!(press(&mut m, go_at), Control::Continue);
        assert_eq!(m.game().times_ms(), &[1000]);
    }

    #[test]
    fn test_session_score_is_set_from_the_average() {
        let mut m = machine(ReactionTimerConfig::default(), 11);
        m.start(0.0);
        let reactions = [200.0, 300.0, 250.0, 350.0];
        for ms in reactions {
            let at = react(&mut m, ms);
            m.tick(at + 2.0);
        }
        // Last round is a false start, left out of the average.
        assert_eq!(m.level(), 5);
        let early = m.game().go_at().unwrap() - 0.1;
        assert_eq!(press(&mut m, early), Control::Continue);
        assert_eq!(m.game().times_ms().len(), 5);

        let end = early + 2.0;
        match m.tick(end) {
            Control::Terminate(outcome) => {
                assert_eq!(outcome.reason, EndReason::Completed);
                // 500 - (200 + 300 + 250 + 350) / 4
                assert_eq!(outcome.score, 225);
                assert_eq!(outcome.level, 5);
            }
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_pause_restarts_the_wait() {
        let mut m = machine(ReactionTimerConfig::default(), 4);
        m.start(0.0);
        let go_at = m.game().go_at().unwrap();
        m.tick(go_at);
        m.suspend(go_at + 0.1);
        m.resume(go_at + 5.0);
        assert_eq!(m.phase(), Phase::Showing);
        assert!(m.game().go_at().unwrap() > go_at + 5.0);
        assert_eq!(m.level(), 1);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::YELLOW);
    }
}
