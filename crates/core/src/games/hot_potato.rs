//! HotPotato: keep passing the lit key before the hidden fuse runs out.
//!
//! The potato wanders to a random neighbor on its own and jumps whenever
//! the player presses it. During the last stretch of the fuse it stops
//! wandering and flashes. A player who touched it within `hold_secs` of the
//! explosion was holding it and loses; anyone else survives the round.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::HotPotatoConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::games::flash::KeyFlash;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::scoring::stepped_down;
use crate::types::{Rgb, Slot, SlotSet, GAME_COLORS};

const POTATO_COLOR: Rgb = Rgb::new(255, 100, 0);
const WARNING_FLASH_SECS: f64 = 0.1;
const BEEP_EVERY_SECS: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Live { fuse_at: f64, moved_at: f64, next_beep: f64 },
    /// `flare` is the white first half of the blast.
    Exploding { until: f64, flare: bool, held: bool },
    Safe { until: f64 },
}

#[derive(Debug, Clone)]
pub struct HotPotato {
    config: HotPotatoConfig,
    potato: Slot,
    move_interval: f64,
    survived: u32,
    passed_at: Option<f64>,
    flash: KeyFlash,
    stage: Stage,
}

impl HotPotato {
    pub fn new(config: HotPotatoConfig) -> Self {
        Self {
            move_interval: config.initial_move_interval,
            config,
            potato: Slot::ALL[0],
            survived: 0,
            passed_at: None,
            flash: KeyFlash::default(),
            stage: Stage::Idle,
        }
    }

    pub fn potato(&self) -> Slot {
        self.potato
    }

    /// When the current round's fuse runs out.
    pub fn fuse_at(&self) -> Option<f64> {
        match self.stage {
            Stage::Live { fuse_at, .. } => Some(fuse_at),
            _ => None,
        }
    }

    pub fn survived(&self) -> u32 {
        self.survived
    }

    pub fn move_interval(&self) -> f64 {
        self.move_interval
    }

    fn new_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        s.level += 1;
        self.potato = s.rng.choose(&Slot::ALL);
        self.passed_at = None;
        self.flash.clear();
        let span = self.config.max_fuse_secs - self.config.min_fuse_secs;
        let fuse = self.config.min_fuse_secs + s.rng.next_f64() * span;
        self.stage = Stage::Live {
            fuse_at: now + fuse,
            moved_at: now,
            next_beep: now,
        };
        debug!(
            "hot potato round {}: fuse {fuse:.2}s, moves every {:.2}s",
            s.level, self.move_interval
        );
        self.draw_live(s);
    }

    fn draw_live<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        s.arb.set_slot_color(self.potato, POTATO_COLOR);
        s.arb.clear_display();
        s.arb.draw_text(
            Region::Header,
            &format!("Round {}/{}", s.level, self.config.rounds),
        );
        s.arb.draw_text(Region::Center, "PASS IT!");
        s.arb.draw_text(Region::Footer, &format!("Survived: {}", self.survived));
    }

    fn paint<A: ResourceArbiter>(&self, s: &mut Session<A>, slot: Slot) {
        let color = if slot == self.potato {
            POTATO_COLOR
        } else if self.flash.slot() == Some(slot) {
            Rgb::WHITE
        } else {
            Rgb::OFF
        };
        s.arb.set_slot_color(slot, color);
    }

    fn hop<A: ResourceArbiter>(&mut self, s: &mut Session<A>) {
        let from = self.potato;
        let neighbors = from.neighbors().difference(SlotSet::EMPTY.with(from));
        self.potato = s.rng.choose_slot(neighbors).unwrap_or(from);
        self.paint(s, from);
        self.paint(s, self.potato);
        s.arb.play_tone(440, 0.03);
    }

    fn explode<A: ResourceArbiter>(&mut self, s: &mut Session<A>, fuse_at: f64) {
        let held = self
            .passed_at
            .is_some_and(|at| fuse_at - at < self.config.hold_secs);
        debug!("hot potato round {}: boom at {:?}, held={held}", s.level, self.potato);
        self.flash.clear();
        s.arb.set_all(Rgb::WHITE);
        s.arb.play_tone(200, 0.3);
        self.stage = Stage::Exploding {
            until: fuse_at + self.config.explode_secs / 2.0,
            flare: true,
            held,
        };
    }

    fn resolve<A: ResourceArbiter>(&mut self, s: &mut Session<A>, held: bool, now: f64) -> Step {
        if held {
            s.arb.set_all(Rgb::RED);
            play_cue(&mut s.arb, Cue::Wrong);
            s.arb.clear_display();
            s.arb.draw_text(Region::Center, "BOOM!");
            s.arb.draw_text(Region::Footer, "You got caught!");
            return Step::Finish {
                reason: EndReason::Caught { at: self.potato },
                linger: self.config.caught_secs,
            };
        }

        self.survived += 1;
        s.add_score(self.config.survive_points);
        self.move_interval = stepped_down(
            self.config.initial_move_interval,
            self.config.move_interval_step,
            self.survived,
            self.config.min_move_interval,
        );
        s.arb.set_all(Rgb::GREEN);
        play_cue(&mut s.arb, Cue::Correct);
        s.arb.clear_display();
        s.arb.draw_text(Region::Center, "SAFE!");
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
        self.stage = Stage::Safe {
            until: now + self.config.safe_secs,
        };
        Step::Continue
    }

    fn victory<A: ResourceArbiter>(&mut self, s: &mut Session<A>) -> Step {
        s.add_score(self.survived * self.config.victory_bonus);
        debug!("hot potato: all {} rounds survived", self.survived);
        for slot in Slot::ALL {
            s.arb.set_slot_color(slot, GAME_COLORS[slot.index() % GAME_COLORS.len()]);
        }
        play_cue(&mut s.arb, Cue::LevelUp);
        s.arb.clear_display();
        s.arb.draw_text(Region::Center, "WINNER!");
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
        Step::Finish {
            reason: EndReason::Completed,
            linger: self.config.safe_secs,
        }
    }

    fn tick_live<A: ResourceArbiter>(
        &mut self,
        s: &mut Session<A>,
        fuse_at: f64,
        moved_at: f64,
        next_beep: f64,
        now: f64,
    ) {
        if let Some(slot) = self.flash.due(now) {
            self.paint(s, slot);
        }

        if fuse_at - now < self.config.warning_secs {
            let even = (now / WARNING_FLASH_SECS).floor() as i64 % 2 == 0;
            let color = if even { Rgb::RED } else { POTATO_COLOR };
            s.arb.set_slot_color(self.potato, color);
            if now >= next_beep {
                s.arb.play_tone(880, 0.02);
                self.stage = Stage::Live {
                    fuse_at,
                    moved_at,
                    next_beep: now + BEEP_EVERY_SECS,
                };
            }
        } else if now - moved_at >= self.move_interval {
            self.hop(s);
            self.stage = Stage::Live {
                fuse_at,
                moved_at: now,
                next_beep,
            };
        }
    }
}

impl MiniGame for HotPotato {
    const KIND: GameKind = GameKind::HotPotato;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.new_round(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Idle => {}
            Stage::Live { fuse_at, .. } if now >= fuse_at => self.explode(s, fuse_at),
            Stage::Live {
                fuse_at,
                moved_at,
                next_beep,
            } => self.tick_live(s, fuse_at, moved_at, next_beep, now),
            Stage::Exploding { until, flare, held } if now >= until => {
                if !flare {
                    return self.resolve(s, held, now);
                }
                s.arb.set_all(Rgb::RED);
                s.arb.play_tone(150, 0.3);
                self.stage = Stage::Exploding {
                    until: until + self.config.explode_secs / 2.0,
                    flare: false,
                    held,
                };
            }
            Stage::Exploding { .. } => {}
            Stage::Safe { until } if now >= until => {
                if s.level >= self.config.rounds {
                    return self.victory(s);
                }
                self.new_round(s, now);
            }
            Stage::Safe { .. } => {}
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        let Stage::Live {
            fuse_at, next_beep, ..
        } = self.stage
        else {
            return Step::Continue;
        };

        if slot == self.potato {
            self.passed_at = Some(now);
            self.hop(s);
            self.stage = Stage::Live {
                fuse_at,
                moved_at: now,
                next_beep,
            };
        } else {
            if let Some(previous) = self.flash.start(slot, now) {
                self.paint(s, previous);
            }
            self.paint(s, slot);
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.flash.clear();
        match self.stage {
            Stage::Live { .. } => self.draw_live(s),
            Stage::Exploding { flare, .. } => {
                s.arb.set_all(if flare { Rgb::WHITE } else { Rgb::RED });
            }
            Stage::Safe { .. } => s.arb.set_all(Rgb::GREEN),
            Stage::Idle => {}
        }
    }

    fn shift(&mut self, dt: f64) {
        self.flash.shift(dt);
        if let Some(at) = &mut self.passed_at {
            *at += dt;
        }
        match &mut self.stage {
            Stage::Live {
                fuse_at,
                moved_at,
                next_beep,
            } => {
                *fuse_at += dt;
                *moved_at += dt;
                *next_beep += dt;
            }
            Stage::Exploding { until, .. } | Stage::Safe { until } => *until += dt,
            Stage::Idle => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Live { .. } => Phase::AwaitingInput,
            Stage::Exploding { .. } | Stage::Safe { .. } => Phase::Showing,
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

    type Potato = Machine<HotPotato, RecordingArbiter>;

    const DT: f64 = 0.02;

    fn machine(seed: u32) -> Potato {
        Machine::new(
            HotPotato::new(HotPotatoConfig::default()),
            RecordingArbiter::new(),
            seed,
        )
        .with_intro_secs(0.0)
    }

    fn press(m: &mut Potato, slot: Slot, now: f64) -> Control {
        m.on_key(KeyEvent::press(slot));
        m.tick(now)
    }

    #[test]
    fn test_potato_wanders_to_a_neighbor() {
        let mut m = machine(4);
        m.start(0.0);
        let first = m.game().potato();
        assert_eq!(m.arbiter().led(first), POTATO_COLOR);
        assert_eq!(m.arbiter().lit_count(), 1);

        m.tick(0.79);
        assert_eq!(m.game().potato(), first);
        m.tick(0.8);
        let next = m.game().potato();
        assert_ne!(next, first);
        assert!(first.neighbors().contains(next));
        assert_eq!(m.arbiter().led(first), Rgb::OFF);
        assert_eq!(m.arbiter().led(next), POTATO_COLOR);
    }

    #[test]
    fn test_potato_stays_put_during_the_warning() {
        let mut m = machine(7);
        m.start(0.0);
        let fuse_at = m.game().fuse_at().unwrap();
        m.tick(fuse_at - 0.99);
        let parked = m.game().potato();
        let mut now = fuse_at - 0.99;
        let mut flashed_red = false;
        while now + DT < fuse_at {
            now += DT;
            m.tick(now);
            assert_eq!(m.game().potato(), parked);
            flashed_red |= m.arbiter().led(parked) == Rgb::RED;
        }
        assert!(flashed_red);
        assert!(m.arbiter().tones().iter().any(|t| t.freq_hz == 880));
    }

    #[test]
    fn test_pressing_the_potato_passes_it() {
        let mut m = machine(2);
        m.start(0.0);
        let first = m.game().potato();
        press(&mut m, first, 0.3);
        let next = m.game().potato();
        assert!(first.neighbors().contains(next));
        assert_ne!(next, first);
        // Passing restarts the wander clock.
        m.tick(0.79);
        assert_eq!(m.game().potato(), next);
    }

    #[test]
    fn test_other_keys_just_flash() {
        let mut m = machine(2);
        m.start(0.0);
        let potato = m.game().potato();
        let other = potato.neighbors().complement().iter().next().unwrap();
        press(&mut m, other, 0.1);
        assert_eq!(m.arbiter().led(other), Rgb::WHITE);
        assert_eq!(m.game().potato(), potato);
        m.tick(0.25);
        assert_eq!(m.arbiter().led(other), Rgb::OFF);
    }

    #[test]
    fn test_holding_at_the_blast_is_caught() {
        let mut m = machine(9);
        m.start(0.0);
        let fuse_at = m.game().fuse_at().unwrap();
        m.tick(fuse_at - 0.5);
        let potato = m.game().potato();
        press(&mut m, potato, fuse_at - 0.1);
        let held_at = m.game().potato();

        m.tick(fuse_at);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::WHITE);
        m.tick(fuse_at + 0.3);
        assert_eq!(m.arbiter().led(Slot::ALL[0]), Rgb::RED);
        m.tick(fuse_at + 0.61);
        assert_eq!(m.phase(), Phase::Resolving);
        assert_eq!(m.arbiter().text(Region::Center), "BOOM!");

        match m.tick(fuse_at + 2.7) {
            Control::Terminate(outcome) => {
                assert_eq!(outcome.reason, EndReason::Caught { at: held_at });
                assert_eq!(outcome.score, 0);
            }
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_hands_off_survives_every_round() {
        let mut m = machine(12);
        m.start(0.0);
        let mut now = 0.0;
        let outcome = loop {
            now += DT;
            if let Control::Terminate(outcome) = m.tick(now) {
                break outcome;
            }
            assert!(now < 120.0, "session never ended");
        };
        assert_eq!(outcome.reason, EndReason::Completed);
        assert_eq!(outcome.level, 10);
        // 10 rounds at 10, then 10 survived at 20.
        assert_eq!(outcome.score, 300);
    }

    #[test]
    fn test_survival_speeds_up_the_wander() {
        let mut m = machine(3);
        m.start(0.0);
        let fuse_at = m.game().fuse_at().unwrap();
        m.tick(fuse_at);
        m.tick(fuse_at + 0.3);
        m.tick(fuse_at + 0.61);
        assert_eq!(m.game().survived(), 1);
        assert_eq!(m.current_score(), 10);
        assert!((m.game().move_interval() - 0.75).abs() < 1e-9);

        m.tick(fuse_at + 2.2);
        assert_eq!(m.level(), 2);
        assert!(m.game().fuse_at().is_some());
    }
}
