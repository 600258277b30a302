//! ColorCycleMatch: every key cycles through a palette; find another key
//! showing the target's color.
//!
//! Each slot resolves to `(base + offset) % palette.len()`. Offsets are drawn
//! once per session so the keys never cycle in lockstep. The target's base is
//! frozen for the round, so it keeps showing the captured color while every
//! other key moves one step per cycle. Any other key therefore matches within
//! `palette.len()` cycles.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::ColorCycleConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, Expected, MiniGame, Phase, Session, Step};
use crate::scoring::decayed;
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot, SlotSet, SLOT_COUNT};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Round {
    target: Slot,
    color: usize,
    timer: RoundTimer,
    last_cycle: f64,
}

#[derive(Debug, Clone)]
pub struct ColorCycleMatch {
    config: ColorCycleConfig,
    base: [usize; SLOT_COUNT],
    offset: [usize; SLOT_COUNT],
    cycle_interval: f64,
    round: Option<Round>,
}

impl ColorCycleMatch {
    pub fn new(config: ColorCycleConfig) -> Self {
        Self {
            cycle_interval: config.initial_cycle_interval,
            config,
            base: [0; SLOT_COUNT],
            offset: [0; SLOT_COUNT],
            round: None,
        }
    }

    pub fn target(&self) -> Option<Slot> {
        self.round.map(|r| r.target)
    }

    /// Palette index the player has to find.
    pub fn target_color(&self) -> Option<usize> {
        self.round.map(|r| r.color)
    }

    pub fn cycle_interval(&self) -> f64 {
        self.cycle_interval
    }

    /// Palette index `slot` currently shows.
    pub fn resolved_color(&self, slot: Slot) -> usize {
        let i = slot.index();
        (self.base[i] + self.offset[i]) % self.config.palette.len()
    }

    /// Non-target keys that would score right now.
    pub fn matching_slots(&self) -> SlotSet {
        let Some(round) = self.round else {
            return SlotSet::EMPTY;
        };
        Slot::ALL
            .into_iter()
            .filter(|&s| s != round.target && self.resolved_color(s) == round.color)
            .collect()
    }

    fn new_round<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let target = s.rng.choose_slot(SlotSet::FULL).unwrap_or(Slot::ALL[0]);
        let color = self.resolved_color(target);
        self.round = Some(Round {
            target,
            color,
            timer: RoundTimer::start(now, self.config.round_time_limit),
            last_cycle: now,
        });
        s.level += 1;
        debug!(
            "color cycle round {}: target {} color {} cycle {:.3}s",
            s.level,
            target.index(),
            color,
            self.cycle_interval
        );
        self.draw(s);
    }

    fn draw_keys<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        for slot in Slot::ALL {
            s.arb.set_slot_color(slot, self.config.palette[self.resolved_color(slot)]);
        }
    }

    fn draw<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        self.draw_keys(s);
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Round: {}", s.level));
        s.arb.draw_text(Region::Center, "Match the color!");
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
    }

    fn cycle(&mut self, target: Slot) {
        let len = self.config.palette.len();
        for slot in Slot::ALL.into_iter().filter(|&s| s != target) {
            let i = slot.index();
            self.base[i] = (self.base[i] + 1) % len;
        }
    }

    fn reveal<A: ResourceArbiter>(&self, s: &mut Session<A>, round: Round, pressed: Option<Slot>) {
        s.arb.clear_all();
        s.arb.set_slot_color(round.target, self.config.palette[round.color]);
        for slot in self.matching_slots().iter() {
            s.arb.set_slot_color(slot, Rgb::GREEN);
        }
        if let Some(slot) = pressed {
            s.arb.set_slot_color(slot, Rgb::RED);
        }
        play_cue(&mut s.arb, Cue::Wrong);
    }
}

impl MiniGame for ColorCycleMatch {
    const KIND: GameKind = GameKind::ColorCycleMatch;

    fn prepare<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        let len = self.config.palette.len() as u32;
        for offset in &mut self.offset {
            *offset = s.rng.next_range(len) as usize;
        }
        self.base = [0; SLOT_COUNT];
    }

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.new_round(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        let Some(mut round) = self.round else {
            return Step::Continue;
        };

        if round.timer.expired(now) {
            self.reveal(s, round, None);
            s.arb.draw_text(Region::Center, "Time's up!");
            return Step::fail(EndReason::Timeout {
                expected: Expected::Color(round.color),
            });
        }

        let mut stepped = false;
        while now - round.last_cycle >= self.cycle_interval {
            round.last_cycle += self.cycle_interval;
            self.cycle(round.target);
            stepped = true;
        }
        self.round = Some(round);
        if stepped {
            self.draw_keys(s);
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        let Some(round) = self.round else {
            return Step::Continue;
        };

        if slot == round.target || self.resolved_color(slot) != round.color {
            self.reveal(s, round, Some(slot));
            s.arb.draw_text(Region::Center, "Wrong key!");
            return Step::fail(EndReason::WrongKey {
                pressed: slot,
                expected: Expected::Color(round.color),
            });
        }

        s.add_score(self.config.points_per_match);
        self.cycle_interval = decayed(
            self.cycle_interval,
            self.config.cycle_factor,
            self.config.min_cycle_interval,
        );
        play_cue(&mut s.arb, Cue::Correct);
        self.new_round(s, now);
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        if self.round.is_some() {
            self.draw(s);
        }
    }

    fn shift(&mut self, dt: f64) {
        if let Some(round) = &mut self.round {
            round.timer.shift(dt);
            round.last_cycle += dt;
        }
    }

    fn phase(&self) -> Phase {
        match self.round {
            Some(_) => Phase::AwaitingInput,
            None => Phase::Idle,
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

    type Cycle = Machine<ColorCycleMatch, RecordingArbiter>;

    fn machine(seed: u32) -> Cycle {
        Machine::new(
            ColorCycleMatch::new(ColorCycleConfig::default()),
            RecordingArbiter::new(),
            seed,
        )
        .with_intro_secs(0.0)
    }

    /// Tick until some non-target key matches; returns it.
    fn wait_for_match(m: &mut Cycle, now: &mut f64) -> Slot {
        for _ in 0..1000 {
            if let Some(slot) = m.game().matching_slots().iter().next() {
                return slot;
            }
            *now += 0.05;
            assert_eq!(m.tick(*now), Control::Continue);
        }
        panic!("no match appeared");
    }

    #[test]
    fn test_target_is_pinned_while_others_cycle() {
        let mut m = machine(12);
        m.start(0.0);
        let target = m.game().target().unwrap();
        let color = m.game().target_color().unwrap();
        let other = Slot::ALL[(target.index() + 1) % 12];
        let before = m.game().resolved_color(other);

        m.tick(0.8);
        assert_eq!(m.game().resolved_color(target), color);
        assert_eq!(m.game().resolved_color(other), (before + 1) % 6);

        // Same instant again: nothing moves.
        m.tick(0.8);
        assert_eq!(m.game().resolved_color(other), (before + 1) % 6);
    }

    #[test]
    fn test_match_scores_and_speeds_up() {
        let mut m = machine(3);
        m.start(0.0);
        let mut now = 0.0;
        let hit = wait_for_match(&mut m, &mut now);
        // Same instant, so the colors cannot move before the press lands.
        m.on_key(KeyEvent::press(hit));
        m.tick(now);

        assert_eq!(m.current_score(), 10);
        assert!((m.game().cycle_interval() - 0.72).abs() < 1e-9);
        assert_eq!(m.level(), 2);
    }

    #[test]
    fn test_targets_may_repeat_across_rounds() {
        // Uniform over all twelve keys, so across enough rounds the same
        // key comes up twice in a row.
        let mut repeats = 0;
        for seed in 1..6 {
            let mut m = machine(seed);
            m.start(0.0);
            let mut now = 0.0;
            for round in 1..=40 {
                let previous = m.game().target();
                let hit = wait_for_match(&mut m, &mut now);
                m.on_key(KeyEvent::press(hit));
                m.tick(now);
                assert_eq!(m.level(), round + 1);
                if m.game().target() == previous {
                    repeats += 1;
                }
            }
        }
        assert!(repeats > 0);
    }

    #[test]
    fn test_match_is_always_reachable_before_timeout() {
        for seed in 1..20 {
            let mut m = machine(seed);
            m.start(0.0);
            let mut now = 0.0;
            let slot = wait_for_match(&mut m, &mut now);
            assert!(now < 6.0, "seed {seed}: first match at {now}");
            assert_ne!(Some(slot), m.game().target());
        }
    }

    #[test]
    fn test_pressing_target_is_wrong() {
        let mut m = machine(8);
        m.start(0.0);
        let target = m.game().target().unwrap();
        let color = m.game().target_color().unwrap();
        m.on_key(KeyEvent::press(target));
        m.tick(0.1);
        match m.tick(2.0) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::WrongKey {
                    pressed: target,
                    expected: Expected::Color(color)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_round_timeout_reports_color() {
        let mut m = machine(8);
        m.start(0.0);
        let color = m.game().target_color().unwrap();
        m.tick(6.0);
        assert_eq!(m.phase(), Phase::Resolving);
        match m.tick(7.0) {
            Control::Terminate(outcome) => assert_eq!(
                outcome.reason,
                EndReason::Timeout {
                    expected: Expected::Color(color)
                }
            ),
            other => panic!("expected terminate, got {:?}", other),
        }
    }
}
