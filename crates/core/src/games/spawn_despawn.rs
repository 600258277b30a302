//! SpawnDespawn: whack targets before they vanish, against a fixed clock.
//!
//! Live targets sit in a fixed array indexed by slot. Difficulty is a pure
//! function of elapsed time and is recomputed on every tick, so spawn
//! interval and visibility always match the clock, including after a pause.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::SpawnDespawnConfig;
use crate::cue::{play_cue, play_key_tone, Cue};
use crate::game::GameKind;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::scoring::{difficulty_level, stepped_down};
use crate::timer::RoundTimer;
use crate::types::{Rgb, Slot, SlotSet, REVEAL_SECS, SLOT_COUNT};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Challenge {
    occupied: bool,
    spawned_at: f64,
}

/// Per-session tallies, reported alongside the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnStats {
    pub spawned: u32,
    pub hits: u32,
    /// Targets that timed out untouched.
    pub expired: u32,
    /// Presses on empty keys; the only misses that cost points.
    pub wrong_presses: u32,
}

#[derive(Debug, Clone)]
pub struct SpawnDespawn {
    config: SpawnDespawnConfig,
    clock: Option<RoundTimer>,
    challenges: [Challenge; SLOT_COUNT],
    active: usize,
    last_spawn: f64,
    visible: f64,
    spawn_interval: f64,
    stats: SpawnStats,
    hud_secs: Option<u32>,
}

impl SpawnDespawn {
    pub fn new(config: SpawnDespawnConfig) -> Self {
        Self {
            visible: config.initial_visible,
            spawn_interval: config.initial_spawn_interval,
            config,
            clock: None,
            challenges: [Challenge::default(); SLOT_COUNT],
            active: 0,
            last_spawn: 0.0,
            stats: SpawnStats::default(),
            hud_secs: None,
        }
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn active_slots(&self) -> SlotSet {
        Slot::ALL
            .into_iter()
            .filter(|s| self.challenges[s.index()].occupied)
            .collect()
    }

    pub fn stats(&self) -> SpawnStats {
        self.stats
    }

    pub fn visible_time(&self) -> f64 {
        self.visible
    }

    pub fn spawn_interval(&self) -> f64 {
        self.spawn_interval
    }

    pub fn remaining(&self, now: f64) -> f64 {
        self.clock.map_or(self.config.duration, |c| c.remaining(now))
    }

    fn recompute_difficulty<A: ResourceArbiter>(&mut self, s: &mut Session<A>, elapsed: f64) {
        let cfg = &self.config;
        let level = difficulty_level(elapsed, cfg.difficulty_step_secs);
        self.visible = stepped_down(cfg.initial_visible, cfg.visible_step, level, cfg.min_visible);
        self.spawn_interval = stepped_down(
            cfg.initial_spawn_interval,
            cfg.spawn_interval_step,
            level,
            cfg.min_spawn_interval,
        );
        if s.level != level + 1 {
            s.level = level + 1;
            debug!(
                "spawn despawn: difficulty {} visible {:.2}s interval {:.2}s",
                s.level, self.visible, self.spawn_interval
            );
        }
    }

    fn remove(&mut self, slot: Slot) -> bool {
        let entry = &mut self.challenges[slot.index()];
        if !entry.occupied {
            return false;
        }
        entry.occupied = false;
        self.active -= 1;
        true
    }

    fn expire<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        for slot in Slot::ALL {
            let entry = self.challenges[slot.index()];
            if entry.occupied && now - entry.spawned_at >= self.visible && self.remove(slot) {
                self.stats.expired += 1;
                s.arb.set_slot_color(slot, Rgb::OFF);
            }
        }
    }

    fn spawn<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.last_spawn = now;
        for _ in 0..self.config.spawn_batch {
            if self.active >= self.config.max_simultaneous {
                debug!("spawn despawn: {} targets live, skipping spawn", self.active);
                return;
            }
            let free = self.active_slots().complement();
            let Some(slot) = s.rng.choose_slot(free) else {
                return;
            };
            self.challenges[slot.index()] = Challenge {
                occupied: true,
                spawned_at: now,
            };
            self.active += 1;
            self.stats.spawned += 1;
            s.arb.set_slot_color(slot, self.config.target_color);
        }
    }

    fn draw_hud<A: ResourceArbiter>(&self, s: &mut Session<A>, secs: u32) {
        s.arb.draw_text(Region::Header, &format!("Time: {secs}"));
        s.arb.draw_text(Region::Center, &format!("Hits: {}", self.stats.hits));
        s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
    }

    fn refresh_hud<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        let secs = self.remaining(now).ceil() as u32;
        if self.hud_secs != Some(secs) {
            self.hud_secs = Some(secs);
            self.draw_hud(s, secs);
        }
    }
}

impl MiniGame for SpawnDespawn {
    const KIND: GameKind = GameKind::SpawnDespawn;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        self.clock = Some(RoundTimer::start(now, self.config.duration));
        self.recompute_difficulty(s, 0.0);
        self.refresh_hud(s, now);
        self.spawn(s, now);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        let Some(clock) = self.clock else {
            return Step::Continue;
        };

        if clock.expired(now) {
            // Targets still up when time runs out count as missed.
            for slot in Slot::ALL {
                if self.remove(slot) {
                    self.stats.expired += 1;
                }
            }
            s.arb.clear_all();
            s.arb.clear_display();
            s.arb.draw_text(Region::Header, "TIME'S UP!");
            s.arb.draw_text(
                Region::Center,
                &format!("Hits: {}  Missed: {}", self.stats.hits, self.stats.expired),
            );
            s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
            play_cue(&mut s.arb, Cue::GameOver);
            return Step::Finish {
                reason: EndReason::TimeUp,
                linger: REVEAL_SECS,
            };
        }

        self.recompute_difficulty(s, clock.elapsed(now));
        self.expire(s, now);
        if now - self.last_spawn >= self.spawn_interval {
            self.spawn(s, now);
        }
        self.refresh_hud(s, now);
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, _now: f64) -> Step {
        if self.clock.is_none() {
            return Step::Continue;
        }

        if self.remove(slot) {
            self.stats.hits += 1;
            s.add_score(self.config.hit_points);
            s.arb.set_slot_color(slot, Rgb::OFF);
            play_key_tone(&mut s.arb, slot);
        } else {
            self.stats.wrong_presses += 1;
            s.penalize(self.config.miss_penalty);
            play_cue(&mut s.arb, Cue::Wrong);
        }

        if let Some(secs) = self.hud_secs {
            self.draw_hud(s, secs);
        }
        Step::Continue
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) {
        for slot in self.active_slots().iter() {
            s.arb.set_slot_color(slot, self.config.target_color);
        }
        self.hud_secs = None;
        self.refresh_hud(s, now);
    }

    fn shift(&mut self, dt: f64) {
        if let Some(clock) = &mut self.clock {
            clock.shift(dt);
        }
        self.last_spawn += dt;
        for entry in self.challenges.iter_mut().filter(|c| c.occupied) {
            entry.spawned_at += dt;
        }
    }

    fn phase(&self) -> Phase {
        if self.clock.is_some() {
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
    use crate::types::KeyEvent;

    type Whack = Machine<SpawnDespawn, RecordingArbiter>;

    fn machine(config: SpawnDespawnConfig, seed: u32) -> Whack {
        Machine::new(SpawnDespawn::new(config), RecordingArbiter::new(), seed).with_intro_secs(0.0)
    }

    #[test]
    fn test_hit_scores_and_clears_slot() {
        let mut m = machine(SpawnDespawnConfig::default(), 4);
        m.start(0.0);
        let target = m.game().active_slots().iter().next().unwrap();
        assert!(!m.arbiter().led(target).is_off());

        m.on_key(KeyEvent::press(target));
        m.tick(0.1);
        assert_eq!(m.current_score(), 10);
        assert!(m.arbiter().led(target).is_off());
        assert_eq!(m.game().stats().hits, 1);
    }

    #[test]
    fn test_wrong_press_never_goes_negative() {
        let mut m = machine(SpawnDespawnConfig::default(), 4);
        m.start(0.0);
        let empty = m.game().active_slots().complement().iter().next().unwrap();
        m.on_key(KeyEvent::press(empty));
        m.tick(0.1);
        assert_eq!(m.current_score(), 0);
        assert_eq!(m.game().stats().wrong_presses, 1);
        assert_eq!(m.game().stats().expired, 0);
    }

    #[test]
    fn test_untouched_target_expires_as_miss() {
        let mut m = machine(SpawnDespawnConfig::default(), 4);
        m.start(0.0);
        m.tick(1.5);
        assert_eq!(m.game().stats().expired, 1);
        assert_eq!(m.current_score(), 0);
    }

    #[test]
    fn test_capacity_and_single_removal_hold_throughout() {
        let config = SpawnDespawnConfig {
            spawn_batch: 3,
            initial_spawn_interval: 0.3,
            ..SpawnDespawnConfig::default()
        };
        let max = config.max_simultaneous;
        let mut m = machine(config, 17);
        m.start(0.0);

        let mut now = 0.0;
        let mut presses = 0u32;
        while now < 29.9 {
            now += 0.02;
            presses += 1;
            if presses % 7 == 0 {
                m.on_key(KeyEvent::press(Slot::ALL[(presses % 12) as usize]));
            }
            assert_eq!(m.tick(now), Control::Continue);
            let game = m.game();
            assert!(game.active_count() <= max);
            assert_eq!(game.active_slots().len(), game.active_count());
            let stats = game.stats();
            assert_eq!(
                stats.spawned,
                stats.hits + stats.expired + game.active_count() as u32
            );
        }
    }

    #[test]
    fn test_every_spawn_is_settled_by_time_up() {
        let mut m = machine(SpawnDespawnConfig::default(), 23);
        m.start(0.0);
        let mut now = 0.0;
        let mut ticks = 0u32;
        while m.phase() != Phase::Resolving {
            now += 0.02;
            ticks += 1;
            if ticks % 11 == 0 {
                if let Some(slot) = m.game().active_slots().iter().next() {
                    m.on_key(KeyEvent::press(slot));
                }
            }
            m.tick(now);
        }
        assert!(now >= 30.0);
        let stats = m.game().stats();
        assert_eq!(m.game().active_count(), 0);
        assert!(stats.hits > 0);
        assert_eq!(stats.spawned, stats.hits + stats.expired);
    }

    #[test]
    fn test_difficulty_tracks_elapsed_time() {
        let mut m = machine(SpawnDespawnConfig::default(), 1);
        m.start(0.0);
        m.tick(4.9);
        assert_eq!(m.game().visible_time(), 1.5);
        m.tick(10.0);
        assert!((m.game().visible_time() - 1.2).abs() < 1e-9);
        assert!((m.game().spawn_interval() - 0.8).abs() < 1e-9);
        m.tick(29.0);
        assert!((m.game().visible_time() - 0.75).abs() < 1e-9);
        assert!((m.game().spawn_interval() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_time_budget_ends_session() {
        let mut m = machine(SpawnDespawnConfig::default(), 2);
        m.start(0.0);
        assert_eq!(m.tick(29.99), Control::Continue);
        assert_eq!(m.tick(30.0), Control::Continue);
        assert_eq!(m.phase(), Phase::Resolving);
        match m.tick(31.5) {
            Control::Terminate(outcome) => assert_eq!(outcome.reason, EndReason::TimeUp),
            other => panic!("expected terminate, got {:?}", other),
        }
        assert!(m.arbiter().is_clean());
    }

    #[test]
    fn test_pause_keeps_live_targets() {
        let mut m = machine(SpawnDespawnConfig::default(), 6);
        m.start(0.0);
        let live = m.game().active_slots();
        m.suspend(0.5);
        assert_eq!(m.arbiter().lit_count(), 0);
        m.resume(20.5);
        assert_eq!(m.game().active_slots(), live);
        assert!((m.game().remaining(20.5) - 29.5).abs() < 1e-9);
        for slot in live.iter() {
            assert!(!m.arbiter().led(slot).is_off());
        }
    }
}
