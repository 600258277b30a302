//! The lifecycle contract shared by every mini-game.
//!
//! [`GameStateMachine`] is what the host sees. [`Machine`] implements it once
//! for any [`MiniGame`], owning everything the games have in common: the
//! arbiter handle, the RNG, score and high score, the intro countdown,
//! buffered input, suspend/resume and the terminal transition with its
//! cleanup. A `MiniGame` only supplies the round rules.
//!
//! # Tick order
//!
//! Each `tick(now)` runs, in order:
//!
//! 1. the game's time-driven update (`advance`), so a timeout landing on the
//!    same tick as a key press wins
//! 2. at most one buffered key press
//! 3. at most one buffered encoder event
//!
//! `tick` is the only place time is read, and calling it twice with the
//! same `now` changes nothing the second time.

use arrayvec::ArrayVec;
use log::{debug, info, warn};

use crate::arbiter::{Region, ResourceArbiter};
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::rng::SimpleRng;
use crate::types::{EncoderEvent, KeyEvent, Slot, SlotSet, INTRO_SECS, REVEAL_SECS};

/// Pending key presses (and encoder events) kept between ticks.
pub const INPUT_QUEUE_LEN: usize = 4;

/// Coarse lifecycle state reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Showing,
    AwaitingInput,
    Resolving,
    Suspended,
    Terminal,
}

/// What the player should have done, for failure screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Slot(Slot),
    /// Palette index of the color to match.
    Color(usize),
    Slots(SlotSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    WrongKey { pressed: Slot, expected: Expected },
    Timeout { expected: Expected },
    /// The session's time budget ran out.
    TimeUp,
    /// The player left through the encoder.
    Quit,
    /// Every round was played; the score rates the whole run.
    Completed,
    /// Still holding the hot potato at `at` when it went off.
    Caught { at: Slot },
}

impl EndReason {
    pub fn headline(&self) -> &'static str {
        match self {
            EndReason::WrongKey { .. } => "Wrong key!",
            EndReason::Timeout { .. } | EndReason::TimeUp => "Time's up!",
            EndReason::Quit => "Quit",
            EndReason::Completed => "Finished!",
            EndReason::Caught { .. } => "BOOM!",
        }
    }
}

/// Final report of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub kind: GameKind,
    pub reason: EndReason,
    pub score: u32,
    pub high_score: u32,
    pub new_high_score: bool,
    pub level: u32,
}

/// Signal returned by every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Suspend,
    Terminate(Outcome),
}

/// Result of a game hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Continue,
    /// End the session after showing feedback for `linger` seconds.
    Finish { reason: EndReason, linger: f64 },
}

impl Step {
    /// End with the standard failure reveal.
    pub fn fail(reason: EndReason) -> Self {
        Step::Finish {
            reason,
            linger: REVEAL_SECS,
        }
    }
}

/// The host-facing contract.
pub trait GameStateMachine {
    type Arbiter: ResourceArbiter;

    fn kind(&self) -> GameKind;

    /// Idle -> intro countdown (or straight into the first round).
    fn start(&mut self, now: f64);

    fn tick(&mut self, now: f64) -> Control;

    /// Buffer a key transition; consumed by the next tick.
    fn on_key(&mut self, event: KeyEvent);

    /// Buffer an encoder event; consumed by the next tick.
    fn on_encoder(&mut self, event: EncoderEvent);

    /// Back to Idle with a zero score. The high score is kept.
    fn reset(&mut self);

    /// Freeze round timers, keeping the current challenge.
    fn suspend(&mut self, now: f64);

    /// Continue with the time that was left at `suspend`.
    fn resume(&mut self, now: f64);

    fn current_score(&self) -> u32;

    fn high_score(&self) -> u32;

    fn level(&self) -> u32;

    fn phase(&self) -> Phase;

    fn is_terminal(&self) -> bool {
        self.phase() == Phase::Terminal
    }

    fn arbiter(&self) -> &Self::Arbiter;

    /// Clear every output and hand the arbiter back.
    fn release(self) -> Self::Arbiter
    where
        Self: Sized;
}

/// State a game shares with the lifecycle driver.
#[derive(Debug)]
pub struct Session<A> {
    pub arb: A,
    pub rng: SimpleRng,
    pub score: u32,
    pub level: u32,
    high_score: u32,
}

impl<A: ResourceArbiter> Session<A> {
    pub fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Replace the score outright, for games that rate the whole session.
    pub fn set_score(&mut self, points: u32) {
        self.score = points;
    }

    /// Subtract, stopping at zero.
    pub fn penalize(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn blank(&mut self) {
        self.arb.clear_all();
        self.arb.clear_display();
    }
}

/// Rules of one mini-game, driven by [`Machine`].
///
/// Hooks receive the shared [`Session`] and the tick's `now`.
pub trait MiniGame {
    const KIND: GameKind;

    /// Once per session, before the intro. Also the place for
    /// session-scoped randomness.
    fn prepare<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _now: f64) {}

    /// First round, when the intro ends.
    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64);

    /// Time-driven update: timeouts, animation deadlines, spawns.
    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step;

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step;

    fn rotate<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _delta: i32, _now: f64) -> Step {
        Step::Continue
    }

    /// `None` lets the driver treat the press as a pause request.
    fn encoder_press<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _now: f64) -> Option<Step> {
        None
    }

    /// Repaint the current challenge after a pause.
    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64);

    /// Push every stored timestamp `dt` seconds later.
    fn shift(&mut self, dt: f64);

    fn phase(&self) -> Phase;

    /// Forget all round and difficulty state.
    fn reset(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Intro { until: f64, shown: u32 },
    Running,
    Resolving { until: f64, reason: EndReason },
    Terminal(Outcome),
}

/// Lifecycle driver around a [`MiniGame`].
#[derive(Debug)]
pub struct Machine<G, A> {
    game: G,
    session: Session<A>,
    stage: Stage,
    suspended_since: Option<f64>,
    keys: ArrayVec<Slot, INPUT_QUEUE_LEN>,
    encoder: ArrayVec<EncoderEvent, INPUT_QUEUE_LEN>,
    intro_secs: f64,
}

impl<G: MiniGame, A: ResourceArbiter> Machine<G, A> {
    pub fn new(game: G, arb: A, seed: u32) -> Self {
        Self {
            game,
            session: Session {
                arb,
                rng: SimpleRng::new(seed),
                score: 0,
                level: 0,
                high_score: 0,
            },
            stage: Stage::Idle,
            suspended_since: None,
            keys: ArrayVec::new(),
            encoder: ArrayVec::new(),
            intro_secs: INTRO_SECS,
        }
    }

    /// Best score so far, as loaded by the host.
    pub fn with_high_score(mut self, high_score: u32) -> Self {
        self.session.high_score = high_score;
        self
    }

    /// Countdown length; zero starts the first round inside `start`.
    pub fn with_intro_secs(mut self, secs: f64) -> Self {
        self.intro_secs = secs.max(0.0);
        self
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    /// Outcome once terminal.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.stage {
            Stage::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    fn draw_countdown(&mut self, remaining: u32) {
        let arb = &mut self.session.arb;
        arb.clear_display();
        arb.draw_text(Region::Header, G::KIND.name());
        arb.draw_text(Region::Center, &remaining.to_string());
        play_cue(arb, Cue::Countdown);
    }

    fn enter_round(&mut self, now: f64) {
        self.stage = Stage::Running;
        self.session.blank();
        play_cue(&mut self.session.arb, Cue::Select);
        debug!("{}: first round at {now:.3}", G::KIND.name());
        self.game.begin(&mut self.session, now);
    }

    fn tick_intro(&mut self, now: f64, until: f64, shown: u32) -> Control {
        // Keys are not meaningful during the countdown.
        self.pop_key();
        if let Some(EncoderEvent::Press) = self.pop_encoder() {
            self.suspend(now);
            return Control::Suspend;
        }

        if now >= until {
            self.enter_round(now);
            return Control::Continue;
        }

        let remaining = (until - now).ceil() as u32;
        if remaining != shown {
            self.draw_countdown(remaining);
            self.stage = Stage::Intro {
                until,
                shown: remaining,
            };
        }
        Control::Continue
    }

    fn tick_running(&mut self, now: f64) -> Control {
        let mut step = self.game.advance(&mut self.session, now);

        if step == Step::Continue {
            if let Some(slot) = self.pop_key() {
                step = self.game.press(&mut self.session, slot, now);
            }
        }

        if step == Step::Continue {
            match self.pop_encoder() {
                Some(EncoderEvent::Press) => match self.game.encoder_press(&mut self.session, now) {
                    Some(game_step) => step = game_step,
                    None => {
                        self.suspend(now);
                        return Control::Suspend;
                    }
                },
                Some(EncoderEvent::Rotate(delta)) => {
                    step = self.game.rotate(&mut self.session, delta, now);
                }
                None => {}
            }
        }

        match step {
            Step::Continue => Control::Continue,
            Step::Finish { reason, linger } => self.finish(reason, linger, now),
        }
    }

    fn tick_suspended(&mut self, now: f64) -> Control {
        if let Some(EncoderEvent::Press) = self.pop_encoder() {
            self.suspended_since = None;
            return self.finalize(EndReason::Quit);
        }
        if self.pop_key().is_some() {
            self.resume(now);
            return Control::Continue;
        }
        Control::Suspend
    }

    fn finish(&mut self, reason: EndReason, linger: f64, now: f64) -> Control {
        debug!("{}: finishing with {:?}", G::KIND.name(), reason);
        if linger <= 0.0 {
            return self.finalize(reason);
        }
        self.stage = Stage::Resolving {
            until: now + linger,
            reason,
        };
        Control::Continue
    }

    fn finalize(&mut self, reason: EndReason) -> Control {
        let score = self.session.score;
        let new_high_score = score > self.session.high_score;
        if new_high_score {
            info!(
                "{}: new high score {} (was {})",
                G::KIND.name(),
                score,
                self.session.high_score
            );
            self.session.high_score = score;
        }

        self.session.blank();
        self.keys.clear();
        self.encoder.clear();

        let outcome = Outcome {
            kind: G::KIND,
            reason,
            score,
            high_score: self.session.high_score,
            new_high_score,
            level: self.session.level,
        };
        info!(
            "{}: game over ({}) score={} level={}",
            G::KIND.name(),
            reason.headline(),
            score,
            outcome.level
        );
        self.stage = Stage::Terminal(outcome);
        Control::Terminate(outcome)
    }

    fn pop_key(&mut self) -> Option<Slot> {
        self.keys.pop_at(0)
    }

    fn pop_encoder(&mut self) -> Option<EncoderEvent> {
        self.encoder.pop_at(0)
    }

    fn accepts_input(&self) -> bool {
        !matches!(self.stage, Stage::Idle | Stage::Terminal(_))
    }
}

impl<G: MiniGame, A: ResourceArbiter> GameStateMachine for Machine<G, A> {
    type Arbiter = A;

    fn kind(&self) -> GameKind {
        G::KIND
    }

    fn start(&mut self, now: f64) {
        if self.stage != Stage::Idle {
            return;
        }
        info!("{}: start (high score {})", G::KIND.name(), self.session.high_score);
        self.session.blank();
        self.session.arb.draw_text(Region::Header, G::KIND.name());
        self.game.prepare(&mut self.session, now);

        if self.intro_secs > 0.0 {
            self.stage = Stage::Intro {
                until: now + self.intro_secs,
                shown: 0,
            };
        } else {
            self.enter_round(now);
        }
    }

    fn tick(&mut self, now: f64) -> Control {
        if let Stage::Terminal(outcome) = self.stage {
            return Control::Terminate(outcome);
        }
        if self.suspended_since.is_some() {
            return self.tick_suspended(now);
        }

        match self.stage {
            Stage::Idle => Control::Continue,
            Stage::Intro { until, shown } => self.tick_intro(now, until, shown),
            Stage::Running => self.tick_running(now),
            Stage::Resolving { until, reason } => {
                self.keys.clear();
                self.encoder.clear();
                if now >= until {
                    self.finalize(reason)
                } else {
                    Control::Continue
                }
            }
            Stage::Terminal(outcome) => Control::Terminate(outcome),
        }
    }

    fn on_key(&mut self, event: KeyEvent) {
        if !event.pressed || !self.accepts_input() {
            return;
        }
        if self.keys.try_push(event.slot).is_err() {
            warn!("{}: key queue full, dropping {:?}", G::KIND.name(), event.slot);
        }
    }

    fn on_encoder(&mut self, event: EncoderEvent) {
        if event == EncoderEvent::Rotate(0) || !self.accepts_input() {
            return;
        }
        if self.encoder.try_push(event).is_err() {
            warn!("{}: encoder queue full, dropping {:?}", G::KIND.name(), event);
        }
    }

    fn reset(&mut self) {
        self.game.reset();
        self.session.score = 0;
        self.session.level = 0;
        self.session.blank();
        self.keys.clear();
        self.encoder.clear();
        self.suspended_since = None;
        self.stage = Stage::Idle;
    }

    fn suspend(&mut self, now: f64) {
        if self.suspended_since.is_some()
            || !matches!(self.stage, Stage::Intro { .. } | Stage::Running)
        {
            return;
        }
        debug!("{}: suspended at {now:.3}", G::KIND.name());
        self.suspended_since = Some(now);
        self.keys.clear();
        self.encoder.clear();

        let arb = &mut self.session.arb;
        arb.clear_all();
        arb.clear_display();
        arb.draw_text(Region::Header, "PAUSED");
        arb.draw_text(Region::Center, "Key: resume");
        arb.draw_text(Region::Footer, "Push: quit");
    }

    fn resume(&mut self, now: f64) {
        let Some(since) = self.suspended_since.take() else {
            return;
        };
        let dt = (now - since).max(0.0);
        debug!("{}: resumed after {dt:.3}s", G::KIND.name());
        self.keys.clear();
        self.encoder.clear();

        match self.stage {
            Stage::Intro { until, .. } => {
                self.session.blank();
                self.session.arb.draw_text(Region::Header, G::KIND.name());
                self.stage = Stage::Intro {
                    until: until + dt,
                    shown: 0,
                };
            }
            Stage::Running => {
                self.game.shift(dt);
                self.session.blank();
                self.game.redraw(&mut self.session, now);
            }
            _ => {}
        }
    }

    fn current_score(&self) -> u32 {
        self.session.score
    }

    fn high_score(&self) -> u32 {
        self.session.high_score
    }

    fn level(&self) -> u32 {
        self.session.level
    }

    fn phase(&self) -> Phase {
        if self.suspended_since.is_some() {
            return Phase::Suspended;
        }
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Intro { .. } => Phase::Showing,
            Stage::Running => self.game.phase(),
            Stage::Resolving { .. } => Phase::Resolving,
            Stage::Terminal(_) => Phase::Terminal,
        }
    }

    fn arbiter(&self) -> &A {
        &self.session.arb
    }

    fn release(mut self) -> A {
        self.session.blank();
        self.session.arb
    }
}
