//! TogglePuzzle (Lights Out): turn every key off.
//!
//! Puzzles are built backwards from the solved grid with random presses, so
//! replaying the scramble always solves them. After a solve the player picks
//! between the next level (any key) and ending the session (encoder press).
//! Turning the encoder counter-clockwise undoes the last press.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::TogglePuzzleConfig;
use crate::cue::{play_cue, play_key_tone, Cue};
use crate::game::GameKind;
use crate::grid::LightGrid;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::rng::SimpleRng;
use crate::scoring::toggle_points;
use crate::types::{Rgb, Slot};

const LIT_COLOR: Rgb = Rgb::YELLOW;

/// Scramble an all-off grid with `moves` uniformly random presses.
///
/// Repeats are allowed. If the presses cancel out, more are added until at
/// least one light is on. Returns the grid and every press applied.
pub fn scramble(rng: &mut SimpleRng, moves: u32) -> (LightGrid, Vec<Slot>) {
    let mut grid = LightGrid::new();
    let mut presses = Vec::with_capacity(moves as usize + 1);
    for _ in 0..moves {
        let slot = rng.choose(&Slot::ALL);
        grid.toggle(slot);
        presses.push(slot);
    }
    while grid.is_solved() {
        let slot = rng.choose(&Slot::ALL);
        grid.toggle(slot);
        presses.push(slot);
    }
    (grid, presses)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Solving,
    Solved { until: f64 },
    /// Key for the next level, encoder press to stop.
    Choosing,
}

#[derive(Debug, Clone)]
pub struct TogglePuzzle {
    config: TogglePuzzleConfig,
    random_moves: u32,
    grid: LightGrid,
    scramble: Vec<Slot>,
    history: Vec<Slot>,
    moves: u32,
    stage: Stage,
}

impl TogglePuzzle {
    pub fn new(config: TogglePuzzleConfig) -> Self {
        Self {
            random_moves: config.initial_random_moves,
            config,
            grid: LightGrid::new(),
            scramble: Vec::new(),
            history: Vec::new(),
            moves: 0,
            stage: Stage::Idle,
        }
    }

    pub fn grid(&self) -> LightGrid {
        self.grid
    }

    /// Presses that generated the current puzzle.
    pub fn scramble_moves(&self) -> &[Slot] {
        &self.scramble
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Scramble length for the current (or next) puzzle.
    pub fn random_moves(&self) -> u32 {
        self.random_moves
    }

    fn new_puzzle<A: ResourceArbiter>(&mut self, s: &mut Session<A>) {
        let (grid, presses) = scramble(&mut s.rng, self.random_moves);
        self.grid = grid;
        self.scramble = presses;
        self.history.clear();
        self.moves = 0;
        self.stage = Stage::Solving;
        s.level += 1;
        debug!(
            "toggle puzzle level {}: {} scramble presses, {} lit",
            s.level,
            self.scramble.len(),
            grid.lit_count()
        );
        self.draw(s);
    }

    fn draw_grid<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        for slot in Slot::ALL {
            let color = if self.grid.is_lit(slot) {
                LIT_COLOR
            } else {
                Rgb::OFF
            };
            s.arb.set_slot_color(slot, color);
        }
        s.arb.draw_text(
            Region::HeaderRight,
            &format!("Lit: {}", self.grid.lit_count()),
        );
        s.arb.draw_text(Region::Footer, &format!("Moves: {}", self.moves));
    }

    fn draw<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, &format!("Level: {}", s.level));
        match self.stage {
            Stage::Solving => {
                s.arb.draw_text(Region::Center, "Lights out!");
                self.draw_grid(s);
            }
            Stage::Solved { .. } => {
                s.arb.set_all(Rgb::GREEN);
                s.arb.draw_text(Region::Center, "SOLVED!");
                s.arb.draw_text(Region::Footer, &format!("Score: {}", s.score));
            }
            Stage::Choosing => {
                s.arb.clear_all();
                s.arb.draw_text(Region::Center, "Key: next level");
                s.arb.draw_text(Region::Footer, "Push: end");
            }
            Stage::Idle => {}
        }
    }

    fn apply<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) {
        self.grid.toggle(slot);
        self.moves += 1;
        self.draw_grid(s);

        if self.grid.is_solved() {
            let points = toggle_points(self.config.base_score, self.moves, s.level);
            s.set_score(points);
            debug!(
                "toggle puzzle level {} solved in {} moves: score {points}",
                s.level, self.moves
            );
            self.random_moves = (self.random_moves + 1).min(self.config.max_random_moves);
            self.stage = Stage::Solved {
                until: now + self.config.solved_secs,
            };
            play_cue(&mut s.arb, Cue::LevelUp);
            self.draw(s);
        }
    }
}

impl MiniGame for TogglePuzzle {
    const KIND: GameKind = GameKind::TogglePuzzle;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.new_puzzle(s);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        if let Stage::Solved { until } = self.stage {
            if now >= until {
                self.stage = Stage::Choosing;
                self.draw(s);
            }
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        match self.stage {
            Stage::Solving => {
                self.history.push(slot);
                play_key_tone(&mut s.arb, slot);
                self.apply(s, slot, now);
            }
            Stage::Choosing => {
                play_cue(&mut s.arb, Cue::Select);
                self.new_puzzle(s);
            }
            Stage::Solved { .. } | Stage::Idle => {}
        }
        Step::Continue
    }

    fn rotate<A: ResourceArbiter>(&mut self, s: &mut Session<A>, delta: i32, now: f64) -> Step {
        if delta < 0 && self.stage == Stage::Solving {
            if let Some(slot) = self.history.pop() {
                debug!("toggle puzzle: undo {}", slot.index());
                self.apply(s, slot, now);
            }
        }
        Step::Continue
    }

    fn encoder_press<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _now: f64) -> Option<Step> {
        match self.stage {
            Stage::Solved { .. } | Stage::Choosing => Some(Step::Finish {
                reason: EndReason::Quit,
                linger: 0.0,
            }),
            Stage::Solving | Stage::Idle => None,
        }
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.draw(s);
    }

    fn shift(&mut self, dt: f64) {
        if let Stage::Solved { until } = &mut self.stage {
            *until += dt;
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Solving | Stage::Choosing => Phase::AwaitingInput,
            Stage::Solved { .. } => Phase::Showing,
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
    use crate::types::{EncoderEvent, KeyEvent, SlotSet};

    type Puzzle = Machine<TogglePuzzle, RecordingArbiter>;

    fn machine(seed: u32) -> Puzzle {
        Machine::new(
            TogglePuzzle::new(TogglePuzzleConfig::default()),
            RecordingArbiter::new(),
            seed,
        )
        .with_intro_secs(0.0)
    }

    /// Slots pressed an odd number of times: pressing each once solves.
    fn odd_presses(presses: &[Slot]) -> SlotSet {
        presses.iter().fold(SlotSet::EMPTY, |acc, &s| {
            acc.symmetric_difference(SlotSet::EMPTY.with(s))
        })
    }

    fn solve(m: &mut Puzzle, now: f64) {
        for slot in odd_presses(m.game().scramble_moves()).iter() {
            m.on_key(KeyEvent::press(slot));
            assert_eq!(m.tick(now), Control::Continue);
        }
    }

    #[test]
    fn test_replaying_scramble_turns_everything_off() {
        for seed in 1..100 {
            let mut rng = SimpleRng::new(seed);
            let (mut grid, presses) = scramble(&mut rng, 5);
            assert!(!grid.is_solved());
            assert!(presses.len() >= 5);
            for &slot in &presses {
                grid.toggle(slot);
            }
            assert!(grid.is_solved(), "seed {seed}");
        }
    }

    #[test]
    fn test_solution_never_longer_than_scramble() {
        for seed in 1..100 {
            let mut rng = SimpleRng::new(seed);
            let (mut grid, presses) = scramble(&mut rng, 5);
            let solution = odd_presses(&presses);
            assert!(solution.len() <= presses.len());
            for slot in solution.iter() {
                grid.toggle(slot);
            }
            assert!(grid.is_solved(), "seed {seed}");
        }
    }

    #[test]
    fn test_start_shows_lit_grid() {
        let mut m = machine(4);
        m.start(0.0);
        let lit = m.game().grid().lit_count();
        assert!(lit > 0);
        assert_eq!(m.arbiter().lit_count(), lit);
        assert_eq!(m.level(), 1);
    }

    #[test]
    fn test_solve_scores_and_raises_difficulty() {
        let mut m = machine(4);
        m.start(0.0);
        solve(&mut m, 0.5);
        let moves = m.game().moves();
        assert!(m.game().grid().is_solved());
        assert_eq!(m.phase(), Phase::Showing);
        assert_eq!(m.current_score(), toggle_points(100, moves, 1));
        assert_eq!(m.game().random_moves(), 6);

        m.tick(2.5);
        assert_eq!(m.phase(), Phase::AwaitingInput);
        m.on_key(KeyEvent::press(Slot::ALL[0]));
        m.tick(2.6);
        assert_eq!(m.level(), 2);
        assert!(m.game().scramble_moves().len() >= 6);
        assert_eq!(m.game().moves(), 0);
    }

    #[test]
    fn test_each_solve_rates_the_session_afresh() {
        let mut m = machine(4);
        m.start(0.0);
        solve(&mut m, 0.5);
        let first = m.current_score();
        assert_eq!(first, toggle_points(100, m.game().moves(), 1));

        m.tick(2.5);
        m.on_key(KeyEvent::press(Slot::ALL[0]));
        m.tick(2.6);
        assert_eq!(m.level(), 2);
        // Until the next solve the previous rating stands.
        assert_eq!(m.current_score(), first);

        solve(&mut m, 3.0);
        assert!(m.game().grid().is_solved());
        let moves = m.game().moves();
        assert_eq!(m.current_score(), toggle_points(100, moves, 2));
        assert_ne!(m.current_score(), first + toggle_points(100, moves, 2));
    }

    #[test]
    fn test_encoder_press_after_solve_ends_session() {
        let mut m = machine(8);
        m.start(0.0);
        solve(&mut m, 0.5);
        let score = m.current_score();
        m.on_encoder(EncoderEvent::Press);
        match m.tick(0.6) {
            Control::Terminate(outcome) => {
                assert_eq!(outcome.reason, EndReason::Quit);
                assert_eq!(outcome.score, score);
                assert!(outcome.new_high_score);
            }
            other => panic!("expected terminate, got {:?}", other),
        }
        assert!(m.arbiter().is_clean());
    }

    #[test]
    fn test_encoder_press_while_solving_pauses() {
        let mut m = machine(8);
        m.start(0.0);
        m.on_encoder(EncoderEvent::Press);
        assert_eq!(m.tick(0.1), Control::Suspend);
        assert_eq!(m.phase(), Phase::Suspended);
    }

    #[test]
    fn test_undo_restores_previous_grid() {
        let mut m = machine(12);
        m.start(0.0);
        let before = m.game().grid();
        let slot = Slot::ALL[4];
        m.on_key(KeyEvent::press(slot));
        m.tick(0.1);
        if m.game().grid().is_solved() {
            return;
        }
        assert_ne!(m.game().grid(), before);

        m.on_encoder(EncoderEvent::Rotate(-1));
        m.tick(0.2);
        assert_eq!(m.game().grid(), before);
        assert_eq!(m.game().moves(), 2);

        // Clockwise and empty-history undo do nothing.
        m.on_encoder(EncoderEvent::Rotate(1));
        m.tick(0.3);
        m.on_encoder(EncoderEvent::Rotate(-1));
        m.tick(0.4);
        assert_eq!(m.game().grid(), before);
    }
}
