//! TicTacToe: two players share the pad, the bottom 3x3 keys are the board.
//!
//! The top row shows whose turn it is. A finished game blinks the winning
//! line (or flashes yellow on a draw), then waits for any key to start the
//! next one. Wins and draws are tallied for the session; nothing is scored.

use log::debug;

use crate::arbiter::{Region, ResourceArbiter};
use crate::config::TicTacToeConfig;
use crate::cue::{play_cue, Cue};
use crate::game::GameKind;
use crate::games::flash::KeyFlash;
use crate::machine::{EndReason, MiniGame, Phase, Session, Step};
use crate::types::{Rgb, Slot};

/// First board key; cells run row by row from here.
const BOARD_OFFSET: usize = 3;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

const BLINK_ON_SECS: f64 = 0.3;
const BLINK_PERIOD_SECS: f64 = 0.5;
const DRAW_PERIOD_SECS: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Red,
    Blue,
}

impl Player {
    fn other(self) -> Self {
        match self {
            Player::Red => Player::Blue,
            Player::Blue => Player::Red,
        }
    }

    fn color(self) -> Rgb {
        match self {
            Player::Red => Rgb::RED,
            Player::Blue => Rgb::BLUE,
        }
    }

    /// Top-row key that shows this player's turn, and its color.
    fn indicator(self) -> (Slot, Rgb) {
        match self {
            Player::Red => (Slot::ALL[0], Rgb::new(255, 50, 50)),
            Player::Blue => (Slot::ALL[2], Rgb::new(50, 50, 255)),
        }
    }

    fn move_tone(self) -> u16 {
        match self {
            Player::Red => 440,
            Player::Blue => 330,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Player::Red => "RED",
            Player::Blue => "BLUE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Turn,
    Won { since: f64, line: [usize; 3] },
    Drawn { since: f64 },
    Over,
}

/// Session tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub red: u32,
    pub blue: u32,
    pub draws: u32,
}

#[derive(Debug, Clone)]
pub struct TicTacToe {
    config: TicTacToeConfig,
    board: [Option<Player>; 9],
    turn: Player,
    tally: Tally,
    flash: KeyFlash,
    stage: Stage,
}

fn cell_of(slot: Slot) -> Option<usize> {
    slot.index().checked_sub(BOARD_OFFSET)
}

fn slot_of(cell: usize) -> Slot {
    Slot::ALL[cell + BOARD_OFFSET]
}

impl TicTacToe {
    pub fn new(config: TicTacToeConfig) -> Self {
        Self {
            config,
            board: [None; 9],
            turn: Player::Red,
            tally: Tally::default(),
            flash: KeyFlash::default(),
            stage: Stage::Idle,
        }
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn cell(&self, cell: usize) -> Option<Player> {
        self.board[cell]
    }

    fn winning_line(&self) -> Option<[usize; 3]> {
        LINES.into_iter().find(|&[a, b, c]| {
            self.board[a].is_some() && self.board[a] == self.board[b] && self.board[b] == self.board[c]
        })
    }

    fn new_game<A: ResourceArbiter>(&mut self, s: &mut Session<A>) {
        s.level += 1;
        self.board = [None; 9];
        self.turn = Player::Red;
        self.flash.clear();
        self.stage = Stage::Turn;
        debug!("tic-tac-toe: game {}", s.level);
        self.draw_board(s);
        self.draw_status(s);
    }

    fn draw_board<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_all();
        for (cell, owner) in self.board.iter().enumerate() {
            let color = owner.map_or(Rgb::DIM, Player::color);
            s.arb.set_slot_color(slot_of(cell), color);
        }
        if self.stage == Stage::Turn {
            let (slot, color) = self.turn.indicator();
            s.arb.set_slot_color(slot, color);
        }
    }

    fn draw_status<A: ResourceArbiter>(&self, s: &mut Session<A>) {
        s.arb.clear_display();
        s.arb.draw_text(Region::Header, "TIC-TAC-TOE");
        if self.stage == Stage::Turn {
            s.arb.draw_text(
                Region::Center,
                &format!("{}'s turn", self.turn.label()),
            );
        }
        s.arb.draw_text(
            Region::Footer,
            &format!(
                "R:{} B:{} D:{}",
                self.tally.red, self.tally.blue, self.tally.draws
            ),
        );
    }

    fn draw_result<A: ResourceArbiter>(&self, s: &mut Session<A>, headline: &str) {
        self.draw_board(s);
        self.draw_status(s);
        s.arb.draw_text(Region::Center, headline);
        s.arb.draw_text(Region::HeaderRight, "Key: again");
    }

    /// Top-row key color when no flash is showing.
    fn top_row_color(&self, slot: Slot) -> Rgb {
        let (indicator, color) = self.turn.indicator();
        if self.stage == Stage::Turn && slot == indicator {
            color
        } else {
            Rgb::OFF
        }
    }

    fn claim<A: ResourceArbiter>(&mut self, s: &mut Session<A>, cell: usize, now: f64) {
        if self.board[cell].is_some() {
            s.arb.play_tone(200, 0.1);
            return;
        }
        let player = self.turn;
        self.board[cell] = Some(player);
        s.arb.play_tone(player.move_tone(), 0.1);

        if let Some(line) = self.winning_line() {
            match player {
                Player::Red => self.tally.red += 1,
                Player::Blue => self.tally.blue += 1,
            }
            debug!("tic-tac-toe: {} wins", player.label());
            play_cue(&mut s.arb, Cue::Correct);
            self.stage = Stage::Won { since: now, line };
            self.draw_board(s);
            return;
        }

        if self.board.iter().all(Option::is_some) {
            self.tally.draws += 1;
            debug!("tic-tac-toe: draw");
            self.stage = Stage::Drawn { since: now };
            s.arb.set_all(Rgb::YELLOW);
            return;
        }

        self.turn = player.other();
        self.draw_board(s);
        self.draw_status(s);
    }

    fn headline(&self) -> String {
        match self.winning_line().and_then(|[a, ..]| self.board[a]) {
            Some(player) => format!("{} WINS!", player.label()),
            None => "DRAW!".to_string(),
        }
    }
}

impl MiniGame for TicTacToe {
    const KIND: GameKind = GameKind::TicTacToe;

    fn begin<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.new_game(s);
    }

    fn advance<A: ResourceArbiter>(&mut self, s: &mut Session<A>, now: f64) -> Step {
        match self.stage {
            Stage::Turn => {
                if let Some(slot) = self.flash.due(now) {
                    s.arb.set_slot_color(slot, self.top_row_color(slot));
                }
            }
            Stage::Won { since, line } => {
                let elapsed = now - since;
                if elapsed >= self.config.win_blink_secs {
                    self.stage = Stage::Over;
                    self.draw_result(s, &self.headline());
                } else if elapsed % BLINK_PERIOD_SECS < BLINK_ON_SECS {
                    for cell in line {
                        s.arb.set_slot_color(slot_of(cell), Rgb::GREEN);
                    }
                } else {
                    self.draw_board(s);
                }
            }
            Stage::Drawn { since } => {
                let elapsed = now - since;
                if elapsed >= self.config.draw_flash_secs {
                    self.stage = Stage::Over;
                    self.draw_result(s, "DRAW!");
                } else if elapsed % DRAW_PERIOD_SECS < DRAW_PERIOD_SECS / 2.0 {
                    s.arb.set_all(Rgb::YELLOW);
                } else {
                    s.arb.clear_all();
                }
            }
            Stage::Idle | Stage::Over => {}
        }
        Step::Continue
    }

    fn press<A: ResourceArbiter>(&mut self, s: &mut Session<A>, slot: Slot, now: f64) -> Step {
        match self.stage {
            Stage::Over => self.new_game(s),
            Stage::Turn => match cell_of(slot) {
                Some(cell) => self.claim(s, cell, now),
                None => {
                    if let Some(previous) = self.flash.start(slot, now) {
                        s.arb.set_slot_color(previous, self.top_row_color(previous));
                    }
                    s.arb.set_slot_color(slot, Rgb::WHITE);
                }
            },
            Stage::Idle | Stage::Won { .. } | Stage::Drawn { .. } => {}
        }
        Step::Continue
    }

    fn encoder_press<A: ResourceArbiter>(&mut self, _s: &mut Session<A>, _now: f64) -> Option<Step> {
        Some(Step::Finish {
            reason: EndReason::Quit,
            linger: 0.0,
        })
    }

    fn redraw<A: ResourceArbiter>(&mut self, s: &mut Session<A>, _now: f64) {
        self.flash.clear();
        match self.stage {
            Stage::Over => self.draw_result(s, &self.headline()),
            Stage::Idle => {}
            _ => {
                self.draw_board(s);
                self.draw_status(s);
            }
        }
    }

    fn shift(&mut self, dt: f64) {
        self.flash.shift(dt);
        match &mut self.stage {
            Stage::Won { since, .. } | Stage::Drawn { since } => *since += dt,
            Stage::Idle | Stage::Turn | Stage::Over => {}
        }
    }

    fn phase(&self) -> Phase {
        match self.stage {
            Stage::Idle => Phase::Idle,
            Stage::Turn | Stage::Over => Phase::AwaitingInput,
            Stage::Won { .. } | Stage::Drawn { .. } => Phase::Showing,
        }
    }

    fn reset(&mut self) {
        *self = Self::new(self.config.clone());
    }
}
