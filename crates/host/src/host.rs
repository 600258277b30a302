//! GameHost: menu, game and results screens around one arbiter.
//!
//! The arbiter has exactly one owner at any time. The host keeps it while
//! the menu or the results screen is shown and moves it into the [`Game`]
//! on launch; [`GameStateMachine::release`] hands it back, blank, when the
//! game terminates.
//!
//! Like the games, the host reads time only through `tick(now)` and routes
//! at most one key and one encoder event per tick.

use std::mem;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::core::{
    ArcadeConfig, Control, EndReason, Game, GameKind, GameStateMachine, Outcome, Region,
    ResourceArbiter, SimpleRng,
};
use crate::menu::{click, volume_after, Menu};
use crate::scores::HighScores;
use crate::settings::Settings;
use crate::types::{EncoderEvent, InputSource, DEFAULT_VOLUME};

/// Which screen is up, for runners and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing(GameKind),
    Results,
    /// Only seen if a previous tick panicked mid-transition.
    Detached,
}

#[derive(Debug)]
enum Stage<A> {
    Menu(A),
    Playing(Game<A>),
    Results { arb: A, outcome: Outcome },
    Handover,
}

pub struct GameHost<A, I> {
    stage: Stage<A>,
    input: I,
    menu: Menu,
    menu_dirty: bool,
    volume: u8,
    config: ArcadeConfig,
    rng: SimpleRng,
    scores: HighScores,
    scores_path: Option<PathBuf>,
    last_outcome: Option<Outcome>,
}

impl<A: ResourceArbiter, I: InputSource> GameHost<A, I> {
    /// `seed` drives the per-game seeds, so a fixed seed replays a session.
    pub fn new(arb: A, input: I, config: ArcadeConfig, seed: u32) -> Self {
        Self {
            stage: Stage::Menu(arb),
            input,
            menu: Menu::new(),
            menu_dirty: true,
            volume: DEFAULT_VOLUME,
            config,
            rng: SimpleRng::new(seed),
            scores: HighScores::default(),
            scores_path: None,
            last_outcome: None,
        }
    }

    /// Build from a settings file's contents, loading the score file it names.
    pub fn from_settings(arb: A, input: I, settings: &Settings, seed: u32) -> Self {
        let scores = HighScores::load_from(&settings.scores_path);
        Self::new(arb, input, settings.arcade.clone(), seed)
            .with_volume(settings.volume)
            .with_high_scores(scores, Some(settings.scores_path.clone()))
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume;
        self.menu_dirty = true;
        self
    }

    /// Start from `scores`; promotions are written to `path` when given.
    pub fn with_high_scores(mut self, scores: HighScores, path: Option<PathBuf>) -> Self {
        self.scores = scores;
        self.scores_path = path;
        self.menu_dirty = true;
        self
    }

    pub fn tick(&mut self, now: f64) {
        self.stage = match mem::replace(&mut self.stage, Stage::Handover) {
            Stage::Menu(arb) => self.tick_menu(arb, now),
            Stage::Playing(game) => self.tick_game(game, now),
            Stage::Results { arb, outcome } => self.tick_results(arb, outcome),
            Stage::Handover => Stage::Handover,
        };
    }

    fn tick_menu(&mut self, mut arb: A, now: f64) -> Stage<A> {
        if let Some(key) = self.input.poll().filter(|k| k.pressed) {
            if let Some(volume) = volume_after(key.slot, self.volume) {
                debug!("volume {} -> {}", self.volume, volume);
                self.volume = volume;
                self.menu_dirty = true;
            }
        }

        match self.input.poll_encoder_event() {
            Some(EncoderEvent::Press) => return self.launch(arb, now),
            Some(EncoderEvent::Rotate(delta)) => {
                self.menu.rotate(delta);
                self.menu_dirty = true;
                click(&mut arb);
            }
            None => {}
        }

        if self.menu_dirty {
            arb.set_volume(self.volume);
            self.menu
                .draw(&mut arb, self.scores.get(self.menu.selected()), self.volume);
            self.menu_dirty = false;
        }
        Stage::Menu(arb)
    }

    fn launch(&mut self, mut arb: A, now: f64) -> Stage<A> {
        let kind = self.menu.selected();
        let seed = self.rng.next_u32();
        info!("starting {} (seed {seed:#010x})", kind.name());

        arb.clear_all();
        arb.clear_display();
        let mut game =
            Game::new(kind, arb, &self.config, seed).with_high_score(self.scores.get(kind));
        game.start(now);
        Stage::Playing(game)
    }

    fn tick_game(&mut self, mut game: Game<A>, now: f64) -> Stage<A> {
        if let Some(key) = self.input.poll() {
            game.on_key(key);
        }
        if let Some(event) = self.input.poll_encoder_event() {
            game.on_encoder(event);
        }

        match game.tick(now) {
            Control::Terminate(outcome) => {
                let mut arb = game.release();
                self.record(&outcome);
                draw_results(&mut arb, &outcome, self.scores.get(outcome.kind));
                self.last_outcome = Some(outcome);
                Stage::Results { arb, outcome }
            }
            Control::Continue | Control::Suspend => Stage::Playing(game),
        }
    }

    fn tick_results(&mut self, arb: A, outcome: Outcome) -> Stage<A> {
        // Keys are drained and ignored here.
        let _ = self.input.poll();
        match self.input.poll_encoder_event() {
            Some(EncoderEvent::Press) => {
                self.menu_dirty = true;
                Stage::Menu(arb)
            }
            _ => Stage::Results { arb, outcome },
        }
    }

    fn record(&mut self, outcome: &Outcome) {
        if !self.scores.record(outcome.kind, outcome.score) {
            return;
        }
        info!("{}: best score now {}", outcome.kind.name(), outcome.score);
        if let Some(path) = &self.scores_path {
            if let Err(e) = self.scores.save_to(path) {
                warn!("could not save high scores to {}: {e}", path.display());
            }
        }
    }

    pub fn screen(&self) -> Screen {
        match &self.stage {
            Stage::Menu(_) => Screen::Menu,
            Stage::Playing(game) => Screen::Playing(game.kind()),
            Stage::Results { .. } => Screen::Results,
            Stage::Handover => Screen::Detached,
        }
    }

    /// The arbiter, wherever it currently lives.
    pub fn arbiter(&self) -> Option<&A> {
        match &self.stage {
            Stage::Menu(arb) | Stage::Results { arb, .. } => Some(arb),
            Stage::Playing(game) => Some(game.arbiter()),
            Stage::Handover => None,
        }
    }

    pub fn game(&self) -> Option<&Game<A>> {
        match &self.stage {
            Stage::Playing(game) => Some(game),
            _ => None,
        }
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Stop whatever is running and return the arbiter with every output off.
    pub fn shutdown(self) -> Option<A> {
        let mut arb = match self.stage {
            Stage::Menu(arb) | Stage::Results { arb, .. } => arb,
            Stage::Playing(game) => game.release(),
            Stage::Handover => return None,
        };
        arb.clear_all();
        arb.clear_display();
        Some(arb)
    }
}

fn draw_results<A: ResourceArbiter + ?Sized>(arb: &mut A, outcome: &Outcome, best: u32) {
    arb.clear_all();
    arb.clear_display();

    let title = match outcome.reason {
        EndReason::TimeUp => "TIME'S UP!",
        EndReason::Completed => "RESULTS",
        _ => "GAME OVER",
    };
    let note = if outcome.new_high_score {
        "NEW BEST!"
    } else if matches!(outcome.reason, EndReason::TimeUp | EndReason::Completed) {
        ""
    } else {
        outcome.reason.headline()
    };

    arb.draw_text(Region::Header, title);
    arb.draw_text(Region::HeaderRight, note);
    arb.draw_text(Region::Center, &format!("Score: {}", outcome.score));
    arb.draw_text(Region::Footer, &format!("Best: {best}  Push knob"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordingArbiter;
    use crate::types::KeyEvent;
    use keypad_arcade_input::{Scripted, ScriptedInput};

    fn host(script: ScriptedInput) -> GameHost<RecordingArbiter, ScriptedInput> {
        GameHost::new(RecordingArbiter::new(), script, ArcadeConfig::instant(), 11)
    }

    #[test]
    fn test_first_tick_draws_menu() {
        let mut host = host(ScriptedInput::new());
        host.tick(0.0);
        assert_eq!(host.screen(), Screen::Menu);
        let arb = host.arbiter().unwrap();
        assert_eq!(arb.text(Region::Header), "> Speed Chase");
        assert_eq!(arb.volume(), DEFAULT_VOLUME);
    }

    #[test]
    fn test_rotation_selects_and_press_launches() {
        let mut host = host(ScriptedInput::new().rotate(-1).press());
        host.tick(0.0);
        assert_eq!(host.menu().selected(), GameKind::TicTacToe);
        assert_eq!(host.arbiter().unwrap().text(Region::Header), "> Tic-Tac-Toe");

        host.tick(0.02);
        assert_eq!(host.screen(), Screen::Playing(GameKind::TicTacToe));
        assert!(host.arbiter().unwrap().lit_count() > 0);
    }

    #[test]
    fn test_volume_keys_change_arbiter_volume() {
        let mut host = host(ScriptedInput::new().key(2).key(2).key(2).key(5));
        for i in 0..4 {
            host.tick(i as f64 * 0.02);
        }
        assert_eq!(host.volume(), 4);
        assert_eq!(host.arbiter().unwrap().volume(), 4);
    }

    #[test]
    fn test_game_over_shows_results_then_menu() {
        // Speed Chase: any key but the target fails, and with the instant
        // config the target is lit on the first tick.
        let mut host = host(ScriptedInput::new().press());
        host.tick(0.0);
        host.tick(0.02);
        let target = match host.game() {
            Some(Game::ReactionChase(m)) => m.game().target(),
            _ => None,
        }
        .unwrap();
        let wrong = (target.index() as u8 + 1) % 12;
        host.input_mut()
            .push(Scripted::Key(KeyEvent::press_index(wrong).unwrap()));

        let mut now = 0.04;
        while host.screen() != Screen::Results && now < 5.0 {
            host.tick(now);
            now += 0.02;
        }
        assert_eq!(host.screen(), Screen::Results);
        let arb = host.arbiter().unwrap();
        assert_eq!(arb.text(Region::Header), "GAME OVER");
        assert_eq!(arb.text(Region::HeaderRight), "Wrong key!");
        assert_eq!(host.last_outcome().unwrap().score, 0);

        host.tick(now);
        assert_eq!(host.screen(), Screen::Results);
        host.input_mut()
            .push(Scripted::Encoder(EncoderEvent::Press));
        host.tick(now + 0.02);
        assert_eq!(host.screen(), Screen::Menu);
        host.tick(now + 0.04);
        assert_eq!(host.arbiter().unwrap().text(Region::Header), "> Speed Chase");
    }

    #[test]
    fn test_beaten_best_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut host = host(ScriptedInput::new().press())
            .with_high_scores(HighScores::default(), Some(path.clone()));
        host.tick(0.0);
        host.tick(0.02);
        let target = match host.game() {
            Some(Game::ReactionChase(m)) => m.game().target(),
            _ => None,
        }
        .unwrap();
        // Hit once, then pause and quit.
        host.input_mut().push(Scripted::Key(KeyEvent::press(target)));
        host.input_mut()
            .push(Scripted::Encoder(EncoderEvent::Press));
        host.input_mut()
            .push(Scripted::Encoder(EncoderEvent::Press));

        let mut now = 0.04;
        while host.screen() != Screen::Results && now < 1.0 {
            host.tick(now);
            now += 0.02;
        }
        assert_eq!(host.screen(), Screen::Results);
        let outcome = *host.last_outcome().unwrap();
        assert_eq!(outcome.reason, EndReason::Quit);
        assert!(outcome.new_high_score);
        assert!(outcome.score > 0);
        assert_eq!(host.arbiter().unwrap().text(Region::HeaderRight), "NEW BEST!");
        assert_eq!(host.scores().get(GameKind::ReactionChase), outcome.score);
        assert_eq!(
            HighScores::load_from(&path).get(GameKind::ReactionChase),
            outcome.score
        );
    }

    #[test]
    fn test_unbeaten_best_leaves_the_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        let mut host = host(ScriptedInput::new().press().press().press())
            .with_high_scores(HighScores::default(), Some(path.clone()));
        for i in 0..4 {
            host.tick(i as f64 * 0.02);
        }
        assert_eq!(host.screen(), Screen::Results);
        assert!(!host.last_outcome().unwrap().new_high_score);
        assert!(!path.exists());
    }

    #[test]
    fn test_shutdown_mid_game_returns_clean_arbiter() {
        let mut host = host(ScriptedInput::new().press());
        host.tick(0.0);
        host.tick(0.02);
        assert!(matches!(host.screen(), Screen::Playing(_)));
        let arb = host.shutdown().unwrap();
        assert!(arb.is_clean());
    }
}
