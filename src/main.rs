//! Terminal keypad arcade (default binary).
//!
//! Plays the pad in a terminal. The left block of a QWERTY keyboard stands
//! in for the 12 keys, arrows turn the encoder, Enter pushes it and Esc
//! quits. Logs go to the file named in the settings, since the terminal is
//! in raw mode.
//!
//! Usage: `keypad-arcade [settings.json]`

use std::fs::File;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::info;

use keypad_arcade::host::{GameHost, MonotonicClock, Settings};
use keypad_arcade::input::{char_for_slot, TerminalInput};
use keypad_arcade::term::{FrameBuffer, PadView, TermArbiter, TerminalRenderer, Viewport};
use keypad_arcade::types::{Clock, Slot};

const DEFAULT_SETTINGS: &str = "keypad-arcade.json";
const HELP: &str = "keys 123/qwe/asd/zxc  arrows: turn  Enter: push  Esc: quit";

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS.to_string());
    let settings = Settings::load(&path).with_context(|| format!("loading settings {path}"))?;
    init_logging(&settings)?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, &settings);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging(settings: &Settings) -> Result<()> {
    let file = File::create(&settings.log_path)
        .with_context(|| format!("creating log file {}", settings.log_path.display()))?;
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, settings: &Settings) -> Result<()> {
    let seed = settings.seed.unwrap_or_else(time_seed);
    info!("keypad arcade starting, seed {seed:#010x}");

    let arbiter = TermArbiter::new(settings.volume);
    let mut host = GameHost::from_settings(arbiter, TerminalInput::new(), settings, seed);

    let view = PadView::default()
        .with_labels(Slot::ALL.map(|slot| char_for_slot(slot).to_ascii_uppercase()))
        .with_help(HELP);
    let clock = MonotonicClock::new();
    let tick = Duration::from_millis(u64::from(settings.tick_ms));
    let mut fb = FrameBuffer::new(0, 0);
    let mut tones_heard = 0;
    let mut next_tick = 0.0;

    loop {
        let wait = Duration::from_secs_f64((next_tick - clock.now()).max(0.0));
        if host.input_mut().pump(wait)? {
            break;
        }

        let now = clock.now();
        if now < next_tick {
            continue;
        }
        next_tick = now + tick.as_secs_f64();
        host.tick(now);

        let Some(pad) = host.arbiter().map(TermArbiter::state) else {
            continue;
        };
        if pad.tone_count != tones_heard {
            tones_heard = pad.tone_count;
            term.bell()?;
        }
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(pad, Viewport::new(w, h), &mut fb);
        term.present(&mut fb)?;
    }

    info!("quit requested");
    if let Some(arbiter) = host.shutdown() {
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(arbiter.state(), Viewport::new(w, h), &mut fb);
        term.present(&mut fb)?;
    }
    Ok(())
}

fn time_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
