//! Input diagnostic: prints what each terminal key decodes to.
//!
//! Useful to check which key kinds (press/repeat/release) a terminal reports
//! and that the keypad layout maps as expected. Esc or Ctrl-C quits.

use std::io::{self, Write};

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::terminal;

use keypad_arcade::input::{map_key_event, should_quit, PadInput};

fn main() -> Result<()> {
    terminal::enable_raw_mode()?;
    let result = run();
    let _ = terminal::disable_raw_mode();
    result
}

fn run() -> Result<()> {
    let mut out = io::stdout();
    write!(out, "press keys (Esc to quit)\r\n")?;
    out.flush()?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if should_quit(key) {
            return Ok(());
        }
        let decoded = match map_key_event(key) {
            Some(PadInput::Key(slot)) => {
                format!("key {:>2} (row {}, col {})", slot.index(), slot.row(), slot.col())
            }
            Some(PadInput::Encoder(e)) => format!("encoder {e:?}"),
            None => "unmapped".to_string(),
        };
        write!(out, "{:?} {:?} -> {decoded}\r\n", key.code, key.kind)?;
        out.flush()?;
    }
}
