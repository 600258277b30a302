//! Polled input sources.
//!
//! [`TerminalInput`] drains crossterm events into small queues that the host
//! then polls through [`InputSource`]. Only presses are queued: no game acts
//! on a release, and the machines consume one key per tick.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use arrayvec::ArrayVec;
use crossterm::event::{self, Event, KeyEventKind};
use log::{trace, warn};

use crate::map::{map_key_event, should_quit, PadInput};
use crate::types::{EncoderEvent, InputSource, KeyEvent};

const KEY_QUEUE_LEN: usize = 16;

/// Keyboard-backed keypad and encoder.
#[derive(Debug, Default)]
pub struct TerminalInput {
    keys: ArrayVec<KeyEvent, KEY_QUEUE_LEN>,
    encoder_delta: i32,
    encoder_pressed: bool,
    quit: bool,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for terminal events and queue all that arrived.
    ///
    /// Returns `true` once a quit key has been seen.
    pub fn pump(&mut self, timeout: Duration) -> io::Result<bool> {
        let mut wait = timeout;
        while event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                self.feed(key);
            }
            wait = Duration::ZERO;
        }
        Ok(self.quit)
    }

    /// Queue one terminal key event.
    pub fn feed(&mut self, key: event::KeyEvent) {
        if key.kind == KeyEventKind::Press && should_quit(key) {
            self.quit = true;
            return;
        }
        let Some(input) = map_key_event(key) else {
            return;
        };
        trace!("terminal input {:?} ({:?})", input, key.kind);

        match (input, key.kind) {
            (PadInput::Key(slot), KeyEventKind::Press) => self.push(KeyEvent::press(slot)),
            (
                PadInput::Encoder(EncoderEvent::Rotate(delta)),
                KeyEventKind::Press | KeyEventKind::Repeat,
            ) => {
                self.encoder_delta += delta;
            }
            (PadInput::Encoder(EncoderEvent::Press), KeyEventKind::Press) => {
                self.encoder_pressed = true;
            }
            _ => {}
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn push(&mut self, event: KeyEvent) {
        if self.keys.try_push(event).is_err() {
            warn!("input queue full, dropping {:?}", event);
        }
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self) -> Option<KeyEvent> {
        self.keys.pop_at(0)
    }

    fn poll_encoder(&mut self) -> Option<i32> {
        let delta = std::mem::take(&mut self.encoder_delta);
        (delta != 0).then_some(delta)
    }

    fn poll_encoder_press(&mut self) -> bool {
        std::mem::take(&mut self.encoder_pressed)
    }
}

/// One scripted input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scripted {
    Key(KeyEvent),
    Encoder(EncoderEvent),
}

/// Replays a fixed list of inputs, one per poll, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pending: VecDeque<Scripted>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, index: u8) -> Self {
        if let Some(event) = KeyEvent::press_index(index) {
            self.pending.push_back(Scripted::Key(event));
        }
        self
    }

    pub fn rotate(mut self, delta: i32) -> Self {
        self.pending
            .push_back(Scripted::Encoder(EncoderEvent::Rotate(delta)));
        self
    }

    pub fn press(mut self) -> Self {
        self.pending.push_back(Scripted::Encoder(EncoderEvent::Press));
        self
    }

    pub fn push(&mut self, step: Scripted) {
        self.pending.push_back(step);
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Option<KeyEvent> {
        match self.pending.front() {
            Some(Scripted::Key(event)) => {
                let event = *event;
                self.pending.pop_front();
                Some(event)
            }
            _ => None,
        }
    }

    fn poll_encoder(&mut self) -> Option<i32> {
        match self.pending.front() {
            Some(Scripted::Encoder(EncoderEvent::Rotate(delta))) => {
                let delta = *delta;
                self.pending.pop_front();
                Some(delta)
            }
            _ => None,
        }
    }

    fn poll_encoder_press(&mut self) -> bool {
        if let Some(Scripted::Encoder(EncoderEvent::Press)) = self.pending.front() {
            self.pending.pop_front();
            true
        } else {
            false
        }
    }
}
