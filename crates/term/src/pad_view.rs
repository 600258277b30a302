//! PadView: maps a [`PadState`] into a terminal framebuffer.
//!
//! Pure (no I/O), so layouts can be unit-tested. The display sits on top,
//! the 3x4 key grid below it, then a status line.

use crate::arbiter::PadState;
use crate::core::Region;
use crate::fb::{CellStyle, FrameBuffer};
use crate::types::{Rgb, Slot, GRID_COLS, GRID_ROWS, MAX_VOLUME};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

const DISPLAY_COLS: u16 = 24;
const UNLIT: Rgb = Rgb::new(40, 40, 48);

pub struct PadView {
    key_w: u16,
    key_h: u16,
    labels: [char; 12],
    help: &'static str,
}

impl Default for PadView {
    fn default() -> Self {
        // 7x3 reads as roughly square in most terminal fonts.
        Self {
            key_w: 7,
            key_h: 3,
            labels: ['0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B'],
            help: "",
        }
    }
}

impl PadView {
    /// Characters printed on the key caps, by slot.
    pub fn with_labels(mut self, labels: [char; 12]) -> Self {
        self.labels = labels;
        self
    }

    /// Hint shown under the status line.
    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    fn grid_size(&self) -> (u16, u16) {
        let cols = GRID_COLS as u16;
        let rows = GRID_ROWS as u16;
        (cols * self.key_w + (cols - 1), rows * self.key_h + (rows - 1))
    }

    /// Render into an existing framebuffer, resizing it to `viewport`.
    pub fn render_into(&self, pad: &PadState, viewport: Viewport, fb: &mut FrameBuffer) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let (grid_w, grid_h) = self.grid_size();
        let panel_w = (DISPLAY_COLS + 2).max(grid_w);
        let total_h = 6 + 1 + grid_h + 2;
        let x0 = viewport.width.saturating_sub(panel_w) / 2;
        let y0 = viewport.height.saturating_sub(total_h) / 2;

        self.draw_display(fb, pad, x0 + panel_w.saturating_sub(DISPLAY_COLS + 2) / 2, y0);

        let grid_x = x0 + panel_w.saturating_sub(grid_w) / 2;
        let grid_y = y0 + 7;
        for slot in Slot::ALL {
            self.draw_key(fb, pad.leds[slot.index()], slot, grid_x, grid_y);
        }

        let status_y = grid_y + grid_h + 1;
        fb.put_centered(0, status_y, viewport.width, &status_line(pad), CellStyle::default());
        if !self.help.is_empty() {
            fb.put_centered(
                0,
                status_y + 1,
                viewport.width,
                self.help,
                CellStyle::default().dim(),
            );
        }
    }

    pub fn render(&self, pad: &PadState, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(pad, viewport, &mut fb);
        fb
    }

    fn draw_display(&self, fb: &mut FrameBuffer, pad: &PadState, x: u16, y: u16) {
        let frame = CellStyle::new(Rgb::new(120, 120, 140), Rgb::OFF);
        let text = CellStyle::new(Rgb::new(170, 220, 255), Rgb::OFF);
        fb.draw_box(x, y, DISPLAY_COLS + 2, 6, frame);

        let inner = x + 1;
        fb.put_str(inner, y + 1, &pad.lines[Region::Header.index()], text);
        let right = &pad.lines[Region::HeaderRight.index()];
        let right_len = right.chars().count().min(DISPLAY_COLS as usize) as u16;
        fb.put_str(inner + DISPLAY_COLS - right_len, y + 1, right, text);
        fb.put_centered(
            inner,
            y + 3,
            DISPLAY_COLS,
            &pad.lines[Region::Center.index()],
            text.bold(),
        );
        fb.put_str(inner, y + 4, &pad.lines[Region::Footer.index()], text);
    }

    fn draw_key(&self, fb: &mut FrameBuffer, led: Rgb, slot: Slot, x0: u16, y0: u16) {
        let x = x0 + slot.col() as u16 * (self.key_w + 1);
        let y = y0 + slot.row() as u16 * (self.key_h + 1);
        let bg = if led.is_off() { UNLIT } else { led };
        fb.fill_rect(x, y, self.key_w, self.key_h, ' ', CellStyle::new(Rgb::OFF, bg));

        let fg = if luminance(bg) > 110 {
            Rgb::OFF
        } else {
            Rgb::new(200, 200, 200)
        };
        fb.put_str(
            x + self.key_w / 2,
            y + self.key_h / 2,
            &self.labels[slot.index()].to_string(),
            CellStyle::new(fg, bg).bold(),
        );
    }
}

fn luminance(c: Rgb) -> u32 {
    (299 * c.r as u32 + 587 * c.g as u32 + 114 * c.b as u32) / 1000
}

fn status_line(pad: &PadState) -> String {
    let bars: String = (1..=MAX_VOLUME)
        .map(|v| if v <= pad.volume { '■' } else { '·' })
        .collect();
    match pad.last_tone {
        Some(tone) if pad.volume > 0 => format!("Vol {bars}  ♪ {} Hz", tone.freq_hz),
        _ if pad.volume == 0 => format!("Vol {bars}  (muted)"),
        _ => format!("Vol {bars}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find_row(fb: &FrameBuffer, needle: &str) -> Option<u16> {
        (0..fb.height()).find(|&y| fb.row_text(y).contains(needle))
    }

    #[test]
    fn test_display_lines_are_rendered() {
        let mut pad = PadState::default();
        pad.lines[Region::Header.index()] = "Level: 3".into();
        pad.lines[Region::HeaderRight.index()] = "Lit: 4".into();
        pad.lines[Region::Center.index()] = "SOLVED!".into();
        let fb = PadView::default().render(&pad, Viewport::new(60, 30));

        let header = find_row(&fb, "Level: 3").unwrap();
        assert!(fb.row_text(header).contains("Lit: 4"));
        let center = find_row(&fb, "SOLVED!").unwrap();
        assert_eq!(center, header + 2);
    }

    #[test]
    fn test_lit_key_uses_led_color() {
        let mut pad = PadState::default();
        pad.leds[4] = Rgb::RED;
        let view = PadView::default();
        let fb = view.render(&pad, Viewport::new(60, 30));

        let row = find_row(&fb, "4").unwrap();
        let x = fb.row_text(row).find('4').unwrap() as u16;
        assert_eq!(fb.get(x, row).unwrap().style.bg, Rgb::RED);

        let zero_row = find_row(&fb, "0").unwrap();
        let zx = fb.row_text(zero_row).find('0').unwrap() as u16;
        assert_eq!(fb.get(zx, zero_row).unwrap().style.bg, UNLIT);
    }

    #[test]
    fn test_status_line_shows_volume() {
        let mut pad = PadState::default();
        pad.volume = 2;
        assert_eq!(status_line(&pad), "Vol ■■···");
        pad.volume = 0;
        assert!(status_line(&pad).contains("muted"));
    }

    #[test]
    fn test_tiny_viewport_does_not_panic() {
        let fb = PadView::default().render(&PadState::default(), Viewport::new(5, 3));
        assert_eq!((fb.width(), fb.height()), (5, 3));
    }
}
