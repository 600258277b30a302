//! Key colors and tones.

use serde::{Deserialize, Serialize};

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);
    pub const ORANGE: Rgb = Rgb::new(255, 128, 0);
    pub const PURPLE: Rgb = Rgb::new(128, 0, 255);
    pub const DIM: Rgb = Rgb::new(30, 30, 30);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Integer-divide every channel, e.g. `divide(4)` for a quarter-bright hint.
    ///
    /// # Examples
    ///
    /// ```
    /// use keypad_arcade_types::Rgb;
    ///
    /// assert_eq!(Rgb::YELLOW.divide(4), Rgb::new(63, 63, 0));
    /// ```
    pub const fn divide(self, by: u8) -> Self {
        Self::new(self.r / by, self.g / by, self.b / by)
    }

    pub const fn is_off(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// Colors a game may pick at random for a lit target.
pub const GAME_COLORS: [Rgb; 6] = [
    Rgb::RED,
    Rgb::GREEN,
    Rgb::BLUE,
    Rgb::YELLOW,
    Rgb::CYAN,
    Rgb::MAGENTA,
];

/// Per-key feedback pitch, C4 up to G5.
pub const KEY_TONES_HZ: [u16; 12] = [262, 294, 330, 349, 392, 440, 494, 523, 587, 659, 698, 784];

/// A single `(frequency, duration)` step of a tone sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub freq_hz: u16,
    pub duration_s: f32,
}

impl Tone {
    pub const fn new(freq_hz: u16, duration_s: f32) -> Self {
        Self { freq_hz, duration_s }
    }
}
