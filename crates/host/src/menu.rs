//! Game selection screen.

use crate::core::{play_cue, Cue, GameKind, Region, ResourceArbiter};
use crate::types::{Rgb, Slot, MAX_VOLUME};

/// Raises the volume while the menu is shown.
pub const VOLUME_UP: Slot = Slot::ALL[2];
/// Lowers the volume while the menu is shown.
pub const VOLUME_DOWN: Slot = Slot::ALL[5];

/// Cursor over [`GameKind::ALL`], wrapping at both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Menu {
    selected: usize,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> GameKind {
        GameKind::ALL[self.selected]
    }

    pub fn position(&self) -> usize {
        self.selected
    }

    /// Move by `delta` detents.
    pub fn rotate(&mut self, delta: i32) {
        let len = GameKind::ALL.len() as i32;
        self.selected = (self.selected as i32 + delta).rem_euclid(len) as usize;
    }

    /// Paint the selection, its best score and the volume key hints.
    pub fn draw<A: ResourceArbiter + ?Sized>(&self, arb: &mut A, best: u32, volume: u8) {
        let kind = self.selected();
        arb.clear_all();
        arb.set_slot_color(VOLUME_UP, Rgb::GREEN.divide(2));
        arb.set_slot_color(VOLUME_DOWN, Rgb::RED.divide(2));

        arb.clear_display();
        arb.draw_text(Region::Header, &format!("> {}", kind.name()));
        arb.draw_text(
            Region::HeaderRight,
            &format!("{}/{}", self.selected + 1, GameKind::ALL.len()),
        );
        arb.draw_text(Region::Center, kind.description());
        arb.draw_text(Region::Footer, &format!("Best: {best}  Vol: {volume}"));
    }
}

/// New volume after a press on `slot`, or `None` if it is not a volume key.
pub fn volume_after(slot: Slot, volume: u8) -> Option<u8> {
    if slot == VOLUME_UP {
        Some((volume + 1).min(MAX_VOLUME))
    } else if slot == VOLUME_DOWN {
        Some(volume.saturating_sub(1))
    } else {
        None
    }
}

/// Audible click for menu navigation.
pub fn click<A: ResourceArbiter + ?Sized>(arb: &mut A) {
    play_cue(arb, Cue::Select);
}
