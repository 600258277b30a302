//! Key slots and slot sets.

use serde::{Deserialize, Serialize};

/// Number of keys on the pad.
pub const SLOT_COUNT: usize = 12;

/// Grid columns.
pub const GRID_COLS: u8 = 3;

/// Grid rows.
pub const GRID_ROWS: u8 = 4;

/// One physical key, 0-11 in row-major order.
///
/// A `Slot` can only be built through [`Slot::new`], so every value in the
/// program is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Slot(u8);

impl Slot {
    /// All twelve slots in index order.
    pub const ALL: [Slot; SLOT_COUNT] = [
        Slot(0),
        Slot(1),
        Slot(2),
        Slot(3),
        Slot(4),
        Slot(5),
        Slot(6),
        Slot(7),
        Slot(8),
        Slot(9),
        Slot(10),
        Slot(11),
    ];

    /// Build a slot from a raw key index.
    ///
    /// # Examples
    ///
    /// ```
    /// use keypad_arcade_types::Slot;
    ///
    /// assert_eq!(Slot::new(0).map(|s| s.index()), Some(0));
    /// assert_eq!(Slot::new(11).map(|s| s.index()), Some(11));
    /// assert_eq!(Slot::new(12), None);
    /// ```
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < SLOT_COUNT {
            Some(Slot(index))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn row(self) -> u8 {
        self.0 / GRID_COLS
    }

    pub const fn col(self) -> u8 {
        self.0 % GRID_COLS
    }

    /// The slot itself and its up/down/left/right neighbors.
    pub fn neighbors(self) -> SlotSet {
        let (row, col) = (self.row(), self.col());
        let mut set = SlotSet::EMPTY.with(self);
        if row > 0 {
            set.insert(Slot(self.0 - GRID_COLS));
        }
        if row + 1 < GRID_ROWS {
            set.insert(Slot(self.0 + GRID_COLS));
        }
        if col > 0 {
            set.insert(Slot(self.0 - 1));
        }
        if col + 1 < GRID_COLS {
            set.insert(Slot(self.0 + 1));
        }
        set
    }
}

impl TryFrom<u8> for Slot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Slot::new(value).ok_or_else(|| format!("slot index {value} out of range 0-11"))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.0
    }
}

/// A set of slots packed into a 12-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotSet(u16);

impl SlotSet {
    pub const EMPTY: SlotSet = SlotSet(0);
    pub const FULL: SlotSet = SlotSet((1 << SLOT_COUNT) - 1);

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub fn from_slots(slots: &[Slot]) -> Self {
        slots.iter().fold(Self::EMPTY, |set, &slot| set.with(slot))
    }

    pub const fn contains(self, slot: Slot) -> bool {
        self.0 & (1 << slot.0) != 0
    }

    /// Insert a slot, returning `true` if it was not present.
    pub fn insert(&mut self, slot: Slot) -> bool {
        let fresh = !self.contains(slot);
        self.0 |= 1 << slot.0;
        fresh
    }

    /// Remove a slot, returning `true` if it was present.
    pub fn remove(&mut self, slot: Slot) -> bool {
        let present = self.contains(slot);
        self.0 &= !(1 << slot.0);
        present
    }

    pub const fn with(self, slot: Slot) -> Self {
        SlotSet(self.0 | (1 << slot.0))
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Slots in exactly one of the two sets.
    pub const fn symmetric_difference(self, other: SlotSet) -> SlotSet {
        SlotSet(self.0 ^ other.0)
    }

    pub const fn difference(self, other: SlotSet) -> SlotSet {
        SlotSet(self.0 & !other.0)
    }

    pub const fn complement(self) -> SlotSet {
        SlotSet(!self.0 & Self::FULL.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Slot> {
        Slot::ALL.into_iter().filter(move |&slot| self.contains(slot))
    }
}

impl FromIterator<Slot> for SlotSet {
    fn from_iter<I: IntoIterator<Item = Slot>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |set, slot| set.with(slot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(i: u8) -> Slot {
        Slot::new(i).unwrap()
    }

    #[test]
    fn test_adjacency_matches_grid() {
        let expect: [&[u8]; SLOT_COUNT] = [
            &[0, 1, 3],
            &[0, 1, 2, 4],
            &[1, 2, 5],
            &[0, 3, 4, 6],
            &[1, 3, 4, 5, 7],
            &[2, 4, 5, 8],
            &[3, 6, 7, 9],
            &[4, 6, 7, 8, 10],
            &[5, 7, 8, 11],
            &[6, 9, 10],
            &[7, 9, 10, 11],
            &[8, 10, 11],
        ];
        for slot in Slot::ALL {
            let want: SlotSet = expect[slot.index()].iter().map(|&i| s(i)).collect();
            assert_eq!(slot.neighbors(), want, "slot {}", slot.index());
        }
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        for a in Slot::ALL {
            for b in a.neighbors().iter() {
                assert!(b.neighbors().contains(a));
            }
        }
    }

    #[test]
    fn test_slot_set_insert_remove() {
        let mut set = SlotSet::EMPTY;
        assert!(set.insert(s(3)));
        assert!(!set.insert(s(3)));
        assert_eq!(set.len(), 1);
        assert!(set.remove(s(3)));
        assert!(!set.remove(s(3)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_slot_set_complement_and_iter() {
        let set = SlotSet::from_slots(&[s(0), s(11)]);
        let rest = set.complement();
        assert_eq!(rest.len(), 10);
        assert!(!rest.contains(s(0)));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![s(0), s(11)]);
    }

    #[test]
    fn test_slot_serde_rejects_out_of_range() {
        assert!(Slot::try_from(12u8).is_err());
        assert_eq!(u8::from(s(7)), 7);
    }
}
