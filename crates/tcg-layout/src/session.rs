//! Layout model: the image library and the 3×3 placement grid
//!
//! A [`LayoutSession`] owns both. Slots refer to library entries by index
//! only, and the library never shrinks except through [`LayoutSession::reset`],
//! which clears both halves in the same `&mut self` call, so any reader sees
//! either the old state or the fully reset one.

use crate::constants::{GRID_COLUMNS, SLOT_COUNT};
use crate::layout::GridPosition;
use crate::payload::ImagePayload;
use crate::types::{LayoutError, Result};

/// Index of an image in the session library
pub type LibraryIndex = usize;

/// Append-only pool of source images
#[derive(Debug, Clone, Default)]
pub struct Library {
    images: Vec<ImagePayload>,
}

impl Library {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: LibraryIndex) -> Option<&ImagePayload> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImagePayload> {
        self.images.iter()
    }

    fn push(&mut self, payload: ImagePayload) -> LibraryIndex {
        self.images.push(payload);
        self.images.len() - 1
    }

    fn clear(&mut self) {
        self.images.clear();
    }
}

/// The nine placement slots, row-major from the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    slots: [Option<LibraryIndex>; SLOT_COUNT],
}

impl Grid {
    pub fn slot(&self, slot: usize) -> Option<LibraryIndex> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<LibraryIndex>; SLOT_COUNT] {
        &self.slots
    }

    /// Occupied slots in index order
    pub fn occupied(&self) -> impl Iterator<Item = (usize, LibraryIndex)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.map(|index| (slot, index)))
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Grid position of a slot index
pub fn slot_position(slot: usize) -> GridPosition {
    GridPosition::new(slot / GRID_COLUMNS, slot % GRID_COLUMNS)
}

/// Slot index of a grid position
pub fn slot_index(pos: GridPosition) -> usize {
    pos.row * GRID_COLUMNS + pos.col
}

/// Session state for one layout
#[derive(Debug, Clone, Default)]
pub struct LayoutSession {
    library: Library,
    grid: Grid,
}

impl LayoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Add an image to the library and return its index
    pub fn append_to_library(&mut self, payload: ImagePayload) -> LibraryIndex {
        self.library.push(payload)
    }

    /// Point `slot` at a library image, replacing whatever was there
    pub fn assign(&mut self, slot: usize, library_index: LibraryIndex) -> Result<()> {
        check_slot(slot)?;
        if library_index >= self.library.len() {
            return Err(LayoutError::OutOfRange {
                what: "library",
                index: library_index,
                len: self.library.len(),
            });
        }
        self.grid.slots[slot] = Some(library_index);
        Ok(())
    }

    /// Empty `slot`
    pub fn clear(&mut self, slot: usize) -> Result<()> {
        check_slot(slot)?;
        self.grid.slots[slot] = None;
        Ok(())
    }

    /// Empty the grid and the library together
    pub fn reset(&mut self) {
        self.grid = Grid::default();
        self.library.clear();
    }

    /// True when no slot holds an image; export should be disabled
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Freeze the occupied slots and their payloads for export.
    ///
    /// The snapshot shares payload bytes with the library, so taking one is
    /// cheap, and nothing done with it can touch the session.
    pub fn snapshot(&self) -> LayoutSnapshot {
        let cards = self
            .grid
            .occupied()
            .filter_map(|(slot, index)| {
                self.library.get(index).map(|payload| SlotImage {
                    slot,
                    library_index: index,
                    payload: payload.clone(),
                })
            })
            .collect();
        LayoutSnapshot { cards }
    }
}

fn check_slot(slot: usize) -> Result<()> {
    if slot >= SLOT_COUNT {
        return Err(LayoutError::OutOfRange {
            what: "slot",
            index: slot,
            len: SLOT_COUNT,
        });
    }
    Ok(())
}

/// One occupied slot resolved to its image
#[derive(Debug, Clone, PartialEq)]
pub struct SlotImage {
    pub slot: usize,
    pub library_index: LibraryIndex,
    pub payload: ImagePayload,
}

/// Occupied slots of a session at one point in time, in slot order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    cards: Vec<SlotImage>,
}

impl LayoutSnapshot {
    /// Build a snapshot directly, e.g. for a single card.
    ///
    /// Entries are sorted by slot; slots past the grid are dropped.
    pub fn from_cards(mut cards: Vec<SlotImage>) -> Self {
        cards.retain(|c| c.slot < SLOT_COUNT);
        cards.sort_by_key(|c| c.slot);
        Self { cards }
    }

    pub fn cards(&self) -> &[SlotImage] {
        &self.cards
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
