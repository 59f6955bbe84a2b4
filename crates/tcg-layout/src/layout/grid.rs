//! Grid layout calculation
//!
//! This module centers the 3×3 card block on the page and derives the
//! rectangle of every slot from it.

use crate::constants::{
    CARD_HEIGHT_MM, CARD_WIDTH_MM, GRID_COLUMNS, GRID_ROWS, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::options::LayoutOptions;
use crate::session::slot_position;
use crate::types::{LayoutError, Result};

use super::{GridPosition, Rect};

// =============================================================================
// Grid Creation
// =============================================================================

/// Placement of the card block on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    /// Gap between adjacent cards
    pub gap_mm: f32,
    /// Width of the whole card block including gaps
    pub total_width_mm: f32,
    /// Height of the whole card block including gaps
    pub total_height_mm: f32,
    /// Left edge of the block (the horizontal margin)
    pub start_x_mm: f32,
    /// Top edge of the block (the vertical margin)
    pub start_y_mm: f32,
}

/// Create the grid geometry for the given options.
pub fn create_grid_geometry(options: &LayoutOptions) -> Result<GridGeometry> {
    grid_geometry_with_gap(options.gap_mm())
}

/// Create the grid geometry for an explicit gap.
///
/// A block that does not fit on the page is rejected rather than placed at
/// negative coordinates.
pub fn grid_geometry_with_gap(gap_mm: f32) -> Result<GridGeometry> {
    let total_width_mm = block_extent(CARD_WIDTH_MM, GRID_COLUMNS, gap_mm);
    let total_height_mm = block_extent(CARD_HEIGHT_MM, GRID_ROWS, gap_mm);

    if total_width_mm > PAGE_WIDTH_MM {
        return Err(LayoutError::GridOverflow {
            total_mm: total_width_mm,
            page_mm: PAGE_WIDTH_MM,
        });
    }
    if total_height_mm > PAGE_HEIGHT_MM {
        return Err(LayoutError::GridOverflow {
            total_mm: total_height_mm,
            page_mm: PAGE_HEIGHT_MM,
        });
    }

    Ok(GridGeometry {
        gap_mm,
        total_width_mm,
        total_height_mm,
        start_x_mm: (PAGE_WIDTH_MM - total_width_mm) / 2.0,
        start_y_mm: (PAGE_HEIGHT_MM - total_height_mm) / 2.0,
    })
}

fn block_extent(card_mm: f32, count: usize, gap_mm: f32) -> f32 {
    count as f32 * card_mm + (count - 1) as f32 * gap_mm
}

// =============================================================================
// Cell Calculations
// =============================================================================

impl GridGeometry {
    /// Bounds of the card at a grid position
    pub fn card_rect(&self, pos: GridPosition) -> Rect {
        Rect::new(
            self.start_x_mm + pos.col as f32 * (CARD_WIDTH_MM + self.gap_mm),
            self.start_y_mm + pos.row as f32 * (CARD_HEIGHT_MM + self.gap_mm),
            CARD_WIDTH_MM,
            CARD_HEIGHT_MM,
        )
    }

    /// Bounds of the card in a slot (row-major index)
    pub fn slot_rect(&self, slot: usize) -> Rect {
        self.card_rect(slot_position(slot))
    }

    /// Bounds of the whole card block
    pub fn block_rect(&self) -> Rect {
        Rect::new(
            self.start_x_mm,
            self.start_y_mm,
            self.total_width_mm,
            self.total_height_mm,
        )
    }
}

/// Bounds of a lone card centered on the page
pub fn single_card_rect() -> Rect {
    Rect::new(
        (PAGE_WIDTH_MM - CARD_WIDTH_MM) / 2.0,
        (PAGE_HEIGHT_MM - CARD_HEIGHT_MM) / 2.0,
        CARD_WIDTH_MM,
        CARD_HEIGHT_MM,
    )
}

// =============================================================================
// Tests
// =============================================================================
