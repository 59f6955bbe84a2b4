//! Physical constants for card sheets
//!
//! Everything on the sheet is measured in millimeters with the origin at the
//! top-left corner of an A4 portrait page. These values never change at
//! runtime.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Millimeters per inch
pub const MM_PER_INCH: f32 = 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Page and Card
// =============================================================================

/// A4 portrait width
pub const PAGE_WIDTH_MM: f32 = 210.0;

/// A4 portrait height
pub const PAGE_HEIGHT_MM: f32 = 297.0;

/// Trading card width
pub const CARD_WIDTH_MM: f32 = 63.0;

/// Trading card height
pub const CARD_HEIGHT_MM: f32 = 88.0;

/// Gap between adjacent cards when spacing is enabled
pub const CARD_GAP_MM: f32 = 5.0;

// =============================================================================
// Grid
// =============================================================================

pub const GRID_COLUMNS: usize = 3;
pub const GRID_ROWS: usize = 3;

/// Number of slots on a sheet
pub const SLOT_COUNT: usize = GRID_COLUMNS * GRID_ROWS;

// =============================================================================
// Crop Marks
// =============================================================================

/// Length of each crop mark arm
pub const CROP_MARK_LENGTH_MM: f32 = 3.0;

/// Stroke width of crop marks
pub const CROP_MARK_WIDTH_MM: f32 = 0.1;

/// Segments drawn per card (two per corner)
pub const CROP_MARKS_PER_CARD: usize = 8;

// =============================================================================
// Print Raster
// =============================================================================

/// Print density the rasters are prepared for
pub const PRINT_DPI: u32 = 600;

/// Raster width in pixels: 63mm at 600 dpi
pub const RASTER_WIDTH_PX: u32 = 1488;

/// Raster height in pixels: 88mm at 600 dpi
pub const RASTER_HEIGHT_PX: u32 = 2079;

/// JPEG quality used when re-encoding rasters (0.85 on a 0-1 scale)
pub const JPEG_QUALITY: u8 = 85;

// =============================================================================
// Intake
// =============================================================================

/// Largest encoded image accepted from intake (10 MiB)
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Crop Transform
// =============================================================================

pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 3.0;

// =============================================================================
// Output
// =============================================================================

/// Default file name for a 3×3 sheet
pub const DEFAULT_LAYOUT_FILENAME: &str = "tcg-layout.pdf";

/// Default file name for single-card sheets
pub const DEFAULT_CARDS_FILENAME: &str = "tcg-cards.pdf";
