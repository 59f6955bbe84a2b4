//! Sheet geometry
//!
//! This module handles all the geometric calculations for a card sheet:
//! - Grid layout (centering, spacing, per-slot card rectangles)
//! - Crop mark segments around each card
//!
//! All coordinates are millimeters with the origin at the top-left of the page.

mod grid;
mod marks;
mod types;

pub use grid::*;
pub use marks::*;
pub use types::*;
