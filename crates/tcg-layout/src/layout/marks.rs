//! Crop marks (tonbo) around a card
//!
//! Each corner gets one horizontal and one vertical arm. Arms start on the
//! card edge and run outward, so they never cover the card itself.

use crate::constants::{CROP_MARK_LENGTH_MM, CROP_MARK_WIDTH_MM, CROP_MARKS_PER_CARD};

use super::{LineSegment, Point, Rect};

/// Generate the crop mark segments for one card.
///
/// Order: top-left, top-right, bottom-left, bottom-right; horizontal arm
/// before vertical arm at each corner.
pub fn crop_marks_for_card(card: &Rect) -> [LineSegment; CROP_MARKS_PER_CARD] {
    let left = card.x;
    let right = card.right();
    let top = card.y;
    let bottom = card.bottom();

    [
        // Top-left corner
        crop_mark_left(left, top),
        crop_mark_up(left, top),
        // Top-right corner
        crop_mark_right(right, top),
        crop_mark_up(right, top),
        // Bottom-left corner
        crop_mark_left(left, bottom),
        crop_mark_down(left, bottom),
        // Bottom-right corner
        crop_mark_right(right, bottom),
        crop_mark_down(right, bottom),
    ]
}

// Individual arm helpers; y grows downward.
fn crop_mark_left(x: f32, y: f32) -> LineSegment {
    segment((x - CROP_MARK_LENGTH_MM, y), (x, y))
}

fn crop_mark_right(x: f32, y: f32) -> LineSegment {
    segment((x, y), (x + CROP_MARK_LENGTH_MM, y))
}

fn crop_mark_up(x: f32, y: f32) -> LineSegment {
    segment((x, y - CROP_MARK_LENGTH_MM), (x, y))
}

fn crop_mark_down(x: f32, y: f32) -> LineSegment {
    segment((x, y), (x, y + CROP_MARK_LENGTH_MM))
}

fn segment(from: (f32, f32), to: (f32, f32)) -> LineSegment {
    LineSegment::new(
        Point::new(from.0, from.1),
        Point::new(to.0, to.1),
        CROP_MARK_WIDTH_MM,
    )
}
