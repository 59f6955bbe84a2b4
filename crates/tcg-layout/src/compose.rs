//! Page composition
//!
//! This module turns a layout snapshot into draw calls on a page:
//! 1. Compute the sheet geometry for the options
//! 2. Plan one placement (card rect + crop marks) per occupied slot
//! 3. Rasterize each slot in turn and hand the image and its marks to a
//!    [`PageSink`]
//!
//! Slots are processed strictly one after another so that at most one
//! decoded source image is alive at a time. A slot whose image cannot be
//! decoded is skipped and reported; the rest of the page still renders.

use crate::cancel::CancelFlag;
use crate::layout::{
    LineSegment, Rect, create_grid_geometry, crop_marks_for_card, single_card_rect,
};
use crate::normalize::{PrintRaster, normalize_for_print};
use crate::options::LayoutOptions;
use crate::session::{LayoutSnapshot, SlotImage};
use crate::types::{ExportReport, LayoutError, LayoutMode, Result, SkippedSlot};

/// Receiver of draw calls, in page millimeters with a top-left origin
pub trait PageSink {
    /// Draw a card raster filling `rect`
    fn place_image(&mut self, slot: usize, rect: &Rect, raster: &PrintRaster) -> Result<()>;

    /// Stroke a straight line
    fn stroke_line(&mut self, line: &LineSegment) -> Result<()>;
}

/// Where one card goes and which marks surround it
#[derive(Debug, Clone, PartialEq)]
pub struct CardPlacement {
    pub slot: usize,
    pub rect: Rect,
    pub marks: Vec<LineSegment>,
}

/// Geometry for every card on the page, in slot order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PagePlan {
    pub placements: Vec<CardPlacement>,
}

impl PagePlan {
    pub fn line_count(&self) -> usize {
        self.placements.iter().map(|p| p.marks.len()).sum()
    }
}

/// Compute placements without touching any pixels.
pub fn plan_page(
    snapshot: &LayoutSnapshot,
    options: &LayoutOptions,
    mode: LayoutMode,
) -> Result<PagePlan> {
    let placements = match mode {
        LayoutMode::Grid => {
            let grid = create_grid_geometry(options)?;
            snapshot
                .cards()
                .iter()
                .map(|card| placement(card.slot, grid.slot_rect(card.slot), options))
                .collect()
        }
        LayoutMode::SingleCard => snapshot
            .cards()
            .first()
            .map(|card| placement(card.slot, single_card_rect(), options))
            .into_iter()
            .collect(),
    };

    Ok(PagePlan { placements })
}

fn placement(slot: usize, rect: Rect, options: &LayoutOptions) -> CardPlacement {
    let marks = if options.enable_crop_marks {
        crop_marks_for_card(&rect).to_vec()
    } else {
        Vec::new()
    };
    CardPlacement { slot, rect, marks }
}

/// Cards of the snapshot paired with their planned placement
pub(crate) fn planned_cards<'a>(
    snapshot: &'a LayoutSnapshot,
    plan: PagePlan,
) -> Vec<(&'a SlotImage, CardPlacement)> {
    plan.placements
        .into_iter()
        .filter_map(|placement| {
            snapshot
                .cards()
                .iter()
                .find(|card| card.slot == placement.slot)
                .map(|card| (card, placement))
        })
        .collect()
}

/// Draw one card and its marks, or record why it was skipped.
pub(crate) fn emit_card<S: PageSink + ?Sized>(
    sink: &mut S,
    placement: &CardPlacement,
    raster: Result<PrintRaster>,
    report: &mut ExportReport,
) -> Result<()> {
    let raster = match raster {
        Ok(raster) => raster,
        Err(LayoutError::Decode(reason)) => {
            log::warn!("Skipping slot {}: {}", placement.slot, reason);
            report.skipped.push(SkippedSlot {
                slot: placement.slot,
                reason,
            });
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    sink.place_image(placement.slot, &placement.rect, &raster)?;
    report.cards_placed += 1;

    for mark in &placement.marks {
        sink.stroke_line(mark)?;
    }
    report.line_segments += placement.marks.len();

    Ok(())
}

/// Compose a page into `sink`, rasterizing on the calling thread.
pub fn compose_page<S: PageSink + ?Sized>(
    snapshot: &LayoutSnapshot,
    options: &LayoutOptions,
    mode: LayoutMode,
    sink: &mut S,
    cancel: &CancelFlag,
) -> Result<ExportReport> {
    if snapshot.is_empty() {
        return Err(LayoutError::EmptyLayout);
    }

    let plan = plan_page(snapshot, options, mode)?;
    let mut report = ExportReport::default();

    for (card, placement) in planned_cards(snapshot, plan) {
        if cancel.is_cancelled() {
            return Err(LayoutError::Cancelled);
        }
        log::debug!("Rendering slot {}", placement.slot);
        let raster = normalize_for_print(&card.payload);
        emit_card(sink, &placement, raster, &mut report)?;
    }

    Ok(report)
}

// =============================================================================
// Instruction Recording
// =============================================================================

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawInstruction {
    Image {
        slot: usize,
        rect: Rect,
        width_px: u32,
        height_px: u32,
    },
    Line(LineSegment),
}

/// Sink that keeps the instruction list instead of drawing
#[derive(Debug, Clone, Default)]
pub struct InstructionRecorder {
    pub instructions: Vec<DrawInstruction>,
}

impl InstructionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, DrawInstruction::Image { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, DrawInstruction::Line(_)))
            .count()
    }
}

impl PageSink for InstructionRecorder {
    fn place_image(&mut self, slot: usize, rect: &Rect, raster: &PrintRaster) -> Result<()> {
        self.instructions.push(DrawInstruction::Image {
            slot,
            rect: *rect,
            width_px: raster.width(),
            height_px: raster.height(),
        });
        Ok(())
    }

    fn stroke_line(&mut self, line: &LineSegment) -> Result<()> {
        self.instructions.push(DrawInstruction::Line(*line));
        Ok(())
    }
}
