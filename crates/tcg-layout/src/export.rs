//! Sheet export
//!
//! Drives the compositor into a PDF writer. The async entry points await one
//! blocking rasterization task per occupied slot, in slot order, and check
//! the cancel flag between slots.

use crate::cancel::CancelFlag;
use crate::compose::{compose_page, emit_card, plan_page, planned_cards};
use crate::normalize::normalize_for_print;
use crate::options::LayoutOptions;
use crate::render::PdfPageWriter;
use crate::session::LayoutSnapshot;
use crate::types::{ExportReport, LayoutError, LayoutMode, Result};
use std::path::Path;

/// A rendered PDF and what went into it
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub report: ExportReport,
}

/// Per-slot progress of a running export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportProgress {
    /// Slot just handled
    pub slot: usize,
    /// Cards handled so far, including skipped ones
    pub current: usize,
    /// Cards on the page
    pub total: usize,
}

/// Render a sheet to PDF bytes on the calling thread.
pub fn render_pdf_blocking(
    snapshot: &LayoutSnapshot,
    options: &LayoutOptions,
    mode: LayoutMode,
    cancel: &CancelFlag,
) -> Result<ExportOutput> {
    let mut writer = PdfPageWriter::new();
    let report = compose_page(snapshot, options, mode, &mut writer, cancel)?;
    let bytes = writer.finish()?;
    log::info!(
        "Rendered sheet: {} cards, {} skipped",
        report.cards_placed,
        report.skipped.len()
    );
    Ok(ExportOutput { bytes, report })
}

/// Render a sheet to PDF bytes.
///
/// Each slot is rasterized on the blocking pool and awaited before the next
/// one starts.
pub async fn render_pdf<F>(
    snapshot: &LayoutSnapshot,
    options: &LayoutOptions,
    mode: LayoutMode,
    cancel: &CancelFlag,
    mut on_progress: F,
) -> Result<ExportOutput>
where
    F: FnMut(ExportProgress),
{
    if snapshot.is_empty() {
        return Err(LayoutError::EmptyLayout);
    }

    let plan = plan_page(snapshot, options, mode)?;
    let cards = planned_cards(snapshot, plan);
    let total = cards.len();

    let mut writer = PdfPageWriter::new();
    let mut report = ExportReport::default();

    for (index, (card, placement)) in cards.into_iter().enumerate() {
        if cancel.is_cancelled() {
            log::info!("Export cancelled before slot {}", placement.slot);
            return Err(LayoutError::Cancelled);
        }
        log::debug!("Rendering slot {}", placement.slot);

        let payload = card.payload.clone();
        let raster = tokio::task::spawn_blocking(move || normalize_for_print(&payload)).await?;
        emit_card(&mut writer, &placement, raster, &mut report)?;

        on_progress(ExportProgress {
            slot: placement.slot,
            current: index + 1,
            total,
        });
    }

    let bytes = tokio::task::spawn_blocking(move || writer.finish()).await??;
    log::info!(
        "Rendered sheet: {} cards, {} skipped",
        report.cards_placed,
        report.skipped.len()
    );

    Ok(ExportOutput { bytes, report })
}

/// Render a sheet and write it to `output_path`.
pub async fn generate_pdf(
    snapshot: &LayoutSnapshot,
    options: &LayoutOptions,
    mode: LayoutMode,
    output_path: impl AsRef<Path>,
) -> Result<ExportReport> {
    let output = render_pdf(snapshot, options, mode, &CancelFlag::new(), |_| {}).await?;
    save_pdf(&output.bytes, output_path).await?;
    Ok(output.report)
}

/// Write rendered PDF bytes to disk
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(())
}
