use crate::SessionUpdate;
use std::path::PathBuf;
use tcg_layout::{
    CancelFlag, ImagePayload, LayoutMode, LayoutOptions, LayoutSession, LayoutSnapshot,
    LibraryIndex,
};
use tokio::sync::mpsc;

pub fn handle_add_image(
    payload: ImagePayload,
    session: &mut LayoutSession,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    let index = session.append_to_library(payload);
    let _ = update_tx.send(SessionUpdate::ImageAdded { index });
}

pub async fn handle_load_image(
    path: PathBuf,
    session: &mut LayoutSession,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match tcg_layout::load_image(&path).await {
        Ok(payload) => handle_add_image(payload, session, update_tx),
        Err(e) => {
            let _ = update_tx.send(SessionUpdate::Error {
                message: format!("Failed to load {}: {e}", path.display()),
            });
        }
    }
}

pub fn handle_assign(
    slot: usize,
    library_index: LibraryIndex,
    session: &mut LayoutSession,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match session.assign(slot, library_index) {
        Ok(()) => {
            let _ = update_tx.send(SessionUpdate::SlotChanged {
                slot,
                library_index: Some(library_index),
            });
        }
        Err(e) => {
            let _ = update_tx.send(SessionUpdate::Error {
                message: format!("Failed to assign slot: {e}"),
            });
        }
    }
}

pub fn handle_clear(
    slot: usize,
    session: &mut LayoutSession,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    match session.clear(slot) {
        Ok(()) => {
            let _ = update_tx.send(SessionUpdate::SlotChanged {
                slot,
                library_index: None,
            });
        }
        Err(e) => {
            let _ = update_tx.send(SessionUpdate::Error {
                message: format!("Failed to clear slot: {e}"),
            });
        }
    }
}

pub async fn handle_export(
    snapshot: LayoutSnapshot,
    options: LayoutOptions,
    mode: LayoutMode,
    output_path: PathBuf,
    cancel: CancelFlag,
    update_tx: &mpsc::UnboundedSender<SessionUpdate>,
) {
    let rendered = tcg_layout::render_pdf(&snapshot, &options, mode, &cancel, |progress| {
        let _ = update_tx.send(SessionUpdate::Progress {
            operation: format!("Rendering slot {}", progress.slot),
            current: progress.current,
            total: progress.total,
        });
    })
    .await;

    let output = match rendered {
        Ok(output) => output,
        Err(e) => {
            let _ = update_tx.send(SessionUpdate::Error {
                message: format!("Failed to generate PDF: {e}"),
            });
            return;
        }
    };

    for skipped in &output.report.skipped {
        let _ = update_tx.send(SessionUpdate::Warning {
            message: format!("Slot {} left blank: {}", skipped.slot, skipped.reason),
        });
    }

    match tcg_layout::save_pdf(&output.bytes, &output_path).await {
        Ok(()) => {
            let _ = update_tx.send(SessionUpdate::ExportComplete {
                path: output_path,
                report: output.report,
            });
        }
        Err(e) => {
            let _ = update_tx.send(SessionUpdate::Error {
                message: format!("Failed to save PDF: {e}"),
            });
        }
    }
}
