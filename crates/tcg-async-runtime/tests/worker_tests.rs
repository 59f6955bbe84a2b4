use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tcg_async_runtime::*;
use tcg_layout::PayloadFormat;
use tokio::sync::mpsc::UnboundedReceiver;

fn card_png() -> ImagePayload {
    let img = RgbaImage::from_pixel(12, 16, Rgba([200, 40, 40, 180]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    ImagePayload::from_bytes(bytes).unwrap()
}

async fn next(updates: &mut UnboundedReceiver<SessionUpdate>) -> SessionUpdate {
    updates.recv().await.expect("worker stopped early")
}

/// Collect updates up to and including the one that ends an export
async fn export_updates(updates: &mut UnboundedReceiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut seen = Vec::new();
    loop {
        let update = next(updates).await;
        let done = matches!(
            update,
            SessionUpdate::ExportComplete { .. } | SessionUpdate::Error { .. }
        );
        seen.push(update);
        if done {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_add_assign_and_export() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(LayoutMode::Grid.default_filename());
    let (handle, mut updates) = spawn_session();

    handle.add_image(card_png()).unwrap();
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::ImageAdded { index: 0 }
    ));

    handle.assign(0, 0).unwrap();
    handle.assign(3, 0).unwrap();
    for expected in [0, 3] {
        match next(&mut updates).await {
            SessionUpdate::SlotChanged {
                slot,
                library_index,
            } => {
                assert_eq!(slot, expected);
                assert_eq!(library_index, Some(0));
            }
            other => panic!("unexpected update {:?}", other),
        }
    }

    handle
        .export(LayoutOptions::new(true, true), LayoutMode::Grid, &path)
        .unwrap();
    let seen = export_updates(&mut updates).await;

    let progress: Vec<(usize, usize)> = seen
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::Progress { current, total, .. } => Some((*current, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec![(1, 2), (2, 2)]);

    match seen.last().unwrap() {
        SessionUpdate::ExportComplete {
            path: written,
            report,
        } => {
            assert_eq!(written, &path);
            assert_eq!(report.cards_placed, 2);
            assert_eq!(report.line_segments, 16);
        }
        other => panic!("unexpected update {:?}", other),
    }

    let doc = lopdf::Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_reported_and_session_survives() {
    let (handle, mut updates) = spawn_session();

    handle.assign(0, 0).unwrap();
    match next(&mut updates).await {
        SessionUpdate::Error { message } => assert!(message.contains("library"), "{}", message),
        other => panic!("unexpected update {:?}", other),
    }

    handle.clear(9).unwrap();
    match next(&mut updates).await {
        SessionUpdate::Error { message } => assert!(message.contains("slot"), "{}", message),
        other => panic!("unexpected update {:?}", other),
    }

    handle.add_image(card_png()).unwrap();
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::ImageAdded { index: 0 }
    ));
}

#[tokio::test]
async fn test_export_of_empty_grid_fails_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.pdf");
    let (handle, mut updates) = spawn_session();

    handle.add_image(card_png()).unwrap();
    next(&mut updates).await;

    handle
        .export(LayoutOptions::default(), LayoutMode::Grid, &path)
        .unwrap();
    let seen = export_updates(&mut updates).await;
    assert_eq!(seen.len(), 1);
    assert!(matches!(&seen[0], SessionUpdate::Error { .. }));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_undecodable_slot_becomes_warning() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.pdf");
    let (handle, mut updates) = spawn_session();

    handle.add_image(card_png()).unwrap();
    handle
        .add_image(ImagePayload::new(
            PayloadFormat::Png,
            b"\x89PNG\r\n\x1a\ntruncated".to_vec(),
        ))
        .unwrap();
    handle.assign(0, 0).unwrap();
    handle.assign(1, 1).unwrap();
    for _ in 0..4 {
        next(&mut updates).await;
    }

    handle
        .export(LayoutOptions::default(), LayoutMode::Grid, &path)
        .unwrap();
    let seen = export_updates(&mut updates).await;

    let warnings: Vec<&String> = seen
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::Warning { message } => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Slot 1"), "{}", warnings[0]);

    match seen.last().unwrap() {
        SessionUpdate::ExportComplete { report, .. } => {
            assert_eq!(report.cards_placed, 1);
            assert_eq!(report.skipped.len(), 1);
        }
        other => panic!("unexpected update {:?}", other),
    }
    assert!(path.exists());
}

#[tokio::test]
async fn test_cancelled_export_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cancelled.pdf");
    let (handle, mut updates) = spawn_session();

    handle.add_image(card_png()).unwrap();
    handle.assign(4, 0).unwrap();
    next(&mut updates).await;
    next(&mut updates).await;

    let cancel = CancelFlag::new();
    cancel.cancel();
    handle
        .send(SessionCommand::Export {
            options: LayoutOptions::default(),
            mode: LayoutMode::Grid,
            output_path: path.clone(),
            cancel,
        })
        .unwrap();

    let seen = export_updates(&mut updates).await;
    match seen.last().unwrap() {
        SessionUpdate::Error { message } => assert!(message.contains("cancelled"), "{}", message),
        other => panic!("unexpected update {:?}", other),
    }
    assert!(!path.exists());
}

#[tokio::test]
async fn test_reset_clears_grid_and_library() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("after-reset.pdf");
    let (handle, mut updates) = spawn_session();

    handle.add_image(card_png()).unwrap();
    handle.assign(2, 0).unwrap();
    handle.reset().unwrap();
    next(&mut updates).await;
    next(&mut updates).await;
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::SessionReset
    ));

    // Library indices start over after a reset
    handle.add_image(card_png()).unwrap();
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::ImageAdded { index: 0 }
    ));

    handle
        .export(LayoutOptions::default(), LayoutMode::Grid, &path)
        .unwrap();
    let seen = export_updates(&mut updates).await;
    assert!(matches!(seen.last(), Some(SessionUpdate::Error { .. })));
}

#[tokio::test]
async fn test_load_image_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("card.png");
    std::fs::write(&image_path, card_png().bytes()).unwrap();
    let missing = dir.path().join("missing.png");

    let (handle, mut updates) = spawn_session();
    handle.load_image(&image_path).unwrap();
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::ImageAdded { index: 0 }
    ));

    handle.load_image(Path::new(&missing)).unwrap();
    assert!(matches!(
        next(&mut updates).await,
        SessionUpdate::Error { .. }
    ));
}

#[tokio::test]
async fn test_handle_reports_stopped_worker() {
    let (command_tx, command_rx) = tokio::sync::mpsc::unbounded_channel();
    drop(command_rx);
    let handle = SessionHandle::new(command_tx);
    assert!(matches!(handle.reset(), Err(RuntimeError::WorkerGone)));
}
