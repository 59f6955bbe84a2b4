use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tcg_layout::*;

fn card_png(color: [u8; 4]) -> ImagePayload {
    let img = RgbaImage::from_pixel(9, 12, Rgba(color));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    ImagePayload::from_bytes(bytes).unwrap()
}

fn corrupt_png() -> ImagePayload {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(b"truncated");
    ImagePayload::new(PayloadFormat::Png, bytes)
}

fn compose(
    session: &LayoutSession,
    options: LayoutOptions,
    mode: LayoutMode,
) -> (Result<ExportReport>, InstructionRecorder) {
    let mut recorder = InstructionRecorder::new();
    let result = compose_page(
        &session.snapshot(),
        &options,
        mode,
        &mut recorder,
        &CancelFlag::new(),
    );
    (result, recorder)
}

fn image_origins(recorder: &InstructionRecorder) -> Vec<(usize, f32, f32)> {
    recorder
        .instructions
        .iter()
        .filter_map(|i| match i {
            DrawInstruction::Image { slot, rect, .. } => Some((*slot, rect.x, rect.y)),
            DrawInstruction::Line(_) => None,
        })
        .collect()
}

#[test]
fn test_two_cards_with_spacing_and_marks() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([255, 0, 0, 255]));
    let b = session.append_to_library(card_png([0, 0, 255, 255]));
    session.assign(0, a).unwrap();
    session.assign(3, b).unwrap();

    let (result, recorder) = compose(&session, LayoutOptions::new(true, true), LayoutMode::Grid);
    let report = result.unwrap();

    assert_eq!(recorder.image_count(), 2);
    assert_eq!(recorder.line_count(), 16);
    assert_eq!(report.cards_placed, 2);
    assert_eq!(report.line_segments, 16);
    assert!(!report.has_warnings());

    // startY = (297 - 274) / 2 = 11.5; row 1 adds 88 + 5
    assert_eq!(
        image_origins(&recorder),
        vec![(0, 5.5, 11.5), (3, 5.5, 104.5)]
    );
}

#[test]
fn test_image_precedes_its_marks() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([0, 255, 0, 255]));
    session.assign(2, a).unwrap();
    session.assign(7, a).unwrap();

    let (result, recorder) = compose(&session, LayoutOptions::new(false, true), LayoutMode::Grid);
    result.unwrap();

    let kinds: Vec<bool> = recorder
        .instructions
        .iter()
        .map(|i| matches!(i, DrawInstruction::Image { .. }))
        .collect();
    let mut expected = vec![true];
    expected.extend(std::iter::repeat_n(false, 8));
    expected.push(true);
    expected.extend(std::iter::repeat_n(false, 8));
    assert_eq!(kinds, expected);
}

#[test]
fn test_composition_is_deterministic() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([10, 20, 30, 255]));
    let b = session.append_to_library(card_png([30, 20, 10, 128]));
    session.assign(8, a).unwrap();
    session.assign(1, b).unwrap();
    session.assign(4, a).unwrap();

    let options = LayoutOptions::new(true, true);
    let (_, first) = compose(&session, options, LayoutMode::Grid);
    let (_, second) = compose(&session, options, LayoutMode::Grid);
    assert_eq!(first.instructions, second.instructions);

    let slots: Vec<usize> = image_origins(&first).iter().map(|o| o.0).collect();
    assert_eq!(slots, vec![1, 4, 8]);
}

#[test]
fn test_no_marks_when_disabled() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([1, 2, 3, 255]));
    session.assign(0, a).unwrap();

    let (result, recorder) = compose(&session, LayoutOptions::new(true, false), LayoutMode::Grid);
    assert_eq!(result.unwrap().line_segments, 0);
    assert_eq!(recorder.line_count(), 0);
    assert_eq!(recorder.image_count(), 1);
}

#[test]
fn test_rasters_are_print_size() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([1, 2, 3, 255]));
    session.assign(5, a).unwrap();

    let (_, recorder) = compose(&session, LayoutOptions::default(), LayoutMode::Grid);
    match &recorder.instructions[0] {
        DrawInstruction::Image {
            rect,
            width_px,
            height_px,
            ..
        } => {
            assert_eq!((*width_px, *height_px), (1488, 2079));
            assert_eq!((rect.width, rect.height), (63.0, 88.0));
            // Row 1, col 2 without spacing
            assert_eq!((rect.x, rect.y), (10.5 + 126.0, 16.5 + 88.0));
        }
        other => panic!("expected image, got {:?}", other),
    }
}

#[test]
fn test_empty_grid_emits_nothing() {
    let mut session = LayoutSession::new();
    session.append_to_library(card_png([0, 0, 0, 255]));
    assert!(session.is_empty());

    let (result, recorder) = compose(&session, LayoutOptions::new(true, true), LayoutMode::Grid);
    assert!(matches!(result, Err(LayoutError::EmptyLayout)));
    assert!(recorder.instructions.is_empty());
}

#[test]
fn test_corrupt_slot_is_skipped() {
    let mut session = LayoutSession::new();
    let good = session.append_to_library(card_png([200, 200, 0, 255]));
    let bad = session.append_to_library(corrupt_png());
    session.assign(0, good).unwrap();
    session.assign(1, bad).unwrap();
    session.assign(2, good).unwrap();

    let (result, recorder) = compose(&session, LayoutOptions::new(true, true), LayoutMode::Grid);
    let report = result.unwrap();

    assert_eq!(report.cards_placed, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].slot, 1);
    assert_eq!(recorder.image_count(), 2);
    assert_eq!(recorder.line_count(), 16);
    let slots: Vec<usize> = image_origins(&recorder).iter().map(|o| o.0).collect();
    assert_eq!(slots, vec![0, 2]);

    // The session itself is untouched by the failure
    assert_eq!(session.grid().slot(1), Some(bad));
}

#[test]
fn test_single_card_centered() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([9, 9, 9, 255]));
    let b = session.append_to_library(card_png([90, 90, 90, 255]));
    session.assign(4, a).unwrap();
    session.assign(6, b).unwrap();

    let (result, recorder) = compose(
        &session,
        LayoutOptions::new(true, true),
        LayoutMode::SingleCard,
    );
    result.unwrap();

    assert_eq!(image_origins(&recorder), vec![(4, 73.5, 104.5)]);
    assert_eq!(recorder.line_count(), 8);
}

#[test]
fn test_cancelled_before_first_slot() {
    let mut session = LayoutSession::new();
    let a = session.append_to_library(card_png([9, 9, 9, 255]));
    session.assign(0, a).unwrap();

    let cancel = CancelFlag::new();
    cancel.cancel();
    let mut recorder = InstructionRecorder::new();
    let result = compose_page(
        &session.snapshot(),
        &LayoutOptions::default(),
        LayoutMode::Grid,
        &mut recorder,
        &cancel,
    );
    assert!(matches!(result, Err(LayoutError::Cancelled)));
    assert!(recorder.instructions.is_empty());
}

#[test]
fn test_plan_does_not_decode() {
    let mut session = LayoutSession::new();
    let bad = session.append_to_library(corrupt_png());
    session.assign(8, bad).unwrap();

    let plan = plan_page(
        &session.snapshot(),
        &LayoutOptions::new(true, true),
        LayoutMode::Grid,
    )
    .unwrap();
    assert_eq!(plan.placements.len(), 1);
    assert_eq!(plan.line_count(), 8);
    assert_eq!(plan.placements[0].rect.x, 5.5 + 2.0 * 68.0);
}
