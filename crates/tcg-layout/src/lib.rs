mod cancel;
pub mod compose;
pub mod constants;
mod crop;
mod export;
pub mod layout;
mod normalize;
mod options;
mod payload;
pub mod render;
mod session;
mod types;

pub use cancel::CancelFlag;
pub use compose::{
    CardPlacement, DrawInstruction, InstructionRecorder, PagePlan, PageSink, compose_page,
    plan_page,
};
pub use crop::{CARD_ASPECT, CropRequest, PixelRect, crop_to_card};
pub use export::{
    ExportOutput, ExportProgress, generate_pdf, render_pdf, render_pdf_blocking, save_pdf,
};
pub use normalize::{PrintRaster, RESAMPLE_FILTER, normalize_for_print, normalize_to};
pub use options::LayoutOptions;
pub use payload::{ImagePayload, PayloadFormat, load_image};
pub use session::{
    Grid, Library, LibraryIndex, LayoutSession, LayoutSnapshot, SlotImage, slot_index,
    slot_position,
};
pub use types::*;
