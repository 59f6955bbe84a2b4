use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("{what} index {index} out of range (len {len})")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Document write error: {0}")]
    DocumentWrite(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("Invalid crop: {0}")]
    InvalidCrop(String),
    #[error("Card grid is {total_mm}mm but the page is only {page_mm}mm")]
    GridOverflow { total_mm: f32, page_mm: f32 },
    #[error("No cards placed on the grid")]
    EmptyLayout,
    #[error("Export cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Which kind of sheet to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Up to nine cards on a 3×3 grid
    #[default]
    Grid,
    /// One card centered on the page
    SingleCard,
}

impl LayoutMode {
    pub fn default_filename(self) -> &'static str {
        match self {
            LayoutMode::Grid => crate::constants::DEFAULT_LAYOUT_FILENAME,
            LayoutMode::SingleCard => crate::constants::DEFAULT_CARDS_FILENAME,
        }
    }
}

/// A slot that was left out of an export
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSlot {
    pub slot: usize,
    pub reason: String,
}

/// Summary of a finished export
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportReport {
    /// Cards whose raster was embedded
    pub cards_placed: usize,
    /// Crop mark segments stroked
    pub line_segments: usize,
    /// Occupied slots that could not be rendered
    pub skipped: Vec<SkippedSlot>,
}

impl ExportReport {
    pub fn has_warnings(&self) -> bool {
        !self.skipped.is_empty()
    }
}
