//! PDF rendering for card sheets
//!
//! This module handles all PDF-specific operations:
//! - Building the one-page A4 document skeleton
//! - Embedding card rasters as JPEG image XObjects
//! - Writing placement and stroke operators in PDF user space

mod page;

pub use page::PdfPageWriter;
