//! Single-page PDF writer
//!
//! Layout code works in millimeters from the top-left corner; PDF user space
//! is points from the bottom-left. The conversion happens here and nowhere
//! else.

use crate::compose::PageSink;
use crate::constants::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM, mm_to_pt};
use crate::layout::{LineSegment, Rect};
use crate::normalize::PrintRaster;
use crate::payload::PayloadFormat;
use crate::types::{LayoutError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Builds one A4 page from draw calls
pub struct PdfPageWriter {
    doc: Document,
    pages_id: ObjectId,
    xobjects: Dictionary,
    content: String,
    image_count: usize,
    line_width_pt: Option<f32>,
}

impl Default for PdfPageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfPageWriter {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            xobjects: Dictionary::new(),
            // Marks are always black
            content: String::from("0 0 0 RG\n"),
            image_count: 0,
            line_width_pt: None,
        }
    }

    /// Number of images embedded so far
    pub fn image_count(&self) -> usize {
        self.image_count
    }

    /// Assemble the page tree and serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), self.content.into_bytes()));

        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(self.xobjects));

        let page_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(mm_to_pt(PAGE_WIDTH_MM)),
                    Object::Real(mm_to_pt(PAGE_HEIGHT_MM)),
                ]),
            ),
            ("Resources", Object::Dictionary(resources)),
            ("Contents", Object::Reference(content_id)),
        ]));

        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ("Count", Object::Integer(1)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| LayoutError::DocumentWrite(e.to_string()))?;
        Ok(bytes)
    }
}

impl PageSink for PdfPageWriter {
    fn place_image(&mut self, _slot: usize, rect: &Rect, raster: &PrintRaster) -> Result<()> {
        let payload = raster.payload();
        if payload.format() != PayloadFormat::Jpeg {
            return Err(LayoutError::DocumentWrite(format!(
                "card rasters must be JPEG, got {}",
                payload.format().name()
            )));
        }

        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"XObject".to_vec()));
        dict.set("Subtype", Object::Name(b"Image".to_vec()));
        dict.set("Width", Object::Integer(raster.width() as i64));
        dict.set("Height", Object::Integer(raster.height() as i64));
        dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
        dict.set("BitsPerComponent", Object::Integer(8));
        dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

        let image_id = self
            .doc
            .add_object(Stream::new(dict, payload.bytes().to_vec()));

        let name = format!("Im{}", self.image_count);
        self.xobjects
            .set(name.as_bytes(), Object::Reference(image_id));
        self.content.push_str(&image_placement_command(&name, rect));
        self.image_count += 1;

        Ok(())
    }

    fn stroke_line(&mut self, line: &LineSegment) -> Result<()> {
        let width_pt = mm_to_pt(line.thickness);
        if self.line_width_pt != Some(width_pt) {
            self.content.push_str(&format!("{:.3} w\n", width_pt));
            self.line_width_pt = Some(width_pt);
        }
        self.content.push_str(&line_command(line));
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// PDF y coordinate of a page y measured downward in millimeters
fn pdf_y(y_mm: f32) -> f32 {
    mm_to_pt(PAGE_HEIGHT_MM - y_mm)
}

/// Generate the content stream command to draw an image XObject in `rect`.
fn image_placement_command(xobject_name: &str, rect: &Rect) -> String {
    format!(
        "q {:.3} 0 0 {:.3} {:.3} {:.3} cm /{} Do Q\n",
        mm_to_pt(rect.width),
        mm_to_pt(rect.height),
        mm_to_pt(rect.x),
        pdf_y(rect.bottom()),
        xobject_name
    )
}

fn line_command(line: &LineSegment) -> String {
    format!(
        "{:.3} {:.3} m {:.3} {:.3} l S\n",
        mm_to_pt(line.from.x),
        pdf_y(line.from.y),
        mm_to_pt(line.to.x),
        pdf_y(line.to.y)
    )
}
