//! Low-level PDF assembly on top of lopdf.
//!
//! `PdfBuilder` owns the object table, shared font resources, and page
//! tree; `PageContent` accumulates content-stream operators for one page.
//! Text is written with the standard Helvetica fonts in WinAnsi encoding,
//! which covers the Latin-1 range the invoice text needs (umlauts).

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::RenderError;

pub(crate) const PAGE_WIDTH: f64 = 595.0;
pub(crate) const PAGE_HEIGHT: f64 = 842.0;

/// Fonts registered in the shared page resources.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

/// Accumulates a multi-page document.
pub(crate) struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
        });

        Self {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
        }
    }

    /// Closes one page and appends it to the page tree.
    pub fn push_page(&mut self, content: PageContent) {
        let stream = Stream::new(dictionary! {}, content.ops);
        let content_id = self.doc.add_object(Object::Stream(stream));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => self.resources_id,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Finalizes the page tree and serializes the document.
    pub fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| id.into()).collect();
        let count = self.page_ids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(bytes)
    }
}

/// Content-stream operators for a single page.
#[derive(Default)]
pub(crate) struct PageContent {
    ops: Vec<u8>,
}

impl PageContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws one line of black text with its baseline at `(x, y)`.
    pub fn text(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        self.text_gray(font, size, x, y, 0.0, text);
    }

    /// Draws one line of text with the given fill gray (0 black, 1 white).
    pub fn text_gray(&mut self, font: Font, size: f64, x: f64, y: f64, gray: f64, text: &str) {
        self.ops.extend_from_slice(
            format!(
                "{gray} g BT /{} {size} Tf {x:.2} {y:.2} Td (",
                font.resource_name()
            )
            .as_bytes(),
        );
        self.ops.extend_from_slice(&escape_text(text));
        self.ops.extend_from_slice(b") Tj ET 0 g\n");
    }

    /// Strokes a straight line.
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64) {
        self.ops.extend_from_slice(
            format!("{width} w {x1:.2} {y1:.2} m {x2:.2} {y2:.2} l S\n").as_bytes(),
        );
    }

    /// Fills a rectangle with a gray level.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, gray: f64) {
        self.ops.extend_from_slice(
            format!("{gray} g {x:.2} {y:.2} {w:.2} {h:.2} re f 0 g\n").as_bytes(),
        );
    }
}

/// Escapes text for a PDF literal string in WinAnsi encoding.
///
/// Latin-1 characters become octal escapes; anything outside that range
/// is replaced, since the standard fonts cannot show it anyway.
fn escape_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => out.extend_from_slice(b"\\("),
            ')' => out.extend_from_slice(b"\\)"),
            '\\' => out.extend_from_slice(b"\\\\"),
            c if c.is_ascii_control() => out.push(b' '),
            c if c.is_ascii() => out.push(c as u8),
            c => {
                let code = c as u32;
                if (0xA0..=0xFF).contains(&code) {
                    out.extend_from_slice(format!("\\{:03o}", code).as_bytes());
                } else {
                    out.push(b'?');
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_ascii() {
        assert_eq!(escape_text("Pipe repair"), b"Pipe repair");
    }

    #[test]
    fn test_escape_delimiters() {
        assert_eq!(escape_text("(a) \\ b"), b"\\(a\\) \\\\ b".to_vec());
    }

    #[test]
    fn test_escape_umlauts_to_octal() {
        // Ü is 0xDC in Latin-1 / WinAnsi.
        assert_eq!(escape_text("Ü"), b"\\334".to_vec());
        assert_eq!(escape_text("ä"), b"\\344".to_vec());
    }

    #[test]
    fn test_escape_replaces_out_of_range() {
        assert_eq!(escape_text("€"), b"?".to_vec());
        assert_eq!(escape_text("日"), b"?".to_vec());
    }

    #[test]
    fn test_build_and_extract_round_trip() {
        let mut builder = PdfBuilder::new();

        let mut page = PageContent::new();
        page.text(Font::Regular, 12.0, 50.0, 700.0, "Hello Invoice");
        builder.push_page(page);

        let mut page = PageContent::new();
        page.text(Font::Bold, 12.0, 50.0, 700.0, "Second Page");
        builder.push_page(page);

        assert_eq!(builder.page_count(), 2);
        let bytes = builder.finish().unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);

        let mut text = String::new();
        for (page_num, _) in doc.get_pages() {
            text.push_str(&doc.extract_text(&[page_num]).unwrap());
        }
        assert!(text.contains("Hello Invoice"));
        assert!(text.contains("Second Page"));
    }
}
