// Markdown → paginated PDF.
// Pipeline: markup::parse_markdown → layout::layout → printpdf, all in memory.

pub mod font_metrics;
pub mod layout;
pub mod markup;
pub mod stylesheet;

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use thiserror::Error;
use tracing::debug;

pub use stylesheet::{Stylesheet, StylesheetSource};

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Stylesheet unavailable: {0}")]
    Stylesheet(String),

    #[error("Markup contains no renderable content")]
    EmptyDocument,

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// A finished PDF held in memory.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    stylesheet: StylesheetSource,
}

impl DocumentRenderer {
    pub fn new(stylesheet: StylesheetSource) -> Self {
        Self { stylesheet }
    }

    /// Renders markdown to PDF bytes. No filesystem writes.
    pub fn render(&self, title: &str, markup: &str) -> Result<RenderedDocument, RenderError> {
        let style = self.stylesheet.resolve()?;

        let blocks = markup::parse_markdown(markup);
        if blocks.iter().all(|b| matches!(b, markup::Block::Rule)) {
            return Err(RenderError::EmptyDocument);
        }

        let pages = layout::layout(&blocks, &style);
        let bytes = write_pdf(title, &pages, &style)?;

        debug!(
            "Rendered '{}': {} blocks, {} pages, {} bytes",
            title,
            blocks.len(),
            pages.len(),
            bytes.len()
        );

        Ok(RenderedDocument {
            bytes,
            page_count: pages.len(),
        })
    }
}

fn write_pdf(title: &str, pages: &[layout::Page], style: &Stylesheet) -> Result<Vec<u8>, RenderError> {
    let width = Mm(style.page_width_mm);
    let height = Mm(style.page_height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| RenderError::Pdf(format!("font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| RenderError::Pdf(format!("font error: {e}")))?;

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, format!("Layer {}", index + 1))
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for line in &page.lines {
            let font = if line.bold { &bold } else { &regular };
            layer.use_text(
                line.text.as_str(),
                line.size_pt,
                Mm(line.x_mm),
                Mm(line.y_mm),
                font,
            );
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Pdf(format!("save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| RenderError::Pdf(format!("buffer error: {e}")))
}
