//! Block list → positioned lines on fixed-size pages.
//!
//! Coordinates are millimetres with the origin at the bottom-left corner of
//! the page, which is what the PDF writer expects. The cursor walks down from
//! the top margin; a line that would cross the bottom margin starts a new page.

use super::font_metrics::metrics;
use super::markup::Block;
use super::stylesheet::{Stylesheet, PT_TO_MM};

/// One run of text at a fixed position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    /// Baseline, measured up from the bottom edge.
    pub y_mm: f32,
    pub size_pt: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

/// Baseline sits this fraction of the font size below the top of the line box.
const ASCENT: f32 = 0.8;

struct Cursor<'a> {
    style: &'a Stylesheet,
    pages: Vec<Page>,
    /// Distance from the top edge of the current page.
    offset_mm: f32,
}

impl<'a> Cursor<'a> {
    fn new(style: &'a Stylesheet) -> Self {
        Self {
            style,
            pages: vec![Page::default()],
            offset_mm: style.margin_top_mm,
        }
    }

    fn at_page_top(&self) -> bool {
        self.pages.last().is_some_and(|p| p.lines.is_empty())
    }

    /// Vertical gap; swallowed at the top of a page.
    fn space(&mut self, mm: f32) {
        if !self.at_page_top() {
            self.offset_mm += mm;
        }
    }

    fn ensure_room(&mut self, height_mm: f32) {
        let limit = self.style.page_height_mm - self.style.margin_bottom_mm;
        if self.offset_mm + height_mm > limit && !self.at_page_top() {
            self.pages.push(Page::default());
            self.offset_mm = self.style.margin_top_mm;
        }
    }

    /// Places one line box; `runs` share the baseline (marker + text).
    fn place(&mut self, runs: Vec<(String, f32)>, size_pt: f32, bold: bool) {
        let line_height = size_pt * self.style.line_height * PT_TO_MM;
        self.ensure_room(line_height);

        let baseline = self.style.page_height_mm - (self.offset_mm + size_pt * ASCENT * PT_TO_MM);
        if let Some(page) = self.pages.last_mut() {
            for (text, x_mm) in runs {
                page.lines.push(PlacedLine {
                    text,
                    x_mm,
                    y_mm: baseline,
                    size_pt,
                    bold,
                });
            }
        }
        self.offset_mm += line_height;
    }

    fn finish(self) -> Vec<Page> {
        self.pages
    }
}

pub fn layout(blocks: &[Block], style: &Stylesheet) -> Vec<Page> {
    let mut cursor = Cursor::new(style);
    let left = style.margin_left_mm;
    let width = style.content_width_mm();

    for block in blocks {
        match block {
            Block::Heading { level, text } => {
                let size = match level {
                    1 => style.h1_size_pt,
                    2 => style.h2_size_pt,
                    _ => style.h3_size_pt,
                };
                cursor.space(style.heading_spacing_mm);
                for line in metrics(true).wrap(text, size, width) {
                    cursor.place(vec![(line, left)], size, true);
                }
                cursor.space(style.heading_spacing_mm / 2.0);
            }
            Block::Paragraph { text, bold } => {
                for line in metrics(*bold).wrap(text, style.body_size_pt, width) {
                    cursor.place(vec![(line, left)], style.body_size_pt, *bold);
                }
                cursor.space(style.paragraph_spacing_mm);
            }
            Block::ListItem {
                marker,
                depth,
                text,
            } => {
                let marker_x = left + style.bullet_indent_mm * f32::from(depth.saturating_sub(1));
                let text_x = marker_x + style.bullet_indent_mm;
                let text_width = (left + width - text_x).max(style.bullet_indent_mm);

                let lines = metrics(false).wrap(text, style.body_size_pt, text_width);
                for (i, line) in lines.into_iter().enumerate() {
                    let mut runs = Vec::with_capacity(2);
                    if i == 0 {
                        runs.push((marker.clone(), marker_x));
                    }
                    runs.push((line, text_x));
                    cursor.place(runs, style.body_size_pt, false);
                }
                cursor.space(style.paragraph_spacing_mm / 3.0);
            }
            Block::Rule => cursor.space(style.paragraph_spacing_mm * 2.0),
        }
    }

    cursor.finish()
}
