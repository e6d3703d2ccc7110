//! Page and typography settings for rendered documents.
//!
//! The stylesheet is an external JSON resource so the look of every generated
//! PDF can change without a rebuild. It is read on each render.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::RenderError;

/// Points per millimetre conversion used by all layout math.
pub const PT_TO_MM: f32 = 0.352_778;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stylesheet {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_top_mm: f32,
    pub margin_bottom_mm: f32,
    pub margin_left_mm: f32,
    pub margin_right_mm: f32,
    pub body_size_pt: f32,
    pub h1_size_pt: f32,
    pub h2_size_pt: f32,
    pub h3_size_pt: f32,
    /// Baseline-to-baseline distance as a multiple of the font size.
    pub line_height: f32,
    pub paragraph_spacing_mm: f32,
    pub heading_spacing_mm: f32,
    pub bullet_indent_mm: f32,
}

impl Default for Stylesheet {
    /// US letter, 0.75" side margins, 10.5pt body.
    fn default() -> Self {
        Self {
            page_width_mm: 215.9,
            page_height_mm: 279.4,
            margin_top_mm: 18.0,
            margin_bottom_mm: 18.0,
            margin_left_mm: 19.05,
            margin_right_mm: 19.05,
            body_size_pt: 10.5,
            h1_size_pt: 18.0,
            h2_size_pt: 13.0,
            h3_size_pt: 11.5,
            line_height: 1.3,
            paragraph_spacing_mm: 2.5,
            heading_spacing_mm: 3.5,
            bullet_indent_mm: 5.0,
        }
    }
}

impl Stylesheet {
    pub fn content_width_mm(&self) -> f32 {
        self.page_width_mm - self.margin_left_mm - self.margin_right_mm
    }

    pub fn content_height_mm(&self) -> f32 {
        self.page_height_mm - self.margin_top_mm - self.margin_bottom_mm
    }

    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let sheet: Stylesheet = serde_json::from_str(json)
            .map_err(|e| RenderError::Stylesheet(format!("invalid stylesheet JSON: {e}")))?;
        sheet.validate()?;
        Ok(sheet)
    }

    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RenderError::Stylesheet(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    /// Rejects sheets that would leave no room for even one body line.
    fn validate(&self) -> Result<(), RenderError> {
        let sizes = [
            self.body_size_pt,
            self.h1_size_pt,
            self.h2_size_pt,
            self.h3_size_pt,
            self.line_height,
        ];
        if sizes.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(RenderError::Stylesheet(
                "font sizes and line height must be positive".to_string(),
            ));
        }

        let tallest_line = self.h1_size_pt.max(self.body_size_pt) * self.line_height * PT_TO_MM;
        if self.content_width_mm() <= self.bullet_indent_mm || self.content_height_mm() < tallest_line
        {
            return Err(RenderError::Stylesheet(
                "margins leave no usable content area".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the renderer gets its stylesheet from.
#[derive(Debug, Clone)]
pub enum StylesheetSource {
    /// JSON file read on every render. Missing files fail the render.
    File(PathBuf),
    #[cfg(test)]
    Inline(Stylesheet),
}

impl StylesheetSource {
    pub fn resolve(&self) -> Result<Stylesheet, RenderError> {
        match self {
            StylesheetSource::File(path) => Stylesheet::load(path),
            #[cfg(test)]
            StylesheetSource::Inline(sheet) => Ok(sheet.clone()),
        }
    }
}
