//! Splits the raw generation output into the resume and the cover letter.

use thiserror::Error;

use crate::generation::prompts::{COVER_LETTER_MARKER, RESUME_MARKER};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// The two labeled sections of a generation result, as markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TailoredDocuments {
    pub resume: String,
    pub cover_letter: String,
}

/// Parses `### TAILORED RESUME … ### COVER LETTER …` output.
///
/// The cover-letter marker must appear exactly once and both sections must be
/// non-empty after trimming. Resume labels are optional and all of them are removed.
pub fn parse(result_text: &str) -> Result<TailoredDocuments, ParseError> {
    let marker_count = result_text.matches(COVER_LETTER_MARKER).count();
    if marker_count != 1 {
        return Err(ParseError::MalformedResponse(format!(
            "expected exactly one {COVER_LETTER_MARKER:?} marker, found {marker_count}"
        )));
    }

    let (before, after) = result_text
        .split_once(COVER_LETTER_MARKER)
        .ok_or_else(|| {
            ParseError::MalformedResponse(format!("missing {COVER_LETTER_MARKER:?} marker"))
        })?;

    let resume = before.replace(RESUME_MARKER, "").trim().to_string();
    let cover_letter = after.trim().to_string();

    if resume.is_empty() {
        return Err(ParseError::MalformedResponse(
            "resume section is empty".to_string(),
        ));
    }
    if cover_letter.is_empty() {
        return Err(ParseError::MalformedResponse(
            "cover letter section is empty".to_string(),
        ));
    }

    Ok(TailoredDocuments {
        resume,
        cover_letter,
    })
}
