// All prompt constants for the tailoring pipeline.

/// Fixed system instruction sent with every generation request.
pub const TAILOR_SYSTEM: &str = "You are a professional resume writer. \
    Output only the final documents with no explanation or preamble.";

/// Label preceding the master profile in the composed request.
pub const MASTER_RESUME_LABEL: &str = "MASTER RESUME:";

/// Label preceding the extracted job posting in the composed request.
pub const JOB_REQUIREMENTS_LABEL: &str = "JOB REQUIREMENTS:";

/// Section marker the model places before the resume. Optional in responses.
pub const RESUME_MARKER: &str = "### TAILORED RESUME";

/// Section marker separating the resume from the cover letter. Required exactly once.
pub const COVER_LETTER_MARKER: &str = "### COVER LETTER";

/// Neutral spellings substituted for markers found inside source documents.
pub const RESUME_MARKER_NEUTRAL: &str = "### Tailored Resume";
pub const COVER_LETTER_MARKER_NEUTRAL: &str = "### Cover Letter";
