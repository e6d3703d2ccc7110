//! Builds the single generation request from the three source texts.

use tracing::warn;

use crate::generation::prompts::{
    COVER_LETTER_MARKER, COVER_LETTER_MARKER_NEUTRAL, JOB_REQUIREMENTS_LABEL, MASTER_RESUME_LABEL,
    RESUME_MARKER, RESUME_MARKER_NEUTRAL,
};

/// The composed user message. Built once per job, consumed once by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
}

/// Composes: career context, then the labeled master profile, then the labeled job text.
///
/// Response markers appearing inside any source are rewritten to a neutral
/// spelling first, so the parser only ever sees markers the model produced.
pub fn compose(context_text: &str, profile_text: &str, job_text: &str) -> GenerationRequest {
    let context = neutralize_markers("career context", context_text);
    let profile = neutralize_markers("master profile", profile_text);
    let job = neutralize_markers("job requirements", job_text);

    GenerationRequest {
        text: format!(
            "{context}\n\n{MASTER_RESUME_LABEL}\n{profile}\n\n{JOB_REQUIREMENTS_LABEL}\n{job}\n"
        ),
    }
}

fn neutralize_markers(source: &str, text: &str) -> String {
    let mut out = text.to_string();
    for (marker, neutral) in [
        (RESUME_MARKER, RESUME_MARKER_NEUTRAL),
        (COVER_LETTER_MARKER, COVER_LETTER_MARKER_NEUTRAL),
    ] {
        if out.contains(marker) {
            warn!("{source} contains the response marker {marker:?}; rewriting it as {neutral:?}");
            out = out.replace(marker, neutral);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_orders_sections() {
        let request = compose(
            "Write in a confident voice.",
            "# Jane Doe\nRust engineer",
            "Looking for a backend engineer",
        );

        let context_at = request.text.find("confident voice").unwrap();
        let master_at = request.text.find("MASTER RESUME:").unwrap();
        let profile_at = request.text.find("Jane Doe").unwrap();
        let job_label_at = request.text.find("JOB REQUIREMENTS:").unwrap();
        let job_at = request.text.find("backend engineer").unwrap();

        assert!(context_at < master_at);
        assert!(master_at < profile_at);
        assert!(profile_at < job_label_at);
        assert!(job_label_at < job_at);
    }

    #[test]
    fn test_compose_passes_ordinary_text_verbatim() {
        let request = compose("ctx <b>{x}</b>", "## Skills\n- Rust", "100% remote");
        assert!(request.text.contains("ctx <b>{x}</b>"));
        assert!(request.text.contains("## Skills\n- Rust"));
        assert!(request.text.contains("100% remote"));
    }

    #[test]
    fn test_compose_neutralizes_embedded_markers() {
        let request = compose(
            "Always end with ### COVER LETTER",
            "### TAILORED RESUME\nJane",
            "job",
        );
        assert!(!request.text.contains(COVER_LETTER_MARKER));
        assert!(!request.text.contains(RESUME_MARKER));
        assert!(request.text.contains(COVER_LETTER_MARKER_NEUTRAL));
        assert!(request.text.contains(RESUME_MARKER_NEUTRAL));
    }
}
