//! Object key conventions shared with the people uploading to the reference bucket.
//! These strings must stay bit-exact; existing buckets depend on them.

use thiserror::Error;

pub const JOB_REQ_INFIX: &str = "JobReq";
pub const PDF_EXTENSION: &str = ".pdf";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("Job requirement filename '{filename}' does not match <initials>_JobReq_<Company>.pdf")]
    FilenameFormat { filename: String },
}

/// `{initials}_112025_Master.md`
pub fn master_profile_key(initials: &str) -> String {
    format!("{initials}_112025_Master.md")
}

/// `{initials}_career_context.md`
pub fn career_context_key(initials: &str) -> String {
    format!("{initials}_career_context.md")
}

/// Prefix every job requirement key starts with: `{initials}_JobReq_`.
pub fn job_req_prefix(initials: &str) -> String {
    format!("{initials}_{JOB_REQ_INFIX}_")
}

/// Output keys for one job requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputKeys {
    pub company: String,
    pub resume: String,
    pub cover_letter: String,
}

/// Company name = third `_`-delimited token of the filename, extension removed.
///
/// `VECP_JobReq_Acme.pdf` → `Acme`. Tokens after the third are ignored.
pub fn company_name(job_req_key: &str) -> Result<String, NamingError> {
    let format_error = || NamingError::FilenameFormat {
        filename: job_req_key.to_string(),
    };

    let token = job_req_key.split('_').nth(2).ok_or_else(format_error)?;
    let company = token.strip_suffix(PDF_EXTENSION).unwrap_or(token);

    if company.is_empty() {
        return Err(format_error());
    }
    Ok(company.to_string())
}

pub fn output_keys(initials: &str, job_req_key: &str) -> Result<OutputKeys, NamingError> {
    let company = company_name(job_req_key)?;
    Ok(OutputKeys {
        resume: format!("{initials}_{company}_R{PDF_EXTENSION}"),
        cover_letter: format!("{initials}_{company}_CL{PDF_EXTENSION}"),
        company,
    })
}
