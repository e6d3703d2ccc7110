//! Fixtures shared by the pipeline and batch tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use lopdf::dictionary;
use lopdf::{Document, Object, Stream};

use super::ApplicationPipeline;
use crate::batch::selector::local_today;
use crate::config::PipelineSettings;
use crate::generation::composer::GenerationRequest;
use crate::llm_client::{GenerationFailure, TextGenerator};
use crate::render::{DocumentRenderer, Stylesheet, StylesheetSource};
use crate::storage::memory::MemoryObjectStore;

pub const REFERENCE_BUCKET: &str = "refs";
pub const OUTPUT_BUCKET: &str = "out";
pub const INITIALS: &str = "VECP";

pub const WELL_FORMED_RESPONSE: &str =
    "### TAILORED RESUME\nJane Doe Resume\n### COVER LETTER\nDear Hiring Manager...";

/// Single-page PDF with one line of Helvetica text.
pub fn job_pdf(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.4");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        },
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });
    if let Ok(Object::Dictionary(ref mut page)) = doc.get_object_mut(page_id) {
        page.set("Parent", pages_id);
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn noon_today_utc() -> DateTime<Utc> {
    local_today()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .unwrap()
        .with_timezone(&Utc)
}

/// Reference bucket holding a profile, a career context and `VECP_JobReq_Acme.pdf`.
pub fn seeded_store() -> Arc<MemoryObjectStore> {
    let store = Arc::new(MemoryObjectStore::new());
    store.insert(
        REFERENCE_BUCKET,
        "VECP_112025_Master.md",
        "# Jane Doe\n\n## Experience\n- Built payment APIs in Rust",
    );
    store.insert(
        REFERENCE_BUCKET,
        "VECP_career_context.md",
        "Write in a direct voice. Produce a resume and a cover letter.",
    );
    add_job(&store, "VECP_JobReq_Acme.pdf");
    store
}

pub fn add_job(store: &MemoryObjectStore, key: &str) {
    store.insert_modified(
        REFERENCE_BUCKET,
        key,
        job_pdf("Looking for a backend engineer"),
        Some(noon_today_utc()),
    );
}

pub fn pipeline(
    store: Arc<MemoryObjectStore>,
    generator: Arc<dyn TextGenerator>,
) -> ApplicationPipeline {
    ApplicationPipeline::new(
        PipelineSettings {
            reference_bucket: REFERENCE_BUCKET.to_string(),
            output_bucket: OUTPUT_BUCKET.to_string(),
            initials: INITIALS.to_string(),
        },
        store,
        generator,
        DocumentRenderer::new(StylesheetSource::Inline(Stylesheet::default())),
    )
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    /// Fails the way an unreachable endpoint does.
    TransportError,
}

/// Replays scripted replies in order; the last reply repeats once the script runs out.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Scripted>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn sequence(replies: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            last: Mutex::new(None),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn always(text: &str) -> Self {
        Self::sequence(vec![Scripted::Text(text.to_string())])
    }

    pub fn failing() -> Self {
        Self::sequence(vec![Scripted::TransportError])
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationFailure> {
        self.prompts.lock().unwrap().push(request.text.clone());

        let next = self.script.lock().unwrap().pop_front();
        let reply = match next {
            Some(reply) => {
                *self.last.lock().unwrap() = Some(reply.clone());
                reply
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or(Scripted::TransportError),
        };

        match reply {
            Scripted::Text(text) => Ok(text),
            Scripted::TransportError => Err(transport_error()),
        }
    }
}

/// A genuine `reqwest::Error`, built from a request that cannot be constructed.
fn transport_error() -> GenerationFailure {
    let err = reqwest::Client::new()
        .post("http://exa mple.invalid:notaport/v1/messages")
        .build()
        .unwrap_err();
    GenerationFailure::Transport(err)
}
