//! Message interpretation pipeline
//!
//! Text: rephrase -> classify -> extract (transaction or query).
//! Screenshot: extract -> validate -> enhance description.
//!
//! Each stage owns its fallback policy:
//!
//! | Stage                 | On inference/parse failure          |
//! |-----------------------|-------------------------------------|
//! | rephrase              | original text                       |
//! | classify              | `unknown`                           |
//! | transaction extractor | `ErrorRecord`                       |
//! | query extractor       | `ErrorRecord`                       |
//! | screenshot extractor  | sentinel record (amount 0, low)     |
//!
//! Nothing here holds mutable state between runs, so one `Pipeline` can serve
//! concurrent requests.

mod classify;
pub mod dates;
mod enhance;
mod query;
mod rephrase;
pub mod screenshot;
mod transaction;
mod validate;

pub use enhance::enhance_description;
pub use screenshot::ScreenshotInput;
pub use validate::{validate, validate_amount_field, Validation};

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

use crate::ai::{AIClient, ImageInput, InferenceBackend, InferenceRequest};
use crate::error::{Error, Result};
use crate::models::{
    ClassificationLabel, ErrorRecord, ExtractedTransaction, QuerySpec, TransactionRecord,
};
use crate::prompts::{PromptId, PromptLibrary};

/// What the pipeline made of one text message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PipelineOutcome {
    Transaction(ExtractedTransaction),
    Query(QuerySpec),
    /// Balance request marker; the handler reads aggregates itself
    Balance,
    Unknown,
    Error(ErrorRecord),
}

impl PipelineOutcome {
    pub fn label(&self) -> Option<ClassificationLabel> {
        match self {
            Self::Transaction(_) => Some(ClassificationLabel::Transaction),
            Self::Query(_) => Some(ClassificationLabel::Query),
            Self::Balance => Some(ClassificationLabel::Balance),
            Self::Unknown => Some(ClassificationLabel::Unknown),
            Self::Error(_) => None,
        }
    }
}

/// A processed text message with provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedMessage {
    pub original_text: String,
    pub canonical_text: String,
    pub processed_at: NaiveDateTime,
    pub outcome: PipelineOutcome,
}

impl ProcessedMessage {
    /// Whether rephrasing changed the text (beyond whitespace/case)
    pub fn was_rephrased(&self) -> bool {
        self.original_text.trim().to_lowercase() != self.canonical_text.trim().to_lowercase()
    }
}

/// A processed screenshot: the record plus the validator's verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedScreenshot {
    pub record: TransactionRecord,
    pub validation: Validation,
    pub processed_at: NaiveDateTime,
}

/// The interpretation pipeline
///
/// Cheap to clone; clones share the prompt cache.
#[derive(Clone)]
pub struct Pipeline {
    ai: AIClient,
    prompts: Arc<RwLock<PromptLibrary>>,
}

impl Pipeline {
    /// Create a pipeline with the default prompt library (overrides enabled)
    pub fn new(ai: AIClient) -> Self {
        Self::with_prompts(ai, PromptLibrary::new())
    }

    pub fn with_prompts(ai: AIClient, prompts: PromptLibrary) -> Self {
        Self {
            ai,
            prompts: Arc::new(RwLock::new(prompts)),
        }
    }

    pub fn ai(&self) -> &AIClient {
        &self.ai
    }

    /// Run a text message through every stage, dated now
    pub async fn process_text(&self, text: &str) -> ProcessedMessage {
        self.process_text_at(text, Local::now().naive_local()).await
    }

    /// Run a text message with an explicit reference time
    pub async fn process_text_at(&self, text: &str, now: NaiveDateTime) -> ProcessedMessage {
        let canonical = self.rephrase(text).await;
        let label = self.classify(&canonical).await;
        debug!(label = %label, canonical = %canonical, "Message classified");

        let outcome = match label {
            ClassificationLabel::Transaction => {
                match self.extract_transaction(&canonical, text).await {
                    Ok(txn) => PipelineOutcome::Transaction(txn),
                    Err(err) => PipelineOutcome::Error(err),
                }
            }
            ClassificationLabel::Query => match self.extract_query(&canonical, now.date()).await {
                Ok(spec) => PipelineOutcome::Query(spec),
                Err(err) => PipelineOutcome::Error(err),
            },
            ClassificationLabel::Balance => PipelineOutcome::Balance,
            ClassificationLabel::Unknown => PipelineOutcome::Unknown,
        };

        ProcessedMessage {
            original_text: text.to_string(),
            canonical_text: canonical.as_str().to_string(),
            processed_at: now,
            outcome,
        }
    }

    /// Screenshot path: extract, validate, and enhance valid records
    pub async fn process_screenshot(
        &self,
        input: &ScreenshotInput,
        caption: Option<&str>,
    ) -> ProcessedScreenshot {
        let mut record = self.extract_screenshot(input, caption).await;
        let validation = validate(Some(&record));
        if validation.is_valid {
            record.description = enhance_description(&record, caption);
        }
        ProcessedScreenshot {
            record,
            validation,
            processed_at: Local::now().naive_local(),
        }
    }

    /// Render a prompt and send it to the inference service
    async fn run_prompt(
        &self,
        id: PromptId,
        vars: &HashMap<&str, &str>,
        image: Option<ImageInput>,
        json_mode: bool,
    ) -> Result<String> {
        let (system, user, temperature) = {
            let mut prompts = self
                .prompts
                .write()
                .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
            let prompt = prompts.get(id)?;
            (
                prompt.render_system(vars),
                prompt.render_user(vars),
                prompt.metadata.temperature,
            )
        };

        let mut request = InferenceRequest::new(id.as_str(), &system, &user).temperature(temperature);
        if json_mode {
            request = request.json();
        }
        if let Some(image) = image {
            request = request.with_image(image);
        }

        self.ai.infer(&request).await
    }
}
