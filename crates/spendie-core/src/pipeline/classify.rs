use std::collections::HashMap;

use tracing::warn;

use crate::models::{CanonicalMessage, ClassificationLabel};
use crate::prompts::PromptId;

use super::Pipeline;

impl Pipeline {
    /// Label a canonical message; every failure collapses to `Unknown`
    pub async fn classify(&self, message: &CanonicalMessage) -> ClassificationLabel {
        let mut vars = HashMap::new();
        vars.insert("message", message.as_str());

        match self
            .run_prompt(PromptId::ClassifyMessage, &vars, None, false)
            .await
        {
            Ok(raw) => parse_label(&raw).unwrap_or_else(|| {
                warn!(raw = %raw, "Classifier returned an unknown label");
                ClassificationLabel::Unknown
            }),
            Err(e) => {
                warn!(error = %e, "Classification failed, treating message as unknown");
                ClassificationLabel::Unknown
            }
        }
    }
}

/// Exact label match, case-insensitive and trimmed
pub(crate) fn parse_label(raw: &str) -> Option<ClassificationLabel> {
    match raw.trim().to_lowercase().as_str() {
        "transaction" => Some(ClassificationLabel::Transaction),
        "query" => Some(ClassificationLabel::Query),
        "balance" => Some(ClassificationLabel::Balance),
        "unknown" => Some(ClassificationLabel::Unknown),
        _ => None,
    }
}
