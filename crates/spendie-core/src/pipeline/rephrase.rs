use std::collections::HashMap;

use tracing::warn;

use crate::models::CanonicalMessage;
use crate::prompts::PromptId;

use super::Pipeline;

impl Pipeline {
    /// Normalize an informal utterance into a canonical English sentence
    ///
    /// Never fails: any inference problem yields the original text.
    pub async fn rephrase(&self, utterance: &str) -> CanonicalMessage {
        if utterance.trim().is_empty() {
            return CanonicalMessage::unchanged(utterance);
        }

        let mut vars = HashMap::new();
        vars.insert("message", utterance);

        match self.run_prompt(PromptId::Rephrase, &vars, None, false).await {
            Ok(text) => CanonicalMessage::new(strip_wrapping(&text), utterance),
            Err(e) => {
                warn!(error = %e, "Rephrase failed, using original text");
                CanonicalMessage::unchanged(utterance)
            }
        }
    }
}

/// Drop an `Output:` label and surrounding quotes some models add
fn strip_wrapping(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("Output:")
        .or_else(|| text.strip_prefix("output:"))
        .unwrap_or(text)
        .trim();
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`').trim()
}
