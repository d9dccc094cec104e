use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::ai::parsing::{as_amount, as_text, parse_json, AmountField};
use crate::models::{
    CanonicalMessage, Category, Confidence, ErrorRecord, ExtractedTransaction, Extraction,
};
use crate::prompts::PromptId;

use super::Pipeline;

/// Transaction object as the model emits it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTransaction {
    #[serde(rename = "type")]
    kind: Value,
    amount: Value,
    description: Value,
    category: Value,
    confidence: Value,
    #[serde(alias = "counterparty")]
    recipient_sender: Value,
    split_info: Value,
}

impl Pipeline {
    /// Turn a canonical transaction sentence into a structured draft
    ///
    /// Inference and parse failures come back as an [`ErrorRecord`]. Missing
    /// required fields stay `None`; the caller decides whether to persist.
    pub async fn extract_transaction(
        &self,
        message: &CanonicalMessage,
        original: &str,
    ) -> Extraction<ExtractedTransaction> {
        let mut vars = HashMap::new();
        vars.insert("message", message.as_str());

        let raw: RawTransaction = self
            .run_prompt(PromptId::ExtractTransaction, &vars, None, true)
            .await
            .and_then(|response| parse_json(&response))
            .map_err(|e| {
                warn!(error = %e, "Transaction extraction failed");
                ErrorRecord::new(format!("Could not parse transaction: {}", e))
            })?;

        Ok(draft_from_raw(raw, message.as_str(), original))
    }
}

fn draft_from_raw(raw: RawTransaction, canonical: &str, original: &str) -> ExtractedTransaction {
    let amount = match as_amount(&raw.amount) {
        AmountField::Value(v) => Some(v),
        AmountField::Missing => None,
        AmountField::Malformed => {
            warn!(amount = %raw.amount, "Ignoring non-numeric amount");
            None
        }
    };

    ExtractedTransaction {
        kind: as_text(&raw.kind).and_then(|k| k.parse().ok()),
        amount,
        description: as_text(&raw.description),
        category: Category::from_label(as_text(&raw.category).as_deref()),
        confidence: Confidence::from_label(as_text(&raw.confidence).as_deref()),
        counterparty: as_text(&raw.recipient_sender),
        split_info: as_text(&raw.split_info),
        original_text: original.to_string(),
        canonical_text: canonical.to_string(),
    }
}
