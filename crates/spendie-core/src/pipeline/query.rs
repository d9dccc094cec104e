use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::ai::parsing::{as_text, parse_json};
use crate::models::{
    AmountFilter, CanonicalMessage, Confidence, ErrorRecord, Extraction, QueryIntent, QuerySpec,
    TxnType,
};
use crate::prompts::PromptId;

use super::dates::resolve_range;
use super::Pipeline;

/// Query object as the model emits it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawQuery {
    intent: Value,
    #[serde(rename = "type")]
    txn_type: Value,
    category: Value,
    keywords: Value,
    amount_filter: Value,
    start_date: Value,
    end_date: Value,
    confidence: Value,
}

impl Pipeline {
    /// Turn a canonical query sentence into filter parameters
    ///
    /// Candidate dates are resolved against `today` before returning, so the
    /// returned query never carries relative tokens.
    pub async fn extract_query(
        &self,
        message: &CanonicalMessage,
        today: NaiveDate,
    ) -> Extraction<QuerySpec> {
        let today_str = today.format("%Y-%m-%d").to_string();
        let mut vars = HashMap::new();
        vars.insert("message", message.as_str());
        vars.insert("today", today_str.as_str());

        let raw: RawQuery = self
            .run_prompt(PromptId::ExtractQuery, &vars, None, true)
            .await
            .and_then(|response| parse_json(&response))
            .map_err(|e| {
                warn!(error = %e, "Query extraction failed");
                ErrorRecord::new(format!("Could not parse query: {}", e))
            })?;

        Ok(spec_from_raw(raw, today))
    }
}

fn spec_from_raw(raw: RawQuery, today: NaiveDate) -> QuerySpec {
    let mut confidence = Confidence::from_label(as_text(&raw.confidence).as_deref());

    let resolution = resolve_range(
        as_text(&raw.start_date).as_deref(),
        as_text(&raw.end_date).as_deref(),
        today,
    );
    if resolution.unrecognised {
        warn!(
            start = %raw.start_date,
            end = %raw.end_date,
            "Unrecognised date expression, dropping date range"
        );
        confidence = Confidence::Low;
    }

    QuerySpec {
        intent: as_text(&raw.intent)
            .and_then(|i| i.parse().ok())
            .unwrap_or(QueryIntent::List),
        txn_type: as_text(&raw.txn_type)
            .and_then(|t| t.parse().ok())
            .unwrap_or(TxnType::Both),
        category: category_filter(&raw.category),
        keywords: keyword_set(&raw.keywords),
        amount_filter: amount_filter(&raw.amount_filter),
        date_range: resolution.range,
        confidence,
    }
}

fn category_filter(value: &Value) -> Option<String> {
    as_text(value)
        .map(|c| c.to_lowercase())
        .filter(|c| !matches!(c.as_str(), "all" | "any" | "both"))
}

/// Ordered, case-insensitively deduplicated search tokens
fn keyword_set(value: &Value) -> Option<Vec<String>> {
    let candidates: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(as_text).collect(),
        Value::String(s) => s.split(',').map(|k| k.trim().to_string()).collect(),
        _ => Vec::new(),
    };

    let mut keywords: Vec<String> = Vec::new();
    for keyword in candidates.into_iter().filter(|k| !k.is_empty()) {
        if !keywords.iter().any(|k| k.eq_ignore_ascii_case(&keyword)) {
            keywords.push(keyword);
        }
    }

    (!keywords.is_empty()).then_some(keywords)
}

fn amount_filter(value: &Value) -> Option<AmountFilter> {
    let Value::Object(map) = value else {
        return None;
    };
    let bound = |keys: &[&str]| -> Option<f64> {
        keys.iter().filter_map(|k| map.get(*k)).find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.replace(',', "").trim().parse().ok(),
            _ => None,
        })
    };

    let filter = AmountFilter {
        greater_than: bound(&["gt", "greater_than", "greaterThan", "min"]),
        less_than: bound(&["lt", "less_than", "lessThan", "max"]),
        equal_to: bound(&["eq", "equal_to", "equals"]),
    };
    (!filter.is_empty()).then_some(filter)
}
