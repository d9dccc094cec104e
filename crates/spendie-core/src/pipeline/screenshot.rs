//! Payment screenshot extraction
//!
//! Screenshots arrive either as an image (sent to the vision model) or as an
//! OCR transcript. Transcripts also go through deterministic heuristics that
//! fill whatever the model left empty. Extraction never fails: anything
//! unusable becomes the sentinel record.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::parsing::{as_amount, as_text, parse_json, AmountField};
use crate::ai::ImageInput;
use crate::models::{Category, Confidence, TransactionKind, TransactionRecord};
use crate::prompts::PromptId;

use super::validate::validate_amount_field;
use super::Pipeline;

/// Known payment apps and the aliases that identify them
const PAYMENT_APPS: &[(&str, &[&str])] = &[
    ("phonepe", &["phonepe", "phone pe", "purple app"]),
    ("paytm", &["paytm", "pay tm"]),
    ("googlepay", &["google pay", "gpay", "tez"]),
    ("bhim", &["bhim", "bhim upi"]),
    ("amazonpay", &["amazon pay", "amazon"]),
    ("cred", &["cred", "cred pay"]),
    ("whatsapp", &["whatsapp", "whatsapp pay"]),
    ("freecharge", &["freecharge", "free charge"]),
    ("mobikwik", &["mobikwik", "mobi kwik"]),
    ("airtel", &["airtel money", "airtel payments"]),
    ("jio", &["jio money", "jio pay"]),
    ("sbi", &["sbi pay", "yono sbi"]),
    ("icici", &["icici", "imobile"]),
    ("hdfc", &["hdfc", "paymentapp"]),
];

/// Phrases that mark a payment confirmation screen
const PAYMENT_INDICATORS: &[&str] = &[
    "upi",
    "payment",
    "transaction",
    "paid",
    "received",
    "sent",
    "successful",
    "phonepe",
    "paytm",
    "google pay",
    "gpay",
    "bhim",
    "amazon pay",
    "cred",
    "whatsapp pay",
    "₹",
    "rupees",
    "transaction id",
    "reference number",
    "to:",
    "from:",
];

const EXPENSE_PHRASES: &[&str] = &[
    "paid to",
    "sent to",
    "money sent",
    "payment successful",
    "transferred",
    "debited",
];

const INCOME_PHRASES: &[&str] = &[
    "received from",
    "money received",
    "payment received",
    "credited",
];

/// Tokens that end a counterparty name
const NAME_STOP_WORDS: &[&str] = &[
    "upi", "id", "on", "via", "ref", "reference", "transaction", "txn", "from", "to", "paid",
    "sent", "received", "successful", "completed", "banking", "name", "bank", "debited",
    "credited", "at", "using",
];

/// At most nine leading digits; longer runs are reference numbers, not amounts
const NUMBER: &str = r"(\d{1,9}(?:,\d{2,3})*(?:\.\d{1,2})?)\b";

fn amount_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            format!(r"₹\s*{}", NUMBER),
            format!(r"(?i)\brs\.?\s*{}", NUMBER),
            format!(r"(?i)\binr\s*{}", NUMBER),
            // Without a marker the number must start a token of its own
            format!(r"\b{}\s*/-", NUMBER),
            format!(r"(?i)\bpaid\b.*?\b{}", NUMBER),
            format!(r"(?i)\bsent\b.*?\b{}", NUMBER),
            format!(r"(?i)\breceived\b.*?\b{}", NUMBER),
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

fn name_marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| {
            Regex::new(r"(?i)\b(?:paid to|sent to|received from|money sent to|to:|from:)").ok()
        })
        .as_ref()
}

/// Screenshot payload
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenshotInput {
    /// Raw image for the vision model
    Image(ImageInput),
    /// OCR transcript (degraded deployments without vision)
    Transcript(String),
}

impl ScreenshotInput {
    fn transcript(&self) -> Option<&str> {
        match self {
            Self::Transcript(text) => Some(text),
            Self::Image(_) => None,
        }
    }
}

/// Screenshot object as the model emits it
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawScreenshot {
    #[serde(rename = "type")]
    kind: Value,
    amount: Value,
    description: Value,
    category: Value,
    recipient_sender: Value,
    transaction_id: Value,
    app_name: Value,
    confidence: Value,
}

impl Pipeline {
    /// Extract a transaction from a payment screenshot
    ///
    /// Always returns a record; failures yield
    /// [`TransactionRecord::screenshot_sentinel`].
    pub async fn extract_screenshot(
        &self,
        input: &ScreenshotInput,
        caption: Option<&str>,
    ) -> TransactionRecord {
        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        let original = caption.unwrap_or_default();

        let transcript = input.transcript().map(str::trim);
        if transcript.is_some_and(str::is_empty) {
            warn!("Empty screenshot transcript");
            return TransactionRecord::screenshot_sentinel(original);
        }

        let mut vars = HashMap::new();
        if let Some(text) = transcript {
            vars.insert("transcript", text);
        }
        if let Some(caption) = caption {
            vars.insert("caption", caption);
        }
        let image = match input {
            ScreenshotInput::Image(image) => Some(image.clone()),
            ScreenshotInput::Transcript(_) => None,
        };

        let raw: RawScreenshot = match self
            .run_prompt(PromptId::ParseScreenshot, &vars, image, true)
            .await
            .and_then(|response| parse_json(&response))
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Screenshot extraction failed, returning sentinel");
                return TransactionRecord::screenshot_sentinel(original);
            }
        };

        match record_from_raw(raw, transcript, original) {
            Some(record) => record,
            None => TransactionRecord::screenshot_sentinel(original),
        }
    }
}

fn record_from_raw(
    raw: RawScreenshot,
    transcript: Option<&str>,
    original: &str,
) -> Option<TransactionRecord> {
    let mut amount_field = as_amount(&raw.amount);
    if amount_field.value().map_or(true, |v| v <= 0) {
        if let Some(found) = transcript.and_then(extract_amount) {
            debug!(amount = found, "Amount taken from transcript");
            amount_field = AmountField::Value(found);
        }
    }
    let verdict = validate_amount_field(amount_field);
    if !verdict.is_valid {
        warn!(reason = %verdict.reason, "Screenshot has no usable amount");
        return None;
    }
    let amount = amount_field.value()?;

    let kind = as_text(&raw.kind)
        .and_then(|k| k.parse::<TransactionKind>().ok())
        .or_else(|| transcript.and_then(detect_direction))
        .unwrap_or(TransactionKind::Expense);

    let counterparty = as_text(&raw.recipient_sender)
        .or_else(|| transcript.and_then(merge_name_fragments));

    let source_app = as_text(&raw.app_name)
        .and_then(|name| detect_app(&name))
        .or_else(|| transcript.and_then(detect_app))
        .map(str::to_string);

    let mut confidence = Confidence::from_label(as_text(&raw.confidence).as_deref());
    if transcript.is_some_and(|t| !is_payment_screenshot(t)) {
        debug!("Transcript does not look like a payment confirmation");
        confidence = Confidence::Low;
    }

    Some(TransactionRecord {
        kind,
        amount,
        description: as_text(&raw.description).unwrap_or_else(|| "UPI transaction".to_string()),
        category: Category::from_label(as_text(&raw.category).as_deref()),
        confidence,
        counterparty,
        split_info: None,
        source_app,
        transaction_ref: as_text(&raw.transaction_id),
        original_text: original.to_string(),
        canonical_text: transcript.unwrap_or_default().to_string(),
    })
}

/// First currency amount in the text, in whole rupees
///
/// Patterns are tried in priority order: explicit currency markers, then the
/// `/-` suffix, then numbers following a payment verb on the same line.
/// Paise are truncated.
pub fn extract_amount(text: &str) -> Option<i64> {
    amount_patterns().iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| parse_whole_rupees(m.as_str()))
    })
}

fn parse_whole_rupees(raw: &str) -> Option<i64> {
    let whole = raw.split('.').next().unwrap_or(raw).replace(',', "");
    whole.parse().ok()
}

/// Direction from the earliest direction phrase in the text
pub fn detect_direction(text: &str) -> Option<TransactionKind> {
    let lower = text.to_lowercase();
    let earliest = |phrases: &[&str]| phrases.iter().filter_map(|p| lower.find(p)).min();

    match (earliest(EXPENSE_PHRASES), earliest(INCOME_PHRASES)) {
        (Some(e), Some(i)) if i < e => Some(TransactionKind::Income),
        (Some(_), _) => Some(TransactionKind::Expense),
        (None, Some(_)) => Some(TransactionKind::Income),
        (None, None) => None,
    }
}

/// Canonical app name for the first alias found as a whole word
pub fn detect_app(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    PAYMENT_APPS
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| contains_word(&lower, alias)))
        .map(|(app, _)| *app)
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + needle.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Whether the text looks like a payment confirmation (two or more indicators)
pub fn is_payment_screenshot(text: &str) -> bool {
    let lower = text.to_lowercase();
    PAYMENT_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count()
        >= 2
}

/// Rebuild a counterparty name that OCR split across tokens or lines
///
/// Takes the alphabetic tokens after a "paid to" / "received from" style
/// marker. Runs of single letters ("R A H U L") are joined into one word.
pub fn merge_name_fragments(text: &str) -> Option<String> {
    let marker = name_marker()?.find(text)?;
    let after = &text[marker.end()..];

    let mut tokens: Vec<&str> = Vec::new();
    for token in after.split_whitespace() {
        let bare = token.trim_matches(|c: char| c == ',' || c == ':' || c == '-');
        if bare.is_empty() {
            continue;
        }
        let is_name_like = bare.chars().all(|c| c.is_alphabetic() || c == '.');
        if !is_name_like || NAME_STOP_WORDS.contains(&bare.to_lowercase().as_str()) {
            if tokens.is_empty() {
                continue;
            }
            break;
        }
        tokens.push(bare);
        if tokens.len() >= 12 {
            break;
        }
    }

    let mut words: Vec<String> = Vec::new();
    let mut letters = String::new();
    for token in tokens {
        if token.chars().count() == 1 {
            letters.push_str(token);
            continue;
        }
        if !letters.is_empty() {
            words.push(std::mem::take(&mut letters));
        }
        words.push(token.to_string());
    }
    if !letters.is_empty() {
        words.push(letters);
    }

    // Cap at four words so trailing OCR noise does not become part of the name
    words.truncate(4);
    let name = words.join(" ");
    (!name.is_empty()).then_some(name)
}
