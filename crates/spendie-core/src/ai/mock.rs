//! Mock backend for testing
//!
//! Replies are scripted per task (the prompt id of the calling stage),
//! optionally narrowed by a substring of the user prompt. Unscripted tasks get
//! a crude keyword heuristic so the CLI stays usable offline with
//! `AI_BACKEND=mock`. Every request is recorded for assertions.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use regex::Regex;

use crate::error::{Error, Result};

use super::{InferenceBackend, InferenceRequest};

/// Scripted outcome of a mock call
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this completion text
    Text(String),
    /// Fail as if the service were unreachable
    Unavailable,
}

#[derive(Debug, Clone)]
struct MockRule {
    task: String,
    needle: Option<String>,
    reply: MockReply,
}

/// Mock inference backend for testing
///
/// Clones share the script and call log.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fail every call with `InferenceUnavailable`
    pub unavailable: bool,
    rules: Arc<Mutex<Vec<MockRule>>>,
    calls: Arc<Mutex<Vec<InferenceRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            unavailable: false,
            rules: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// A backend whose every call fails
    pub fn unavailable() -> Self {
        Self {
            healthy: false,
            unavailable: true,
            ..Self::new()
        }
    }

    /// Script the reply for every call of `task`
    pub fn respond(self, task: &str, reply: impl Into<String>) -> Self {
        self.push_rule(task, None, MockReply::Text(reply.into()))
    }

    /// Script the reply for calls of `task` whose user prompt contains `needle`
    pub fn respond_when(self, task: &str, needle: &str, reply: impl Into<String>) -> Self {
        self.push_rule(task, Some(needle), MockReply::Text(reply.into()))
    }

    /// Make every call of `task` fail
    pub fn fail(self, task: &str) -> Self {
        self.push_rule(task, None, MockReply::Unavailable)
    }

    fn push_rule(self, task: &str, needle: Option<&str>, reply: MockReply) -> Self {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockRule {
                task: task.to_string(),
                needle: needle.map(str::to_string),
                reply,
            });
        self
    }

    /// All requests received so far, oldest first
    pub fn calls(&self) -> Vec<InferenceRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for `task`
    pub fn call_count(&self, task: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.task == task)
            .count()
    }

    fn scripted(&self, request: &InferenceRequest) -> Option<MockReply> {
        let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        let for_task: Vec<&MockRule> = rules.iter().filter(|r| r.task == request.task).collect();

        for_task
            .iter()
            .find(|r| {
                r.needle
                    .as_deref()
                    .is_some_and(|n| request.user_prompt.contains(n))
            })
            .or_else(|| for_task.iter().find(|r| r.needle.is_none()))
            .map(|r| r.reply.clone())
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn infer(&self, request: &InferenceRequest) -> Result<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if self.unavailable {
            return Err(Error::InferenceUnavailable("mock backend unavailable".into()));
        }

        match self.scripted(request) {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Unavailable) => Err(Error::InferenceUnavailable(format!(
                "mock failure for {}",
                request.task
            ))),
            None => Ok(heuristic_reply(request)),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

/// Keyword heuristics used when no reply is scripted
fn heuristic_reply(request: &InferenceRequest) -> String {
    let text = request.user_prompt.trim();
    let lower = text.to_lowercase();
    match request.task.as_str() {
        "rephrase" => text.to_string(),
        "classify_message" => classify_by_keywords(&lower).to_string(),
        "extract_transaction" => transaction_by_keywords(text, &lower).to_string(),
        "extract_query" => query_by_keywords(&lower).to_string(),
        // Leave screenshot fields empty so the transcript heuristics decide
        "parse_screenshot" => "{}".to_string(),
        _ => String::new(),
    }
}

fn classify_by_keywords(lower: &str) -> &'static str {
    let has_number = lower.chars().any(|c| c.is_ascii_digit());
    if lower.contains("balance") || lower.contains("summary") {
        "balance"
    } else if lower.contains("how much")
        || lower.contains("show")
        || lower.contains("list")
        || lower.ends_with('?')
    {
        "query"
    } else if has_number {
        "transaction"
    } else {
        "unknown"
    }
}

fn transaction_by_keywords(text: &str, lower: &str) -> serde_json::Value {
    let amount = Regex::new(r"\d[\d,]*")
        .ok()
        .and_then(|re| re.find(text))
        .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok());

    let income = ["received", "got", "earned", "credited", "salary", "deposited"]
        .iter()
        .any(|w| lower.contains(w));

    let counterparty = Regex::new(r"(?i)\b(?:from|to)\s+([A-Za-z][\w]*)")
        .ok()
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    serde_json::json!({
        "type": if income { "income" } else { "expense" },
        "amount": amount,
        "description": text,
        "category": if counterparty.is_some() { "transfer" } else { "miscellaneous" },
        "confidence": "medium",
        "recipient_sender": counterparty,
        "split_info": null,
    })
}

fn query_by_keywords(lower: &str) -> serde_json::Value {
    let intent = if lower.contains("how much") || lower.contains("total") {
        "total"
    } else if lower.contains("summary") || lower.contains("breakdown") {
        "summary"
    } else {
        "list"
    };
    let txn_type = if lower.contains("spen") || lower.contains("expense") {
        "expense"
    } else if lower.contains("earn") || lower.contains("income") || lower.contains("received") {
        "income"
    } else {
        "both"
    };
    let period = [
        ("yesterday", "yesterday"),
        ("today", "today"),
        ("this week", "this_week"),
        ("last week", "last_week"),
        ("this month", "this_month"),
        ("last month", "last_month"),
    ]
    .iter()
    .find(|(phrase, _)| lower.contains(phrase))
    .map(|(_, token)| *token);

    serde_json::json!({
        "intent": intent,
        "type": txn_type,
        "category": null,
        "keywords": null,
        "amount_filter": null,
        "start_date": period,
        "end_date": null,
        "confidence": "medium",
    })
}
