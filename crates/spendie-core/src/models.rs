//! Domain models for Spendie

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed category set shared by every extractor and the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Shopping,
    Health,
    Education,
    Salary,
    Freelance,
    Investment,
    Charity,
    Transfer,
    Cash,
    Bills,
    #[default]
    Miscellaneous,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Entertainment => "entertainment",
            Self::Utilities => "utilities",
            Self::Shopping => "shopping",
            Self::Health => "health",
            Self::Education => "education",
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::Investment => "investment",
            Self::Charity => "charity",
            Self::Transfer => "transfer",
            Self::Cash => "cash",
            Self::Bills => "bills",
            Self::Miscellaneous => "miscellaneous",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Utilities,
            Self::Shopping,
            Self::Health,
            Self::Education,
            Self::Salary,
            Self::Freelance,
            Self::Investment,
            Self::Charity,
            Self::Transfer,
            Self::Cash,
            Self::Bills,
            Self::Miscellaneous,
        ]
    }

    /// Lenient conversion used at the inference boundary.
    ///
    /// Absent or unrecognised labels land in `Miscellaneous`.
    pub fn from_label(label: Option<&str>) -> Self {
        label
            .and_then(|l| l.parse().ok())
            .unwrap_or_default()
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse certainty label attached to extracted data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn from_label(label: Option<&str>) -> Self {
        label.and_then(|l| l.parse().ok()).unwrap_or_default()
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown confidence: {}", s)),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of message the user sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationLabel {
    Transaction,
    Query,
    Balance,
    Unknown,
}

impl ClassificationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Query => "query",
            Self::Balance => "balance",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized English rendering of a user utterance
///
/// Never empty when the input was non-empty: a blank rephrasing falls back
/// to the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalMessage(String);

impl CanonicalMessage {
    pub fn new(canonical: &str, original: &str) -> Self {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            Self(original.to_string())
        } else {
            Self(canonical.to_string())
        }
    }

    /// Wrap the original utterance unchanged
    pub fn unchanged(original: &str) -> Self {
        Self(original.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated financial record ready for the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub category: Category,
    pub confidence: Confidence,
    /// Person or business on the other side
    pub counterparty: Option<String>,
    pub split_info: Option<String>,
    /// Payment app, screenshot-origin records only
    pub source_app: Option<String>,
    /// External reference id, screenshot-origin records only
    pub transaction_ref: Option<String>,
    pub original_text: String,
    pub canonical_text: String,
}

impl TransactionRecord {
    pub const SENTINEL_DESCRIPTION: &'static str = "Could not parse screenshot";

    /// Placeholder returned when a screenshot yields nothing usable
    pub fn screenshot_sentinel(original_text: &str) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount: 0,
            description: Self::SENTINEL_DESCRIPTION.to_string(),
            category: Category::Miscellaneous,
            confidence: Confidence::Low,
            counterparty: None,
            split_info: None,
            source_app: None,
            transaction_ref: None,
            original_text: original_text.to_string(),
            canonical_text: String::new(),
        }
    }
}

/// Output of the typed-message transaction extractor
///
/// Required fields stay optional here: the extractor never synthesizes
/// them. Callers run [`ExtractedTransaction::into_record`] before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTransaction {
    pub kind: Option<TransactionKind>,
    pub amount: Option<i64>,
    pub description: Option<String>,
    pub category: Category,
    pub confidence: Confidence,
    pub counterparty: Option<String>,
    pub split_info: Option<String>,
    pub original_text: String,
    pub canonical_text: String,
}

impl ExtractedTransaction {
    /// Names of required fields that are absent or empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.kind.is_none() {
            missing.push("kind");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if self.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            missing.push("description");
        }
        missing
    }

    /// Completeness check for typed messages (kind + amount + description)
    ///
    /// A complete record must still carry a strictly positive amount.
    pub fn into_record(self) -> Result<TransactionRecord> {
        let missing = self.missing_fields();
        match (self.kind, self.amount, self.description) {
            (Some(_), Some(amount), Some(_)) if missing.is_empty() && amount <= 0 => {
                Err(Error::InvalidAmount("no valid amount found".into()))
            }
            (Some(kind), Some(amount), Some(description)) if missing.is_empty() => {
                Ok(TransactionRecord {
                    kind,
                    amount,
                    description,
                    category: self.category,
                    confidence: self.confidence,
                    counterparty: self.counterparty,
                    split_info: self.split_info,
                    source_app: None,
                    transaction_ref: None,
                    original_text: self.original_text,
                    canonical_text: self.canonical_text,
                })
            }
            _ => Err(Error::IncompleteRecord(format!(
                "missing {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Error-shaped value returned by the extractors instead of raising
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of an extractor: the structured value or an error record
pub type Extraction<T> = std::result::Result<T, ErrorRecord>;

/// What the user wants done with matching transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    #[default]
    List,
    Total,
    Summary,
    Search,
}

impl QueryIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Total => "total",
            Self::Summary => "summary",
            Self::Search => "search",
        }
    }
}

impl std::str::FromStr for QueryIntent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "list" => Ok(Self::List),
            "total" => Ok(Self::Total),
            "summary" => Ok(Self::Summary),
            "search" => Ok(Self::Search),
            _ => Err(format!("Unknown query intent: {}", s)),
        }
    }
}

/// Transaction type filter for queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
    #[default]
    Both,
}

impl TxnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Both => "both",
        }
    }

    /// The single kind this filter selects, if any
    pub fn kind(&self) -> Option<TransactionKind> {
        match self {
            Self::Income => Some(TransactionKind::Income),
            Self::Expense => Some(TransactionKind::Expense),
            Self::Both => None,
        }
    }
}

impl std::str::FromStr for TxnType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "both" | "all" => Ok(Self::Both),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TxnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Amount bounds for queries; `equal_to` overrides the range bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct AmountFilter {
    pub greater_than: Option<f64>,
    pub less_than: Option<f64>,
    pub equal_to: Option<f64>,
}

impl AmountFilter {
    pub fn is_empty(&self) -> bool {
        self.greater_than.is_none() && self.less_than.is_none() && self.equal_to.is_none()
    }

    pub fn matches(&self, amount: i64) -> bool {
        let amount = amount as f64;
        if let Some(eq) = self.equal_to {
            return amount == eq;
        }
        self.greater_than.map_or(true, |gt| amount > gt)
            && self.less_than.map_or(true, |lt| amount < lt)
    }
}

/// Inclusive range of absolute dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping reversed bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

/// Structured filter parameters extracted from a query message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QuerySpec {
    pub intent: QueryIntent,
    pub txn_type: TxnType,
    pub category: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub amount_filter: Option<AmountFilter>,
    pub date_range: Option<DateRange>,
    pub confidence: Confidence,
}

/// How a ledger entry entered the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Typed chat message
    #[default]
    Manual,
    /// Payment screenshot
    Screenshot,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Screenshot => "screenshot",
        }
    }
}

impl std::str::FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "screenshot" | "upi_ocr" => Ok(Self::Screenshot),
            _ => Err(format!("Unknown origin: {}", s)),
        }
    }
}

/// A transaction as persisted in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: String,
    pub category: String,
    pub confidence: Confidence,
    pub counterparty: Option<String>,
    pub split_info: Option<String>,
    pub source_app: Option<String>,
    pub transaction_ref: Option<String>,
    pub origin: Origin,
    pub created_at: NaiveDateTime,
}

/// Income and expense totals for one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Balance {
    pub income: i64,
    pub expense: i64,
}

impl Balance {
    pub fn net(&self) -> i64 {
        self.income - self.expense
    }
}

/// Spending total for a single day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub total: i64,
}
