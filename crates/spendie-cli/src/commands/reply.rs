//! Reply text for chat-style commands

use std::collections::HashMap;

use spendie_core::models::{
    Balance, Confidence, DailyTotal, ErrorRecord, QueryIntent, QuerySpec, StoredTransaction,
    TransactionKind, TransactionRecord,
};

use super::{rupees, truncate};

pub const HELP: &str = "🤔 I didn't understand that

Try:
• 'Spent ₹200 on groceries' (for transactions)
• 'Got 1200 from dad' (informal amounts work!)
• 'Papa ne 1200 diye' (Hindi also works!)
• 'How much did I spend on food?' (for queries)
• 'What's my balance?' (for balance)
• spendie screenshot <file> (for payment screenshots)";

pub const INCOMPLETE: &str = "⚠️ Incomplete transaction data
Please provide amount and description.
Example: 'Got 1200 from dad' or 'Papa ne 1200 diye'";

pub const NO_MATCHES: &str = "📭 No transactions found
No transactions match your query criteria.";

pub const NO_SCREENSHOT_AMOUNT: &str = "⚠️ Could not find transaction details
No amount or transaction information found in the image.";

const LOW_CONFIDENCE_NOTE: &str = "💡 Note: Low confidence - please verify details";

/// Rows shown for a `list` query
const LIST_LIMIT: usize = 10;
/// Categories shown for a `summary` query
const SUMMARY_CATEGORIES: usize = 5;

fn kind_emoji(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "💰",
        TransactionKind::Expense => "💸",
    }
}

fn title(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Income",
        TransactionKind::Expense => "Expense",
    }
}

fn record_lines(record: &TransactionRecord, heading: &str) -> Vec<String> {
    let confidence_emoji = if record.confidence == Confidence::High {
        "✅"
    } else {
        "⚠️"
    };
    let mut lines = vec![
        format!("{} {}", confidence_emoji, heading),
        String::new(),
        format!(
            "{} {}: {}",
            kind_emoji(record.kind),
            title(record.kind),
            rupees(record.amount)
        ),
        format!("📝 Description: {}", record.description),
        format!("🏷️ Category: {}", record.category),
    ];
    if let Some(counterparty) = &record.counterparty {
        lines.push(format!("👤 Contact: {}", counterparty));
    }
    lines
}

/// Confirmation for a typed transaction
pub fn transaction_added(record: &TransactionRecord, understood_as: Option<&str>) -> String {
    let mut lines = record_lines(record, "Transaction Added:");
    if let Some(split) = &record.split_info {
        lines.push(format!("🔄 Split: {}", split));
    }
    if record.confidence == Confidence::Low {
        lines.push(String::new());
        lines.push(LOW_CONFIDENCE_NOTE.to_string());
    }
    if let Some(canonical) = understood_as {
        lines.push(String::new());
        lines.push(format!("🔄 Understood as: {}", canonical));
    }
    lines.join("\n")
}

/// Confirmation for a screenshot transaction
pub fn screenshot_added(record: &TransactionRecord) -> String {
    let mut lines = record_lines(record, "Transaction Added from Screenshot:");
    if let Some(app) = &record.source_app {
        lines.push(format!("📱 App: {}", app));
    }
    if record.confidence == Confidence::Low {
        lines.push(String::new());
        lines.push(LOW_CONFIDENCE_NOTE.to_string());
    }
    lines.join("\n")
}

pub fn extraction_failed(error: &ErrorRecord) -> String {
    format!("❌ {}", error.message)
}

pub fn screenshot_rejected(reason: &str) -> String {
    format!("❌ Could not process transaction\n{}", reason)
}

/// Answer a query from the matching rows (most recent first)
pub fn query_result(spec: &QuerySpec, rows: &[StoredTransaction]) -> String {
    if rows.is_empty() {
        return NO_MATCHES.to_string();
    }
    let total: i64 = rows.iter().map(|r| r.amount).sum();

    match spec.intent {
        QueryIntent::Total => format!(
            "💰 Total {}: {}\n📊 Transactions found: {}",
            spec.txn_type,
            rupees(total),
            rows.len()
        ),
        QueryIntent::List => {
            let mut lines = vec!["📋 Transaction List:".to_string(), String::new()];
            for (i, row) in rows.iter().take(LIST_LIMIT).enumerate() {
                lines.push(format!(
                    "{}. {} {} - {} ({})",
                    i + 1,
                    kind_emoji(row.kind),
                    rupees(row.amount),
                    truncate(&row.description, 60),
                    row.created_at.format("%m/%d")
                ));
            }
            if rows.len() > LIST_LIMIT {
                lines.push(String::new());
                lines.push(format!(
                    "... and {} more transactions",
                    rows.len() - LIST_LIMIT
                ));
            }
            lines.join("\n")
        }
        QueryIntent::Summary => {
            let mut by_category: HashMap<&str, i64> = HashMap::new();
            for row in rows {
                *by_category.entry(row.category.as_str()).or_default() += row.amount;
            }
            let mut categories: Vec<(&str, i64)> = by_category.into_iter().collect();
            categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

            let mut lines = vec![
                "📊 Summary:".to_string(),
                format!("💰 Total: {}", rupees(total)),
                format!("📈 Transactions: {}", rows.len()),
                String::new(),
                "Top Categories:".to_string(),
            ];
            for (category, amount) in categories.into_iter().take(SUMMARY_CATEGORIES) {
                lines.push(format!("• {}: {}", category, rupees(amount)));
            }
            lines.join("\n")
        }
        QueryIntent::Search => format!("📋 Found {} transactions", rows.len()),
    }
}

pub fn balance(balance: &Balance, top_category: Option<&(String, i64)>) -> String {
    let (name, amount) = top_category
        .map(|(name, amount)| (name.as_str(), *amount))
        .unwrap_or(("N/A", 0));
    format!(
        "💸 Your Balance Summary:\n🟢 Income: {}\n🔴 Expense: {}\n🧾 Net: {}\n📊 Top Category: {} ({})",
        rupees(balance.income),
        rupees(balance.expense),
        rupees(balance.net()),
        name,
        rupees(amount)
    )
}

pub fn categories(breakdown: &[(String, i64)]) -> String {
    if breakdown.is_empty() {
        return "📭 No expense categories found.".to_string();
    }
    let mut lines = vec!["📊 Spending by Category:".to_string()];
    for (category, amount) in breakdown.iter().take(10) {
        lines.push(format!("• {}: {}", category, rupees(*amount)));
    }
    lines.join("\n")
}

pub fn patterns(totals: &[DailyTotal], days: u32) -> String {
    if totals.is_empty() {
        return "📭 No spending patterns found.".to_string();
    }
    let mut lines = vec![format!("📈 Last {} Days Spending:", days)];
    for day in totals {
        lines.push(format!("• {}: {}", day.date, rupees(day.total)));
    }
    let total: i64 = totals.iter().map(|d| d.total).sum();
    let average = total as f64 / f64::from(days.max(1));
    lines.push(String::new());
    lines.push(format!("📊 Period Total: {}", rupees(total)));
    lines.push(format!("📈 Daily Average: {}", rupees(average.round() as i64)));
    lines.join("\n")
}
