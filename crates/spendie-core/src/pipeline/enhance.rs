use crate::models::{TransactionKind, TransactionRecord};

/// Compose the final description from structured fields and the user caption
///
/// `"{caption} ({base})"` when a caption is given, else `"{base}"`, followed by
/// `" [to X, via APP]"` / `" [from X, via APP]"` when there is context.
pub fn enhance_description(record: &TransactionRecord, caption: Option<&str>) -> String {
    let base = record.description.as_str();

    let mut context = Vec::new();
    if let Some(counterparty) = record.counterparty.as_deref().filter(|c| !c.trim().is_empty()) {
        match record.kind {
            TransactionKind::Expense => context.push(format!("to {}", counterparty.trim())),
            TransactionKind::Income => context.push(format!("from {}", counterparty.trim())),
        }
    }
    if let Some(app) = record.source_app.as_deref().filter(|a| !a.trim().is_empty()) {
        context.push(format!("via {}", app.trim()));
    }

    let mut description = match caption.map(str::trim).filter(|c| !c.is_empty()) {
        Some(caption) => format!("{} ({})", caption, base),
        None => base.to_string(),
    };
    if !context.is_empty() {
        description.push_str(&format!(" [{}]", context.join(", ")));
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Confidence};

    fn groceries_from_dad() -> TransactionRecord {
        TransactionRecord {
            kind: TransactionKind::Income,
            amount: 500,
            description: "groceries".to_string(),
            category: Category::Food,
            confidence: Confidence::High,
            counterparty: Some("dad".to_string()),
            split_info: None,
            source_app: None,
            transaction_ref: None,
            original_text: String::new(),
            canonical_text: String::new(),
        }
    }

    #[test]
    fn test_counterparty_clause() {
        assert_eq!(enhance_description(&groceries_from_dad(), Some("")), "groceries [from dad]");
        assert_eq!(enhance_description(&groceries_from_dad(), None), "groceries [from dad]");
    }

    #[test]
    fn test_caption_is_prepended() {
        assert_eq!(
            enhance_description(&groceries_from_dad(), Some("lunch money")),
            "lunch money (groceries) [from dad]"
        );
    }

    #[test]
    fn test_expense_with_app() {
        let mut record = groceries_from_dad();
        record.kind = TransactionKind::Expense;
        record.counterparty = Some("Rahul".to_string());
        record.source_app = Some("phonepe".to_string());
        assert_eq!(
            enhance_description(&record, Some("  dinner ")),
            "dinner (groceries) [to Rahul, via phonepe]"
        );
    }

    #[test]
    fn test_no_context_no_brackets() {
        let mut record = groceries_from_dad();
        record.counterparty = None;
        assert_eq!(enhance_description(&record, None), "groceries");
        assert_eq!(enhance_description(&record, Some("snacks")), "snacks (groceries)");

        record.source_app = Some("gpay".to_string());
        assert_eq!(enhance_description(&record, None), "groceries [via gpay]");
    }
}
