use serde::Serialize;

use crate::ai::parsing::AmountField;
use crate::error::{Error, Result};
use crate::models::{Confidence, TransactionRecord};

pub const REASON_NO_RECORD: &str = "could not parse transaction data";
pub const REASON_NO_AMOUNT: &str = "no valid amount found";
pub const REASON_BAD_AMOUNT: &str = "invalid amount format";
pub const REASON_LOW_CONFIDENCE: &str = "low confidence in parsing - please verify";
pub const REASON_VALID: &str = "valid transaction";

/// Validator verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub is_valid: bool,
    pub reason: String,
}

impl Validation {
    fn valid(reason: &str) -> Self {
        Self {
            is_valid: true,
            reason: reason.to_string(),
        }
    }

    fn invalid(reason: &str) -> Self {
        Self {
            is_valid: false,
            reason: reason.to_string(),
        }
    }

    /// Valid, but the user should double-check it
    pub fn needs_review(&self) -> bool {
        self.is_valid && self.reason == REASON_LOW_CONFIDENCE
    }

    /// Convert an invalid verdict into [`Error::InvalidAmount`]
    pub fn into_result(self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(Error::InvalidAmount(self.reason))
        }
    }
}

/// Minimum validity rules for screenshot-origin records
///
/// Only the amount is required: description, kind and category are not
/// checked here. Typed messages go through
/// [`ExtractedTransaction::into_record`](crate::models::ExtractedTransaction::into_record)
/// instead.
pub fn validate(record: Option<&TransactionRecord>) -> Validation {
    let Some(record) = record else {
        return Validation::invalid(REASON_NO_RECORD);
    };
    let verdict = validate_amount_field(AmountField::Value(record.amount));
    if !verdict.is_valid {
        return verdict;
    }
    if record.confidence == Confidence::Low {
        return Validation::valid(REASON_LOW_CONFIDENCE);
    }
    Validation::valid(REASON_VALID)
}

/// Amount rule on its own, for values read straight from inference output
pub fn validate_amount_field(amount: AmountField) -> Validation {
    match amount {
        AmountField::Value(v) if v > 0 => Validation::valid(REASON_VALID),
        AmountField::Value(_) | AmountField::Missing => Validation::invalid(REASON_NO_AMOUNT),
        AmountField::Malformed => Validation::invalid(REASON_BAD_AMOUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, TransactionKind};

    fn record(amount: i64, confidence: Confidence) -> TransactionRecord {
        TransactionRecord {
            kind: TransactionKind::Expense,
            amount,
            description: String::new(),
            category: Category::Miscellaneous,
            confidence,
            counterparty: None,
            split_info: None,
            source_app: None,
            transaction_ref: None,
            original_text: String::new(),
            canonical_text: String::new(),
        }
    }

    #[test]
    fn test_missing_record() {
        let v = validate(None);
        assert!(!v.is_valid);
        assert_eq!(v.reason, REASON_NO_RECORD);
    }

    #[test]
    fn test_non_positive_amounts_are_invalid() {
        for amount in [0, -1, -500, i64::MIN] {
            let v = validate(Some(&record(amount, Confidence::High)));
            assert!(!v.is_valid, "amount {} accepted", amount);
            assert_eq!(v.reason, REASON_NO_AMOUNT);
        }
    }

    #[test]
    fn test_positive_amounts_are_valid_even_with_empty_description() {
        for amount in [1, 50, 1_000_000] {
            assert!(validate(Some(&record(amount, Confidence::Medium))).is_valid);
        }
    }

    #[test]
    fn test_low_confidence_is_valid_with_warning() {
        let v = validate(Some(&record(200, Confidence::Low)));
        assert!(v.is_valid);
        assert!(v.needs_review());
        assert_eq!(v.reason, "low confidence in parsing - please verify");
    }

    #[test]
    fn test_sentinel_is_invalid() {
        let sentinel = TransactionRecord::screenshot_sentinel("");
        let v = validate(Some(&sentinel));
        assert!(!v.is_valid);
        assert!(matches!(v.into_result(), Err(Error::InvalidAmount(_))));
    }

    #[test]
    fn test_amount_field_rules() {
        assert!(validate_amount_field(AmountField::Value(10)).is_valid);
        assert_eq!(validate_amount_field(AmountField::Missing).reason, REASON_NO_AMOUNT);
        assert_eq!(validate_amount_field(AmountField::Malformed).reason, REASON_BAD_AMOUNT);
    }
}
