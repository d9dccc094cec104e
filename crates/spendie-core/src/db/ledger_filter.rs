//! Filter builder for ledger queries
//!
//! Turns a [`QuerySpec`] (or hand-set criteria) into a WHERE clause plus
//! bound parameters, so listing and aggregation share one definition of
//! "matching rows".

use crate::models::{AmountFilter, DateRange, QuerySpec, TransactionKind};

/// Criteria for selecting one user's ledger rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerFilter {
    /// `None` means both income and expense
    pub kind: Option<TransactionKind>,
    /// Inclusive on both ends
    pub date_range: Option<DateRange>,
    /// Any keyword may match (OR)
    pub keywords: Vec<String>,
    /// Case-insensitive substring of the stored category
    pub category: Option<String>,
    pub amount: Option<AmountFilter>,
    pub limit: Option<usize>,
}

/// SQL components produced by [`LedgerFilter::build`]
pub struct FilterResult {
    /// WHERE clause including the keyword; always scoped to a user
    pub where_clause: String,
    pub order_clause: &'static str,
    pub limit_clause: String,
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl LedgerFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn date_range(mut self, range: Option<DateRange>) -> Self {
        self.date_range = range;
        self
    }

    /// Match entries containing any of `keywords`
    ///
    /// Case folding is ASCII-only, like SQLite's `lower()`, so non-ASCII
    /// letters must match case exactly.
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    pub fn amount(mut self, amount: Option<AmountFilter>) -> Self {
        self.amount = amount;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Build the SQL for `user_id`; columns are referenced through alias `t`
    pub fn build(&self, user_id: i64) -> FilterResult {
        let mut conditions = vec!["t.user_id = ?".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(kind) = self.kind {
            conditions.push("t.kind = ?".to_string());
            params.push(Box::new(kind.as_str()));
        }

        if let Some(range) = self.date_range {
            conditions.push("t.date >= ? AND t.date <= ?".to_string());
            params.push(Box::new(range.start.to_string()));
            params.push(Box::new(range.end.to_string()));
        }

        // instr() keeps `%` and `_` in keywords literal
        let keywords: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim().to_ascii_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if !keywords.is_empty() {
            let mut alternatives = Vec::new();
            for keyword in keywords {
                for column in [
                    "t.description",
                    "t.counterparty",
                    "t.source_app",
                    "t.transaction_ref",
                ] {
                    alternatives.push(format!("instr(lower(COALESCE({}, '')), ?) > 0", column));
                    params.push(Box::new(keyword.clone()));
                }
            }
            conditions.push(format!("({})", alternatives.join(" OR ")));
        }

        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                conditions.push("instr(lower(t.category), ?) > 0".to_string());
                params.push(Box::new(category.to_ascii_lowercase()));
            }
        }

        if let Some(amount) = self.amount {
            if let Some(eq) = amount.equal_to {
                conditions.push("t.amount = ?".to_string());
                params.push(Box::new(eq));
            } else {
                if let Some(gt) = amount.greater_than {
                    conditions.push("t.amount > ?".to_string());
                    params.push(Box::new(gt));
                }
                if let Some(lt) = amount.less_than {
                    conditions.push("t.amount < ?".to_string());
                    params.push(Box::new(lt));
                }
            }
        }

        let limit_clause = match self.limit {
            Some(n) => format!("LIMIT {}", n),
            None => String::new(),
        };

        FilterResult {
            where_clause: format!("WHERE {}", conditions.join(" AND ")),
            order_clause: "ORDER BY t.created_at DESC, t.id DESC",
            limit_clause,
            params,
        }
    }
}

impl From<&QuerySpec> for LedgerFilter {
    fn from(spec: &QuerySpec) -> Self {
        Self::new()
            .kind(spec.txn_type.kind())
            .date_range(spec.date_range)
            .keywords(spec.keywords.clone().unwrap_or_default())
            .category(spec.category.as_deref())
            .amount(spec.amount_filter.filter(|a| !a.is_empty()))
    }
}

impl FilterResult {
    /// Get parameter references for query execution
    pub fn params_refs(&self) -> Vec<&dyn rusqlite::ToSql> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
