//! Ledger tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn at(d: u32, h: u32) -> NaiveDateTime {
        day(d).and_hms_opt(h, 30, 0).unwrap()
    }

    fn record(kind: TransactionKind, amount: i64, description: &str, category: Category) -> TransactionRecord {
        TransactionRecord {
            kind,
            amount,
            description: description.to_string(),
            category,
            confidence: Confidence::High,
            counterparty: None,
            split_info: None,
            source_app: None,
            transaction_ref: None,
            original_text: description.to_string(),
            canonical_text: description.to_string(),
        }
    }

    /// Small ledger for user 1 plus one row for user 2
    fn seeded() -> Database {
        let db = Database::in_memory().unwrap();
        let expense = TransactionKind::Expense;

        db.append_at(1, &record(TransactionKind::Income, 5000, "salary", Category::Salary), Origin::Manual, at(1, 9))
            .unwrap();
        db.append_at(1, &record(expense, 250, "Swiggy dinner", Category::Food), Origin::Manual, at(3, 20))
            .unwrap();
        db.append_at(1, &record(expense, 1300, "electricity bill", Category::Bills), Origin::Manual, at(5, 11))
            .unwrap();

        let mut upi = record(expense, 480, "UPI transaction", Category::Food);
        upi.counterparty = Some("Zomato Ltd".to_string());
        upi.source_app = Some("paytm".to_string());
        upi.transaction_ref = Some("412345678901".to_string());
        db.append_at(1, &upi, Origin::Screenshot, at(10, 13)).unwrap();

        db.append_at(2, &record(expense, 999, "Swiggy", Category::Food), Origin::Manual, at(10, 13))
            .unwrap();
        db
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();
        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 14);
    }

    #[test]
    fn test_append_round_trips_fields() {
        let db = seeded();
        let rows = db
            .query(1, &LedgerFilter::new().keywords(["zomato"]))
            .unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.user_id, 1);
        assert_eq!(row.kind, TransactionKind::Expense);
        assert_eq!(row.amount, 480);
        assert_eq!(row.category, "food");
        assert_eq!(row.confidence, Confidence::High);
        assert_eq!(row.origin, Origin::Screenshot);
        assert_eq!(row.source_app.as_deref(), Some("paytm"));
        assert_eq!(row.created_at, at(10, 13));
    }

    #[test]
    fn test_append_rejects_non_positive_amount() {
        let db = Database::in_memory().unwrap();
        let sentinel = TransactionRecord::screenshot_sentinel("");
        let err = db.append(1, &sentinel, Origin::Screenshot).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidAmount(_)));
        assert!(db.query(1, &LedgerFilter::new()).unwrap().is_empty());
    }

    #[test]
    fn test_query_is_most_recent_first_and_user_scoped() {
        let db = seeded();
        let rows = db.query(1, &LedgerFilter::new()).unwrap();
        let amounts: Vec<i64> = rows.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![480, 1300, 250, 5000]);

        let limited = db.query(1, &LedgerFilter::new().limit(Some(2))).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive_or() {
        // Keywords are OR'd: any one keyword in any searchable column matches
        let db = seeded();
        let rows = db
            .query(1, &LedgerFilter::new().keywords(["SWIGGY", "electricity"]))
            .unwrap();
        assert_eq!(rows.len(), 2);

        // Transaction reference is searchable too
        let rows = db.query(1, &LedgerFilter::new().keywords(["412345"])).unwrap();
        assert_eq!(rows.len(), 1);

        // LIKE wildcards are literal
        let rows = db.query(1, &LedgerFilter::new().keywords(["%"])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_keyword_folding_is_ascii_only() {
        let db = seeded();
        db.append_at(
            1,
            &record(TransactionKind::Expense, 1200, "École fees", Category::Education),
            Origin::Manual,
            at(11, 10),
        )
        .unwrap();

        let rows = db.query(1, &LedgerFilter::new().keywords(["ÉCOLE"])).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 1200);

        let rows = db.query(1, &LedgerFilter::new().keywords(["école"])).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_kind_date_category_and_amount_filters() {
        let db = seeded();

        let expenses = db
            .query(1, &LedgerFilter::new().kind(Some(TransactionKind::Expense)))
            .unwrap();
        assert_eq!(expenses.len(), 3);

        // Inclusive on both ends
        let window = db
            .query(1, &LedgerFilter::new().date_range(Some(DateRange::new(day(3), day(5)))))
            .unwrap();
        assert_eq!(window.len(), 2);

        let food = db.query(1, &LedgerFilter::new().category(Some("FOO"))).unwrap();
        assert_eq!(food.len(), 2);

        let big = db
            .query(
                1,
                &LedgerFilter::new().amount(Some(AmountFilter {
                    greater_than: Some(300.0),
                    less_than: Some(2000.0),
                    equal_to: None,
                })),
            )
            .unwrap();
        let amounts: Vec<i64> = big.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![480, 1300]);

        let exact = db
            .query(
                1,
                &LedgerFilter::new().amount(Some(AmountFilter {
                    greater_than: Some(5000.0),
                    less_than: None,
                    equal_to: Some(1300.0),
                })),
            )
            .unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].description, "electricity bill");
    }

    #[test]
    fn test_query_spec_drives_filter() {
        let db = seeded();
        let spec = QuerySpec {
            intent: QueryIntent::Total,
            txn_type: TxnType::Expense,
            category: Some("food".to_string()),
            date_range: Some(DateRange::new(day(1), day(7))),
            ..Default::default()
        };
        let rows = db.query(1, &LedgerFilter::from(&spec)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, 250);
    }

    #[test]
    fn test_balance_and_breakdown() {
        let db = seeded();
        let balance = db.aggregate_balance(1).unwrap();
        assert_eq!(balance.income, 5000);
        assert_eq!(balance.expense, 2030);
        assert_eq!(balance.net(), 2970);

        let empty = db.aggregate_balance(42).unwrap();
        assert_eq!(empty, Balance::default());

        let breakdown = db.category_breakdown(1, TransactionKind::Expense).unwrap();
        assert_eq!(
            breakdown,
            vec![("bills".to_string(), 1300), ("food".to_string(), 730)]
        );
    }

    #[test]
    fn test_daily_totals_trailing_window() {
        let db = seeded();
        let totals = db
            .daily_totals(1, 7, TransactionKind::Expense, day(10))
            .unwrap();
        // Window is 4..=10, so the 3rd falls outside
        assert_eq!(
            totals,
            vec![
                DailyTotal { date: day(5), total: 1300 },
                DailyTotal { date: day(10), total: 480 },
            ]
        );
    }

    #[test]
    fn test_daily_totals_huge_window_covers_whole_ledger() {
        let db = seeded();
        let totals = db
            .daily_totals(1, 200_000_000, TransactionKind::Expense, day(13))
            .unwrap();
        let days: Vec<NaiveDate> = totals.iter().map(|t| t.date).collect();
        assert_eq!(days, vec![day(3), day(5), day(10)]);

        let totals = db
            .daily_totals(1, u32::MAX, TransactionKind::Expense, day(13))
            .unwrap();
        assert_eq!(totals.len(), 3);
    }

    #[test]
    fn test_export_csv_columns_and_quoting() {
        let db = seeded();
        let csv = db.export_csv(1).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), CSV_COLUMNS.join(","));

        let first = lines.next().unwrap();
        assert_eq!(
            first,
            "2024-06-10,expense,480,UPI transaction,food,Monday,June,2024,13:30:00,screenshot,paytm,Zomato Ltd,412345678901,high"
        );
        assert_eq!(csv.lines().count(), 5);

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let descriptions: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[3].to_string())
            .collect();
        assert!(descriptions.contains(&"Swiggy dinner".to_string()));
    }

    #[test]
    fn test_delete_all_is_per_user() {
        let db = seeded();
        assert_eq!(db.delete_all(1).unwrap(), 4);
        assert!(db.query(1, &LedgerFilter::new()).unwrap().is_empty());
        assert_eq!(db.query(2, &LedgerFilter::new()).unwrap().len(), 1);
    }
}
