//! Ledger operations: append, filtered listing, aggregates, export

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime};
use rusqlite::params;
use tracing::info;

use super::{parse_datetime, Database, LedgerFilter, DATETIME_FORMAT};
use crate::error::{Error, Result};
use crate::models::{
    Balance, DailyTotal, Origin, StoredTransaction, TransactionKind, TransactionRecord,
};

/// Header row of [`Database::export_csv`]
pub const CSV_COLUMNS: [&str; 14] = [
    "Date",
    "Type",
    "Amount",
    "Description",
    "Category",
    "Day of Week",
    "Month",
    "Year",
    "Time",
    "Source",
    "UPI App",
    "Recipient/Sender",
    "Transaction ID",
    "Confidence",
];

const SELECT_COLUMNS: &str = "t.id, t.user_id, t.kind, t.amount, t.description, t.category, \
     t.confidence, t.counterparty, t.split_info, t.source_app, t.transaction_ref, t.origin, \
     t.created_at";

impl Database {
    /// Append a validated record, timestamped now
    pub fn append(&self, user_id: i64, record: &TransactionRecord, origin: Origin) -> Result<i64> {
        self.append_at(user_id, record, origin, Local::now().naive_local())
    }

    /// Append a validated record with an explicit timestamp
    pub fn append_at(
        &self,
        user_id: i64,
        record: &TransactionRecord,
        origin: Origin,
        at: NaiveDateTime,
    ) -> Result<i64> {
        if record.amount <= 0 {
            return Err(Error::InvalidAmount(format!(
                "refusing to store amount {}",
                record.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (
                user_id, kind, amount, description, category, confidence, counterparty,
                split_info, source_app, transaction_ref, origin, date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
            params![
                user_id,
                record.kind.as_str(),
                record.amount,
                record.description,
                record.category.as_str(),
                record.confidence.as_str(),
                record.counterparty,
                record.split_info,
                record.source_app,
                record.transaction_ref,
                origin.as_str(),
                at.date().to_string(),
                at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();

        info!(
            id,
            user_id,
            kind = %record.kind,
            amount = record.amount,
            origin = origin.as_str(),
            "Ledger entry appended"
        );
        Ok(id)
    }

    /// Matching entries, most recent first
    pub fn query(&self, user_id: i64, filter: &LedgerFilter) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;
        let built = filter.build(user_id);
        let sql = format!(
            "SELECT {} FROM transactions t {} {} {}",
            SELECT_COLUMNS, built.where_clause, built.order_clause, built.limit_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(built.params_refs().as_slice(), Self::row_to_stored)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Column order: see `SELECT_COLUMNS`
    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredTransaction> {
        let kind_str: String = row.get(2)?;
        let confidence_str: String = row.get(6)?;
        let origin_str: String = row.get(11)?;
        let created_at_str: String = row.get(12)?;
        Ok(StoredTransaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: kind_str.parse().unwrap_or(TransactionKind::Expense),
            amount: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
            confidence: confidence_str.parse().unwrap_or_default(),
            counterparty: row.get(7)?,
            split_info: row.get(8)?,
            source_app: row.get(9)?,
            transaction_ref: row.get(10)?,
            origin: origin_str.parse().unwrap_or_default(),
            created_at: parse_datetime(&created_at_str),
        })
    }

    /// Lifetime income and expense totals
    pub fn aggregate_balance(&self, user_id: i64) -> Result<Balance> {
        let conn = self.conn()?;
        let (income, expense): (i64, i64) = conn.query_row(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'income' THEN amount END), 0),
                COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount END), 0)
            FROM transactions
            WHERE user_id = ?1
            "#,
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(Balance { income, expense })
    }

    /// Totals per category for one kind, largest first
    pub fn category_breakdown(
        &self,
        user_id: i64,
        kind: TransactionKind,
    ) -> Result<Vec<(String, i64)>> {
        self.category_breakdown_filtered(user_id, &LedgerFilter::new().kind(Some(kind)))
    }

    /// Totals per category over the rows matching `filter`, largest first
    pub fn category_breakdown_filtered(
        &self,
        user_id: i64,
        filter: &LedgerFilter,
    ) -> Result<Vec<(String, i64)>> {
        let conn = self.conn()?;
        let built = filter.build(user_id);
        let sql = format!(
            r#"
            SELECT t.category, SUM(t.amount) AS total
            FROM transactions t
            {}
            GROUP BY t.category
            ORDER BY total DESC, t.category ASC
            "#,
            built.where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(built.params_refs().as_slice(), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Per-day totals over the trailing `days` days ending `today`
    ///
    /// Days without entries are omitted. Oldest first.
    pub fn daily_totals(
        &self,
        user_id: i64,
        days: u32,
        kind: TransactionKind,
        today: NaiveDate,
    ) -> Result<Vec<DailyTotal>> {
        // Windows reaching past the calendar start cover everything
        let start = today
            .checked_sub_days(Days::new(u64::from(days.max(1) - 1)))
            .unwrap_or(NaiveDate::MIN);
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT date, SUM(amount)
            FROM transactions
            WHERE user_id = ?1 AND kind = ?2 AND date >= ?3 AND date <= ?4
            GROUP BY date
            ORDER BY date ASC
            "#,
        )?;
        let rows = stmt
            .query_map(
                params![user_id, kind.as_str(), start.to_string(), today.to_string()],
                |row| {
                    let date: String = row.get(0)?;
                    Ok((date, row.get::<_, i64>(1)?))
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(date, total)| {
                NaiveDate::parse_from_str(&date, "%Y-%m-%d")
                    .ok()
                    .map(|date| DailyTotal { date, total })
            })
            .collect())
    }

    /// Export every entry for `user_id` as CSV, most recent first
    pub fn export_csv(&self, user_id: i64) -> Result<String> {
        let transactions = self.query(user_id, &LedgerFilter::new())?;

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_COLUMNS)?;
        for tx in &transactions {
            let ts = tx.created_at;
            writer.write_record([
                ts.format("%Y-%m-%d").to_string(),
                tx.kind.as_str().to_string(),
                tx.amount.to_string(),
                tx.description.clone(),
                tx.category.clone(),
                ts.format("%A").to_string(),
                ts.format("%B").to_string(),
                ts.year().to_string(),
                ts.format("%H:%M:%S").to_string(),
                tx.origin.as_str().to_string(),
                tx.source_app.clone().unwrap_or_default(),
                tx.counterparty.clone().unwrap_or_default(),
                tx.transaction_ref.clone().unwrap_or_default(),
                tx.confidence.as_str().to_string(),
            ])?;
        }

        let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Remove every entry for `user_id`, returning how many were deleted
    pub fn delete_all(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE user_id = ?1",
            params![user_id],
        )?;
        info!(user_id, deleted, "Ledger cleared");
        Ok(deleted)
    }
}
