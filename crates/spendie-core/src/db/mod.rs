//! Ledger store: SQLite with connection pooling and migrations
//!
//! - `ledger` - append, filtered queries, aggregates, CSV export
//! - `ledger_filter` - WHERE clause builder for ledger queries

use chrono::{Local, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::error::Result;

mod ledger;
mod ledger_filter;

pub use ledger::CSV_COLUMNS;
pub use ledger_filter::{FilterResult, LedgerFilter};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Timestamp layout used for `created_at`
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a SQLite datetime string
pub(crate) fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .unwrap_or_else(|_| Local::now().naive_local())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
}

impl Database {
    /// Open (or create) the ledger at `path` and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;
        debug!(path = %path, "Ledger opened");

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Backed by a temp file: each pooled connection to `:memory:` would
    /// otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "spendie_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().to_string();

        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL: readers don't block the writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
                amount INTEGER NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL,
                category TEXT NOT NULL DEFAULT 'miscellaneous',
                confidence TEXT NOT NULL DEFAULT 'low',
                counterparty TEXT,                         -- recipient or sender
                split_info TEXT,
                source_app TEXT,                           -- normalised payment app name
                transaction_ref TEXT,                      -- UPI/bank reference
                origin TEXT NOT NULL DEFAULT 'manual',     -- manual, screenshot
                date DATE NOT NULL,
                created_at DATETIME NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_transactions_user_kind ON transactions(user_id, kind);
            "#,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
