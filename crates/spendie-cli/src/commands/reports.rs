//! Ledger report commands: balance, categories, patterns

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use spendie_core::db::Database;
use spendie_core::models::TransactionKind;

use super::reply;

/// Balance summary with the largest expense category
pub fn balance_reply(db: &Database, user_id: i64) -> Result<String> {
    let balance = db
        .aggregate_balance(user_id)
        .context("Failed to read balance")?;
    let breakdown = db
        .category_breakdown(user_id, TransactionKind::Expense)
        .context("Failed to read categories")?;
    Ok(reply::balance(&balance, breakdown.first()))
}

pub fn cmd_balance(db: &Database, user_id: i64) -> Result<()> {
    println!("{}", balance_reply(db, user_id)?);
    Ok(())
}

pub fn categories_reply(db: &Database, user_id: i64) -> Result<String> {
    let breakdown = db
        .category_breakdown(user_id, TransactionKind::Expense)
        .context("Failed to read categories")?;
    Ok(reply::categories(&breakdown))
}

pub fn cmd_categories(db: &Database, user_id: i64) -> Result<()> {
    println!("{}", categories_reply(db, user_id)?);
    Ok(())
}

pub fn patterns_reply(db: &Database, user_id: i64, days: u32, today: NaiveDate) -> Result<String> {
    let totals = db
        .daily_totals(user_id, days, TransactionKind::Expense, today)
        .context("Failed to read daily totals")?;
    Ok(reply::patterns(&totals, days))
}

pub fn cmd_patterns(db: &Database, user_id: i64, days: u32) -> Result<()> {
    let today = Local::now().date_naive();
    println!("{}", patterns_reply(db, user_id, days, today)?);
    Ok(())
}
