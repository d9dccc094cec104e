//! Text message commands: message, chat, parse

use std::io::BufRead;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use spendie_core::db::{Database, LedgerFilter};
use spendie_core::error::Error;
use spendie_core::models::Origin;
use spendie_core::pipeline::{Pipeline, PipelineOutcome};
use tracing::warn;

use super::reply;
use super::reports::balance_reply;

/// Handle one chat message and produce the reply text
///
/// Complete transactions are appended to the ledger; queries and balance
/// requests read from it.
pub async fn handle_message(
    pipeline: &Pipeline,
    db: &Database,
    user_id: i64,
    text: &str,
    now: NaiveDateTime,
) -> Result<String> {
    let processed = pipeline.process_text_at(text, now).await;
    let understood_as = processed
        .was_rephrased()
        .then_some(processed.canonical_text.as_str());

    let reply = match &processed.outcome {
        PipelineOutcome::Transaction(txn) => match txn.clone().into_record() {
            Ok(record) => {
                db.append_at(user_id, &record, Origin::Manual, now)
                    .context("Failed to save transaction")?;
                reply::transaction_added(&record, understood_as)
            }
            Err(Error::IncompleteRecord(missing)) => {
                warn!(missing = %missing, "Transaction not recorded");
                reply::INCOMPLETE.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Transaction not recorded");
                format!("{}\n{}", reply::INCOMPLETE, e)
            }
        },
        PipelineOutcome::Query(spec) => {
            let rows = db
                .query(user_id, &LedgerFilter::from(spec))
                .context("Failed to query ledger")?;
            reply::query_result(spec, &rows)
        }
        PipelineOutcome::Balance => balance_reply(db, user_id)?,
        PipelineOutcome::Unknown => reply::HELP.to_string(),
        PipelineOutcome::Error(err) => reply::extraction_failed(err),
    };
    Ok(reply)
}

pub async fn cmd_message(pipeline: &Pipeline, db: &Database, user_id: i64, text: &str) -> Result<()> {
    let reply = handle_message(pipeline, db, user_id, text, Local::now().naive_local()).await?;
    println!("{}", reply);
    Ok(())
}

/// Read messages from stdin until EOF
pub async fn cmd_chat(pipeline: &Pipeline, db: &Database, user_id: i64) -> Result<()> {
    println!("💬 Spendie chat. One message per line, Ctrl-D to quit.");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let reply = handle_message(pipeline, db, user_id, text, Local::now().naive_local()).await?;
        println!("{}\n", reply);
    }
    Ok(())
}

/// Print the pipeline result as JSON without touching the ledger
pub async fn cmd_parse(pipeline: &Pipeline, text: &str) -> Result<()> {
    let processed = pipeline.process_text(text).await;
    println!("{}", serde_json::to_string_pretty(&processed)?);
    Ok(())
}
