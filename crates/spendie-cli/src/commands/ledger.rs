//! Ledger maintenance commands: export, delete-all

use std::path::Path;

use anyhow::{Context, Result};
use spendie_core::db::Database;

/// Export the user's ledger as CSV to a file, or stdout
pub fn cmd_export(db: &Database, user_id: i64, output: Option<&Path>) -> Result<()> {
    let csv = db.export_csv(user_id).context("Failed to export ledger")?;

    match output {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let rows = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} transactions to {}", rows, path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

pub fn cmd_delete_all(db: &Database, user_id: i64, yes: bool) -> Result<()> {
    if !yes {
        println!("⚠️  This deletes every transaction for user {}.", user_id);
        println!("   Re-run with --yes to confirm.");
        return Ok(());
    }

    let deleted = db.delete_all(user_id).context("Failed to delete transactions")?;
    println!("🗑️ Deleted {} transactions.", deleted);
    Ok(())
}
