//! Payment screenshot command

use std::path::Path;

use anyhow::{Context, Result};
use spendie_core::ai::ImageInput;
use spendie_core::db::Database;
use spendie_core::models::Origin;
use spendie_core::pipeline::{Pipeline, ScreenshotInput};

use super::reply;

/// Extract, validate and store a screenshot transaction; returns the reply text
pub async fn handle_screenshot(
    pipeline: &Pipeline,
    db: &Database,
    user_id: i64,
    input: &ScreenshotInput,
    caption: Option<&str>,
) -> Result<String> {
    let processed = pipeline.process_screenshot(input, caption).await;

    if processed.record.amount <= 0 {
        return Ok(reply::NO_SCREENSHOT_AMOUNT.to_string());
    }
    if !processed.validation.is_valid {
        return Ok(reply::screenshot_rejected(&processed.validation.reason));
    }

    db.append(user_id, &processed.record, Origin::Screenshot)
        .context("Failed to save transaction")?;
    Ok(reply::screenshot_added(&processed.record))
}

pub async fn cmd_screenshot(
    pipeline: &Pipeline,
    db: &Database,
    user_id: i64,
    file: &Path,
    caption: Option<&str>,
    ocr: bool,
) -> Result<()> {
    println!("📸 Processing {}...", file.display());
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let input = if ocr {
        ScreenshotInput::Transcript(String::from_utf8_lossy(&bytes).into_owned())
    } else {
        ScreenshotInput::Image(ImageInput::sniff(bytes))
    };

    let reply = handle_screenshot(pipeline, db, user_id, &input, caption).await?;
    println!("{}", reply);
    Ok(())
}
