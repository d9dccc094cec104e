//! Shared utilities and the health check
//!
//! - `open_db` - Open the ledger database
//! - `load_pipeline` - Build the pipeline from inference config
//! - `cmd_health` - Probe the inference service

use std::path::Path;

use anyhow::{Context, Result};
use spendie_core::ai::{AIClient, InferenceBackend, InferenceConfig};
use spendie_core::db::Database;
use spendie_core::pipeline::Pipeline;
use tracing::debug;

/// Open the ledger, creating it on first use
pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

fn load_client(config_path: Option<&Path>) -> Result<AIClient> {
    let config = InferenceConfig::load(config_path).context("Failed to load inference config")?;
    debug!(config = ?config, "Inference config loaded");
    AIClient::from_config(&config).context("Failed to create inference client")
}

/// Build the interpretation pipeline from config file and environment
pub fn load_pipeline(config_path: Option<&Path>) -> Result<Pipeline> {
    Ok(Pipeline::new(load_client(config_path)?))
}

pub async fn cmd_health(config_path: Option<&Path>) -> Result<()> {
    let ai = load_client(config_path)?;
    println!("🔌 Inference service");
    println!("   Host:  {}", ai.host());
    println!("   Model: {}", ai.model());

    if ai.health_check().await {
        println!("✅ Reachable");
        Ok(())
    } else {
        println!("❌ Not reachable");
        anyhow::bail!("inference service at {} is not reachable", ai.host())
    }
}
