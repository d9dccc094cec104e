//! Spendie CLI - natural-language finance bot
//!
//! Usage:
//!   spendie message "papa ne 1200 diye"      Record or answer a message
//!   spendie screenshot pay.png --caption x   Record a payment screenshot
//!   spendie balance                          Show balance summary
//!   spendie export --output ledger.csv       Export the ledger

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Message { text } => {
            let db = commands::open_db(&cli.db)?;
            let pipeline = commands::load_pipeline(config)?;
            commands::cmd_message(&pipeline, &db, cli.user, &text).await
        }
        Commands::Chat => {
            let db = commands::open_db(&cli.db)?;
            let pipeline = commands::load_pipeline(config)?;
            commands::cmd_chat(&pipeline, &db, cli.user).await
        }
        Commands::Screenshot { file, caption, ocr } => {
            let db = commands::open_db(&cli.db)?;
            let pipeline = commands::load_pipeline(config)?;
            commands::cmd_screenshot(&pipeline, &db, cli.user, &file, caption.as_deref(), ocr)
                .await
        }
        Commands::Parse { text } => {
            let pipeline = commands::load_pipeline(config)?;
            commands::cmd_parse(&pipeline, &text).await
        }
        Commands::Balance => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_balance(&db, cli.user)
        }
        Commands::Categories => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_categories(&db, cli.user)
        }
        Commands::Patterns { days } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_patterns(&db, cli.user, days)
        }
        Commands::Export { output } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_export(&db, cli.user, output.as_deref())
        }
        Commands::DeleteAll { yes } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_delete_all(&db, cli.user, yes)
        }
        Commands::Prompts { action } => match action {
            PromptsAction::List => commands::cmd_prompts_list(),
            PromptsAction::Show { id } => commands::cmd_prompts_show(&id),
        },
        Commands::Health => commands::cmd_health(config).await,
    }
}
