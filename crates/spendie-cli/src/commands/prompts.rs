//! Prompts-related command implementations

use anyhow::Result;
use spendie_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

/// List all prompts and their override status
pub fn cmd_prompts_list() -> Result<()> {
    let mut library = PromptLibrary::new();
    let prompts = library.list();

    println!("Available Prompts:\n");

    println!(
        "{:<22} {:>7}  {:>11}  {}",
        "ID", "VERSION", "TEMPERATURE", "OVERRIDE"
    );
    println!("{}", "-".repeat(60));

    for info in prompts {
        let override_status = if info.has_override {
            "✓ Custom"
        } else {
            "Default"
        };

        println!(
            "{:<22} {:>7}  {:>11.1}  {}",
            info.id, info.version, info.temperature, override_status
        );
    }

    println!();
    println!(
        "Override directory: {}",
        default_prompts_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(not available)".to_string())
    );
    println!();
    println!("To customize a prompt, copy it into the override directory as <id>.md and edit it.");

    Ok(())
}

/// Show the content of a specific prompt
pub fn cmd_prompts_show(prompt_id: &str) -> Result<()> {
    let id: PromptId = match prompt_id.parse() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("Unknown prompt ID: {}", prompt_id);
            eprintln!();
            eprintln!("Available prompts:");
            for id in PromptId::all() {
                eprintln!("  - {}", id.as_str());
            }
            return Ok(());
        }
    };

    let mut library = PromptLibrary::new();
    let prompt = library.get(id)?;

    println!("Prompt: {}", prompt.metadata.id);
    println!("Version: {}", prompt.metadata.version);
    println!("Temperature: {}", prompt.metadata.temperature);
    println!(
        "Source: {}",
        if prompt.is_override {
            "Override"
        } else {
            "Default"
        }
    );

    if let Some(ref path) = prompt.override_path {
        println!("Override Path: {}", path.display());
    }

    println!();
    println!("--- Content ---");
    println!("{}", prompt.content);

    Ok(())
}
