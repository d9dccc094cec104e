//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, load_pipeline) and the health check
//! - `message` - Text messages: message, chat, parse
//! - `screenshot` - Payment screenshots
//! - `reports` - Balance, categories, daily patterns
//! - `ledger` - Export and delete-all
//! - `prompts` - Prompt library inspection
//! - `reply` - Reply text rendering shared by the handlers

pub mod core;
pub mod ledger;
pub mod message;
pub mod prompts;
pub mod reply;
pub mod reports;
pub mod screenshot;

// Re-export command functions for main.rs
pub use core::*;
pub use ledger::*;
pub use message::*;
pub use prompts::*;
pub use reports::*;
pub use screenshot::*;

/// Format whole rupees with thousands separators: `₹12,500`
pub fn rupees(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if amount < 0 {
        format!("-₹{}", grouped)
    } else {
        format!("₹{}", grouped)
    }
}

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
