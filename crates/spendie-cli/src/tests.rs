//! CLI command tests
//!
//! Handlers run against a temp-file ledger and the scripted mock backend.

use chrono::{NaiveDate, NaiveDateTime};
use spendie_core::ai::{AIClient, ImageInput, MockBackend};
use spendie_core::db::{Database, LedgerFilter};
use spendie_core::models::{
    Category, Confidence, Origin, TransactionKind, TransactionRecord,
};
use spendie_core::pipeline::{Pipeline, ScreenshotInput};
use spendie_core::prompts::PromptLibrary;

use crate::commands::{self, reply, rupees, truncate};

const USER: i64 = 42;

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn pipeline(mock: MockBackend) -> Pipeline {
    Pipeline::with_prompts(AIClient::Mock(mock), PromptLibrary::embedded_only())
}

fn at(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, d)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap()
}

fn expense(amount: i64, description: &str, category: Category) -> TransactionRecord {
    TransactionRecord {
        kind: TransactionKind::Expense,
        amount,
        description: description.to_string(),
        category,
        confidence: Confidence::High,
        counterparty: None,
        split_info: None,
        source_app: None,
        transaction_ref: None,
        original_text: description.to_string(),
        canonical_text: description.to_string(),
    }
}

// ========== Formatting ==========

#[test]
fn test_rupees_grouping() {
    assert_eq!(rupees(0), "₹0");
    assert_eq!(rupees(999), "₹999");
    assert_eq!(rupees(1200), "₹1,200");
    assert_eq!(rupees(1234567), "₹1,234,567");
    assert_eq!(rupees(-4500), "-₹4,500");
}

#[test]
fn test_truncate_is_char_safe() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("₹₹₹₹₹₹₹₹", 6), "₹₹₹...");
}

// ========== Message Command Tests ==========

#[tokio::test]
async fn test_message_records_income_with_understood_as() {
    let db = setup_test_db();
    let mock = MockBackend::new()
        .respond("rephrase", "Received ₹1200 from papa")
        .respond("classify_message", "transaction")
        .respond(
            "extract_transaction",
            r#"{"type": "income", "amount": 1200, "description": "received from papa",
                "category": "transfer", "confidence": "high", "recipient_sender": "papa"}"#,
        );

    let reply = commands::handle_message(&pipeline(mock), &db, USER, "papa ne 1200 diye", at(13))
        .await
        .unwrap();

    assert!(reply.starts_with("✅ Transaction Added:"));
    assert!(reply.contains("💰 Income: ₹1,200"));
    assert!(reply.contains("👤 Contact: papa"));
    assert!(reply.contains("🔄 Understood as: Received ₹1200 from papa"));

    let rows = db.query(USER, &LedgerFilter::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].origin, Origin::Manual);
    assert_eq!(rows[0].created_at, at(13));
}

#[tokio::test]
async fn test_message_low_confidence_note_and_no_understood_as() {
    let db = setup_test_db();
    let mock = MockBackend::new()
        .respond("classify_message", "transaction")
        .respond(
            "extract_transaction",
            r#"{"type": "expense", "amount": 60, "description": "chai", "confidence": "low"}"#,
        );

    let reply = commands::handle_message(&pipeline(mock), &db, USER, "chai 60", at(13))
        .await
        .unwrap();

    assert!(reply.starts_with("⚠️ Transaction Added:"));
    assert!(reply.contains("please verify"));
    assert!(!reply.contains("Understood as"));
}

#[tokio::test]
async fn test_message_incomplete_transaction_is_not_saved() {
    let db = setup_test_db();
    let mock = MockBackend::new()
        .respond("classify_message", "transaction")
        .respond(
            "extract_transaction",
            r#"{"type": "expense", "description": "lunch"}"#,
        );

    let reply = commands::handle_message(&pipeline(mock), &db, USER, "had lunch", at(13))
        .await
        .unwrap();

    assert_eq!(reply, reply::INCOMPLETE);
    assert!(db.query(USER, &LedgerFilter::new()).unwrap().is_empty());
}

#[tokio::test]
async fn test_message_extractor_error_is_reported() {
    let db = setup_test_db();
    let mock = MockBackend::new()
        .respond("classify_message", "transaction")
        .respond("extract_transaction", "sorry, I cannot help");

    let reply = commands::handle_message(&pipeline(mock), &db, USER, "spent 5", at(13))
        .await
        .unwrap();

    assert!(reply.starts_with("❌ Could not parse transaction"));
}

#[tokio::test]
async fn test_message_total_query() {
    let db = setup_test_db();
    db.append_at(USER, &expense(250, "Swiggy", Category::Food), Origin::Manual, at(4))
        .unwrap();
    db.append_at(USER, &expense(1250, "Zomato party", Category::Food), Origin::Manual, at(5))
        .unwrap();
    db.append_at(USER, &expense(900, "Movie", Category::Entertainment), Origin::Manual, at(5))
        .unwrap();
    // Outside last week
    db.append_at(USER, &expense(70, "Samosa", Category::Food), Origin::Manual, at(12))
        .unwrap();

    let mock = MockBackend::new()
        .respond("classify_message", "query")
        .respond(
            "extract_query",
            r#"{"intent": "total", "type": "expense", "category": "food",
                "start_date": "last_week", "confidence": "high"}"#,
        );

    let reply = commands::handle_message(
        &pipeline(mock),
        &db,
        USER,
        "how much did I spend on food last week",
        at(13),
    )
    .await
    .unwrap();

    assert_eq!(reply, "💰 Total expense: ₹1,500\n📊 Transactions found: 2");
}

#[tokio::test]
async fn test_message_list_query_caps_at_ten() {
    let db = setup_test_db();
    for d in 1..=12 {
        db.append_at(USER, &expense(i64::from(d) * 10, "snack", Category::Food), Origin::Manual, at(d))
            .unwrap();
    }
    let mock = MockBackend::new()
        .respond("classify_message", "query")
        .respond("extract_query", r#"{"intent": "list", "type": "both"}"#);

    let reply = commands::handle_message(&pipeline(mock), &db, USER, "show transactions", at(13))
        .await
        .unwrap();

    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines[0], "📋 Transaction List:");
    // Most recent first
    assert_eq!(lines[2], "1. 💸 ₹120 - snack (06/12)");
    assert!(reply.contains("10. 💸 ₹30 - snack (06/03)"));
    assert!(!reply.contains("11."));
    assert!(reply.ends_with("... and 2 more transactions"));
}

#[tokio::test]
async fn test_message_summary_and_empty_query() {
    let db = setup_test_db();
    db.append_at(USER, &expense(300, "Groceries", Category::Food), Origin::Manual, at(3))
        .unwrap();
    db.append_at(USER, &expense(500, "Uber", Category::Transport), Origin::Manual, at(3))
        .unwrap();

    let mock = MockBackend::new()
        .respond("classify_message", "query")
        .respond_when("extract_query", "summary", r#"{"intent": "summary", "type": "expense"}"#)
        .respond_when(
            "extract_query",
            "rent",
            r#"{"intent": "search", "keywords": ["rent"]}"#,
        );
    let pipeline = pipeline(mock);

    let summary = commands::handle_message(&pipeline, &db, USER, "expense summary", at(13))
        .await
        .unwrap();
    assert!(summary.contains("💰 Total: ₹800"));
    let transport = summary.find("• transport: ₹500").unwrap();
    let food = summary.find("• food: ₹300").unwrap();
    assert!(transport < food);

    let empty = commands::handle_message(&pipeline, &db, USER, "find rent", at(13))
        .await
        .unwrap();
    assert_eq!(empty, reply::NO_MATCHES);
}

#[tokio::test]
async fn test_message_balance_and_unknown() {
    let db = setup_test_db();
    let mut salary = expense(5000, "salary", Category::Salary);
    salary.kind = TransactionKind::Income;
    db.append_at(USER, &salary, Origin::Manual, at(1)).unwrap();
    db.append_at(USER, &expense(1300, "bill", Category::Bills), Origin::Manual, at(2))
        .unwrap();

    let mock = MockBackend::new()
        .respond_when("classify_message", "balance", "balance")
        .respond("classify_message", "unknown");
    let pipeline = pipeline(mock);

    let balance = commands::handle_message(&pipeline, &db, USER, "my balance", at(13))
        .await
        .unwrap();
    assert_eq!(
        balance,
        "💸 Your Balance Summary:\n🟢 Income: ₹5,000\n🔴 Expense: ₹1,300\n🧾 Net: ₹3,700\n📊 Top Category: bills (₹1,300)"
    );

    let unknown = commands::handle_message(&pipeline, &db, USER, "hello", at(13))
        .await
        .unwrap();
    assert_eq!(unknown, reply::HELP);
}

#[tokio::test]
async fn test_message_service_down_still_replies() {
    let db = setup_test_db();
    let reply = commands::handle_message(
        &pipeline(MockBackend::unavailable()),
        &db,
        USER,
        "spent 100 on fuel",
        at(13),
    )
    .await
    .unwrap();
    assert_eq!(reply, reply::HELP);
}

// ========== Screenshot Command Tests ==========

#[tokio::test]
async fn test_screenshot_transcript_is_saved_with_enhanced_description() {
    let db = setup_test_db();
    let mock = MockBackend::new().respond(
        "parse_screenshot",
        r#"{"amount": 450, "type": "expense", "recipient_sender": "Anil Kumar",
            "app_name": "paytm", "transaction_id": "301234", "description": "UPI payment",
            "category": "food", "confidence": "high"}"#,
    );
    let input = ScreenshotInput::Transcript("Paytm\nPaid to Anil Kumar\n₹450\nUPI Ref 301234".into());

    let reply = commands::handle_screenshot(&pipeline(mock), &db, USER, &input, Some("pizza"))
        .await
        .unwrap();

    assert!(reply.starts_with("✅ Transaction Added from Screenshot:"));
    assert!(reply.contains("📱 App: paytm"));

    let rows = db.query(USER, &LedgerFilter::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].origin, Origin::Screenshot);
    assert_eq!(rows[0].description, "pizza (UPI payment) [to Anil Kumar, via paytm]");
    assert_eq!(rows[0].transaction_ref.as_deref(), Some("301234"));
}

#[tokio::test]
async fn test_screenshot_without_amount_is_rejected() {
    let db = setup_test_db();
    let mock = MockBackend::new().respond("parse_screenshot", r#"{"amount": 0}"#);
    let input = ScreenshotInput::Image(ImageInput::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg"));

    let reply = commands::handle_screenshot(&pipeline(mock), &db, USER, &input, None)
        .await
        .unwrap();

    assert_eq!(reply, reply::NO_SCREENSHOT_AMOUNT);
    assert!(db.query(USER, &LedgerFilter::new()).unwrap().is_empty());
}

#[tokio::test]
async fn test_cmd_screenshot_reads_ocr_file() {
    let db = setup_test_db();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ocr.txt");
    std::fs::write(&path, "Google Pay\nReceived from Meena\n₹2,000\nPayment successful").unwrap();

    // parse_screenshot is unscripted: the mock answers `{}` and the heuristics decide
    commands::cmd_screenshot(&pipeline(MockBackend::new()), &db, USER, &path, None, true)
        .await
        .unwrap();

    let rows = db.query(USER, &LedgerFilter::new()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 2000);
    assert_eq!(rows[0].kind, TransactionKind::Income);
    assert_eq!(rows[0].source_app.as_deref(), Some("googlepay"));
    assert_eq!(rows[0].counterparty.as_deref(), Some("Meena"));
}

// ========== Report Command Tests ==========

#[test]
fn test_categories_and_patterns_replies() {
    let db = setup_test_db();
    assert_eq!(
        commands::categories_reply(&db, USER).unwrap(),
        "📭 No expense categories found."
    );

    db.append_at(USER, &expense(200, "bus", Category::Transport), Origin::Manual, at(10))
        .unwrap();
    db.append_at(USER, &expense(500, "dinner", Category::Food), Origin::Manual, at(12))
        .unwrap();

    let categories = commands::categories_reply(&db, USER).unwrap();
    assert_eq!(
        categories,
        "📊 Spending by Category:\n• food: ₹500\n• transport: ₹200"
    );

    let today = NaiveDate::from_ymd_opt(2024, 6, 13).unwrap();
    let patterns = commands::patterns_reply(&db, USER, 7, today).unwrap();
    assert!(patterns.starts_with("📈 Last 7 Days Spending:"));
    assert!(patterns.contains("• 2024-06-10: ₹200"));
    assert!(patterns.contains("📊 Period Total: ₹700"));
    assert!(patterns.contains("📈 Daily Average: ₹100"));

    let empty = commands::patterns_reply(&db, USER, 1, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap())
        .unwrap();
    assert_eq!(empty, "📭 No spending patterns found.");
}

#[test]
fn test_cmd_balance_categories_patterns_run() {
    let db = setup_test_db();
    assert!(commands::cmd_balance(&db, USER).is_ok());
    assert!(commands::cmd_categories(&db, USER).is_ok());
    assert!(commands::cmd_patterns(&db, USER, 7).is_ok());
}

#[test]
fn test_patterns_days_is_bounded() {
    use clap::Parser;

    use crate::cli::{Cli, Commands};

    let cli = Cli::try_parse_from(["spendie", "patterns", "--days", "30"]).unwrap();
    assert!(matches!(cli.command, Commands::Patterns { days: 30 }));

    assert!(Cli::try_parse_from(["spendie", "patterns", "--days", "0"]).is_err());
    assert!(Cli::try_parse_from(["spendie", "patterns", "--days", "200000000"]).is_err());
}

// ========== Ledger Command Tests ==========

#[test]
fn test_cmd_export_writes_csv_file() {
    let db = setup_test_db();
    db.append_at(USER, &expense(99, "tea, biscuits", Category::Food), Origin::Manual, at(7))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    commands::cmd_export(&db, USER, Some(&path)).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("Date,Type,Amount,Description,Category"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("2024-06-07,expense,99,\"tea, biscuits\",food,Friday,June,2024,18:00:00,manual"));
}

#[test]
fn test_cmd_delete_all_requires_confirmation() {
    let db = setup_test_db();
    db.append_at(USER, &expense(10, "x", Category::Miscellaneous), Origin::Manual, at(1))
        .unwrap();

    commands::cmd_delete_all(&db, USER, false).unwrap();
    assert_eq!(db.query(USER, &LedgerFilter::new()).unwrap().len(), 1);

    commands::cmd_delete_all(&db, USER, true).unwrap();
    assert!(db.query(USER, &LedgerFilter::new()).unwrap().is_empty());
}

// ========== Prompts Command Tests ==========

#[test]
fn test_cmd_prompts_show_known_and_unknown() {
    assert!(commands::cmd_prompts_show("extract_query").is_ok());
    assert!(commands::cmd_prompts_show("not_a_prompt").is_ok());
    assert!(commands::cmd_prompts_list().is_ok());
}
