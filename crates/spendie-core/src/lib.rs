//! Spendie Core Library
//!
//! Shared functionality for the Spendie finance bot:
//! - Inference backends (OpenAI-compatible HTTP, scripted mock)
//! - Prompt library with per-user overrides
//! - Message interpretation pipeline (rephrase, classify, extract)
//! - Screenshot extraction, validation and description enhancement
//! - SQLite ledger store

pub mod ai;
pub mod db;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prompts;

/// Test utilities including a mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    AIClient, ImageInput, InferenceBackend, InferenceConfig, InferenceRequest, MockBackend,
    OpenAICompatibleBackend,
};
pub use db::{Database, LedgerFilter};
pub use error::{Error, Result};
pub use pipeline::{
    Pipeline, PipelineOutcome, ProcessedMessage, ProcessedScreenshot, ScreenshotInput, Validation,
};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
