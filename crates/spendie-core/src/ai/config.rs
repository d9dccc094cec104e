//! Inference service configuration
//!
//! Sources, highest priority first:
//! 1. Environment variables
//! 2. Optional TOML file
//! 3. Built-in defaults (Groq's OpenAI-compatible endpoint)
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai_compatible, mock)
//! - `SPENDIE_INFERENCE_HOST`: Server URL
//! - `SPENDIE_INFERENCE_MODEL`: Chat model name
//! - `SPENDIE_VISION_MODEL`: Model used for screenshot images
//! - `SPENDIE_API_KEY` (or `GROQ_API_KEY`): Bearer token
//! - `SPENDIE_INFERENCE_TIMEOUT_SECS`: Request timeout

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

pub const DEFAULT_BACKEND: &str = "openai_compatible";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Explicit configuration handed to the inference backend at construction
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub backend: String,
    pub base_url: String,
    pub model: String,
    pub vision_model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            vision_model: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// Keep the credential out of logs
impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("vision_model", &self.vision_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl InferenceConfig {
    /// Load configuration: optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = get("AI_BACKEND") {
            self.backend = backend;
        }
        if let Some(host) = get("SPENDIE_INFERENCE_HOST") {
            self.base_url = host;
        }
        if let Some(model) = get("SPENDIE_INFERENCE_MODEL") {
            self.model = model;
        }
        if let Some(model) = get("SPENDIE_VISION_MODEL") {
            self.vision_model = Some(model);
        }
        if let Some(key) = get("SPENDIE_API_KEY").or_else(|| get("GROQ_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(secs) = get("SPENDIE_INFERENCE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(s) if s > 0 => self.timeout_secs = s,
                _ => tracing::warn!(value = %secs, "Ignoring invalid SPENDIE_INFERENCE_TIMEOUT_SECS"),
            }
        }
        self
    }

    /// Model to use for a request, preferring the vision model for images
    pub fn model_for(&self, has_image: bool) -> &str {
        match (&self.vision_model, has_image) {
            (Some(vision), true) => vision,
            _ => &self.model,
        }
    }

    fn validate(self) -> Result<Self> {
        if self.base_url.trim().is_empty() {
            return Err(Error::InvalidData("base_url must not be empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(Error::InvalidData("model must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidData("timeout_secs must be positive".into()));
        }
        Ok(self)
    }
}
