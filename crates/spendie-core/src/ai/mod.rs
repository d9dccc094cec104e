//! Pluggable inference backend abstraction
//!
//! Every interpretation stage talks to the language/vision model through the
//! same narrow contract: one system prompt, one user prompt, a temperature and
//! an optional image. The answer is raw text; parsing and validation belong to
//! the calling stage.
//!
//! # Architecture
//!
//! - `InferenceBackend` trait: the interface every backend implements
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = InferenceConfig::load(None)?;
//! let ai = AIClient::from_config(&config)?;
//!
//! let request = InferenceRequest::new("rephrase", system, "papa ne 1200 diye").temperature(0.1);
//! let text = ai.infer(&request).await?;
//! ```
//!
//! # Configuration
//!
//! See [`InferenceConfig`]. `AI_BACKEND` selects the backend
//! (`openai_compatible`, `mock`). Default: openai_compatible

mod config;
mod mock;
mod openai_compatible;
pub mod parsing;

pub use config::InferenceConfig;
pub use mock::{MockBackend, MockReply};
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Image attached to a vision request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Raw image bytes (encoded by the backend)
    pub data: Vec<u8>,
    /// MIME type used in the data URL
    pub mime_type: String,
}

impl ImageInput {
    pub fn new(data: Vec<u8>, mime_type: &str) -> Self {
        Self {
            data,
            mime_type: mime_type.to_string(),
        }
    }

    /// Guess the MIME type from the file's magic bytes (defaults to JPEG)
    pub fn sniff(data: Vec<u8>) -> Self {
        let mime = if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            "image/png"
        } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
            "image/webp"
        } else if data.starts_with(b"GIF8") {
            "image/gif"
        } else {
            "image/jpeg"
        };
        Self::new(data, mime)
    }
}

/// A single call to the inference service
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    /// Prompt id of the calling stage (logging and test doubles)
    pub task: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub image: Option<ImageInput>,
    /// Ask the service for a single JSON object
    pub json_mode: bool,
}

impl InferenceRequest {
    pub fn new(task: &str, system_prompt: &str, user_prompt: &str) -> Self {
        Self {
            task: task.to_string(),
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            temperature: 0.3,
            image: None,
            json_mode: false,
        }
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.image = Some(image);
        self
    }
}

/// Trait defining the interface for all inference backends
///
/// Implementations map every transport or protocol failure to
/// [`Error::InferenceUnavailable`](crate::error::Error::InferenceUnavailable)
/// and perform no retries.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Send one prompt pair and return the completion text
    async fn infer(&self, request: &InferenceRequest) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete inference client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI-compatible chat completions (Groq, vLLM, llama-server, ...)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Scripted backend for tests and offline runs
    Mock(MockBackend),
}

impl AIClient {
    /// Build a client from explicit configuration
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        match config.backend.to_lowercase().as_str() {
            "mock" => Ok(AIClient::Mock(MockBackend::new())),
            "openai_compatible" | "openai" | "groq" => {
                OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
            }
            other => {
                tracing::warn!(backend = %other, "Unknown AI_BACKEND, falling back to openai_compatible");
                OpenAICompatibleBackend::from_config(config).map(AIClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl InferenceBackend for AIClient {
    async fn infer(&self, request: &InferenceRequest) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.infer(request).await,
            AIClient::Mock(b) => b.infer(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
