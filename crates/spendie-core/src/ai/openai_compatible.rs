//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - Groq (https://api.groq.com/openai), the default
//! - vLLM (http://localhost:8000)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! Screenshot images are sent inline as base64 data URLs.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::config::InferenceConfig;
use super::{InferenceBackend, InferenceRequest};

/// OpenAI-compatible backend
///
/// Works with any server implementing the OpenAI `/v1/chat/completions` API.
///
/// # Example
///
/// ```rust,ignore
/// // Groq
/// export SPENDIE_API_KEY="gsk_..."
///
/// // Local vLLM
/// export SPENDIE_INFERENCE_HOST="http://192.168.1.100:8000"
/// export SPENDIE_INFERENCE_MODEL="meta-llama/Llama-3.2-3B-Instruct"
/// ```
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    vision_model: Option<String>,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a backend with default timeout and no credential
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let config = InferenceConfig {
            base_url: base_url.to_string(),
            model: model.to_string(),
            ..InferenceConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create from explicit configuration
    ///
    /// The configured timeout bounds every request end to end.
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn build_request(&self, request: &InferenceRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);

        if !request.system_prompt.trim().is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: ChatContent::Text(request.system_prompt.clone()),
            });
        }

        let user_content = match &request.image {
            Some(image) => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(&image.data);
                ChatContent::Parts(vec![
                    ContentPart::Text {
                        text: request.user_prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:{};base64,{}", image.mime_type, encoded),
                        },
                    },
                ])
            }
            None => ChatContent::Text(request.user_prompt.clone()),
        };
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user_content,
        });

        let model = match (&request.image, &self.vision_model) {
            (Some(_), Some(vision)) => vision.clone(),
            _ => self.model.clone(),
        };

        ChatCompletionRequest {
            model,
            messages,
            temperature: Some(request.temperature),
            max_tokens: request.image.as_ref().map(|_| 1024),
            response_format: request.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
            stream: false,
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.api_key {
            Some(ref api_key) => builder.header("Authorization", format!("Bearer {}", api_key)),
            None => builder,
        }
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
    stream: bool,
}

/// Chat message
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: ChatContent,
}

/// Chat message content (text or multimodal)
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal messages
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

/// Image URL for vision requests
#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// `response_format` for JSON mode
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Chat completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Chat response message
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl InferenceBackend for OpenAICompatibleBackend {
    async fn infer(&self, request: &InferenceRequest) -> Result<String> {
        let body = self.build_request(request);
        debug!(
            task = %request.task,
            model = %body.model,
            has_image = request.image.is_some(),
            "Inference request: {}",
            request.user_prompt
        );

        let req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body);

        let response = self
            .authorize(req_builder)
            .send()
            .await
            .map_err(|e| Error::InferenceUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InferenceUnavailable(format!(
                "API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::InferenceUnavailable(format!("undecodable response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::InferenceUnavailable("response has no completion".into()))?;

        debug!(task = %request.task, "Inference response: {}", content);
        Ok(content)
    }

    async fn health_check(&self) -> bool {
        let req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));

        match self.authorize(req_builder).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
