//! Prompt library for the interpretation stages
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/spendie/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Each prompt file carries YAML frontmatter (`id`, `version`, `temperature`)
//! followed by `# System` and `# User` sections. Sections support `{{var}}`
//! substitution and `{{#if var}}...{{/if}}` blocks.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const REPHRASE: &str = include_str!("../../../prompts/rephrase.md");
    pub const CLASSIFY_MESSAGE: &str = include_str!("../../../prompts/classify_message.md");
    pub const EXTRACT_TRANSACTION: &str = include_str!("../../../prompts/extract_transaction.md");
    pub const EXTRACT_QUERY: &str = include_str!("../../../prompts/extract_query.md");
    pub const PARSE_SCREENSHOT: &str = include_str!("../../../prompts/parse_screenshot.md");
}

/// Known prompt IDs, one per inference-backed stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    Rephrase,
    ClassifyMessage,
    ExtractTransaction,
    ExtractQuery,
    ParseScreenshot,
}

impl PromptId {
    /// Get the string identifier for this prompt
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rephrase => "rephrase",
            Self::ClassifyMessage => "classify_message",
            Self::ExtractTransaction => "extract_transaction",
            Self::ExtractQuery => "extract_query",
            Self::ParseScreenshot => "parse_screenshot",
        }
    }

    /// Get all known prompt IDs
    pub fn all() -> &'static [PromptId] {
        &[
            Self::Rephrase,
            Self::ClassifyMessage,
            Self::ExtractTransaction,
            Self::ExtractQuery,
            Self::ParseScreenshot,
        ]
    }

    /// Get the default embedded content for this prompt
    fn default_content(&self) -> &'static str {
        match self {
            Self::Rephrase => defaults::REPHRASE,
            Self::ClassifyMessage => defaults::CLASSIFY_MESSAGE,
            Self::ExtractTransaction => defaults::EXTRACT_TRANSACTION,
            Self::ExtractQuery => defaults::EXTRACT_QUERY,
            Self::ParseScreenshot => defaults::PARSE_SCREENSHOT,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown prompt: {}", s))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    /// Unique identifier
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// Sampling temperature for the stage
    pub temperature: f32,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt body (system + user sections)
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Get the system section of the prompt
    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    /// Get the user section of the prompt
    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section (empty if the prompt has none)
    pub fn render_system(&self, vars: &HashMap<&str, &str>) -> String {
        self.system_section()
            .map(|s| render_template(s, vars))
            .unwrap_or_default()
    }

    /// Render the user section, or the whole body when sections are absent
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        match self.user_section() {
            Some(user) => render_template(user, vars),
            None => render_template(&self.content, vars),
        }
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("prompt {}", id.as_str())))
    }

    /// Load a prompt (checking override first, then default)
    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(override_path) = self.override_path(id).filter(|p| p.exists()) {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::InvalidData(format!("Failed to read prompt override: {}", e))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            tracing::debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                is_override: true,
                override_path: Some(override_path),
            });
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
            override_path: None,
        })
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let has_override = self.has_override(id);
                let override_path = if has_override {
                    self.override_path(id)
                } else {
                    None
                };
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    temperature: prompt.map(|p| p.metadata.temperature).unwrap_or(0.0),
                    has_override,
                    override_path,
                }
            })
            .collect()
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }

    /// Check if a prompt has an override file
    pub fn has_override(&self, id: PromptId) -> bool {
        self.override_path(id).is_some_and(|p| p.exists())
    }

    /// Get the override directory path
    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Clear the cache (useful after editing override files)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub temperature: f32,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendie").join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Sections run until the next top-level header
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditionals, then substitute `{{var}}` placeholders
fn render_template(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = resolve_conditionals(template, vars);
    for (key, value) in vars {
        let pattern = format!("{{{{{}}}}}", key);
        result = result.replace(&pattern, value);
    }
    result
}

/// Keep `{{#if var}}` blocks whose variable is non-empty, drop the rest
fn resolve_conditionals(content: &str, vars: &HashMap<&str, &str>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim().to_string();
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = result[block_start..block_start + endif_pos].to_string();
        let full_end = block_start + endif_pos + 7;

        let keep = vars
            .get(var_name.as_str())
            .is_some_and(|v| !v.trim().is_empty());

        result = if keep {
            format!("{}{}{}", &result[..if_start], block_content, &result[full_end..])
        } else {
            format!("{}{}", &result[..if_start], &result[full_end..])
        };
    }

    result
}
