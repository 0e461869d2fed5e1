//! Pluggable generation backend architecture
//!
//! Defines the `GenerationBackend` trait for interchangeable text
//! generators behind one call contract. Backends return raw, untrusted
//! text and do no parsing or validation; failure is signalled as
//! `BackendUnavailable` (unreachable, non-2xx, malformed envelope) or
//! `BackendTimeout`, both distinct from any content-level concern.

use crate::config::{OllamaConfig, RemoteBackendConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const GENERATION_TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 1024;

/// Backend capability tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama instance (designated fallback)
    Ollama,
    /// Google Gemini
    Gemini,
    /// OpenRouter
    Openrouter,
    /// Groq
    Groq,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
            Self::Openrouter => write!(f, "openrouter"),
            Self::Groq => write!(f, "groq"),
        }
    }
}

/// Interchangeable text-generation backend interface
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate raw text from a prompt. The returned text is untrusted.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Capability tag of this backend
    fn kind(&self) -> BackendKind;
}

/// Map a reqwest transport failure onto the backend error taxonomy
fn map_request_error(kind: BackendKind, timeout_secs: u64, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::BackendTimeout {
            backend: kind.to_string(),
            seconds: timeout_secs,
        }
    } else {
        Error::BackendUnavailable {
            backend: kind.to_string(),
            reason: err.to_string(),
        }
    }
}

fn unavailable(kind: BackendKind, reason: impl Into<String>) -> Error {
    Error::BackendUnavailable {
        backend: kind.to_string(),
        reason: reason.into(),
    }
}

fn build_client(kind: BackendKind, timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| unavailable(kind, format!("client build failed: {}", e)))
}

// =============================================================================
// Ollama (local fallback)
// =============================================================================

/// Local Ollama backend. No rate limit, long timeout.
pub struct OllamaBackend {
    client: reqwest::Client,
    url: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

impl OllamaBackend {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(BackendKind::Ollama, config.timeout_secs)?,
            url: config.url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl GenerationBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": GENERATION_TEMPERATURE },
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(BackendKind::Ollama, self.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(unavailable(
                BackendKind::Ollama,
                format!("HTTP {}", response.status()),
            ));
        }

        let envelope: OllamaResponse = response
            .json()
            .await
            .map_err(|e| map_request_error(BackendKind::Ollama, self.timeout_secs, e))?;

        if envelope.response.trim().is_empty() {
            return Err(unavailable(BackendKind::Ollama, "empty response envelope"));
        }
        Ok(envelope.response.trim().to_string())
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Ollama
    }
}

// =============================================================================
// Gemini
// =============================================================================

/// Google Gemini backend
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Deserialize, Default)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiBackend {
    pub fn new(config: &RemoteBackendConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(BackendKind::Gemini, config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": GENERATION_TEMPERATURE,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_request_error(BackendKind::Gemini, self.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(unavailable(
                BackendKind::Gemini,
                format!("HTTP {}", response.status()),
            ));
        }

        let envelope: GeminiResponse = response
            .json()
            .await
            .map_err(|e| map_request_error(BackendKind::Gemini, self.timeout_secs, e))?;

        envelope
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| unavailable(BackendKind::Gemini, "empty response envelope"))
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Gemini
    }
}

// =============================================================================
// OpenAI-compatible chat backends (OpenRouter, Groq)
// =============================================================================

#[derive(Deserialize, Default)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

async fn chat_completion(
    kind: BackendKind,
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
    timeout_secs: u64,
    extra_headers: &[(&str, &str)],
) -> Result<String> {
    let body = serde_json::json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "temperature": GENERATION_TEMPERATURE,
        "max_tokens": MAX_OUTPUT_TOKENS,
    });

    let mut request = client.post(url).bearer_auth(api_key).json(&body);
    for (name, value) in extra_headers {
        request = request.header(*name, *value);
    }

    let response = request
        .send()
        .await
        .map_err(|e| map_request_error(kind, timeout_secs, e))?;

    if !response.status().is_success() {
        return Err(unavailable(kind, format!("HTTP {}", response.status())));
    }

    let envelope: ChatResponse = response
        .json()
        .await
        .map_err(|e| map_request_error(kind, timeout_secs, e))?;

    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unavailable(kind, "empty response envelope"))
}

/// OpenRouter backend
pub struct OpenRouterBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenRouterBackend {
    pub fn new(config: &RemoteBackendConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(BackendKind::Openrouter, config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl GenerationBackend for OpenRouterBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        chat_completion(
            BackendKind::Openrouter,
            &self.client,
            "https://openrouter.ai/api/v1/chat/completions",
            &self.api_key,
            &self.model,
            prompt,
            self.timeout_secs,
            &[("X-Title", "HookForge")],
        )
        .await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Openrouter
    }
}

/// Groq backend
pub struct GroqBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl GroqBackend {
    pub fn new(config: &RemoteBackendConfig, api_key: String) -> Result<Self> {
        Ok(Self {
            client: build_client(BackendKind::Groq, config.timeout_secs)?,
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl GenerationBackend for GroqBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        chat_completion(
            BackendKind::Groq,
            &self.client,
            "https://api.groq.com/openai/v1/chat/completions",
            &self.api_key,
            &self.model,
            prompt,
            self.timeout_secs,
            &[],
        )
        .await
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Groq
    }
}
