//! HookForge configuration management

use crate::generation::backend::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Main HookForge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookForgeConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Generation backend configuration
    pub backends: BackendsConfig,

    /// Retry/cardinality policy per request kind
    pub generation: GenerationConfig,

    /// Session memory configuration
    pub memory: MemoryConfig,

    /// Ad corpus configuration
    pub corpus: CorpusConfig,
}

impl HookForgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::error::Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
            cors_origins: vec!["http://localhost:*".to_string()],
        }
    }
}

/// Generation backend configuration
///
/// `default` names the local fallback backend every failed remote call is
/// retried against exactly once. Remote backends are optional; a request
/// naming an unconfigured backend is served by the fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Default (local fallback) backend
    pub default: BackendKind,

    /// Ollama local backend
    pub ollama: OllamaConfig,

    /// Gemini remote backend
    pub gemini: Option<RemoteBackendConfig>,

    /// OpenRouter remote backend
    pub openrouter: Option<RemoteBackendConfig>,

    /// Groq remote backend
    pub groq: Option<RemoteBackendConfig>,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            default: BackendKind::Ollama,
            ollama: OllamaConfig::default(),
            gemini: Some(RemoteBackendConfig {
                api_key_ref: "gemini_api_key".to_string(),
                model: "gemini-1.5-flash".to_string(),
                timeout_secs: 30,
            }),
            openrouter: Some(RemoteBackendConfig {
                api_key_ref: "openrouter_api_key".to_string(),
                model: "meta-llama/llama-2-70b-chat".to_string(),
                timeout_secs: 60,
            }),
            groq: Some(RemoteBackendConfig {
                api_key_ref: "groq_api_key".to_string(),
                model: "mixtral-8x7b-32768".to_string(),
                timeout_secs: 60,
            }),
        }
    }
}

/// Ollama backend configuration
///
/// The local backend has no rate limit but may be slow under load, so its
/// timeout is much longer than the remote backends'.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama generate endpoint
    pub url: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            model: "gemma:2b".to_string(),
            timeout_secs: 300,
        }
    }
}

/// Remote backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteBackendConfig {
    /// API key reference: names the environment variable holding the key
    pub api_key_ref: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Resolve API keys from environment variables.
///
/// Each remote backend's `api_key_ref` names an environment variable
/// (e.g. `"gemini_api_key"` → reads `$GEMINI_API_KEY`). We try both the
/// original casing and the UPPER_CASE form.
pub fn resolve_api_keys_from_env(backends: &BackendsConfig) -> HashMap<BackendKind, String> {
    let mut keys = HashMap::new();
    let refs = [
        (BackendKind::Gemini, backends.gemini.as_ref()),
        (BackendKind::Openrouter, backends.openrouter.as_ref()),
        (BackendKind::Groq, backends.groq.as_ref()),
    ];
    for (kind, cfg) in refs {
        if let Some(cfg) = cfg {
            let val = std::env::var(&cfg.api_key_ref)
                .or_else(|_| std::env::var(cfg.api_key_ref.to_uppercase()));
            if let Ok(key) = val {
                keys.insert(kind, key);
            }
        }
    }
    keys
}

/// Retry and cardinality policy for one request kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPolicy {
    /// Exact number of items an accepted attempt must yield
    pub expected_items: usize,

    /// Maximum number of generation attempts per request
    pub max_retries: u32,

    /// Delay between attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Per-request-kind generation policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Marketing angle generation (3 items)
    pub angles: RequestPolicy,

    /// Hook generation (5 paired items)
    pub hooks: RequestPolicy,

    /// Image prompt generation (1 free-form item per style)
    pub image_prompts: RequestPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            angles: RequestPolicy {
                expected_items: 3,
                max_retries: 6,
                retry_delay_ms: 750,
            },
            hooks: RequestPolicy {
                expected_items: 5,
                max_retries: 6,
                retry_delay_ms: 750,
            },
            image_prompts: RequestPolicy {
                expected_items: 1,
                max_retries: 4,
                retry_delay_ms: 500,
            },
        }
    }
}

/// Session memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum retained entries per category
    pub capacity: usize,

    /// Number of recent entries included in generation prompts
    pub context_entries: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            context_entries: 5,
        }
    }
}

/// Ad corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Path to the analyzed competitor-ads JSON file (None = no corpus)
    pub data_file: Option<PathBuf>,

    /// Number of sampled ads per context snippet
    pub snippet_count: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            snippet_count: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HookForgeConfig::default();
        assert_eq!(config.server.port, 3002);
        assert_eq!(config.backends.default, BackendKind::Ollama);
        assert_eq!(config.generation.angles.expected_items, 3);
        assert_eq!(config.generation.hooks.expected_items, 5);
        assert_eq!(config.memory.capacity, 20);
    }

    #[test]
    fn test_local_timeout_exceeds_remote() {
        let config = BackendsConfig::default();
        let ollama = config.ollama.timeout_secs;
        for remote in [&config.gemini, &config.openrouter, &config.groq] {
            assert!(remote.as_ref().is_some_and(|r| r.timeout_secs < ollama));
        }
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = HookForgeConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: HookForgeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.generation.hooks.max_retries, 6);
    }

    #[test]
    fn test_resolve_api_keys_missing_env() {
        let mut backends = BackendsConfig::default();
        if let Some(gemini) = backends.gemini.as_mut() {
            gemini.api_key_ref = "hookforge_test_key_that_does_not_exist".to_string();
        }
        backends.openrouter = None;
        backends.groq = None;
        let keys = resolve_api_keys_from_env(&backends);
        assert!(!keys.contains_key(&BackendKind::Gemini));
    }
}
