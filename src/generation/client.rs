//! Generation client with single-fallback dispatch
//!
//! Dispatches to the backend named by the request and, on any backend
//! failure, falls back exactly once to the designated local backend.
//! It never retries the same failing backend — retry-with-delay belongs
//! to the orchestrator.

use crate::config::BackendsConfig;
use crate::error::{Error, Result};
use crate::generation::backend::{
    BackendKind, GeminiBackend, GenerationBackend, GroqBackend, OllamaBackend, OpenRouterBackend,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of configured backends plus the fallback designation
pub struct GenerationClient {
    backends: HashMap<BackendKind, Arc<dyn GenerationBackend>>,
    fallback: BackendKind,
}

impl GenerationClient {
    /// Build the client from configuration and resolved API keys.
    ///
    /// The local Ollama backend is always registered; remote backends are
    /// registered only when both a config section and an API key are
    /// present. A configured remote without a key is skipped with a
    /// warning rather than failing startup.
    pub fn from_config(
        config: &BackendsConfig,
        api_keys: &HashMap<BackendKind, String>,
    ) -> Result<Self> {
        let mut backends: HashMap<BackendKind, Arc<dyn GenerationBackend>> = HashMap::new();

        backends.insert(
            BackendKind::Ollama,
            Arc::new(OllamaBackend::new(&config.ollama)?),
        );

        if let Some(gemini) = &config.gemini {
            match api_keys.get(&BackendKind::Gemini) {
                Some(key) => {
                    backends.insert(
                        BackendKind::Gemini,
                        Arc::new(GeminiBackend::new(gemini, key.clone())?),
                    );
                }
                None => tracing::warn!(backend = "gemini", "configured but no API key resolved"),
            }
        }
        if let Some(openrouter) = &config.openrouter {
            match api_keys.get(&BackendKind::Openrouter) {
                Some(key) => {
                    backends.insert(
                        BackendKind::Openrouter,
                        Arc::new(OpenRouterBackend::new(openrouter, key.clone())?),
                    );
                }
                None => {
                    tracing::warn!(backend = "openrouter", "configured but no API key resolved")
                }
            }
        }
        if let Some(groq) = &config.groq {
            match api_keys.get(&BackendKind::Groq) {
                Some(key) => {
                    backends.insert(
                        BackendKind::Groq,
                        Arc::new(GroqBackend::new(groq, key.clone())?),
                    );
                }
                None => tracing::warn!(backend = "groq", "configured but no API key resolved"),
            }
        }

        Self::new(backends, config.default)
    }

    /// Build the client from an explicit backend set (used in tests)
    pub fn new(
        backends: HashMap<BackendKind, Arc<dyn GenerationBackend>>,
        fallback: BackendKind,
    ) -> Result<Self> {
        if !backends.contains_key(&fallback) {
            return Err(Error::Config(format!(
                "fallback backend '{}' is not registered",
                fallback
            )));
        }
        Ok(Self { backends, fallback })
    }

    /// Generate text via the requested backend, falling back once to the
    /// default local backend on failure. Returns raw, unvalidated text.
    pub async fn generate(&self, prompt: &str, requested: Option<BackendKind>) -> Result<String> {
        let kind = requested.unwrap_or(self.fallback);

        let backend = match self.backends.get(&kind) {
            Some(backend) => backend,
            None => {
                tracing::warn!(backend = %kind, fallback = %self.fallback, "backend not configured, using fallback");
                return self.generate_with(self.fallback, prompt).await;
            }
        };

        match backend.generate(prompt).await {
            Ok(text) => Ok(text),
            Err(err) if kind != self.fallback => {
                tracing::warn!(backend = %kind, error = %err, fallback = %self.fallback, "generation failed, falling back");
                self.generate_with(self.fallback, prompt).await
            }
            Err(err) => Err(err),
        }
    }

    async fn generate_with(&self, kind: BackendKind, prompt: &str) -> Result<String> {
        self.backends
            .get(&kind)
            .ok_or_else(|| Error::Config(format!("backend '{}' is not registered", kind)))?
            .generate(prompt)
            .await
    }

    /// Backends currently registered
    pub fn available(&self) -> Vec<BackendKind> {
        self.backends.keys().copied().collect()
    }

    /// The designated fallback backend
    pub fn fallback(&self) -> BackendKind {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Scripted backend: fails `failures` times, then succeeds
    struct ScriptedBackend {
        kind: BackendKind,
        calls: AtomicU32,
        always_fail: bool,
        reply: String,
    }

    impl ScriptedBackend {
        fn ok(kind: BackendKind, reply: &str) -> Self {
            Self {
                kind,
                calls: AtomicU32::new(0),
                always_fail: false,
                reply: reply.to_string(),
            }
        }

        fn failing(kind: BackendKind) -> Self {
            Self {
                kind,
                calls: AtomicU32::new(0),
                always_fail: true,
                reply: String::new(),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.always_fail {
                Err(Error::BackendUnavailable {
                    backend: self.kind.to_string(),
                    reason: "scripted failure".to_string(),
                })
            } else {
                Ok(self.reply.clone())
            }
        }

        fn kind(&self) -> BackendKind {
            self.kind
        }
    }

    fn client_with(
        backends: Vec<Arc<dyn GenerationBackend>>,
        fallback: BackendKind,
    ) -> GenerationClient {
        let map = backends.into_iter().map(|b| (b.kind(), b)).collect();
        GenerationClient::new(map, fallback).unwrap()
    }

    #[tokio::test]
    async fn test_requested_backend_used() {
        let gemini = Arc::new(ScriptedBackend::ok(BackendKind::Gemini, "from gemini"));
        let ollama = Arc::new(ScriptedBackend::ok(BackendKind::Ollama, "from ollama"));
        let client = client_with(vec![gemini.clone(), ollama.clone()], BackendKind::Ollama);

        let text = client
            .generate("prompt", Some(BackendKind::Gemini))
            .await
            .unwrap();
        assert_eq!(text, "from gemini");
        assert_eq!(ollama.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_failure_exactly_once() {
        let gemini = Arc::new(ScriptedBackend::failing(BackendKind::Gemini));
        let ollama = Arc::new(ScriptedBackend::ok(BackendKind::Ollama, "fallback reply"));
        let client = client_with(vec![gemini.clone(), ollama.clone()], BackendKind::Ollama);

        let text = client
            .generate("prompt", Some(BackendKind::Gemini))
            .await
            .unwrap();
        assert_eq!(text, "fallback reply");
        // The failing backend was tried once, never retried
        assert_eq!(gemini.calls.load(Ordering::SeqCst), 1);
        assert_eq!(ollama.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_surfaces_error() {
        let ollama = Arc::new(ScriptedBackend::failing(BackendKind::Ollama));
        let client = client_with(vec![ollama.clone()], BackendKind::Ollama);

        let err = client.generate("prompt", None).await.unwrap_err();
        assert!(matches!(err, Error::BackendUnavailable { .. }));
        // No second attempt against the same failing backend
        assert_eq!(ollama.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unregistered_backend_routes_to_fallback() {
        let ollama = Arc::new(ScriptedBackend::ok(BackendKind::Ollama, "local"));
        let client = client_with(vec![ollama.clone()], BackendKind::Ollama);

        let text = client
            .generate("prompt", Some(BackendKind::Groq))
            .await
            .unwrap();
        assert_eq!(text, "local");
    }

    #[test]
    fn test_missing_fallback_rejected() {
        let result = GenerationClient::new(HashMap::new(), BackendKind::Ollama);
        assert!(result.is_err());
    }
}
