//! Retry-until-compliant generation orchestrator.
//!
//! One orchestration run walks `Attempting(1) .. Attempting(max_retries)`
//! and terminates in `Accepted` or `Exhausted`. Each attempt:
//! generate → parse → sanitize → validate. Acceptance is all-or-nothing
//! per attempt: a batch where any item fails compliance after the rewrite
//! is rejected whole, because downstream consumers rely on receiving
//! exactly the expected item count.
//!
//! Backend and parse failures are absorbed here as rejection reasons;
//! only the accepted or exhausted outcome crosses the module boundary.

use crate::compliance::Normalizer;
use crate::config::{GenerationConfig, RequestPolicy};
use crate::corpus::AdCorpusProvider;
use crate::generation::backend::BackendKind;
use crate::generation::client::GenerationClient;
use crate::generation::parser::{parse_free_form, parse_numbered_list, parse_paired_list, HookCopy};
use crate::generation::prompt::{angles_prompt, hooks_prompt, image_prompt, ImageStyle, PromptContext};
use crate::memory::{Category, MemoryEntry, SessionMemory};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Minimum acceptable length for a free-form image prompt
const MIN_IMAGE_PROMPT_LEN: usize = 50;

/// Immutable input to one orchestration cycle
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub product_name: String,
    pub product_context: String,
    #[serde(default)]
    pub target_angle: Option<String>,
    #[serde(default)]
    pub custom_direction: Option<String>,
    #[serde(default)]
    pub backend: Option<BackendKind>,
}

/// Why one attempt was rejected
#[derive(Debug, Clone)]
pub enum RejectReason {
    /// The generation call itself failed (unavailable or timed out)
    Backend(String),
    /// Fewer valid items parsed than the request requires
    ParseShortfall { parsed: usize, expected: usize },
    /// One or more items failed compliance even after sanitize.
    /// Rule names are kept for logs and diagnostics; `Display` hides
    /// them so they are never echoed to end users verbatim.
    Compliance { rules: Vec<String> },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(reason) => write!(f, "backend failure: {}", reason),
            Self::ParseShortfall { parsed, expected } => {
                write!(f, "expected {} items, parsed {}", expected, parsed)
            }
            Self::Compliance { rules } => {
                write!(f, "content policy violation ({} rule(s) matched)", rules.len())
            }
        }
    }
}

/// Outcome of one orchestration run.
///
/// `succeeded == true` implies `items.len()` equals the configured count
/// and every item passes compliance; `succeeded == false` implies `items`
/// is empty and `rejections` holds one reason per failed attempt.
#[derive(Debug, Clone)]
pub struct GenerationResult<T> {
    pub items: Vec<T>,
    pub attempts_used: u32,
    pub succeeded: bool,
    pub rejections: Vec<RejectReason>,
}

impl<T> GenerationResult<T> {
    /// The most recent rejection, for the diagnostic payload
    pub fn last_failure(&self) -> Option<&RejectReason> {
        self.rejections.last()
    }
}

/// Item-level seam between the orchestrator and the normalizer.
///
/// Lets the retry loop sanitize and validate plain strings and two-part
/// hooks through one code path.
pub trait CopyItem: Clone + Send {
    /// Best-effort policy rewrite of every text part
    fn sanitized(&self, normalizer: &Normalizer) -> Self;

    /// Names of violated rules across all text parts; empty = compliant
    fn violations(&self, normalizer: &Normalizer) -> Vec<String>;
}

impl CopyItem for String {
    fn sanitized(&self, normalizer: &Normalizer) -> Self {
        normalizer.sanitize(self)
    }

    fn violations(&self, normalizer: &Normalizer) -> Vec<String> {
        normalizer.violations(self)
    }
}

impl CopyItem for HookCopy {
    fn sanitized(&self, normalizer: &Normalizer) -> Self {
        Self {
            main: normalizer.sanitize(&self.main),
            supporting: normalizer.sanitize(&self.supporting),
        }
    }

    fn violations(&self, normalizer: &Normalizer) -> Vec<String> {
        let mut rules = normalizer.violations(&self.main);
        rules.extend(normalizer.violations(&self.supporting));
        rules
    }
}

/// The retry-until-compliant control loop
pub struct Orchestrator {
    client: Arc<GenerationClient>,
    normalizer: Arc<Normalizer>,
    memory: Arc<SessionMemory>,
    corpus: Arc<dyn AdCorpusProvider>,
    config: GenerationConfig,
    memory_context_entries: usize,
}

impl Orchestrator {
    pub fn new(
        client: Arc<GenerationClient>,
        normalizer: Arc<Normalizer>,
        memory: Arc<SessionMemory>,
        corpus: Arc<dyn AdCorpusProvider>,
        config: GenerationConfig,
        memory_context_entries: usize,
    ) -> Self {
        Self {
            client,
            normalizer,
            memory,
            corpus,
            config,
            memory_context_entries,
        }
    }

    /// Generate the configured number of marketing angles.
    ///
    /// On acceptance the result is recorded into session memory before
    /// returning, so the next run sees it as "do not repeat" context.
    pub async fn generate_angles(&self, request: &GenerationRequest) -> GenerationResult<String> {
        let policy = self.config.angles.clone();
        let context = self.prompt_context(Category::Angles).await;
        let prompt = angles_prompt(request, &context, policy.expected_items);

        let result = self
            .run_attempts(&policy, request.backend, &prompt, |raw| {
                parse_numbered_list(raw, policy.expected_items)
            })
            .await;

        if result.succeeded {
            self.memory
                .record(
                    Category::Angles,
                    MemoryEntry::new(
                        &request.product_name,
                        &request.product_context,
                        None,
                        result.items.clone(),
                    ),
                )
                .await;
        }
        result
    }

    /// Generate the configured number of hooks for an angle
    pub async fn generate_hooks(
        &self,
        request: &GenerationRequest,
        angle: &str,
    ) -> GenerationResult<HookCopy> {
        let policy = self.config.hooks.clone();
        let context = self.prompt_context(Category::Hooks).await;
        let prompt = hooks_prompt(request, angle, &context, policy.expected_items);

        let result = self
            .run_attempts(&policy, request.backend, &prompt, |raw| {
                parse_paired_list(raw, policy.expected_items)
            })
            .await;

        if result.succeeded {
            let items = result
                .items
                .iter()
                .map(|h| format!("{} | {}", h.main, h.supporting))
                .collect();
            self.memory
                .record(
                    Category::Hooks,
                    MemoryEntry::new(
                        &request.product_name,
                        &request.product_context,
                        Some(angle.to_string()),
                        items,
                    ),
                )
                .await;
        }
        result
    }

    /// Generate one free-form image prompt in the given style.
    ///
    /// Unlike the upstream copy endpoints, image prompts are not recorded
    /// into session memory: they are derived from an already-recorded
    /// angle/hook pair.
    pub async fn generate_image_prompt(
        &self,
        request: &GenerationRequest,
        angle: &str,
        hook: &str,
        style: ImageStyle,
    ) -> GenerationResult<String> {
        let policy = self.config.image_prompts.clone();
        let prompt = image_prompt(request, angle, hook, style);

        self.run_attempts(&policy, request.backend, &prompt, |raw| {
            parse_free_form(raw, MIN_IMAGE_PROMPT_LEN)
        })
        .await
    }

    async fn prompt_context(&self, category: Category) -> PromptContext {
        PromptContext {
            corpus_snippet: self.corpus.context_snippet(&category.to_string()).await,
            memory_context: self
                .memory
                .recent_context(category, self.memory_context_entries)
                .await,
        }
    }

    /// The state machine. Attempts are strictly sequential; a short delay
    /// separates them so a struggling backend is not hammered.
    async fn run_attempts<T, P>(
        &self,
        policy: &RequestPolicy,
        backend: Option<BackendKind>,
        prompt: &str,
        parse: P,
    ) -> GenerationResult<T>
    where
        T: CopyItem,
        P: Fn(&str) -> Vec<T>,
    {
        let mut rejections = Vec::new();

        for attempt in 1..=policy.max_retries {
            if attempt > 1 {
                tokio::time::sleep(Duration::from_millis(policy.retry_delay_ms)).await;
            }

            let raw = match self.client.generate(prompt, backend).await {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(attempt, error = %err, "generation call failed");
                    rejections.push(RejectReason::Backend(err.to_string()));
                    continue;
                }
            };

            let parsed = parse(&raw);
            if parsed.len() < policy.expected_items {
                tracing::debug!(
                    attempt,
                    parsed = parsed.len(),
                    expected = policy.expected_items,
                    "parse shortfall"
                );
                rejections.push(RejectReason::ParseShortfall {
                    parsed: parsed.len(),
                    expected: policy.expected_items,
                });
                continue;
            }

            let mut accepted = Vec::with_capacity(policy.expected_items);
            let mut violated: Vec<String> = Vec::new();
            for item in parsed.into_iter().take(policy.expected_items) {
                let repaired = item.sanitized(&self.normalizer);
                let rules = repaired.violations(&self.normalizer);
                if rules.is_empty() {
                    accepted.push(repaired);
                } else {
                    violated.extend(rules);
                }
            }

            if violated.is_empty() {
                tracing::info!(attempt, items = accepted.len(), "attempt accepted");
                return GenerationResult {
                    items: accepted,
                    attempts_used: attempt,
                    succeeded: true,
                    rejections,
                };
            }

            // All-or-nothing: partially compliant batches are rejected whole
            violated.sort();
            violated.dedup();
            tracing::warn!(attempt, rules = ?violated, "attempt rejected by content policy");
            rejections.push(RejectReason::Compliance { rules: violated });
        }

        GenerationResult {
            items: Vec::new(),
            attempts_used: policy.max_retries,
            succeeded: false,
            rejections,
        }
    }
}
