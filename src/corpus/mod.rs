//! Ad corpus provider — competitor messaging for prompt enrichment
//!
//! The corpus is an external collaborator: its text is untrusted and not
//! guaranteed to be present. Every provider degrades to an empty snippet
//! on missing or malformed data, and the generation pipeline must work
//! (with poorer prompt context) when it does.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::path::PathBuf;

/// Source of competitor-messaging context snippets
#[async_trait]
pub trait AdCorpusProvider: Send + Sync {
    /// A short block of competitor messaging for the given category,
    /// formatted for prompt inclusion. Empty string when nothing is
    /// available; never an error.
    async fn context_snippet(&self, category: &str) -> String;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Provider with no corpus at all
pub struct EmptyCorpusProvider;

#[async_trait]
impl AdCorpusProvider for EmptyCorpusProvider {
    async fn context_snippet(&self, _category: &str) -> String {
        String::new()
    }

    fn name(&self) -> &str {
        "empty"
    }
}

/// One analyzed competitor ad on disk
#[derive(Debug, Clone, Deserialize)]
struct AnalyzedAd {
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    analysis: Option<AdAnalysis>,
}

#[derive(Debug, Clone, Deserialize)]
struct AdAnalysis {
    #[serde(default)]
    hook: Option<String>,
    #[serde(default)]
    angle: Option<String>,
}

/// Provider backed by a JSON file of analyzed competitor ads.
///
/// The file is re-read on every call so a scraper process can refresh it
/// underneath a running server. Each snippet is a random sample of up to
/// `snippet_count` ads.
pub struct FileCorpusProvider {
    path: PathBuf,
    snippet_count: usize,
}

impl FileCorpusProvider {
    pub fn new(path: PathBuf, snippet_count: usize) -> Self {
        Self {
            path,
            snippet_count: snippet_count.max(1),
        }
    }

    async fn load(&self) -> Option<Vec<AnalyzedAd>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "corpus file unreadable");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(ads) => Some(ads),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "corpus file malformed");
                None
            }
        }
    }
}

#[async_trait]
impl AdCorpusProvider for FileCorpusProvider {
    async fn context_snippet(&self, category: &str) -> String {
        let Some(ads) = self.load().await else {
            return String::new();
        };

        // Prefer ads matching the category, fall back to the whole corpus
        let matching: Vec<&AnalyzedAd> = ads
            .iter()
            .filter(|ad| ad.category.as_deref() == Some(category))
            .collect();
        let pool: Vec<&AnalyzedAd> = if matching.is_empty() {
            ads.iter().collect()
        } else {
            matching
        };

        let mut rng = rand::thread_rng();
        let sample: Vec<&&AnalyzedAd> = pool
            .choose_multiple(&mut rng, self.snippet_count)
            .collect();

        let mut lines = Vec::new();
        for ad in sample {
            let analysis = match &ad.analysis {
                Some(a) => a,
                None => continue,
            };
            let hook = analysis.hook.as_deref().unwrap_or("");
            let angle = analysis.angle.as_deref().unwrap_or("");
            if hook.is_empty() && angle.is_empty() {
                continue;
            }
            let company = ad.company.as_deref().unwrap_or("unknown");
            if angle.is_empty() {
                lines.push(format!("- \"{}\" ({})", hook, company));
            } else {
                lines.push(format!("- \"{}\" [{}] ({})", hook, angle, company));
            }
        }

        if lines.is_empty() {
            return String::new();
        }

        format!(
            "\n\n## COMPETITOR MESSAGING (observed in the market, for inspiration only):\n{}\n",
            lines.join("\n")
        )
    }

    fn name(&self) -> &str {
        "file"
    }
}
