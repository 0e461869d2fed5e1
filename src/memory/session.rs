//! Bounded session memory for generation novelty.
//!
//! Keeps the most recent accepted generations per category so prompts can
//! tell the model what NOT to repeat. Process lifetime only: initialized
//! empty at start, never persisted, discarded on restart — cross-session
//! novelty is a quality heuristic, not a correctness requirement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Default retained entries per category
pub const DEFAULT_CAPACITY: usize = 20;

/// Memory category, one bounded list per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Angles,
    Hooks,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Angles => write!(f, "angles"),
            Self::Hooks => write!(f, "hooks"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "angles" => Ok(Self::Angles),
            "hooks" => Ok(Self::Hooks),
            other => Err(format!("unknown memory category '{}'", other)),
        }
    }
}

/// One accepted generation, read-only after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    pub id: Uuid,
    pub product: String,
    pub context: String,
    pub angle: Option<String>,
    pub items: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl MemoryEntry {
    pub fn new(
        product: impl Into<String>,
        context: impl Into<String>,
        angle: Option<String>,
        items: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product: product.into(),
            context: context.into(),
            angle,
            items,
            timestamp: Utc::now(),
        }
    }
}

/// Capacity-bounded per-category FIFO store.
///
/// `record` and the read methods each take the lock once, so every
/// mutation is atomic; concurrent generation runs share one instance.
pub struct SessionMemory {
    inner: RwLock<HashMap<Category, VecDeque<MemoryEntry>>>,
    capacity: usize,
}

impl SessionMemory {
    /// Create an empty store with the given per-category capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Create an empty store with the default capacity
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Append an entry, evicting the oldest when over capacity.
    /// Returns the evicted entry if eviction occurred.
    pub async fn record(&self, category: Category, entry: MemoryEntry) -> Option<MemoryEntry> {
        let mut inner = self.inner.write().await;
        let list = inner.entry(category).or_default();
        list.push_back(entry);
        if list.len() > self.capacity {
            list.pop_front()
        } else {
            None
        }
    }

    /// Up to `limit` most recent entries, newest last
    pub async fn recent(&self, category: Category, limit: usize) -> Vec<MemoryEntry> {
        let inner = self.inner.read().await;
        match inner.get(&category) {
            Some(list) => {
                let skip = list.len().saturating_sub(limit);
                list.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    /// Recent entries formatted for inclusion in a generation prompt,
    /// framed as prior output the model must not repeat. Empty string
    /// when the category has no history.
    pub async fn recent_context(&self, category: Category, limit: usize) -> String {
        let entries = self.recent(category, limit).await;
        if entries.is_empty() {
            return String::new();
        }

        let mut out = String::from(
            "\n\n## PREVIOUS GENERATIONS (prior output, for reference only — do NOT repeat these):\n",
        );
        for entry in entries {
            match &entry.angle {
                Some(angle) => {
                    out.push_str(&format!("Product: {} | Angle: {}\n", entry.product, angle))
                }
                None => out.push_str(&format!("Product: {}\n", entry.product)),
            }
            out.push_str(&format!("Items: {}\n\n", entry.items.join(" | ")));
        }
        out
    }

    /// Number of retained entries for a category
    pub async fn len(&self, category: Category) -> usize {
        self.inner
            .read()
            .await
            .get(&category)
            .map_or(0, |list| list.len())
    }

    /// Whether a category has no entries
    pub async fn is_empty(&self, category: Category) -> bool {
        self.len(category).await == 0
    }

    /// Per-category capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
