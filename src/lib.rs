//! HookForge - Compliance-Filtered Marketing Copy Generation
//!
//! HookForge turns a product description into marketing angles, ad hooks,
//! and image-generation prompts via interchangeable generative-text
//! backends, and guarantees that nothing leaves the service without
//! passing a fixed advertising-content-policy check.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                       HookForge API                            │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │                      Orchestrator                        │  │
//! │  │   generate → parse → sanitize/validate → accept/retry    │  │
//! │  └───────┬───────────────┬──────────────┬──────────────────┘  │
//! │          │               │              │                     │
//! │  ┌───────▼──────┐ ┌──────▼───────┐ ┌────▼──────────────────┐  │
//! │  │  Generation  │ │  Compliance  │ │    Session Memory     │  │
//! │  │    Client    │ │  Normalizer  │ │  (bounded, per-cat.)  │  │
//! │  │ ollama ──────┼─│  rule set +  │ │  "do not repeat"      │  │
//! │  │ gemini  ↘    │ │  substitution│ │   prompt context      │  │
//! │  │ openrouter ↘ │ │  engine      │ └───────────────────────┘  │
//! │  │ groq      ↘  │ └──────────────┘                            │
//! │  │  (fallback to local ollama)    ┌───────────────────────┐   │
//! │  └──────────────┘                 │  Ad Corpus Provider   │   │
//! │                                   │  (untrusted, optional)│   │
//! │                                   └───────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key invariants
//!
//! - Sanitization is deterministic and idempotent: the rule set is
//!   verified at construction so no replacement matches any pattern.
//! - Accepted results always contain exactly the configured item count,
//!   and every item independently passes the compliance check.
//! - The retry bound is never exceeded; attempts are strictly sequential.
//! - Session memory never exceeds its per-category capacity and always
//!   retains the most recent entries.
//!
//! ## Modules
//!
//! - [`api`]: merged HTTP router
//! - [`compliance`]: rule set and text normalization
//! - [`generation`]: backends, parsing, prompts, orchestrator
//! - [`memory`]: bounded session memory
//! - [`corpus`]: competitor-messaging context provider
//! - [`config`]: configuration management

pub mod api;
pub mod compliance;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generation;
pub mod memory;

pub use config::HookForgeConfig;
pub use error::{Error, Result};
