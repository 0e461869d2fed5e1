//! Compliance rule set and text normalization
//!
//! The rule set is data (`rules`), the substitution engine is code
//! (`normalizer`); keeping them apart lets the rule set be validated and
//! tested independently of the engine that applies it.

pub mod handler;
pub mod normalizer;
pub mod rules;

pub use handler::{compliance_router, ComplianceState};
pub use normalizer::Normalizer;
pub use rules::{default_compliance_rules, policy_guidance, ComplianceRule};
