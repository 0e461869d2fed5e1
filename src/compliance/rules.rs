//! Advertising-policy rule set for health and supplement copy.
//!
//! Two kinds of rules live here:
//! - rewrite rules carry a safe replacement and drive [`sanitize`],
//! - flag-only rules have no replacement and only mark text as
//!   non-compliant (claims that have no safe rewording, such as naming a
//!   disease).
//!
//! Rules are matched case-insensitively at word boundaries and applied in
//! declaration order. The order is part of the contract: multi-word
//! patterns precede the single-word patterns they overlap with, so a
//! phrase is rewritten as a phrase before its fragments are touched.
//!
//! [`sanitize`]: crate::compliance::Normalizer::sanitize

use serde::{Deserialize, Serialize};

/// A single compliance rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRule {
    /// Rule name (used in logs and diagnostics)
    pub name: String,
    /// Case-insensitive, word-boundary-aware regex pattern
    pub pattern: String,
    /// Safe replacement text; None = flag-only rule
    pub replacement: Option<String>,
    /// What the rule catches
    pub note: String,
}

fn rewrite(name: &str, pattern: &str, replacement: &str, note: &str) -> ComplianceRule {
    ComplianceRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        replacement: Some(replacement.to_string()),
        note: note.to_string(),
    }
}

fn flag(name: &str, pattern: &str, note: &str) -> ComplianceRule {
    ComplianceRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        replacement: None,
        note: note.to_string(),
    }
}

/// The default advertising-policy rule set.
///
/// Invariant, checked by `Normalizer::new`: no rule's replacement text
/// matches any rule's pattern. This is what makes sanitization idempotent
/// and keeps it from introducing new violations.
pub fn default_compliance_rules() -> Vec<ComplianceRule> {
    vec![
        // Specific weight-loss amounts and timeframes
        rewrite(
            "specific_amount_claim",
            r"(?i)\b(?:lose|losing|shed|shedding|drop|dropping)\s+(?:up\s+to\s+)?\d+\s*(?:(?:pounds|lbs|kgs?|kilos|inches|sizes)\b|%)",
            "support your weight management goals",
            "specific weight-loss amount",
        ),
        rewrite(
            "weight_loss_verb",
            r"(?i)\b(?:lose|losing|shed|shedding|drop|dropping)\s+(?:weight|body\s+fat|belly\s+fat|the\s+pounds)\b",
            "manage your weight",
            "weight-loss action claim",
        ),
        rewrite(
            "weight_loss_noun",
            r"(?i)\b(?:weight|fat)\s+loss\b",
            "weight management",
            "weight-loss phrasing",
        ),
        rewrite(
            "burn_fat",
            r"(?i)\bburns?\s+(?:fat|calories)\b",
            "supports energy",
            "fat-burning claim",
        ),
        rewrite(
            "melt_blast",
            r"(?i)\b(?:melts?|blasts?)\s+(?:away\s+)?(?:fat|belly\s+fat|pounds)\b",
            "supports wellness",
            "miracle fat-removal imagery",
        ),
        rewrite(
            "timeframe_claim",
            r"(?i)\bin\s+(?:just\s+)?\d+\s+(?:days?|weeks?|months?)\b",
            "over time",
            "specific results timeframe",
        ),
        // Efficacy guarantees
        rewrite(
            "hundred_percent",
            r"(?i)\b100%\s+(?:guaranteed|effective|results?|safe|natural)\b",
            "designed to support you",
            "absolute efficacy claim",
        ),
        rewrite(
            "guarantee",
            r"(?i)\bguarantee[ds]?\b",
            "helps support",
            "guaranteed-results language",
        ),
        rewrite(
            "clinically_proven",
            r"(?i)\bclinically\s+proven\b",
            "clinically studied",
            "unsubstantiated clinical claim",
        ),
        rewrite(
            "proven_to",
            r"(?i)\bproven\s+(?:to|results?)\b",
            "designed to help",
            "proof-of-results claim",
        ),
        rewrite(
            "will_make",
            r"(?i)\bwill\s+(?:make|change|give|transform)\b",
            "may help",
            "certainty-of-outcome claim",
        ),
        // Medical claims
        rewrite(
            "cure",
            r"(?i)\bcur(?:es?|ed|ing)\b",
            "supports",
            "cure claim",
        ),
        rewrite(
            "heal",
            r"(?i)\bheal(?:s|ed|ing)?\b",
            "promotes balance",
            "healing claim",
        ),
        rewrite(
            "treat",
            r"(?i)\btreats?\b",
            "addresses",
            "treatment claim",
        ),
        rewrite(
            "fda_approved",
            r"(?i)\bfda[-\s]approved\b",
            "third-party tested",
            "FDA approval claim",
        ),
        // Sensational language
        rewrite(
            "overnight_instant",
            r"(?i)\b(?:overnight|instant)\s+results?\b",
            "gradual progress",
            "instant-results claim",
        ),
        rewrite(
            "before_after",
            r"(?i)\bbefore\s+and\s+after\b",
            "along the way",
            "before/after framing",
        ),
        rewrite(
            "life_changing",
            r"(?i)\b(?:life|game)[-\s]changing\b",
            "wellness-focused",
            "hyperbole",
        ),
        rewrite(
            "transformation",
            r"(?i)\btransform(?:ations?|ative|ed|ing|s)?\b",
            "progress",
            "body-transformation framing",
        ),
        rewrite(
            "revolutionary",
            r"(?i)\b(?:revolutionary|breakthrough)\b",
            "modern",
            "hyperbole",
        ),
        rewrite(
            "miracle",
            r"(?i)\b(?:miracles?|miraculous)\b",
            "positive",
            "miracle language",
        ),
        rewrite(
            "magic",
            r"(?i)\bmagic(?:al)?\b",
            "effective",
            "magic language",
        ),
        rewrite(
            "secret",
            r"(?i)\bsecrets?\b",
            "key",
            "secret-knowledge framing",
        ),
        rewrite(
            "shocking",
            r"(?i)\bshocking\b",
            "surprising",
            "shock language",
        ),
        rewrite(
            "urgency",
            r"(?i)\b(?:act\s+now|last\s+chance|limited\s+time|limited\s+spots|don'?t\s+wait|before\s+it'?s\s+too\s+late)\b",
            "when you're ready",
            "urgency manipulation",
        ),
        rewrite(
            "testimonial_claim",
            r"(?i)\b(?:success\s+stor(?:y|ies)|customer\s+reviews?|user\s+results)\b",
            "user experience",
            "implied testimonial",
        ),
        // Flag-only: no safe rewording exists
        flag(
            "disease_claim",
            r"(?i)\b(?:diabetes|cancer|arthritis|alzheimer'?s|depression|insomnia|hypertension)\b",
            "names a disease or condition",
        ),
        flag(
            "medical_language",
            r"(?i)\b(?:diagnose[sd]?|diagnosis|prescriptions?|medications?|symptoms?|therapy|disease)\b",
            "medical/diagnostic language",
        ),
        flag(
            "personal_attribute",
            r"(?i)\bare\s+you\s+(?:overweight|obese|diabetic|struggling)\b",
            "targets a personal health attribute",
        ),
        flag(
            "body_shaming",
            r"(?i)\b(?:tired\s+of\s+being\s+fat|embarrassed\s+by\s+your|hate\s+your\s+body|obese|obesity|overweight)\b",
            "body-shaming language",
        ),
        flag(
            "fat_reference",
            r"(?i)\bfat\b",
            "direct body-fat reference",
        ),
        flag(
            "conspiracy",
            r"(?i)\b(?:doctors\s+(?:hate|don'?t\s+want\s+you\s+to\s+know)|big\s+pharma)\b",
            "conspiracy framing",
        ),
    ]
}

/// Free-text policy guidance injected into generation prompts.
///
/// This is prompt material, not rule data: it steers the model toward
/// compliant phrasing up front so the rewrite engine has less to do.
pub fn policy_guidance() -> &'static str {
    r#"## STRICTLY PROHIBITED (THE AD PLATFORM WILL REJECT):

Specific claims and numbers:
- NO specific weight-loss amounts ("lose 10 pounds", "drop 3 sizes")
- NO specific timeframes ("in 2 weeks", "30 days to results")
- NO miracle language ("melts fat", "magic pill", "overnight results")
- NO exaggerated efficacy ("100% guaranteed", "works for everyone")

Medical and health claims:
- NO disease cure claims, NO FDA approval claims, NO diagnostic claims

Targeting and personal attributes:
- NO personal health targeting ("Are you overweight?")
- NO body shaming, NO assumptions about the viewer's health status

Sensational language:
- NO "shocking", "miracle", "secret doctors don't want you to know"
- NO urgency manipulation ("last chance", "limited spots")

## WHAT IS ALLOWED:

General wellness language:
- "Support healthy weight management"
- "May help support metabolism"
- "Designed to complement a healthy lifestyle"

Lifestyle messaging:
- "Feel your best", "Support your wellness journey"
- "Your daily wellness companion"

Science and credentials (only if true):
- "Clinically studied ingredients", "Third-party tested"

Soft benefits:
- "May support energy levels", "Designed to support gut health"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_compile() {
        for rule in default_compliance_rules() {
            assert!(
                regex::Regex::new(&rule.pattern).is_ok(),
                "rule '{}' has invalid pattern: {}",
                rule.name,
                rule.pattern
            );
        }
    }

    #[test]
    fn test_rule_order_is_stable() {
        let a = default_compliance_rules();
        let b = default_compliance_rules();
        let names_a: Vec<_> = a.iter().map(|r| r.name.clone()).collect();
        let names_b: Vec<_> = b.iter().map(|r| r.name.clone()).collect();
        assert_eq!(names_a, names_b);
    }

    #[test]
    fn test_has_flag_only_rules() {
        let rules = default_compliance_rules();
        assert!(rules.iter().any(|r| r.replacement.is_none()));
        assert!(rules.iter().any(|r| r.replacement.is_some()));
    }

    #[test]
    fn test_weight_loss_patterns_match() {
        let rules = default_compliance_rules();
        let amount = rules.iter().find(|r| r.name == "specific_amount_claim").unwrap();
        let re = regex::Regex::new(&amount.pattern).unwrap();
        assert!(re.is_match("Lose 10 pounds fast"));
        assert!(re.is_match("shed 5 lbs"));
        assert!(!re.is_match("a pound of coffee"));
    }

    #[test]
    fn test_guarantee_pattern_match() {
        let rules = default_compliance_rules();
        let rule = rules.iter().find(|r| r.name == "guarantee").unwrap();
        let re = regex::Regex::new(&rule.pattern).unwrap();
        assert!(re.is_match("results guaranteed"));
        assert!(re.is_match("we guarantee it"));
        assert!(!re.is_match("guaranty trust company bond"));
    }

    #[test]
    fn test_heal_does_not_match_healthy() {
        let rules = default_compliance_rules();
        let rule = rules.iter().find(|r| r.name == "heal").unwrap();
        let re = regex::Regex::new(&rule.pattern).unwrap();
        assert!(re.is_match("heals your gut"));
        assert!(!re.is_match("a healthy lifestyle"));
    }

    #[test]
    fn test_policy_guidance_mentions_allowed_language() {
        let guidance = policy_guidance();
        assert!(guidance.contains("PROHIBITED"));
        assert!(guidance.contains("ALLOWED"));
        assert!(guidance.contains("weight management"));
    }
}
