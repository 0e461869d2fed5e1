//! Prompt assembly for angle, hook, and image-prompt generation.
//!
//! Prompts combine four ingredients: the request fields, the advertising
//! policy guidance, a competitor-messaging snippet from the ad corpus,
//! and session-memory context framing prior output as "do not repeat".
//! The corpus and memory parts may be empty; prompts must remain valid
//! without them.

use crate::compliance::rules::policy_guidance;
use crate::generation::orchestrator::GenerationRequest;
use serde::{Deserialize, Serialize};

/// Visual style for image-generation prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    /// Dreamlike visual metaphor, impossible physics
    Surreal,
    /// Disruptive mashup, unexpected context
    Unexpected,
    /// Clean premium product photography
    Studio,
}

impl std::fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surreal => write!(f, "surreal"),
            Self::Unexpected => write!(f, "unexpected"),
            Self::Studio => write!(f, "studio"),
        }
    }
}

/// Prompt enrichment gathered before an orchestration run
#[derive(Debug, Default)]
pub struct PromptContext {
    /// Competitor messaging block (may be empty)
    pub corpus_snippet: String,
    /// Session-memory novelty block (may be empty)
    pub memory_context: String,
}

/// Prompt for generating exactly `count` marketing angles
pub fn angles_prompt(request: &GenerationRequest, context: &PromptContext, count: usize) -> String {
    let custom = match &request.custom_direction {
        Some(direction) => format!("\n\nADDITIONAL DIRECTION:\n{}", direction),
        None => String::new(),
    };

    format!(
        r#"You are generating marketing angles for a wellness product.

An angle is a concept that frames how to sell the product. It can be short
and punchy (3 words) or a bit longer if needed (up to 15 words). MIX IT UP,
don't make them all the same length.

Examples of GOOD angles (various lengths):
- "No Needles"
- "Skip The Doctor"
- "Gut Reset"
- "Clean Energy Without The Crash"
- "What Your Body's Been Asking For"
- "Your Daily Wellness, Simplified"

RULES:
- Each angle is 3-15 words (variety is good!)
- Simple, clear, everyday language
- NO brand names, NO competitor mentions
- Focus on what the customer WANTS or what problem they AVOID
- Output ONLY the angle text, do NOT include word counts{corpus}{memory}
Product: {product}
Context: {product_context}{custom}

Generate EXACTLY {count} UNIQUE angles (numbered list, just the angle text):"#,
        corpus = context.corpus_snippet,
        memory = context.memory_context,
        product = request.product_name,
        product_context = request.product_context,
        custom = custom,
        count = count,
    )
}

/// Prompt for generating exactly `count` hooks with supporting sentences
pub fn hooks_prompt(
    request: &GenerationRequest,
    angle: &str,
    context: &PromptContext,
    count: usize,
) -> String {
    format!(
        r#"You generate punchy hooks for wellness ad images that MUST comply with
the advertising platform's content policies.

{guidance}

Product: {product}
Context: {product_context}
Angle: "{angle}"

YOUR GENERATION RULES:
- Each hook has TWO parts: MAIN HOOK (8-12 words) + SUPPORTING SENTENCE (10-15 words)
- Main hook goes ON the image as text overlay, so keep it SHORT and PUNCHY
- Supporting sentence explains the hook and provides context
- NO brand names, NO competitor names, NO company mentions
- Speaks directly to the customer
- MUST follow all policy rules above (no specific claims, no body shaming, no miracle language)

FORMAT (CRITICAL):
1. [MAIN HOOK] | [SUPPORTING SENTENCE]
2. [MAIN HOOK] | [SUPPORTING SENTENCE]

Example:
1. Support your wellness journey | A daily supplement designed to complement your healthy lifestyle choices.
2. Your gut deserves better | Formulated with ingredients that support digestive comfort and balance.{corpus}{memory}
Generate EXACTLY {count} policy-compliant hooks with supporting sentences (use | separator):"#,
        guidance = policy_guidance(),
        product = request.product_name,
        product_context = request.product_context,
        angle = angle,
        corpus = context.corpus_snippet,
        memory = context.memory_context,
        count = count,
    )
}

/// Prompt for a single image-generation prompt in the given style
pub fn image_prompt(request: &GenerationRequest, angle: &str, hook: &str, style: ImageStyle) -> String {
    let (task, rules) = match style {
        ImageStyle::Surreal => (
            "Create a VISUAL METAPHOR that embodies the angle in a surreal, impossible, dreamlike way. \
             The visual should make people FEEL what the angle means.",
            "- The product bottle morphs or becomes part of impossible geometry that represents the angle\n\
             - Otherworldly colors that symbolize the angle's benefit\n\
             - The hook message is embedded in the visual metaphor\n\
             - No generic bottle floating in space; make it intentional to the angle",
        ),
        ImageStyle::Unexpected => (
            "Create a DISRUPTIVE, UNEXPECTED visual that demonstrates the angle in real-world terms. \
             The composition should make people stop and think differently.",
            "- The bottle appears in an unexpected context that proves the angle\n\
             - Mashups, wrong scale, macro photography, or unexpected point of view\n\
             - The weirdness serves the angle's message, not randomness",
        ),
        ImageStyle::Studio => (
            "Create a HIGH-END, PROFESSIONAL visual that communicates the angle with premium credibility. \
             The visual should feel trustworthy and achievable.",
            "- The bottle is the premium hero: lit beautifully, clearly visible\n\
             - Color palette, lighting, and composition all support the angle's message\n\
             - Clean lifestyle context, high production value\n\
             - Avoid clinical settings and body imagery",
        ),
    };

    format!(
        r#"GENERATE A {style} IMAGE-GENERATION PROMPT FOR A SOCIAL AD

Marketing Angle: "{angle}"
Hook Message: "{hook}"
Product: {product} ({product_context})

YOUR TASK:
{task}

EXECUTION RULES:
{rules}

Write ONE image prompt (2-3 sentences, focus on how the visual expresses the angle):"#,
        style = style.to_string().to_uppercase(),
        angle = angle,
        hook = hook,
        product = request.product_name,
        product_context = request.product_context,
        task = task,
        rules = rules,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            product_name: "GutWell".to_string(),
            product_context: "A daily probiotic drink".to_string(),
            target_angle: None,
            custom_direction: None,
            backend: None,
        }
    }

    #[test]
    fn test_angles_prompt_includes_request_fields() {
        let prompt = angles_prompt(&request(), &PromptContext::default(), 3);
        assert!(prompt.contains("GutWell"));
        assert!(prompt.contains("A daily probiotic drink"));
        assert!(prompt.contains("EXACTLY 3"));
    }

    #[test]
    fn test_angles_prompt_with_custom_direction() {
        let mut req = request();
        req.custom_direction = Some("focus on busy parents".to_string());
        let prompt = angles_prompt(&req, &PromptContext::default(), 3);
        assert!(prompt.contains("ADDITIONAL DIRECTION"));
        assert!(prompt.contains("busy parents"));
    }

    #[test]
    fn test_angles_prompt_embeds_context_blocks() {
        let context = PromptContext {
            corpus_snippet: "\nCOMPETITOR BLOCK\n".to_string(),
            memory_context: "\nMEMORY BLOCK\n".to_string(),
        };
        let prompt = angles_prompt(&request(), &context, 3);
        assert!(prompt.contains("COMPETITOR BLOCK"));
        assert!(prompt.contains("MEMORY BLOCK"));
    }

    #[test]
    fn test_hooks_prompt_includes_policy_guidance() {
        let prompt = hooks_prompt(&request(), "Gut Reset", &PromptContext::default(), 5);
        assert!(prompt.contains("STRICTLY PROHIBITED"));
        assert!(prompt.contains("Gut Reset"));
        assert!(prompt.contains("| separator"));
        assert!(prompt.contains("EXACTLY 5"));
    }

    #[test]
    fn test_image_prompt_styles_differ() {
        let req = request();
        let surreal = image_prompt(&req, "Gut Reset", "Your gut called", ImageStyle::Surreal);
        let unexpected = image_prompt(&req, "Gut Reset", "Your gut called", ImageStyle::Unexpected);
        let studio = image_prompt(&req, "Gut Reset", "Your gut called", ImageStyle::Studio);
        assert!(surreal.contains("SURREAL"));
        assert!(unexpected.contains("UNEXPECTED"));
        assert!(studio.contains("STUDIO"));
        assert_ne!(surreal, unexpected);
        assert_ne!(unexpected, studio);
    }

    #[test]
    fn test_image_style_display() {
        assert_eq!(ImageStyle::Surreal.to_string(), "surreal");
        assert_eq!(ImageStyle::Unexpected.to_string(), "unexpected");
        assert_eq!(ImageStyle::Studio.to_string(), "studio");
    }
}
