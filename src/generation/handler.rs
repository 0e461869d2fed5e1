//! HTTP handlers for the Generation API
//!
//! - POST /api/v1/generate/angles        — 3 marketing angles
//! - POST /api/v1/generate/hooks         — 5 hooks with supporting sentences
//! - POST /api/v1/generate/image-prompts — 3 image-prompt styles
//!
//! Exhaustion surfaces as 422 with an input-revision suggestion: when the
//! retry budget runs out it is almost always because the input context
//! keeps steering the model into disallowed phrasing, not because the
//! system is down. Violating rule names go to logs only.

use crate::generation::backend::BackendKind;
use crate::generation::orchestrator::{GenerationRequest, GenerationResult, Orchestrator};
use crate::generation::parser::HookCopy;
use crate::generation::prompt::ImageStyle;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for generation handlers
#[derive(Clone)]
pub struct GenerationState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Create the generation router
pub fn generation_router(state: GenerationState) -> Router {
    Router::new()
        .route("/api/v1/generate/angles", post(generate_angles))
        .route("/api/v1/generate/hooks", post(generate_hooks))
        .route("/api/v1/generate/image-prompts", post(generate_image_prompts))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnglesRequest {
    pub product_name: String,
    pub product_context: String,
    #[serde(default)]
    pub custom_direction: Option<String>,
    #[serde(default)]
    pub backend: Option<BackendKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnglesResponse {
    pub angles: Vec<String>,
    pub attempts_used: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksRequest {
    pub product_name: String,
    pub product_context: String,
    pub angle: String,
    #[serde(default)]
    pub backend: Option<BackendKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksResponse {
    pub hooks: Vec<HookCopy>,
    pub attempts_used: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptsRequest {
    pub product_name: String,
    pub product_context: String,
    pub angle: String,
    pub hook: String,
    #[serde(default)]
    pub backend: Option<BackendKind>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePromptsResponse {
    pub surreal: String,
    pub unexpected: String,
    pub studio: String,
    pub attempts_used: u32,
}

// =============================================================================
// Handlers
// =============================================================================

fn validation_error(message: &str) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": {"code": "BAD_REQUEST", "message": message}})),
    )
        .into_response()
}

/// 422 payload for an exhausted run. The suggestion points at the input
/// rather than implying a system fault.
fn exhausted_error<T>(result: &GenerationResult<T>) -> axum::response::Response {
    let last_failure = result
        .last_failure()
        .map(|reason| reason.to_string())
        .unwrap_or_else(|| "no attempts completed".to_string());
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "error": {
                "code": "EXHAUSTED",
                "message": "Could not produce compliant output within the retry budget. \
                            Try revising the product description; it may contain concepts \
                            that collide with advertising policy.",
                "attemptsUsed": result.attempts_used,
                "lastFailureReason": last_failure,
            }
        })),
    )
        .into_response()
}

async fn generate_angles(
    State(state): State<GenerationState>,
    Json(body): Json<AnglesRequest>,
) -> impl IntoResponse {
    if body.product_name.trim().is_empty() || body.product_context.trim().is_empty() {
        return validation_error("Missing product name or context");
    }

    let request = GenerationRequest {
        product_name: body.product_name,
        product_context: body.product_context,
        target_angle: None,
        custom_direction: body.custom_direction,
        backend: body.backend,
    };

    let result = state.orchestrator.generate_angles(&request).await;
    if !result.succeeded {
        return exhausted_error(&result);
    }
    Json(AnglesResponse {
        angles: result.items,
        attempts_used: result.attempts_used,
    })
    .into_response()
}

async fn generate_hooks(
    State(state): State<GenerationState>,
    Json(body): Json<HooksRequest>,
) -> impl IntoResponse {
    if body.product_name.trim().is_empty()
        || body.product_context.trim().is_empty()
        || body.angle.trim().is_empty()
    {
        return validation_error("Missing product name, context, or angle");
    }

    let angle = body.angle.clone();
    let request = GenerationRequest {
        product_name: body.product_name,
        product_context: body.product_context,
        target_angle: Some(body.angle),
        custom_direction: None,
        backend: body.backend,
    };

    let result = state.orchestrator.generate_hooks(&request, &angle).await;
    if !result.succeeded {
        return exhausted_error(&result);
    }
    Json(HooksResponse {
        hooks: result.items,
        attempts_used: result.attempts_used,
    })
    .into_response()
}

async fn generate_image_prompts(
    State(state): State<GenerationState>,
    Json(body): Json<ImagePromptsRequest>,
) -> impl IntoResponse {
    if body.product_name.trim().is_empty()
        || body.product_context.trim().is_empty()
        || body.angle.trim().is_empty()
        || body.hook.trim().is_empty()
    {
        return validation_error("Missing required fields");
    }

    let angle = body.angle.clone();
    let hook = body.hook.clone();
    let request = GenerationRequest {
        product_name: body.product_name,
        product_context: body.product_context,
        target_angle: Some(body.angle),
        custom_direction: None,
        backend: body.backend,
    };

    // The three styles are independent generations; run them concurrently
    let orchestrator = &state.orchestrator;
    let (surreal, unexpected, studio) = futures::join!(
        orchestrator.generate_image_prompt(&request, &angle, &hook, ImageStyle::Surreal),
        orchestrator.generate_image_prompt(&request, &angle, &hook, ImageStyle::Unexpected),
        orchestrator.generate_image_prompt(&request, &angle, &hook, ImageStyle::Studio),
    );

    for result in [&surreal, &unexpected, &studio] {
        if !result.succeeded {
            return exhausted_error(result);
        }
    }

    let attempts_used = surreal
        .attempts_used
        .max(unexpected.attempts_used)
        .max(studio.attempts_used);
    Json(ImagePromptsResponse {
        surreal: surreal.items.into_iter().next().unwrap_or_default(),
        unexpected: unexpected.items.into_iter().next().unwrap_or_default(),
        studio: studio.items.into_iter().next().unwrap_or_default(),
        attempts_used,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::orchestrator::RejectReason;

    #[test]
    fn test_exhausted_payload_shape() {
        let result: GenerationResult<String> = GenerationResult {
            items: Vec::new(),
            attempts_used: 5,
            succeeded: false,
            rejections: vec![RejectReason::ParseShortfall {
                parsed: 1,
                expected: 3,
            }],
        };
        let response = exhausted_error(&result);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_exhausted_message_does_not_leak_rules() {
        let result: GenerationResult<String> = GenerationResult {
            items: Vec::new(),
            attempts_used: 6,
            succeeded: false,
            rejections: vec![RejectReason::Compliance {
                rules: vec!["guarantee".to_string()],
            }],
        };
        let last = result.last_failure().map(|r| r.to_string()).unwrap();
        assert!(!last.contains("guarantee"));
    }
}
