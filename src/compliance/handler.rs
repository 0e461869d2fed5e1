//! HTTP handlers for the Compliance API
//!
//! - POST /api/v1/compliance/check   — detect policy violations
//! - POST /api/v1/compliance/rewrite — best-effort safe rewrite
//! - GET  /api/v1/compliance/rules   — list rules (patterns only; safe
//!   replacements are not echoed, so the endpoint cannot be used as a
//!   rewrite oracle)

use crate::compliance::normalizer::Normalizer;
use crate::compliance::rules::ComplianceRule;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared state for compliance handlers
#[derive(Clone)]
pub struct ComplianceState {
    pub normalizer: Arc<Normalizer>,
    pub rules: Arc<Vec<ComplianceRule>>,
}

/// Create the compliance router
pub fn compliance_router(state: ComplianceState) -> Router {
    Router::new()
        .route("/api/v1/compliance/check", post(check))
        .route("/api/v1/compliance/rewrite", post(rewrite))
        .route("/api/v1/compliance/rules", get(list_rules))
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Request body for check/rewrite
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// Response from the check endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub compliant: bool,
    pub violations: Vec<String>,
}

/// Response from the rewrite endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub text: String,
    pub compliant: bool,
}

/// Rule info response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInfo {
    pub name: String,
    pub pattern: String,
    pub rewritable: bool,
    pub note: String,
}

// =============================================================================
// Handlers
// =============================================================================

async fn check(State(state): State<ComplianceState>, Json(req): Json<TextRequest>) -> Json<CheckResponse> {
    let violations = state.normalizer.violations(&req.text);
    Json(CheckResponse {
        compliant: violations.is_empty(),
        violations,
    })
}

async fn rewrite(
    State(state): State<ComplianceState>,
    Json(req): Json<TextRequest>,
) -> Json<RewriteResponse> {
    let text = state.normalizer.sanitize(&req.text);
    let compliant = state.normalizer.is_compliant(&text);
    Json(RewriteResponse { text, compliant })
}

async fn list_rules(State(state): State<ComplianceState>) -> Json<Vec<RuleInfo>> {
    let infos = state
        .rules
        .iter()
        .map(|rule| RuleInfo {
            name: rule.name.clone(),
            pattern: rule.pattern.clone(),
            rewritable: rule.replacement.is_some(),
            note: rule.note.clone(),
        })
        .collect();
    Json(infos)
}
