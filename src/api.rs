//! Unified API router for HookForge
//!
//! Merges all module routers into a single axum `Router` with CORS and a
//! root-level health probe.
//!
//! ## Endpoint Map
//!
//! | Prefix                           | Module     | Description                     |
//! |----------------------------------|------------|---------------------------------|
//! | `/health`                        | api        | Load balancer health probe      |
//! | `/api/v1/generate/*`             | generation | Angles, hooks, image prompts    |
//! | `/api/v1/compliance/*`           | compliance | Check, rewrite, rule listing    |
//! | `/api/v1/memory/*`               | memory     | Recent session-memory entries   |

use crate::compliance::{compliance_router, ComplianceState};
use crate::generation::{generation_router, GenerationState};
use crate::memory::{memory_router, MemoryState};
use axum::{
    http::{header, Method},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

/// Build the complete HookForge HTTP application
pub fn build_app(
    generation_state: GenerationState,
    compliance_state: ComplianceState,
    memory_state: MemoryState,
    cors_origins: &[String],
) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(generation_router(generation_state))
        .merge(compliance_router(compliance_state))
        .merge(memory_router(memory_state))
        .layer(cors)
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // Wildcard patterns fall back to permissive CORS; exact origins are
    // applied as-is
    if origins.iter().any(|o| o.contains('*')) {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(parsed)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
