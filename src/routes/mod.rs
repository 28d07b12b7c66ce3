//! Routes Layer
//!
//! Axum handlers that bridge HTTP clients to the repositories. Handlers
//! validate input, map domain errors to status codes and wrap payloads in
//! the `{"success": true, "data": ...}` envelope.

mod items;
mod lists;

pub use items::*;
pub use lists::*;

use axum::{response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

/// Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "service": "ranklist",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
