use axum::{extract::OriginalUri, Json};
use serde::Serialize;

use crate::error::{Error, Result};

// ─── Shared response envelope ────────────────────────────────────

/// Every successful API response is wrapped as `{ data, success: true }`.
/// Failures use the matching `{ error, success: false }` shape, see `Error`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { data, success: true }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
}

// ─── GET /health ─────────────────────────────────────────────────

pub async fn health() -> Json<ApiResponse<Health>> {
    Json(ApiResponse::ok(Health { status: "ok" }))
}

// ─── Fallback ────────────────────────────────────────────────────

pub async fn not_found(OriginalUri(uri): OriginalUri) -> Result<()> {
    Err(Error::NotFound(uri.path().to_owned()))
}
