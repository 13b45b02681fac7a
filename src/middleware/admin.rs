// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin API key middleware for `/admin/*` routes.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Require the `x-admin-key` header to match the configured admin key.
/// Without a configured key every admin request is refused.
pub async fn require_admin_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.config.admin_api_key.as_deref() else {
        tracing::warn!("Admin request refused: no admin key configured");
        return Err(StatusCode::FORBIDDEN);
    };

    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    if !bool::from(provided.ct_eq(expected.as_bytes())) {
        tracing::warn!(
            path = %request.uri().path(),
            "Blocked admin request with invalid key"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
