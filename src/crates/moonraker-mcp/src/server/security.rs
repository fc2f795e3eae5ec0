//! Bearer-token gate for the MCP endpoint
//!
//! With a configured token, requests must carry `Authorization: Bearer <token>`.
//! Without one the gate is open.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Security middleware state
#[derive(Clone, Default)]
pub struct SecurityState {
    token: Option<Arc<str>>,
}

impl SecurityState {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(Arc::from),
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.token.is_none()
    }

    /// Whether an `Authorization` header value passes the gate
    pub fn authorize(&self, header: Option<&str>) -> bool {
        let Some(expected) = &self.token else {
            return true;
        };
        header
            .and_then(bearer_token)
            .map(|supplied| bool::from(supplied.as_bytes().ct_eq(expected.as_bytes())))
            .unwrap_or(false)
    }
}

/// Credentials of a `Bearer` authorization value; the scheme is case-insensitive
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

/// Security middleware for Axum
pub async fn security_middleware(
    State(state): State<SecurityState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if state.authorize(header) {
        return next.run(request).await;
    }

    warn!("Unauthorized request - missing or invalid bearer token");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthorized",
            "message": "Missing or invalid bearer token"
        })),
    )
        .into_response()
}
