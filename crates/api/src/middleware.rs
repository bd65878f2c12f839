use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use storefront_auth::JwtValidator;

use crate::context::ActorContext;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Resolve the caller's actor from an optional bearer token.
///
/// No `Authorization` header yields an anonymous context; a header that is
/// present but malformed, expired or badly signed is rejected with 401.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let context = match extract_bearer(req.headers())? {
        None => ActorContext::anonymous(),
        Some(token) => {
            let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                StatusCode::UNAUTHORIZED
            })?;
            ActorContext::authenticated(claims.into_actor())
        }
    };

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, StatusCode> {
    let Some(header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Some(token))
}
