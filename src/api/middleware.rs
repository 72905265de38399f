//! API Middleware
//!
//! Bearer-token authentication, role guard and request logging.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::auth::{AuthError, Role};
use crate::domain::OperationContext;
use crate::state::AppState;

/// Header carrying a caller-supplied correlation id
pub const CORRELATION_HEADER: &str = "X-Correlation-Id";

// =========================================================================
// Bearer Authentication Middleware
// =========================================================================

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

/// Verify the access token and attach an `OperationContext`
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = bearer_token(request.headers())
        .and_then(|token| state.tokens.verify(token))
        .map_err(IntoResponse::into_response)?;

    // Extract correlation ID or generate new one
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let context = OperationContext::new(claims.sub, claims.role).with_correlation_id(correlation_id);
    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

// =========================================================================
// Role Guard
// =========================================================================

/// Reject callers without the admin role. Runs after `auth_middleware`.
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, Response> {
    let allowed = request
        .extensions()
        .get::<OperationContext>()
        .is_some_and(|ctx| ctx.role.has_privilege(Role::Admin));

    if !allowed {
        return Err(AuthError::InsufficientPermissions.into_response());
    }

    Ok(next.run(request).await)
}

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "x-admin-key", "cookie", "set-cookie"];

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Request logging middleware
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let start = std::time::Instant::now();

    tracing::debug!(
        method = %method,
        uri = %uri,
        correlation_id = ?correlation_id,
        headers = ?headers,
        "Incoming request"
    );

    let response = next.run(request).await;

    tracing::info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        duration_ms = %start.elapsed().as_millis(),
        correlation_id = ?correlation_id,
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_headers_for_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());
        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        headers.insert("x-admin-key", "bootstrap".parse().unwrap());
        headers.insert("x-correlation-id", "corr-123".parse().unwrap());

        let masked = mask_headers_for_logging(&headers);
        let find = |name: &str| masked.iter().find(|(k, _)| k == name).unwrap().1.clone();

        assert_eq!(find("authorization"), "[REDACTED]");
        assert_eq!(find("x-admin-key"), "[REDACTED]");
        assert_eq!(find("content-type"), "application/json");
        assert_eq!(find("x-correlation-id"), "corr-123");
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingAuthHeader));

        headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwYXNz".parse().unwrap());
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidAuthHeader));

        headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), Err(AuthError::InvalidAuthHeader));

        headers.insert(header::AUTHORIZATION, "bearer token-value".parse().unwrap());
        assert_eq!(bearer_token(&headers), Ok("token-value"));
    }
}
