//! OCPI credentials token authentication
//!
//! CPOs present the token they received during the credentials handshake as
//! `Authorization: Token <token>`. OCPI 2.2.1 base64-encodes the token in
//! the header, 2.1.1 peers send it raw; both forms are accepted.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use super::common::error_response;
use crate::domain::DomainError;

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    MalformedHeader,
    UnknownToken,
}

/// Tokens accepted from CPOs
#[derive(Clone, Default)]
pub struct OcpiAuthState {
    tokens: Arc<HashSet<String>>,
}

impl OcpiAuthState {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: Arc::new(tokens.into_iter().filter(|t| !t.is_empty()).collect()),
        }
    }

    /// Authentication is skipped when no token is configured.
    pub fn is_enabled(&self) -> bool {
        !self.tokens.is_empty()
    }

    fn verify(&self, auth_header: &str) -> Result<(), AuthError> {
        let token = extract_token(auth_header).ok_or(AuthError::MalformedHeader)?;
        if self.tokens.contains(token) {
            return Ok(());
        }
        let decoded = STANDARD
            .decode(token)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        match decoded {
            Some(plain) if self.tokens.contains(&plain) => Ok(()),
            _ => Err(AuthError::UnknownToken),
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Token") && !token.is_empty()).then_some(token)
}

/// OCPI token authentication middleware
pub async fn ocpi_auth_middleware(
    State(auth_state): State<OcpiAuthState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !auth_state.is_enabled() {
        return next.run(request).await;
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    match auth_state.verify(auth_header) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!("Rejected OCPI request: {:?}", e);
            auth_error_response(e)
        }
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let message = match error {
        AuthError::MissingToken => "Missing Authorization header",
        AuthError::MalformedHeader => "Authorization header must be 'Token <token>'",
        AuthError::UnknownToken => "Unknown credentials token",
    };
    error_response(DomainError::Unauthorized(message.to_string())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(tokens: &[&str]) -> Router {
        let state = OcpiAuthState::new(tokens.iter().map(|t| t.to_string()));
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, ocpi_auth_middleware))
    }

    async fn status(app: Router, auth: Option<&str>) -> StatusCode {
        let mut req = Request::builder().uri("/");
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }
        app.oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn rejection_body_names_unauthorized() {
        let response = app(&["secret"])
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(header::AUTHORIZATION, "Token other")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unauthorized: Unknown credentials token");
    }

    #[tokio::test]
    async fn disabled_without_tokens() {
        assert_eq!(status(app(&[]), None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert_eq!(status(app(&["secret"]), None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_raw_and_base64_tokens() {
        let encoded = format!("Token {}", STANDARD.encode("secret"));
        assert_eq!(status(app(&["secret"]), Some("Token secret")).await, StatusCode::OK);
        assert_eq!(status(app(&["secret"]), Some(&encoded)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn rejects_unknown_token_and_other_schemes() {
        assert_eq!(
            status(app(&["secret"]), Some("Token other")).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(app(&["secret"]), Some("Bearer secret")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn extract_token_requires_token_scheme() {
        assert_eq!(extract_token("Token abc"), Some("abc"));
        assert_eq!(extract_token("token  abc "), Some("abc"));
        assert_eq!(extract_token("Token "), None);
        assert_eq!(extract_token("abc"), None);
    }
}
