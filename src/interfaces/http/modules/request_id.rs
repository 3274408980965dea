//! Request ID middleware
//!
//! OCPI peers send `X-Request-ID` and `X-Correlation-ID` on every call.
//! Both are reused when present and generated otherwise, attached to a
//! `tracing::Span` for the request and echoed back in the response.

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for the per-hop request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header name for the ID shared by every hop of one exchange.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// New-type wrapper for the request ID, stored in request extensions.
///
/// Extract in handlers: `Extension(RequestId(id)): Extension<RequestId>`
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Correlation ID, stored in request extensions next to [`RequestId`].
#[derive(Clone, Debug)]
pub struct CorrelationId(pub String);

fn header_or_new(request: &Request<Body>, name: &str) -> String {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Middleware that assigns (or propagates) `X-Request-ID` and `X-Correlation-ID`.
pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = header_or_new(&request, REQUEST_ID_HEADER);
    let correlation_id = header_or_new(&request, CORRELATION_ID_HEADER);

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));
    request
        .extensions_mut()
        .insert(CorrelationId(correlation_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        correlation_id = %correlation_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        headers.insert(CORRELATION_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|Extension(RequestId(id)): Extension<RequestId>| async move { id }),
            )
            .layer(middleware::from_fn(request_id_middleware))
    }

    #[tokio::test]
    async fn echoes_incoming_ids() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "req-1")
                    .header(CORRELATION_ID_HEADER, "corr-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-1");
        assert_eq!(response.headers()[CORRELATION_ID_HEADER], "corr-1");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"req-1");
    }

    #[tokio::test]
    async fn generates_missing_ids() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let request_id = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        let correlation_id = response.headers()[CORRELATION_ID_HEADER].to_str().unwrap();
        assert!(Uuid::parse_str(request_id).is_ok());
        assert!(Uuid::parse_str(correlation_id).is_ok());
        assert_ne!(request_id, correlation_id);
    }
}
