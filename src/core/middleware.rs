use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::now_v7().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Tracing span for each request, tagged with its request id
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

pub fn cors_layer(allowed_origins: Vec<String>) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    // "*" anywhere in the list opens CORS to every origin
    if allowed_origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(AllowOrigin::list(origins))
    }
}

/// Basic auth guard for the Swagger UI
///
/// `credentials` holds the expected "username:password" pair.
pub async fn swagger_basic_auth(
    State(credentials): State<Arc<String>>,
    req: Request,
    next: Next,
) -> Response {
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| BASE64_STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .is_some_and(|given| given == *credentials);

    if authorized {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"Swagger UI\"")],
        "Unauthorized",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware::from_fn_with_state, routing::get, Router};
    use axum_test::TestServer;

    fn guarded_server() -> TestServer {
        let app = Router::new()
            .route("/docs", get(|| async { "docs" }))
            .layer(from_fn_with_state(
                Arc::new("admin:secret".to_string()),
                swagger_basic_auth,
            ));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_basic_auth_accepts_matching_credentials() {
        let server = guarded_server();
        let token = BASE64_STANDARD.encode("admin:secret");

        let response = server
            .get("/docs")
            .add_header(header::AUTHORIZATION, format!("Basic {}", token))
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "docs");
    }

    #[tokio::test]
    async fn test_basic_auth_rejects_missing_or_wrong_credentials() {
        let server = guarded_server();

        let response = server.get("/docs").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let token = BASE64_STANDARD.encode("admin:wrong");
        server
            .get("/docs")
            .add_header(header::AUTHORIZATION, format!("Basic {}", token))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let request = axum::http::Request::new(());
        let mut maker = MakeRequestUuid;
        let first = maker.make_request_id(&request).unwrap();
        let second = maker.make_request_id(&request).unwrap();
        assert_ne!(first.header_value(), second.header_value());
    }
}
