//! HTTP request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router: every path answers `ok`
//! - Wire up middleware (request ID, tracing, timeout)

use axum::{routing::any, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;

/// Fixed success body.
pub const OK_BODY: &str = "ok";

/// Build the router with all middleware layers.
#[allow(deprecated)]
pub fn build_router(config: &ListenerConfig) -> Router {
    Router::new()
        .route("/", any(ok_handler))
        .route("/{*path}", any(ok_handler))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn ok_handler() -> &'static str {
    OK_BODY
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_any_method_any_path_is_ok() {
        let config = ListenerConfig::default();
        for (method, uri) in [(Method::GET, "/"), (Method::POST, "/deep/path")] {
            let response = build_router(&config)
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().contains_key("x-request-id"));
            let body = to_bytes(response.into_body(), 1024).await.unwrap();
            assert_eq!(&body[..], OK_BODY.as_bytes());
        }
    }
}
