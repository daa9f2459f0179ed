//! Axum application setup

use axum::{Router, routing::post};
use std::sync::{Arc, atomic::AtomicU64};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// State shared across handlers
#[derive(Clone, Default)]
pub struct AppState {
    /// Number of traces received since start
    pub received: Arc<AtomicU64>,
}

/// Create the receiver application
pub fn create_app() -> Router {
    create_app_with_state(AppState::default())
}

pub fn create_app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/", post(super::handlers::receive_trace))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_post_root_returns_empty_ok() {
        let state = AppState::default();
        let app = create_app_with_state(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("Content-Type", "text/plain")
                    .body(Body::from("request: {}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
        assert_eq!(state.received.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_root_not_allowed() {
        let response = create_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
