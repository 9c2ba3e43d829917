//! HTTP control API module
//!
//! The tray menu of the countdown: status, hide/show, restart and close.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hide", post(hide_handler))
        .route("/show", post(show_handler))
        .route("/restart-timer", post(restart_timer_handler))
        .route("/restart-app", post(restart_app_handler))
        .route("/close", post(close_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tokio::sync::{mpsc, watch};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        countdown::CloseDecision,
        state::{format_remaining, Command, Phase, PowerAction, Status, VisibilityMode},
    };

    fn status() -> Status {
        Status {
            phase: Phase::Running,
            remaining_seconds: 42,
            remaining: format_remaining(Duration::from_secs(42)),
            mode: VisibilityMode::Foreground,
            action: PowerAction::Sleep,
            graceful: true,
            forced: false,
            annotation: None,
            started_at: None,
        }
    }

    fn app(forced: bool) -> (Router, mpsc::Receiver<Command>) {
        let (tx, rx) = mpsc::channel(8);
        let (_status_tx, status_rx) = watch::channel(status());
        let state = Arc::new(AppState::new(tx, status_rx, forced));
        (create_router(state), rx)
    }

    fn post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn status_reports_snapshot() {
        let (router, _rx) = app(false);
        let response = router
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["countdown"]["remaining_seconds"], 42);
        assert_eq!(json["countdown"]["action"], "sleep");
        assert_eq!(json["countdown"]["mode"], "foreground");
    }

    #[tokio::test]
    async fn hide_queues_a_command() {
        let (router, mut rx) = app(false);
        let response = router.oneshot(post("/hide")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(matches!(rx.recv().await, Some(Command::Hide)));
    }

    #[tokio::test]
    async fn restart_routes_are_forbidden_when_forced() {
        let (router, mut rx) = app(true);
        let response = router.clone().oneshot(post("/restart-timer")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let response = router.oneshot(post("/restart-app")).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn close_reports_negotiation_outcome() {
        let (router, mut rx) = app(false);
        tokio::spawn(async move {
            if let Some(Command::Close { reply: Some(reply) }) = rx.recv().await {
                let _ = reply.send(CloseDecision::AskUser);
            }
        });

        let response = router.oneshot(post("/close")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "confirming");
    }

    #[tokio::test]
    async fn commands_fail_when_loop_is_gone() {
        let (router, rx) = app(false);
        drop(rx);
        let response = router.oneshot(post("/show")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
