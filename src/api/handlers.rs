//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use super::responses::{ApiResponse, HealthResponse, StatusResponse};
use crate::state::{AppState, Command};

/// Queue a command and answer with the current snapshot
async fn enqueue(
    state: &AppState,
    command: Command,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.send(command).await {
        Ok(()) => Ok(Json(ApiResponse::accepted(
            message.to_string(),
            state.current_status(),
        ))),
        Err(e) => {
            error!("{}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle POST /hide - Move the countdown to the tray
pub async fn hide_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    info!("Hide endpoint called");
    enqueue(&state, Command::Hide, "Hide requested").await
}

/// Handle POST /show - Bring the countdown back to the foreground
pub async fn show_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    info!("Show endpoint called");
    enqueue(&state, Command::Show, "Show requested").await
}

/// Handle POST /restart-timer - Reset the countdown to its full duration
pub async fn restart_timer_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if state.forced {
        warn!("Restart-timer endpoint called in forced mode");
        return Err(StatusCode::FORBIDDEN);
    }
    info!("Restart-timer endpoint called");
    enqueue(&state, Command::RestartTimer, "Timer restart requested").await
}

/// Handle POST /restart-app - Re-execute the process
pub async fn restart_app_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    if state.forced {
        warn!("Restart-app endpoint called in forced mode");
        return Err(StatusCode::FORBIDDEN);
    }
    info!("Restart-app endpoint called");
    enqueue(&state, Command::RestartApplication, "Application restart requested").await
}

/// Handle POST /close - Ask to close, subject to close negotiation
pub async fn close_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    let (reply, decision) = oneshot::channel();
    if let Err(e) = state.send(Command::Close { reply: Some(reply) }).await {
        error!("{}", e);
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    match decision.await {
        Ok(decision) => {
            info!("Close endpoint called - {:?}", decision);
            Ok(Json(ApiResponse::close(decision, state.current_status())))
        }
        Err(_) => {
            error!("Control loop dropped the close request");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Handle GET /status - Return the current countdown snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        countdown: state.current_status(),
        uptime: state.get_uptime(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
