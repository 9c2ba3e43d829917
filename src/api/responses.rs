//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{countdown::CloseDecision, state::Status};

/// Response for control endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub countdown: Status,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, countdown: Status) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            countdown,
        }
    }

    /// The command was queued for the control loop
    pub fn accepted(message: String, countdown: Status) -> Self {
        Self::new("accepted".to_string(), message, countdown)
    }

    /// Outcome of a close request
    pub fn close(decision: CloseDecision, countdown: Status) -> Self {
        let (status, message) = match decision {
            CloseDecision::Suppressed => ("suppressed", "Close request ignored"),
            CloseDecision::Proceed => ("closing", "Application is already exiting"),
            CloseDecision::AskUser => ("confirming", "Waiting for confirmation on the terminal"),
        };
        Self::new(status.to_string(), message.to_string(), countdown)
    }
}

/// Status response with process uptime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub countdown: Status,
    pub uptime: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
