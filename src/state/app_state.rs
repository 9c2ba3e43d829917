//! Shared state handed to the HTTP control API

use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tracing::warn;

use super::{Command, Status};

/// Handles the API uses to talk to the control loop
#[derive(Debug, Clone)]
pub struct AppState {
    /// Command queue drained by the control loop
    pub commands: mpsc::Sender<Command>,
    /// Latest countdown snapshot
    pub status: watch::Receiver<Status>,
    /// Forced mode disables every user escape route
    pub forced: bool,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(commands: mpsc::Sender<Command>, status: watch::Receiver<Status>, forced: bool) -> Self {
        Self {
            commands,
            status,
            forced,
            start_time: Instant::now(),
        }
    }

    /// Queue a command for the control loop
    pub async fn send(&self, command: Command) -> Result<(), String> {
        self.commands.send(command).await.map_err(|e| {
            warn!("Control loop is gone, dropping command: {:?}", e.0);
            "countdown control loop is not running".to_string()
        })
    }

    /// Get the latest countdown snapshot
    pub fn current_status(&self) -> Status {
        self.status.borrow().clone()
    }

    /// Calculate process uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        super::format_remaining(self.start_time.elapsed())
    }
}
