//! Signal handling: close requests and simulated window changes

use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM, SIGUSR1, SIGUSR2};
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{services::WindowHandle, state::Command};

/// Translate signals into countdown input until the control loop goes away.
///
/// SIGINT and SIGTERM become close requests, so the close negotiation decides
/// whether the process may end. SIGUSR1 and SIGUSR2 minimize and restore the
/// window from outside, which the control loop picks up on its next tick.
pub async fn forward_signals(
    commands: mpsc::Sender<Command>,
    window: WindowHandle,
) -> Result<(), String> {
    let mut signals = Signals::new([SIGINT, SIGTERM, SIGUSR1, SIGUSR2])
        .map_err(|e| format!("Failed to create signal handler: {}", e))?;

    while let Some(signal) = signals.next().await {
        debug!("Received signal: {}", signal);
        match signal {
            SIGINT | SIGTERM => {
                info!("Close requested by signal {}", signal);
                if commands.send(Command::Close { reply: None }).await.is_err() {
                    break;
                }
            }
            SIGUSR1 => window.minimize(),
            SIGUSR2 => window.restore(),
            _ => {}
        }
    }

    Ok(())
}
