//! lights-out - Shut down, restart, suspend or lock the system when a countdown runs out
//!
//! This is the main entry point for the lights-out application.

use std::sync::Arc;

use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
};
use tracing::{error, info, warn};

use lights_out::{
    api::create_router,
    config::Config,
    countdown::{Collaborators, Flow, MonotonicClock, Session},
    services::{
        check_power_tools, restart_process, InhibitorSleepGuard, SystemPowerDispatcher,
        TerminalNotifier, TerminalPrompt, TerminalSurface, WindowHandle,
    },
    state::{AppState, WindowState},
    tasks::{run_control_loop, LoopChannels, LoopTiming},
    utils::forward_signals,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("lights_out={},tower_http=info", config.log_level()))
        .init();

    let countdown = config.countdown();
    info!("Starting lights-out v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: action={}, duration={}s, graceful={}, forced={}, prevent_sleep={}",
        countdown.action,
        countdown.duration.as_secs(),
        countdown.graceful,
        countdown.forced,
        countdown.prevent_sleep
    );

    // The power action must be executable before we start counting
    if countdown.dry_run {
        warn!("Dry run: {} will only be logged", countdown.action);
    } else if let Err(e) = check_power_tools(countdown.action, countdown.prevent_sleep).await {
        error!("{}", e);
        std::process::exit(1);
    }

    let window = WindowHandle::new(if countdown.initially_visible {
        WindowState::Normal
    } else {
        WindowState::Minimized
    });

    let collaborators = Collaborators {
        clock: Box::new(MonotonicClock),
        dispatcher: Box::new(SystemPowerDispatcher::new(countdown.dry_run)),
        sleep_guard: Box::new(InhibitorSleepGuard::new(countdown.action, countdown.dry_run)),
        surface: Box::new(TerminalSurface::new(window.clone())),
        notifier: Box::new(TerminalNotifier),
    };
    let forced = countdown.forced;
    let session = Session::new(countdown, collaborators);

    let (command_tx, commands) = mpsc::channel(64);
    let (status_tx, status_rx) = watch::channel(session.status());

    // Signals become close requests and window changes
    let signal_tx = command_tx.clone();
    let signal_window = window.clone();
    tokio::spawn(async move {
        if let Err(e) = forward_signals(signal_tx, signal_window).await {
            error!("{}", e);
        }
    });

    // Optional HTTP control API
    if let Some(addr) = config.listen {
        let state = Arc::new(AppState::new(command_tx.clone(), status_rx, forced));
        let listener = TcpListener::bind(addr).await?;
        info!("Control API running on http://{}", addr);
        info!("Endpoints:");
        info!("  GET  /status        - Remaining time and mode");
        info!("  POST /hide          - Move to the background");
        info!("  POST /show          - Bring to the foreground");
        info!("  POST /restart-timer - Reset the countdown");
        info!("  POST /restart-app   - Restart lights-out");
        info!("  POST /close         - Request to close (asks for confirmation)");
        info!("  GET  /health        - Health check");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, create_router(state)).await {
                error!("Control API error: {}", e);
            }
        });
    }

    let channels = LoopChannels {
        commands,
        command_tx,
        status_tx,
    };
    let flow = run_control_loop(
        session,
        channels,
        LoopTiming::default(),
        Arc::new(TerminalPrompt),
    )
    .await;

    if flow == Flow::Restart {
        if let Err(e) = restart_process() {
            error!("{}", e);
        }
    }

    info!("lights-out exiting");
    // A pending confirmation prompt must not keep the process alive
    std::process::exit(0)
}
