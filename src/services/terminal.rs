//! Terminal stand-ins for the countdown window and tray notifications

use std::{
    io::{IsTerminal, Write},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use tracing::{debug, info};

use crate::{
    countdown::{Frame, Notice, Notifier, Surface},
    state::{format_remaining, VisibilityMode, WindowFlags, WindowState},
};

/// Shared window state; signal handlers flip it to simulate the user
/// minimizing or restoring the window
#[derive(Debug, Clone)]
pub struct WindowHandle {
    minimized: Arc<AtomicBool>,
}

impl WindowHandle {
    pub fn new(state: WindowState) -> Self {
        Self {
            minimized: Arc::new(AtomicBool::new(state.is_minimized())),
        }
    }

    pub fn minimize(&self) {
        self.minimized.store(true, Ordering::SeqCst);
    }

    pub fn restore(&self) {
        self.minimized.store(false, Ordering::SeqCst);
    }

    pub fn state(&self) -> WindowState {
        if self.minimized.load(Ordering::SeqCst) {
            WindowState::Minimized
        } else {
            WindowState::Normal
        }
    }
}

/// One line of countdown text, e.g. "Shutdown in 4m 59s (render job)"
pub fn frame_text(frame: &Frame<'_>) -> String {
    let mut text = format!("{} in {}", frame.action, format_remaining(frame.remaining));
    if let Some(annotation) = frame.annotation {
        text.push_str(&format!(" ({})", annotation));
    }
    text
}

/// Renders the countdown on stdout while in the foreground
#[derive(Debug)]
pub struct TerminalSurface {
    window: WindowHandle,
    interactive: bool,
}

impl TerminalSurface {
    pub fn new(window: WindowHandle) -> Self {
        Self {
            window,
            interactive: std::io::stdout().is_terminal(),
        }
    }
}

impl Surface for TerminalSurface {
    fn refresh(&mut self, frame: &Frame<'_>) {
        let text = frame_text(frame);
        if frame.mode == VisibilityMode::Background {
            debug!("Tray: {}", text);
            return;
        }

        let mut stdout = std::io::stdout().lock();
        // Rewrite the same line on a terminal, one line per second otherwise
        let _ = if self.interactive {
            write!(stdout, "\r\x1b[2K{}", text)
        } else {
            writeln!(stdout, "{}", text)
        };
        let _ = stdout.flush();
    }

    fn apply(&mut self, flags: &WindowFlags) {
        debug!("Applying window flags: {:?}", flags);
        match flags.window_state() {
            WindowState::Normal => self.window.restore(),
            WindowState::Minimized => {
                self.window.minimize();
                if self.interactive {
                    println!();
                }
            }
        }
    }

    fn observe(&self) -> WindowState {
        self.window.state()
    }
}

/// Text of a user notification
pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::Milestone { mark, .. } => format!("{} left", mark),
        Notice::Backgrounded { remaining } => format!(
            "Still counting down in the background, {} left",
            format_remaining(*remaining)
        ),
        Notice::Cancelled { action } => format!("{} cancelled", action),
    }
}

/// Logs notifications; the closest thing a terminal has to a tray balloon
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notice: Notice) {
        info!("{}", notice_text(&notice));
    }
}
