//! Visibility mode and window state types

use serde::{Deserialize, Serialize};

/// Authoritative display mode owned by the visibility controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityMode {
    /// Window shown, listed in the taskbar, on top if configured
    Foreground,
    /// Window hidden; the tray surface is the only affordance
    Background,
}

/// Window state as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    Normal,
    Minimized,
}

impl WindowState {
    pub fn is_minimized(&self) -> bool {
        matches!(self, Self::Minimized)
    }
}

/// Window flags applied on every visibility transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFlags {
    pub visible: bool,
    pub on_top: bool,
    pub in_taskbar: bool,
    /// "Hide" menu entry enabled
    pub hide_enabled: bool,
    /// "Show" menu entry enabled
    pub show_enabled: bool,
    /// Cancel/close affordances enabled; false in forced mode
    pub cancel_enabled: bool,
}

impl WindowFlags {
    /// Flags that realise `mode`
    pub fn for_mode(mode: VisibilityMode, on_top: bool, forced: bool) -> Self {
        match mode {
            VisibilityMode::Foreground => Self {
                visible: true,
                on_top,
                in_taskbar: true,
                hide_enabled: true,
                show_enabled: false,
                cancel_enabled: !forced,
            },
            VisibilityMode::Background => Self {
                visible: false,
                on_top: false,
                in_taskbar: false,
                hide_enabled: false,
                show_enabled: true,
                cancel_enabled: !forced,
            },
        }
    }

    /// Window state the platform ends up in once these flags are applied
    pub fn window_state(&self) -> WindowState {
        if self.visible {
            WindowState::Normal
        } else {
            WindowState::Minimized
        }
    }
}
