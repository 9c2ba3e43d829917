//! Process restart

use std::process::Command;

use tracing::info;

/// Launch a fresh copy of this binary with the same arguments.
///
/// The caller exits afterwards; the new process starts its own countdown.
pub fn restart_process() -> Result<(), String> {
    let exe = std::env::current_exe()
        .map_err(|e| format!("Failed to locate current executable: {}", e))?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    let child = Command::new(&exe)
        .args(&args)
        .spawn()
        .map_err(|e| format!("Failed to restart {}: {}", exe.display(), e))?;

    info!("Restarted as pid {}", child.id());
    Ok(())
}
