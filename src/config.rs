//! Configuration and CLI argument handling

use std::{net::SocketAddr, time::Duration};

use clap::Parser;

use crate::state::PowerAction;

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "lights-out")]
#[command(about = "Shut down, restart, suspend or lock the system when a countdown runs out")]
#[command(version)]
pub struct Config {
    /// Countdown duration: plain seconds (`90`) or units (`15m`, `1h30m`, `1h2m3s`)
    #[arg(value_parser = parse_duration)]
    pub duration: Duration,

    /// Action executed when the countdown expires
    #[arg(short, long, value_enum, default_value_t = PowerAction::Shutdown)]
    pub action: PowerAction,

    /// Do not let running applications block shutdown, restart or logout
    #[arg(long)]
    pub hard: bool,

    /// Keep the system awake while the countdown runs
    #[arg(long)]
    pub prevent_sleep: bool,

    /// Start hidden, reporting progress only through the control API
    #[arg(short, long)]
    pub background: bool,

    /// Disable every way of cancelling the countdown
    #[arg(long)]
    pub forced: bool,

    /// Keep the window on top while it is shown
    #[arg(long)]
    pub on_top: bool,

    /// Free text shown next to the countdown
    #[arg(long)]
    pub status: Option<String>,

    /// Address for the HTTP control API, e.g. 127.0.0.1:20554
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Log the power action instead of executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Build the immutable countdown configuration
    pub fn countdown(&self) -> CountdownConfig {
        CountdownConfig {
            duration: self.duration,
            action: self.action,
            graceful: !self.hard,
            prevent_sleep: self.prevent_sleep,
            initially_visible: !self.background,
            forced: self.forced,
            on_top: self.on_top,
            annotation: self.status.clone().filter(|s| !s.trim().is_empty()),
            dry_run: self.dry_run,
        }
    }
}

/// Countdown parameters, fixed for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownConfig {
    pub duration: Duration,
    pub action: PowerAction,
    /// Let applications block or delay the action
    pub graceful: bool,
    /// Hold a keep-awake request while counting down
    pub prevent_sleep: bool,
    /// Start in foreground mode
    pub initially_visible: bool,
    /// No user escape routes: close requests are always suppressed
    pub forced: bool,
    pub on_top: bool,
    /// Display-only note
    pub annotation: Option<String>,
    pub dry_run: bool,
}

impl CountdownConfig {
    /// A visible, graceful, cancellable countdown
    pub fn new(duration: Duration, action: PowerAction) -> Self {
        Self {
            duration,
            action,
            graceful: true,
            prevent_sleep: false,
            initially_visible: true,
            forced: false,
            on_top: false,
            annotation: None,
            dry_run: false,
        }
    }
}

/// Longest accepted countdown: one year
pub const MAX_DURATION: Duration = Duration::from_secs(366 * 24 * 3600);

/// Parse `90`, `90s`, `15m`, `1h30m` or `1h2m3s` into a duration of at most
/// [`MAX_DURATION`]
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let duration = match input.parse::<u64>() {
        Ok(seconds) => Duration::from_secs(seconds),
        Err(_) => Duration::from_secs(parse_units(input)?),
    };

    if duration > MAX_DURATION {
        return Err(format!(
            "duration '{}' exceeds the maximum of {}s",
            input,
            MAX_DURATION.as_secs()
        ));
    }
    Ok(duration)
}

fn parse_units(input: &str) -> Result<u64, String> {
    let mut total: u64 = 0;
    let mut digits = String::new();
    let mut last_unit_rank = 0;

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        let (rank, multiplier) = match c.to_ascii_lowercase() {
            'h' => (1, 3600),
            'm' => (2, 60),
            's' => (3, 1),
            other => return Err(format!("unknown duration unit '{}' in '{}'", other, input)),
        };
        if rank <= last_unit_rank {
            return Err(format!("duration units must appear once, in h/m/s order: '{}'", input));
        }
        if digits.is_empty() {
            return Err(format!("missing number before '{}' in '{}'", c, input));
        }

        let value: u64 = digits
            .parse()
            .map_err(|e| format!("invalid number in '{}': {}", input, e))?;
        total = value
            .checked_mul(multiplier)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration '{}' is too large", input))?;

        digits.clear();
        last_unit_rank = rank;
    }

    if !digits.is_empty() {
        return Err(format!("trailing number without unit in '{}'", input));
    }

    Ok(total)
}
