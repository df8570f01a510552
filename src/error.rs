use std::fmt;

/// Why a draw was refused. Both variants are expected flow outcomes the
/// session turns into guard states, not failures surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    /// Fewer than two candidates; a lucky draw needs at least two
    /// participants to be meaningful.
    InsufficientRoster { available: usize },
    /// More winners requested than the roster holds. Keeps the requested
    /// count so the guard state can display it.
    OverRequested { requested: usize, available: usize },
}

impl DrawError {
    /// Stable code string, used by snapshots and host-side dispatch.
    pub fn code(&self) -> &'static str {
        match self {
            DrawError::InsufficientRoster { .. } => "insufficient_roster",
            DrawError::OverRequested { .. } => "over_requested",
        }
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::InsufficientRoster { available } => {
                write!(f, "need at least 2 students to draw, have {}", available)
            }
            DrawError::OverRequested {
                requested,
                available,
            } => {
                write!(
                    f,
                    "cannot pick {} winners from {} students",
                    requested, available
                )
            }
        }
    }
}

impl std::error::Error for DrawError {}

/// Rejected draw configuration. Unlike `DrawError` these are programming
/// mistakes in the embedding application, caught at session construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    BadRollDuration,
    BadFrameRate { high: f64, low: f64 },
    BadCountMenu,
    BadPointMenu,
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::BadRollDuration => "bad_roll_duration",
            ConfigError::BadFrameRate { .. } => "bad_frame_rate",
            ConfigError::BadCountMenu => "bad_count_menu",
            ConfigError::BadPointMenu => "bad_point_menu",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadRollDuration => write!(f, "roll duration must be positive"),
            ConfigError::BadFrameRate { high, low } => {
                write!(f, "frame rate endpoints out of order: {} -> {}", high, low)
            }
            ConfigError::BadCountMenu => {
                write!(f, "count menu must be non-empty with positive entries")
            }
            ConfigError::BadPointMenu => write!(f, "point menu must be non-empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
