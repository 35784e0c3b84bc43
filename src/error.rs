//! Scheduler error types

use core::fmt;

/// Result type for scheduler lifecycle operations
pub type Result<T> = core::result::Result<T, Error>;

/// Scheduler-level errors
///
/// Overload is deliberately absent: it is a sticky status, not an error
/// returned to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The tick source could not be armed. No scheduling takes place.
    TickSource(ArmError),
    /// `start` was called while the scheduler is already running
    AlreadyStarted,
    /// The kernel API was used before `kernel::init`
    NotInitialized,
}

/// Tick source arming errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmError {
    /// Requested frequency is zero or above the timer clock
    InvalidFrequency,
    /// Required reload value does not fit the timer's counter
    ReloadOutOfRange,
    /// The underlying timer refused the configuration
    Unavailable,
}

impl From<ArmError> for Error {
    fn from(err: ArmError) -> Self {
        Error::TickSource(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TickSource(err) => write!(f, "tick source arming failed: {}", err),
            Error::AlreadyStarted => write!(f, "scheduler already started"),
            Error::NotInitialized => write!(f, "scheduler not initialized"),
        }
    }
}

impl fmt::Display for ArmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmError::InvalidFrequency => write!(f, "invalid tick frequency"),
            ArmError::ReloadOutOfRange => write!(f, "reload value out of range"),
            ArmError::Unavailable => write!(f, "timer unavailable"),
        }
    }
}
